// src/state.rs
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Closed,
    Open,
}

/// Orthogonal to visibility: whether a webhook request is outstanding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    #[default]
    Idle,
    AwaitingReply,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WidgetState {
    pub visibility: Visibility,
    pub activity: Activity,
    pub badge_visible: bool,
    pub suggestions_visible: bool,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            visibility: Visibility::Closed,
            activity: Activity::Idle,
            badge_visible: false,
            suggestions_visible: true,
        }
    }
}

impl WidgetState {
    pub fn is_open(&self) -> bool {
        self.visibility == Visibility::Open
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.activity == Activity::AwaitingReply
    }
}
