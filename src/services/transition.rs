//! Pure transition function for the chat widget.
//!
//! Given the current state and an event, decide the next state and the
//! effects the runtime must carry out. No I/O happens here.

use thiserror::Error;
use tracing::debug;

use crate::config::ChatConfig;
use crate::error::WebhookError;
use crate::message::Sender;
use crate::services::interpreter::{RawResponse, extract_reply};
use crate::state::{Activity, Visibility, WidgetState};

/// Everything that can happen to the widget.
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    ToggleRequested,
    OpenRequested,
    /// Minimize button, Escape key or overlay click.
    CloseRequested,
    UserSubmitted { text: String },
    SuggestionChosen { index: usize },
    ReplyReceived { raw: RawResponse },
    ReplyFailed { error: WebhookError },
    ClearRequested,
    WelcomeElapsed,
}

/// Work for the runtime after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Reveal,
    FocusInput,
    /// Hide the window and release any page scroll lock.
    Hide,
    SetBadge(bool),
    HideSuggestions,
    AppendMessage { sender: Sender, content: String },
    ClearInput,
    SetTyping(bool),
    RequestReply { text: String },
    ClearMessages,
}

#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: WidgetState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: WidgetState) -> Self {
        Self { new_state: state, effects: vec![] }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A reply is still pending, message not sent")]
    AwaitingReply,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Message is {len} characters, the limit is {max}")]
    MessageTooLong { len: usize, max: usize },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    state: &WidgetState,
    config: &ChatConfig,
    event: WidgetEvent,
) -> Result<TransitionResult, TransitionError> {
    match event {
        WidgetEvent::ToggleRequested => Ok(match state.visibility {
            Visibility::Closed => open(state),
            Visibility::Open => close(state),
        }),
        WidgetEvent::OpenRequested => Ok(open(state)),
        WidgetEvent::CloseRequested => Ok(close(state)),

        WidgetEvent::UserSubmitted { text } => submit(state, config, &text),
        WidgetEvent::SuggestionChosen { index } => {
            let suggestion = config.quick_replies.get(index).ok_or_else(|| {
                TransitionError::InvalidTransition(format!("no suggestion at index {index}"))
            })?;
            submit(state, config, &suggestion.message)
        }

        WidgetEvent::ReplyReceived { raw } => {
            ensure_awaiting(state)?;
            let content = extract_reply(&raw).unwrap_or_else(|| {
                debug!("no usable reply in webhook response, using fallback");
                config.fallback_message()
            });
            Ok(finish_reply(state, content))
        }
        WidgetEvent::ReplyFailed { error } => {
            ensure_awaiting(state)?;
            debug!(error = %error, "webhook failed, using fallback");
            Ok(finish_reply(state, config.fallback_message()))
        }

        WidgetEvent::ClearRequested => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::ClearMessages))
        }

        WidgetEvent::WelcomeElapsed => {
            if state.is_open() || !config.enable_notifications || state.badge_visible {
                return Ok(TransitionResult::new(state.clone()));
            }
            let next = WidgetState { badge_visible: true, ..state.clone() };
            Ok(TransitionResult::new(next).with_effect(Effect::SetBadge(true)))
        }
    }
}

fn open(state: &WidgetState) -> TransitionResult {
    if state.is_open() {
        return TransitionResult::new(state.clone());
    }
    let next = WidgetState {
        visibility: Visibility::Open,
        badge_visible: false,
        ..state.clone()
    };
    TransitionResult::new(next)
        .with_effect(Effect::Reveal)
        .with_effect(Effect::FocusInput)
        .with_effect(Effect::SetBadge(false))
}

fn close(state: &WidgetState) -> TransitionResult {
    if !state.is_open() {
        return TransitionResult::new(state.clone());
    }
    let next = WidgetState { visibility: Visibility::Closed, ..state.clone() };
    TransitionResult::new(next).with_effect(Effect::Hide)
}

fn submit(state: &WidgetState, config: &ChatConfig, text: &str) -> Result<TransitionResult, TransitionError> {
    if state.is_awaiting_reply() {
        return Err(TransitionError::AwaitingReply);
    }
    let text = text.trim();
    if text.is_empty() {
        return Err(TransitionError::EmptyMessage);
    }
    let len = text.chars().count();
    if len > config.max_message_length {
        return Err(TransitionError::MessageTooLong { len, max: config.max_message_length });
    }

    let next = WidgetState {
        activity: Activity::AwaitingReply,
        suggestions_visible: false,
        ..state.clone()
    };
    let mut result = TransitionResult::new(next)
        .with_effect(Effect::AppendMessage { sender: Sender::User, content: text.to_string() })
        .with_effect(Effect::ClearInput);
    if state.suggestions_visible {
        result = result.with_effect(Effect::HideSuggestions);
    }
    Ok(result
        .with_effect(Effect::SetTyping(true))
        .with_effect(Effect::RequestReply { text: text.to_string() }))
}

fn ensure_awaiting(state: &WidgetState) -> Result<(), TransitionError> {
    if state.is_awaiting_reply() {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition("reply arrived with no request in flight".to_string()))
    }
}

fn finish_reply(state: &WidgetState, content: String) -> TransitionResult {
    let next = WidgetState { activity: Activity::Idle, ..state.clone() };
    TransitionResult::new(next)
        .with_effect(Effect::SetTyping(false))
        .with_effect(Effect::AppendMessage { sender: Sender::Bot, content })
}
