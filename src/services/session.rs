// src/services/session.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Client-side conversation identity, created once per widget lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    session_id: String,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            session_id: format!("chat_{}", Uuid::new_v4().simple()),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
