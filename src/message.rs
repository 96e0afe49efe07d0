// src/message.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One exchanged chat message. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
}

impl Message {
    pub fn new(sender: Sender, content: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            content: content.into(),
            timestamp: Utc::now(),
            session_id: session_id.into(),
        }
    }
}

/// Body POSTed to the webhook, built fresh for every send.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundPayload {
    pub message: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub context: RequestContext,
    pub metadata: RequestMetadata,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub user_agent: String,
    pub url: String,
    pub locale: String,
    pub timezone: String,
    /// Most recent messages, oldest first. Sent as `context.history`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryEntry>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    pub request_id: String,
    pub source: String,
    pub version: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct HistoryEntry {
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for HistoryEntry {
    fn from(m: &Message) -> Self {
        Self { sender: m.sender, content: m.content.clone(), timestamp: m.timestamp }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_uses_camel_case_wire_names() {
        let payload = OutboundPayload {
            message: "Hola".to_string(),
            session_id: "s-1".to_string(),
            timestamp: Utc::now(),
            context: RequestContext {
                user_agent: "LegalChatWidget/1.0".to_string(),
                url: "https://example.com/".to_string(),
                locale: "es-PE".to_string(),
                timezone: "America/Lima".to_string(),
                history: vec![],
            },
            metadata: RequestMetadata {
                request_id: "req-1".to_string(),
                source: "legal_chat_widget".to_string(),
                version: "1.0".to_string(),
            },
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["sessionId"], json!("s-1"));
        assert_eq!(value["context"]["userAgent"], json!("LegalChatWidget/1.0"));
        assert_eq!(value["metadata"]["requestId"], json!("req-1"));
        assert!(value["context"].get("history").is_none());
        assert!(value.get("history").is_none());
    }
}
