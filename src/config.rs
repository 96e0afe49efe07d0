// src/config.rs
use std::time::Duration;

use reqwest::Url;
use serde::Serialize;

use crate::error::ChatError;

pub const DEFAULT_WEBHOOK_URL: &str =
    "https://singular-dear-jaybird.ngrok-free.app/webhook/cfa4d4c3-0f1c-49bc-b1f9-4d5c4b719b44";

pub const DEFAULT_FALLBACK_TEMPLATE: &str = "Lo siento, no pude procesar tu consulta en este momento. \
Por favor, intenta nuevamente o contáctanos directamente al {phone}.";

/// A suggestion button: `label` is what the user sees, `message` is sent verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuickReply {
    pub label: String,
    pub message: String,
}

impl QuickReply {
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self { label: label.into(), message: message.into() }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatConfig {
    pub webhook_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub retry_multiplier: u32,
    pub history_limit: usize,
    pub context_messages: usize,
    pub max_message_length: usize,
    pub user_agent: String,
    pub source: String,
    pub version: String,
    pub page_url: String,
    pub locale: String,
    pub timezone: String,
    pub welcome_delay: Duration,
    pub enable_notifications: bool,
    pub quick_replies: Vec<QuickReply>,
    pub fallback_template: String,
    pub contact_phone: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            retry_multiplier: 2,
            history_limit: 50,
            context_messages: 5,
            max_message_length: 1000,
            user_agent: "LegalChatWidget/1.0".to_string(),
            source: "legal_chat_widget".to_string(),
            version: "1.0".to_string(),
            page_url: "about:blank".to_string(),
            locale: "es-PE".to_string(),
            timezone: "America/Lima".to_string(),
            welcome_delay: Duration::from_secs(2),
            enable_notifications: true,
            quick_replies: vec![
                QuickReply::new("Documentos divorcio", "¿Qué documentos necesito para un divorcio?"),
                QuickReply::new("Derechos laborales", "¿Cuáles son mis derechos laborales?"),
                QuickReply::new("Registro empresa", "¿Cómo registro una empresa?"),
                QuickReply::new("Accidente tránsito", "¿Qué hacer en caso de accidente de tránsito?"),
            ],
            fallback_template: DEFAULT_FALLBACK_TEMPLATE.to_string(),
            contact_phone: "(01) 234-5678".to_string(),
        }
    }
}

impl ChatConfig {
    /// Loads `.env` if present, then applies `CHAT_*` overrides from the process environment.
    pub fn from_env() -> Result<Self, ChatError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ChatError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("CHAT_WEBHOOK_URL") {
            config.webhook_url = url;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "CHAT_TIMEOUT_MS")? {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(n) = parse_var(&lookup, "CHAT_MAX_RETRIES")? {
            config.max_retries = n;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "CHAT_RETRY_DELAY_MS")? {
            config.retry_delay = Duration::from_millis(ms);
        }
        if let Some(n) = parse_var(&lookup, "CHAT_HISTORY_LIMIT")? {
            config.history_limit = n;
        }
        if let Some(n) = parse_var(&lookup, "CHAT_MAX_MESSAGE_LENGTH")? {
            config.max_message_length = n;
        }
        if let Some(url) = lookup("CHAT_PAGE_URL") {
            config.page_url = url;
        }
        if let Some(locale) = lookup("CHAT_LOCALE").or_else(|| lookup("LANG")) {
            config.locale = locale;
        }
        if let Some(tz) = lookup("CHAT_TIMEZONE").or_else(|| lookup("TZ")) {
            config.timezone = tz;
        }
        if let Some(phone) = lookup("CHAT_CONTACT_PHONE") {
            config.contact_phone = phone;
        }
        if let Some(template) = lookup("CHAT_FALLBACK_TEMPLATE") {
            config.fallback_template = template;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        self.parsed_webhook_url()?;
        if self.timeout.is_zero() {
            return Err(ChatError::InvalidConfiguration("timeout must be non-zero".to_string()));
        }
        if self.history_limit == 0 {
            return Err(ChatError::InvalidConfiguration(
                "history limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn parsed_webhook_url(&self) -> Result<Url, ChatError> {
        if self.webhook_url.trim().is_empty() {
            return Err(ChatError::InvalidConfiguration("webhook URL is required".to_string()));
        }
        let url = Url::parse(self.webhook_url.trim()).map_err(|e| {
            ChatError::InvalidConfiguration(format!("webhook URL {:?} is not valid: {e}", self.webhook_url))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ChatError::InvalidConfiguration(format!(
                "webhook URL scheme must be http or https, got {other}"
            ))),
        }
    }

    /// The apology shown whenever no reply can be rendered.
    pub fn fallback_message(&self) -> String {
        self.fallback_template.replace("{phone}", &self.contact_phone)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ChatError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ChatError::InvalidConfiguration(format!("{key}={raw:?}: {e}"))),
    }
}
