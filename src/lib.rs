pub mod config;
pub mod error;
pub mod message;
pub mod services;
pub mod state;
pub mod ui;
pub mod widget;

pub use config::{ChatConfig, QuickReply};
pub use error::{ChatError, WebhookError};
pub use message::{Message, OutboundPayload, Sender};
pub use services::interpreter::{RawResponse, clean_message, extract_reply};
pub use services::message_store::MessageStore;
pub use services::session::Session;
pub use services::transition::{Effect, TransitionError, WidgetEvent};
pub use services::webhook_client::{ReplySource, RetryPolicy, WebhookClient};
pub use state::{Activity, Visibility, WidgetState};
pub use ui::ChatView;
pub use widget::{ChatWidget, Diagnosis};
