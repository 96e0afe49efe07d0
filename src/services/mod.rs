// src/services/mod.rs
pub mod interpreter;
pub mod message_store;
pub mod metrics_manager;
pub mod session;
pub mod transition;
pub mod webhook_client;
