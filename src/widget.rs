// src/widget.rs
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::message::Message;
use crate::services::message_store::MessageStore;
use crate::services::metrics_manager::MetricsData;
use crate::services::session::Session;
use crate::services::transition::{Effect, TransitionError, WidgetEvent, transition};
use crate::services::webhook_client::{ReplySource, build_payload};
use crate::state::WidgetState;
use crate::ui::ChatView;

/// Snapshot of the widget for debugging.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub session: Session,
    pub state: WidgetState,
    pub message_count: usize,
    pub history_limit: usize,
    pub request_in_flight: bool,
    pub metrics: Option<MetricsData>,
}

/// An initialised chat widget. Owns the session, the message store and the
/// view; all state changes go through [`ChatWidget::dispatch`].
pub struct ChatWidget<V: ChatView> {
    config: ChatConfig,
    session: Session,
    store: MessageStore,
    state: WidgetState,
    source: Arc<dyn ReplySource>,
    view: V,
    events_tx: mpsc::UnboundedSender<WidgetEvent>,
    events_rx: mpsc::UnboundedReceiver<WidgetEvent>,
    /// Replies from spawned requests, tagged with the request generation.
    replies_tx: mpsc::UnboundedSender<(u64, WidgetEvent)>,
    replies_rx: mpsc::UnboundedReceiver<(u64, WidgetEvent)>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl<V: ChatView> ChatWidget<V> {
    pub fn init(config: ChatConfig, source: Arc<dyn ReplySource>, view: V) -> Result<Self, ChatError> {
        config.validate()?;
        let session = Session::new();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        info!(session_id = session.id(), "chat widget initialised");

        Ok(Self {
            store: MessageStore::new(config.history_limit),
            config,
            session,
            state: WidgetState::default(),
            source,
            view,
            events_tx,
            events_rx,
            replies_tx,
            replies_rx,
            generation: 0,
            in_flight: None,
        })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn history(&self) -> Vec<Message> {
        self.store.all()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Sender for events produced outside the widget (timers, other tasks).
    pub fn events(&self) -> mpsc::UnboundedSender<WidgetEvent> {
        self.events_tx.clone()
    }

    /// Emit `WelcomeElapsed` once the configured welcome delay has passed.
    pub fn schedule_welcome(&self) {
        if !self.config.enable_notifications {
            return;
        }
        let tx = self.events_tx.clone();
        let delay = self.config.welcome_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(WidgetEvent::WelcomeElapsed);
        });
    }

    /// Apply one event. Rejected events leave the widget untouched.
    pub fn dispatch(&mut self, event: WidgetEvent) -> Result<(), TransitionError> {
        let result = transition(&self.state, &self.config, event).inspect_err(|e| {
            debug!(session_id = self.session.id(), error = %e, "event rejected");
        })?;
        self.state = result.new_state;
        for effect in result.effects {
            self.apply(effect);
        }
        Ok(())
    }

    /// Next event to dispatch. Replies belonging to a superseded request are
    /// dropped here and never reach the state machine.
    pub async fn next_event(&mut self) -> Option<WidgetEvent> {
        loop {
            tokio::select! {
                Some((generation, event)) = self.replies_rx.recv() => {
                    if generation == self.generation {
                        return Some(event);
                    }
                    debug!(session_id = self.session.id(), generation, "stale reply dropped");
                }
                event = self.events_rx.recv() => return event,
            }
        }
    }

    /// Wait for the pending reply, if any, and apply it.
    pub async fn settle(&mut self) {
        while self.state.is_awaiting_reply() {
            let Some(event) = self.next_event().await else {
                break;
            };
            let _ = self.dispatch(event);
        }
    }

    pub async fn diagnose(&self) -> Diagnosis {
        let metrics = match self.source.metrics() {
            Some(m) => Some(m.get_metrics().await),
            None => None,
        };
        Diagnosis {
            session: self.session.clone(),
            state: self.state.clone(),
            message_count: self.store.len(),
            history_limit: self.store.capacity(),
            request_in_flight: self.in_flight.as_ref().is_some_and(|h| !h.is_finished()),
            metrics,
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Reveal => self.view.open(),
            Effect::FocusInput => self.view.focus_input(),
            Effect::Hide => self.view.close(),
            Effect::SetBadge(visible) => self.view.set_badge(visible),
            Effect::HideSuggestions => self.view.hide_suggestions(),
            Effect::AppendMessage { sender, content } => {
                let message = Message::new(sender, content, self.session.id());
                self.store.append(message.clone());
                self.view.render_message(&message);
            }
            Effect::ClearInput => self.view.clear_input(),
            Effect::SetTyping(visible) => self.view.set_typing(visible),
            Effect::RequestReply { text } => self.request_reply(&text),
            Effect::ClearMessages => {
                self.store.clear();
                self.view.clear_messages();
                debug!(session_id = self.session.id(), "chat cleared");
            }
        }
    }

    fn request_reply(&mut self, text: &str) {
        let history = self.store.recent(self.config.context_messages);
        let payload = build_payload(&self.config, self.session.id(), text, &history);
        let source = Arc::clone(&self.source);
        let tx = self.replies_tx.clone();

        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }
        self.generation += 1;
        let generation = self.generation;

        self.in_flight = Some(tokio::spawn(async move {
            let event = match source.fetch(&payload).await {
                Ok(raw) => WidgetEvent::ReplyReceived { raw },
                Err(error) => WidgetEvent::ReplyFailed { error },
            };
            // Receiver gone means the widget was dropped.
            let _ = tx.send((generation, event));
        }));
    }
}

impl<V: ChatView> Drop for ChatWidget<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
