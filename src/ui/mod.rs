// src/ui/mod.rs
pub mod terminal;

use crate::message::Message;

/// The surface the widget renders into. The widget reads and drives it but
/// never creates or styles it.
pub trait ChatView {
    /// Reveal the chat window.
    fn open(&mut self);
    /// Hide the window and release any page scroll lock.
    fn close(&mut self);
    fn focus_input(&mut self) {}
    fn set_badge(&mut self, visible: bool);
    fn render_message(&mut self, message: &Message);
    fn set_typing(&mut self, visible: bool);
    fn clear_input(&mut self) {}
    fn hide_suggestions(&mut self) {}
    fn clear_messages(&mut self);
}
