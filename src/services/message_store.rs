// src/services/message_store.rs
use std::collections::VecDeque;

use crate::message::Message;

/// Append-only, insertion-ordered history with a length cap.
///
/// When an append pushes the store past its capacity the oldest entries are
/// dropped silently.
#[derive(Clone, Debug)]
pub struct MessageStore {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl MessageStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { messages: VecDeque::with_capacity(capacity), capacity }
    }

    // Append and return the new length.
    pub fn append(&mut self, message: Message) -> usize {
        self.messages.push_back(message);
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
        self.messages.len()
    }

    /// The last `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Message> {
        let skip = self.messages.len().saturating_sub(n);
        self.messages.iter().skip(skip).cloned().collect()
    }

    pub fn all(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new(50)
    }
}
