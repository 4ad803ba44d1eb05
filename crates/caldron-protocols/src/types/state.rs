//! Shared conversation state threaded through every step of a run.

use serde::{Deserialize, Serialize};

use super::message::{Message, USER_AUTHOR};

/// The record passed into and returned from every worker invocation.
///
/// `messages` only ever grows during a run. Workers receive the state by
/// shared reference; the orchestrator is the only writer and applies each
/// worker's output through [`append_message`](Self::append_message) or
/// [`set_route`](Self::set_route).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub last_sender: String,
    /// Worker name or route label chosen by the last router (or the entry
    /// worker at the start of a run).
    pub next_destination: String,
}

impl ConversationState {
    /// Initial state for a run: the user's message, addressed to `entry`.
    pub fn new_request(user_message: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(user_message)],
            last_sender: USER_AUTHOR.to_string(),
            next_destination: entry.into(),
        }
    }

    /// Append a message authored by `author` and record it as the last sender.
    pub fn append_message(&mut self, author: &str, content: impl Into<String>) {
        self.messages.push(Message::new(author, content));
        self.last_sender = author.to_string();
    }

    /// Record a routing decision made by `router`.
    pub fn set_route(&mut self, router: &str, label: impl Into<String>) {
        self.last_sender = router.to_string();
        self.next_destination = label.into();
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The first user message of the run, if any.
    pub fn request(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.is_from_user())
    }

    /// Messages written by a given author, oldest first.
    pub fn messages_from<'a>(&'a self, author: &'a str) -> impl Iterator<Item = &'a Message> + 'a {
        self.messages.iter().filter(move |m| m.author == author)
    }
}
