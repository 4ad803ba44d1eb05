//! Conversation messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author name used for the message that starts a run.
pub const USER_AUTHOR: &str = "user";

/// A single entry in the conversation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Name of the worker (or `"user"`) that produced this message.
    pub author: String,

    /// Text content.
    pub content: String,

    /// When the message was appended.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message authored by `author`.
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(USER_AUTHOR, content)
    }

    /// Whether this message came from the interactive user.
    pub fn is_from_user(&self) -> bool {
        self.author == USER_AUTHOR
    }
}
