//! Routing destinations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label of the terminal sentinel.
pub const END_LABEL: &str = "__end__";

/// Where control goes after a worker finishes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Hand off to a registered worker.
    Worker(String),
    /// Terminal sentinel: the run completes successfully.
    End,
}

impl Destination {
    /// Destination naming a worker.
    pub fn worker(name: impl Into<String>) -> Self {
        Destination::Worker(name.into())
    }

    /// Parse a destination from a label; `"__end__"` is the sentinel.
    pub fn from_label(label: &str) -> Self {
        if label == END_LABEL {
            Destination::End
        } else {
            Destination::Worker(label.to_string())
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Destination::End)
    }

    /// Label form of this destination.
    pub fn label(&self) -> &str {
        match self {
            Destination::Worker(name) => name,
            Destination::End => END_LABEL,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
