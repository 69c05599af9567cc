//! Editor-facing models used by the completion trigger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Zero-based cursor position inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// What the editor looks like at one instant.
///
/// `version` increases on every document change; together with `position`
/// it identifies the place a suggestion may be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSnapshot {
    pub version: u64,
    pub position: Position,
    pub line_text: String,
    pub language: String,
}

impl EditorSnapshot {
    /// Whether a suggestion anchored to `self` may still be shown in `current`.
    pub fn same_anchor(&self, current: &EditorSnapshot) -> bool {
        self.version == current.version && self.position == current.position
    }
}

/// One outbound suggestion request, captured when the quiet period elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub language: String,
    pub text: String,
}

/// Suggestion ready to be rendered inline at `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSuggestion {
    pub text: String,
    pub position: Position,
    pub version: u64,
}
