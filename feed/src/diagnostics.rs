use serde::{Deserialize, Serialize};

/// Why a comment was excluded from the rebuilt forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// The comment's id was already taken by an earlier comment.
    #[error("duplicate id")]
    Duplicate,
    /// The comment's parent id has no record in the input set.
    #[error("dangling parent reference")]
    Dangling,
    /// Attaching the comment would make it its own ancestor.
    #[error("cyclic parent chain")]
    Cycle,
}

/// A data-integrity anomaly found while rebuilding the comment forest.
///
/// Diagnostics are accumulated next to the result, never raised. A caller
/// that ignores them sees a smaller, self-consistent forest; a caller that
/// surfaces them can report the data loss without blocking the feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("comment {comment_id}: {kind}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub comment_id: i32,
}

/// Why a like event was skipped during leaderboard aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum EventDiagnosticKind {
    #[error("missing recipient")]
    MissingRecipient,
    #[error("missing timestamp")]
    MissingTimestamp,
}

/// A malformed like event, identified by its position in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("like event {index}: {kind}")]
pub struct EventDiagnostic {
    pub kind: EventDiagnosticKind,
    pub index: usize,
}
