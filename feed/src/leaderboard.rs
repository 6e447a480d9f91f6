use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{EventDiagnostic, EventDiagnosticKind};

/// A single like, pre-joined upstream so it names the user who *received*
/// it (the author of the liked post), never the liker. Fields are
/// optional because the record crosses an untrusted boundary; events
/// missing either the recipient or the timestamp are skipped with a
/// diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeEvent {
    pub recipient: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
    /// Per-event score contribution; absent means 1.
    pub weight: Option<u32>,
}

/// One row of the ranked leaderboard. Rank is the row's position in the
/// output, not a stored field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub karma: u64,
}

/// The ranked table plus the malformed events that were skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankResult {
    pub entries: Vec<LeaderboardEntry>,
    pub diagnostics: Vec<EventDiagnostic>,
}

/// Folds raw like events into a ranked karma table, counting only events
/// inside the half-open window `[window_start, window_end)`.
///
/// The window is caller-supplied (typically now minus 24 hours to now) so
/// the aggregation stays clock-free and testable. Users with no
/// qualifying score are absent from the result.
pub fn rank(
    events: &[LikeEvent],
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> RankResult {
    let mut diagnostics = Vec::new();
    let mut karma: HashMap<&str, u64> = HashMap::new();

    for (index, event) in events.iter().enumerate() {
        let recipient = match event.recipient.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => {
                tracing::warn!(index, "skipping like event without a recipient");
                diagnostics.push(EventDiagnostic {
                    kind: EventDiagnosticKind::MissingRecipient,
                    index,
                });
                continue;
            }
        };
        let Some(timestamp) = event.timestamp else {
            tracing::warn!(index, "skipping like event without a timestamp");
            diagnostics.push(EventDiagnostic {
                kind: EventDiagnosticKind::MissingTimestamp,
                index,
            });
            continue;
        };
        if timestamp < window_start || timestamp >= window_end {
            continue;
        }
        *karma.entry(recipient).or_insert(0) += u64::from(event.weight.unwrap_or(1));
    }

    let entries = sorted_entries(
        karma
            .into_iter()
            .map(|(username, karma)| (username.to_string(), karma)),
    );
    RankResult {
        entries,
        diagnostics,
    }
}

/// Server-side aggregation mode: the caller already folded qualifying
/// events into a per-user karma map. Produces exactly the ordering `rank`
/// would for equivalent input.
pub fn rank_aggregated(karma: HashMap<String, u64>) -> Vec<LeaderboardEntry> {
    sorted_entries(karma)
}

// Descending karma, ties broken by ascending username (case-sensitive),
// so the order is deterministic across rebuilds. Zero scores mean "no
// qualifying engagement" and are dropped in both modes.
fn sorted_entries(karma: impl IntoIterator<Item = (String, u64)>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = karma
        .into_iter()
        .filter(|(_, karma)| *karma > 0)
        .map(|(username, karma)| LeaderboardEntry { username, karma })
        .collect();
    entries.sort_unstable_by(|a, b| {
        b.karma
            .cmp(&a.karma)
            .then_with(|| a.username.cmp(&b.username))
    });
    entries
}
