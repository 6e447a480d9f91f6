//! Domain core of the Socially feed: the pure transformations the feed
//! controller runs on every fetch. Rebuilds the nested comment view from
//! flat records, folds like events into the karma leaderboard, and
//! decorates posts with their engagement state. No I/O, no storage and no
//! transport lives here; everything is recomputed in full from the latest
//! flat snapshot.

pub mod comment;
pub mod diagnostics;
pub mod leaderboard;
pub mod post;

pub use comment::tree::{TreeBuildResult, build_tree};
pub use comment::{Comment, CommentNode};
pub use diagnostics::{Diagnostic, DiagnosticKind, EventDiagnostic, EventDiagnosticKind};
pub use leaderboard::{LeaderboardEntry, LikeEvent, RankResult, rank, rank_aggregated};
pub use post::{Like, Post, PostView, assemble_feed};
