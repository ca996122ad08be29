//! # Engagement
//!
//! Aggregation core for social engagement metrics.
//!
//! Meme records come from three unsynchronized sources: the remote template
//! catalog, the remote upload store, and the local overlay ledger of likes
//! and comments. This crate merges them into coherent view models and owns
//! the only mutable ledger in the system.
//!
//! ## Overall Data Structures
//!
//! Overlay (string-keyed, string-valued, JSON payloads):
//! - `meme_likes_<id>` to like count (**int** as decimal string): Effective
//!   like counts. Overlay always wins over the remote-fetched value.
//! - `meme_comments_<id>` to comments (**JSON array of strings**): Ordered
//!   comment list per meme.
//! - `user_stats` to per-identity stats (**JSON object**): Accrued likes per
//!   acting identity, fed into the engagement score.
//! - `profile_name` / `profile_bio` / `profile_avatar` (**string**): Profile
//!   fields for the current device.
//!
//! ## Rules
//!
//! - Effective like count = overlay value if present, else the value
//!   recorded at fetch time from the remote record, else zero.
//! - Engagement score = 2 x uploads + accrued likes. Fixed weighting.
//! - Rankings sort strictly descending, stable on ties.
//! - The upload store is append-only from this crate's perspective.
//! - Overlay entries for memes absent from the current catalog fetch
//!   (orphan likes) are dropped silently, never surfaced as errors.
//!
//! ## Failure Policy
//!
//! Reads degrade: a missing entry, a backend read failure, or malformed
//! persisted JSON all count as "absent" and fall back to the remote value
//! or zero. Writes surface errors; the two-key like delta commits through
//! a single multi-key write so a partial like is never observable.

pub mod aggregator;
pub mod meme;
pub mod overlay;

pub use aggregator::{
    count_uploads, filter_by_name, merge_catalog, rank_memes, rank_users, LEADERBOARD_TOP_MEMES,
};
pub use meme::{Meme, MemeView, Metric, Upload, UserRank};
pub use overlay::{MemoryStore, Overlay, OverlayStore, Profile, StoreError, UserStats, ANONYMOUS};
