//! # Aggregator
//!
//! Pure merge/rank functions over meme records, upload documents, and the
//! overlay. Every function here is a single synchronous pass; callers fetch
//! their inputs first and hand them in.

use std::collections::BTreeMap;

use crate::meme::{Meme, MemeView, Metric, Upload, UserRank};
use crate::overlay::{Overlay, OverlayStore, UserStats, ANONYMOUS};

/// Fixed weighting of uploads in the engagement score.
pub const UPLOAD_WEIGHT: u32 = 2;

/// Leaderboard meme list length.
pub const LEADERBOARD_TOP_MEMES: usize = 10;

/// Merge remote-fetched meme records with the overlay.
///
/// Iterates the catalog, never the overlay: overlay entries for memes
/// absent from the fetch (orphan likes) drop out without a trace.
pub fn merge_catalog<S: OverlayStore>(memes: Vec<Meme>, overlay: &Overlay<S>) -> Vec<MemeView> {
    memes
        .into_iter()
        .map(|meme| {
            let likes = overlay.likes(&meme.id).unwrap_or(meme.likes);

            let overlay_comments = overlay.comments(&meme.id);
            let comments = if overlay_comments.is_empty() {
                meme.comments
            } else {
                overlay_comments
            };

            MemeView {
                id: meme.id,
                name: meme.name,
                url: meme.url,
                likes,
                comments,
                uploaded_by: meme.uploaded_by,
                created_at: meme.created_at,
            }
        })
        .collect()
}

/// Rank meme views descending by the chosen metric, stable on ties,
/// optionally truncated to the top `limit`.
pub fn rank_memes(views: &[MemeView], metric: Metric, limit: Option<usize>) -> Vec<MemeView> {
    let mut ranked = views.to_vec();
    ranked.sort_by(|a, b| metric_of(b, metric).cmp(&metric_of(a, metric)));

    if let Some(limit) = limit {
        ranked.truncate(limit);
    }

    ranked
}

fn metric_of(view: &MemeView, metric: Metric) -> usize {
    match metric {
        Metric::Likes => view.likes as usize,
        Metric::Comments => view.comments.len(),
    }
}

/// Per-identity upload counts in first-seen enumeration order.
pub fn count_uploads(uploads: &[Upload]) -> Vec<(String, u32)> {
    let mut counts: Vec<(String, u32)> = Vec::new();

    for upload in uploads {
        let identity = upload.uploader();

        match counts.iter_mut().find(|(name, _)| name == identity) {
            Some((_, count)) => *count += 1,
            None => counts.push((identity.to_string(), 1)),
        }
    }

    counts
}

/// Rank users by engagement score across the union of upload identities
/// and accrued-like identities. The anonymous bucket never takes a slot,
/// whatever its raw counts.
///
/// Tie order: upload enumeration order first, then remaining overlay-only
/// identities in key order.
pub fn rank_users(
    uploads: &[(String, u32)],
    accrued: &BTreeMap<String, UserStats>,
) -> Vec<UserRank> {
    let mut ranks: Vec<UserRank> = Vec::new();

    for (identity, upload_count) in uploads {
        if identity == ANONYMOUS {
            continue;
        }

        let likes = accrued
            .get(identity)
            .map(|stats| stats.total_likes)
            .unwrap_or(0);

        ranks.push(UserRank {
            identity: identity.clone(),
            uploads: *upload_count,
            likes,
            score: UPLOAD_WEIGHT * upload_count + likes,
        });
    }

    for (identity, stats) in accrued {
        if identity == ANONYMOUS || ranks.iter().any(|rank| &rank.identity == identity) {
            continue;
        }

        ranks.push(UserRank {
            identity: identity.clone(),
            uploads: 0,
            likes: stats.total_likes,
            score: stats.total_likes,
        });
    }

    ranks.sort_by(|a, b| b.score.cmp(&a.score));

    ranks
}

/// Case-insensitive substring filter on the display name. A blank query
/// keeps everything.
pub fn filter_by_name(views: &[MemeView], query: &str) -> Vec<MemeView> {
    let needle = query.trim().to_lowercase();

    if needle.is_empty() {
        return views.to_vec();
    }

    views
        .iter()
        .filter(|view| view.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
