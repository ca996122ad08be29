use std::sync::Arc;

use engagement::{merge_catalog, Meme, MemeView, Metric};

use crate::{error::AppError, state::State};

/// Current catalog merged with the overlay, the input to every read view.
pub fn merged_views(state: &Arc<State>) -> Result<Vec<MemeView>, AppError> {
    let templates = state
        .templates
        .read()
        .map_err(|_| AppError::Internal("catalog lock poisoned".to_string()))?
        .clone();

    let memes: Vec<Meme> = templates.into_iter().map(Meme::from).collect();

    Ok(merge_catalog(memes, &state.overlay))
}

/// Sort selector from the query string. Missing means likes; anything
/// unrecognized is a bad request.
pub fn parse_metric(raw: Option<&str>) -> Result<Metric, AppError> {
    match raw {
        None => Ok(Metric::Likes),
        Some(raw) => Metric::parse(raw).ok_or(AppError::MalformedPayload),
    }
}

/// Acting identity for an engagement event: the payload value when given
/// and non-blank, else the stored profile name.
pub fn acting_identity(state: &Arc<State>, supplied: Option<String>) -> String {
    supplied
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| state.overlay.profile().name)
}
