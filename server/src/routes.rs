use std::sync::Arc;

use axum::{
    extract::{Path, Query, State as AppState},
    Json,
};
use catalog::{caption::generate_caption, MemeId, Template};
use chrono::Utc;
use engagement::{
    count_uploads, filter_by_name, rank_memes, rank_users, Meme, MemeView, Metric, Profile,
    Upload, UserRank, LEADERBOARD_TOP_MEMES,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    state::State,
    utils::{acting_identity, merged_views, parse_metric},
};

#[derive(Deserialize)]
pub struct ExploreParams {
    sort: Option<String>,
    q: Option<String>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct LikePayload {
    identity: Option<String>,
}

#[derive(Serialize)]
pub struct LikeResponse {
    likes: u32,
}

#[derive(Deserialize)]
pub struct CommentPayload {
    text: String,
}

#[derive(Serialize)]
pub struct CommentResponse {
    comments: Vec<String>,
}

#[derive(Serialize)]
pub struct LeaderboardResponse {
    top_memes: Vec<MemeView>,
    users: Vec<UserRank>,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    profile: Profile,
    liked_memes: Vec<MemeView>,
    uploads: Vec<Upload>,
}

#[derive(Deserialize)]
pub struct UploadPayload {
    template_id: MemeId,
    top_text: String,
    bottom_text: String,
    identity: Option<String>,
}

pub async fn templates_handler(
    AppState(state): AppState<Arc<State>>,
) -> Result<Json<Vec<Template>>, AppError> {
    Ok(Json(catalog_snapshot(&state)?))
}

pub async fn explore_handler(
    AppState(state): AppState<Arc<State>>,
    Query(params): Query<ExploreParams>,
) -> Result<Json<Vec<MemeView>>, AppError> {
    let metric = parse_metric(params.sort.as_deref())?;

    let mut views = merged_views(&state)?;

    if let Some(query) = &params.q {
        views = filter_by_name(&views, query);
    }

    Ok(Json(rank_memes(&views, metric, params.limit)))
}

pub async fn meme_details_handler(
    AppState(state): AppState<Arc<State>>,
    Path(id): Path<String>,
) -> Result<Json<MemeView>, AppError> {
    let id = MemeId::new(id);

    merged_views(&state)?
        .into_iter()
        .find(|view| view.id == id)
        .map(Json)
        .ok_or(AppError::UnknownMeme)
}

pub async fn like_handler(
    AppState(state): AppState<Arc<State>>,
    Path(id): Path<String>,
    Json(payload): Json<LikePayload>,
) -> Result<Json<LikeResponse>, AppError> {
    let meme = remote_record(&state, &MemeId::new(id))?;
    let identity = acting_identity(&state, payload.identity);

    let likes = state
        .overlay
        .record_like(&meme.id, &identity, Some(meme.likes))?;

    Ok(Json(LikeResponse { likes }))
}

pub async fn comment_handler(
    AppState(state): AppState<Arc<State>>,
    Path(id): Path<String>,
    Json(payload): Json<CommentPayload>,
) -> Result<Json<CommentResponse>, AppError> {
    let meme = remote_record(&state, &MemeId::new(id))?;

    let comments = state.overlay.record_comment(&meme.id, &payload.text)?;

    Ok(Json(CommentResponse { comments }))
}

pub async fn leaderboard_handler(
    AppState(state): AppState<Arc<State>>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let views = merged_views(&state)?;
    let top_memes = rank_memes(&views, Metric::Likes, Some(LEADERBOARD_TOP_MEMES));

    let uploads = state.overlay.store().list_uploads();
    let users = rank_users(&count_uploads(&uploads), &state.overlay.user_stats());

    Ok(Json(LeaderboardResponse { top_memes, users }))
}

pub async fn profile_handler(
    AppState(state): AppState<Arc<State>>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.overlay.profile();

    // Orphan likes (ids no longer in the catalog) drop out here.
    let views = merged_views(&state)?;
    let liked_ids = state.overlay.liked_ids();
    let liked_memes: Vec<MemeView> = views
        .into_iter()
        .filter(|view| liked_ids.contains(&view.id))
        .collect();

    let uploads: Vec<Upload> = state
        .overlay
        .store()
        .list_uploads()
        .into_iter()
        .filter(|upload| upload.uploader() == profile.name)
        .collect();

    Ok(Json(ProfileResponse {
        profile,
        liked_memes,
        uploads,
    }))
}

pub async fn profile_update_handler(
    AppState(state): AppState<Arc<State>>,
    Json(profile): Json<Profile>,
) -> Result<Json<Profile>, AppError> {
    state.overlay.set_profile(&profile)?;

    Ok(Json(state.overlay.profile()))
}

pub async fn upload_handler(
    AppState(state): AppState<Arc<State>>,
    Json(payload): Json<UploadPayload>,
) -> Result<Json<Upload>, AppError> {
    let template = remote_record(&state, &payload.template_id)?;

    let url = generate_caption(
        &state.http,
        &state.config.captioning,
        &template.id,
        &payload.top_text,
        &payload.bottom_text,
    )
    .await
    .map_err(|e| AppError::Captioning(e.to_string()))?;

    let upload = Upload {
        uploaded_by: Some(acting_identity(&state, payload.identity)),
        url,
        top_text: payload.top_text,
        bottom_text: payload.bottom_text,
        template_id: template.id,
        created_at: Utc::now(),
    };

    state.overlay.store().push_upload(&upload)?;

    Ok(Json(upload))
}

fn catalog_snapshot(state: &Arc<State>) -> Result<Vec<Template>, AppError> {
    Ok(state
        .templates
        .read()
        .map_err(|_| AppError::Internal("catalog lock poisoned".to_string()))?
        .clone())
}

/// Remote record for a catalog meme, or 404. The remote-at-fetch like
/// count rides along as the base for like recording.
fn remote_record(state: &Arc<State>, id: &MemeId) -> Result<Meme, AppError> {
    catalog_snapshot(state)?
        .into_iter()
        .find(|template| &template.id == id)
        .map(Meme::from)
        .ok_or(AppError::UnknownMeme)
}
