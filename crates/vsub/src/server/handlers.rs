use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use super::error::ApiError;
use crate::error::VsubError;
use crate::models::{EpisodeHandle, Movie};
use crate::playlist::SEGMENT_SUFFIX;
use crate::proxy::ManifestProxy;

pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";
pub const SEGMENT_CONTENT_TYPE: &str = "video/mp2t";

type ProxyState = State<Arc<ManifestProxy>>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchRequest {
    pub query: String,
}

fn playlist_response(text: String) -> Response {
    (
        [
            (CONTENT_TYPE, PLAYLIST_CONTENT_TYPE),
            (CACHE_CONTROL, "no-cache"),
        ],
        text,
    )
        .into_response()
}

fn parse_movie_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("invalid movie id: {raw}")))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn search(
    State(proxy): ProxyState,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let movies = proxy.search(&request.query).await?;
    Ok(Json(movies))
}

pub async fn movie_index(
    State(proxy): ProxyState,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let movie_id = parse_movie_id(&id)?;
    let index = proxy.episode_index(movie_id).await?;
    Ok(playlist_response(index))
}

pub async fn episode_playlist(
    State(proxy): ProxyState,
    Path((id, hash)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let movie_id = parse_movie_id(&id)?;
    if hash.is_empty() {
        return Err(ApiError::bad_request("empty hash"));
    }

    let playlist = proxy
        .rewritten_manifest(&EpisodeHandle::new(movie_id, hash))
        .await?;
    Ok(playlist_response(playlist))
}

pub async fn segment(
    State(proxy): ProxyState,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let token = file
        .strip_suffix(SEGMENT_SUFFIX)
        .ok_or_else(|| VsubError::BadToken(format!("missing {SEGMENT_SUFFIX} suffix")))?;
    let payload = proxy.segment(token).await?;
    Ok(([(CONTENT_TYPE, SEGMENT_CONTENT_TYPE)], payload).into_response())
}
