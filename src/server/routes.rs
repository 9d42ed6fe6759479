//! HTTP handlers.
//!
//! Handlers decode and validate the request into a [`GameCommand`], hand it
//! to the [`GameSession`](super::session::GameSession) and translate the
//! outcome. Domain rejections are answered with 400 and the full structured
//! result; everything else that fails goes through [`ApiError`].

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use super::AppState;
use crate::game::{
    describe_location, experience_to_next_level, list_inventory, roll_dice, skill_check,
    CommandResult, GameCommand, GameError, LoreError, DEFAULT_DIFFICULTY, DEFAULT_SIDES,
    MAX_INVENTORY_ITEMS,
};
use crate::logutil::escape_log;
use crate::metrics;
use crate::storage::StorageError;
use crate::validation::{
    require_param, require_text, validate_check_value, validate_command, validate_dice_sides,
    validate_player_name, ValidationError,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid request body: {0}")]
    Body(String),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Lore(#[from] LoreError),

    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Body(_) => StatusCode::BAD_REQUEST,
            ApiError::Game(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Lore(LoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Lore(LoreError::Full { .. }) => StatusCode::CONFLICT,
            ApiError::Storage(e) => match e {
                StorageError::NotFound(_) => StatusCode::NOT_FOUND,
                StorageError::InvalidId(_) => StatusCode::BAD_REQUEST,
                StorageError::Json(_)
                | StorageError::TooLarge { .. }
                | StorageError::ChecksumMismatch(_)
                | StorageError::UnsupportedVersion(_)
                | StorageError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
                StorageError::Io(_) | StorageError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {}", self);
        } else {
            warn!("request refused: {}", escape_log(&self.to_string()));
        }
        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

/// Bodies where every field is optional may be empty or absent entirely.
fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Body(e.to_string()))
}

async fn with_timeout<T>(
    limit: Duration,
    op: impl Future<Output = Result<T, StorageError>>,
) -> Result<T, ApiError> {
    match tokio::time::timeout(limit, op).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(_) => Err(ApiError::Timeout(limit)),
    }
}

async fn run_command(app: &AppState, command: GameCommand) -> ApiResult {
    let result = app.session.apply(&command).await?;
    Ok(command_response(result))
}

fn command_response(result: CommandResult) -> Response {
    let status = if result.success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(result)).into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGameRequest {
    pub player_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttackRequest {
    pub target: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub item: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiceRequest {
    pub sides: Option<u32>,
    pub skill: Option<i32>,
    pub difficulty: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct LookQuery {
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoreQuery {
    pub title: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoreRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn new_game(State(app): State<AppState>, body: Bytes) -> ApiResult {
    let request: NewGameRequest = optional_body(&body)?;
    let name = match request.player_name.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => app.config.game.default_player_name.as_str(),
    };
    let name = validate_player_name(&require_param("playerName", Some(name))?, &app.name_rules)?;
    run_command(&app, GameCommand::NewGame { name }).await
}

pub async fn game_state(State(app): State<AppState>) -> Json<serde_json::Value> {
    let state = app.session.snapshot().await;
    Json(json!({ "success": true, "state": &*state }))
}

pub async fn command(
    State(app): State<AppState>,
    body: Result<Json<GameCommand>, JsonRejection>,
) -> ApiResult {
    let Json(command) = body?;
    let command = validate_command(command, &app.name_rules)?;
    run_command(&app, command).await
}

pub async fn move_player(
    State(app): State<AppState>,
    body: Result<Json<MoveRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    let to = require_param("location", request.location.as_deref())?;
    run_command(&app, GameCommand::Move { to }).await
}

pub async fn attack(
    State(app): State<AppState>,
    body: Result<Json<AttackRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    let target = require_param("target", request.target.as_deref())?;
    run_command(&app, GameCommand::Attack { target }).await
}

pub async fn take(
    State(app): State<AppState>,
    body: Result<Json<ItemRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    let item = require_param("item", request.item.as_deref())?;
    run_command(&app, GameCommand::Take { item }).await
}

pub async fn drop_item(
    State(app): State<AppState>,
    body: Result<Json<ItemRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    let item = require_param("item", request.item.as_deref())?;
    run_command(&app, GameCommand::Drop { item }).await
}

pub async fn look(State(app): State<AppState>, Query(query): Query<LookQuery>) -> ApiResult {
    let state = app.session.snapshot().await;
    let location = match query.location.as_deref() {
        Some(raw) => require_param("location", Some(raw))?,
        None => state.player.current_location.clone(),
    };
    let description = describe_location(&state, Some(location.as_str()));
    Ok(Json(json!({
        "success": true,
        "location": location,
        "description": description,
    }))
    .into_response())
}

pub async fn player_stats(State(app): State<AppState>) -> Json<serde_json::Value> {
    let state = app.session.snapshot().await;
    let stats = &state.player.stats;
    Json(json!({
        "success": true,
        "name": state.player.name,
        "stats": stats,
        "experienceToNextLevel": experience_to_next_level(stats),
    }))
}

pub async fn player_inventory(State(app): State<AppState>) -> Json<serde_json::Value> {
    let state = app.session.snapshot().await;
    Json(json!({
        "success": true,
        "inventory": list_inventory(&state),
        "capacity": MAX_INVENTORY_ITEMS,
    }))
}

pub async fn dice_roll(body: Bytes) -> ApiResult {
    let request: DiceRequest = optional_body(&body)?;
    let sides = validate_dice_sides(request.sides.unwrap_or(DEFAULT_SIDES))?;

    if request.skill.is_none() && request.difficulty.is_none() {
        let roll = roll_dice(sides);
        return Ok(Json(json!({ "success": true, "sides": sides, "roll": roll })).into_response());
    }

    let skill = validate_check_value("skill", request.skill.unwrap_or(0))?;
    let difficulty =
        validate_check_value("difficulty", request.difficulty.unwrap_or(DEFAULT_DIFFICULTY))?;
    let check = skill_check(skill, difficulty, sides);
    Ok(Json(json!({
        "success": true,
        "sides": sides,
        "roll": check.roll,
        "check": check,
        "narration": check.to_string(),
    }))
    .into_response())
}

pub async fn journal(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "entries": app.session.journal().await }))
}

/// `?title=` fetches one entry, `?q=` searches titles and text, and no
/// parameters lists the whole book.
pub async fn lore(State(app): State<AppState>, Query(query): Query<LoreQuery>) -> ApiResult {
    let book = app.lore.read().await;
    if let Some(raw) = query.title.as_deref() {
        let title = require_param("title", Some(raw))?;
        let entry = book.get_lore(&title)?;
        return Ok(Json(json!({ "success": true, "entry": entry })).into_response());
    }
    let entries: Vec<_> = match query.q.as_deref() {
        Some(raw) => book.query_lore(&require_param("q", Some(raw))?),
        None => book.entries().collect(),
    };
    Ok(Json(json!({ "success": true, "count": entries.len(), "entries": entries })).into_response())
}

pub async fn add_lore(
    State(app): State<AppState>,
    body: Result<Json<LoreRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    let title = require_param("title", request.title.as_deref())?;
    let content = require_text("content", request.content.as_deref())?;
    let replaced = app.lore.write().await.add_lore(&title, &content)?.is_some();
    info!(
        "{} lore entry '{}'",
        if replaced { "replaced" } else { "added" },
        escape_log(&title)
    );
    let status = if replaced {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(json!({
            "success": true,
            "entry": { "title": title, "content": content },
            "replaced": replaced,
        })),
    )
        .into_response())
}

pub async fn metrics_snapshot() -> Json<metrics::Snapshot> {
    Json(metrics::snapshot())
}

pub async fn list_saves(State(app): State<AppState>) -> ApiResult {
    let saves = with_timeout(app.config.storage.io_timeout(), app.store.list()).await?;
    Ok(Json(json!({ "success": true, "saves": saves })).into_response())
}

/// Writes are not raced against `io_timeout`: an abandoned write would still
/// land on disk after the client had been told it failed.
pub async fn create_save(State(app): State<AppState>) -> ApiResult {
    let state = app.session.snapshot().await;
    let summary = app.store.save(&state).await?;
    metrics::inc_saves();
    info!(
        "saved game {} for {}",
        summary.id,
        escape_log(&summary.player_name)
    );
    app.session
        .record("save", &format!("Saved game {}", summary.id))
        .await;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "save": summary })),
    )
        .into_response())
}

pub async fn load_save(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let loaded = with_timeout(app.config.storage.io_timeout(), app.store.load(&id)).await?;
    let message = format!("Loaded save {}", id);
    let state = app.session.replace(loaded, &message).await;
    metrics::inc_loads();
    info!("{} ({})", message, escape_log(&state.player.name));
    Ok(Json(json!({
        "success": true,
        "message": message,
        "player": state.player,
    }))
    .into_response())
}

pub async fn delete_save(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult {
    with_timeout(app.config.storage.io_timeout(), app.store.delete(&id)).await?;
    info!("deleted save {}", escape_log(&id));
    Ok(Json(json!({ "success": true, "deleted": id })).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::from(ValidationError::Missing("target")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(GameError::CorruptState {
                location_id: "void".into()
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(StorageError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(5)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(LoreError::NotFound("Moon".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(LoreError::Full { max: 1 }).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn empty_optional_body_uses_defaults() {
        let parsed: DiceRequest = optional_body(&Bytes::from_static(b"  ")).unwrap();
        assert!(parsed.sides.is_none());
        let parsed: DiceRequest = optional_body(&Bytes::from_static(br#"{"sides":6}"#)).unwrap();
        assert_eq!(parsed.sides, Some(6));
        assert!(optional_body::<DiceRequest>(&Bytes::from_static(b"{")).is_err());
    }

    #[tokio::test]
    async fn timeouts_become_gateway_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<(), StorageError>(())
        };
        let err = with_timeout(Duration::from_millis(10), slow).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
