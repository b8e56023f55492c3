//! Read-only views of the session registry.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{UserDto, UserListResponse};
use crate::app_state::AppState;
use crate::domain::ConnectionId;
use crate::error::{ErrorResponse, RelayError};

/// `GET /users` — List every connected user.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    summary = "List connected users",
    description = "Returns a snapshot of the session registry: every open connection with its color and last cursor position.",
    responses(
        (status = 200, description = "Registry snapshot", body = UserListResponse),
    )
)]
pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.registry.snapshot().await;
    let mut data: Vec<UserDto> = snapshot
        .iter()
        .map(|(id, user)| UserDto::new(*id, user))
        .collect();
    data.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    let total = data.len();
    Json(UserListResponse { data, total })
}

/// `GET /users/{id}` — Get one connected user.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] if `id` is not a UUID and
/// [`RelayError::UserNotFound`] if no open connection has that id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "Get a connected user",
    description = "Returns the color and last cursor position of one open connection.",
    params(("id" = String, Path, description = "Connection id (UUID)")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such connection", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, RelayError> {
    let id: ConnectionId = id
        .parse()
        .map_err(|_| RelayError::InvalidRequest(format!("invalid user id: {id}")))?;
    let user = state
        .registry
        .get(id)
        .await
        .ok_or(RelayError::UserNotFound(*id.as_uuid()))?;
    Ok(Json(UserDto::new(id, &user)))
}

/// User routes, nested under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
}
