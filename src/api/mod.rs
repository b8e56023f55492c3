//! REST API layer: introspection handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; the health check sits
//! at the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "canvas-relay", description = "Collaborative canvas relay"),
    paths(
        handlers::system::health_handler,
        handlers::users::list_users,
        handlers::users::get_user,
    ),
    components(schemas(
        handlers::system::HealthResponse,
        dto::PositionDto,
        dto::UserDto,
        dto::UserListResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "System", description = "Service health"),
        (name = "Users", description = "Connected participants"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
