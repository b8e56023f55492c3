//! User DTOs for the registry introspection endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ConnectionId, Position, User};

/// Cursor coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PositionDto {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl From<Position> for PositionDto {
    fn from(p: Position) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// One connected participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// Connection id (UUID).
    pub user_id: String,
    /// Last reported cursor position; `null` until the first move.
    pub position: Option<PositionDto>,
    /// Assigned color.
    pub color: String,
}

impl UserDto {
    /// Builds the DTO for the user registered under `id`.
    #[must_use]
    pub fn new(id: ConnectionId, user: &User) -> Self {
        Self {
            user_id: id.to_string(),
            position: user.position.map(PositionDto::from),
            color: user.color.to_string(),
        }
    }
}

/// Response body for `GET /api/v1/users`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    /// Connected users ordered by id.
    pub data: Vec<UserDto>,
    /// Number of connected users.
    pub total: usize,
}
