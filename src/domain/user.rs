//! Ephemeral per-connection user state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 2D canvas coordinate in client pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Creates a position from its two coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A CSS color string (e.g. `"#a3e21f"`).
///
/// Assigned colors are always `#rrggbb`, but colors carried by draw
/// events are forwarded verbatim and may hold any string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    /// Wraps a color string without validation.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the color as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State tracked for one connected participant.
///
/// `color` is fixed for the lifetime of the connection. `position` stays
/// `None` until the first cursor move and is overwritten by every later one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Last reported cursor position, if any.
    pub position: Option<Position>,
    /// Color assigned at connect time.
    pub color: Color,
}

impl User {
    /// Creates a user that has not reported a position yet.
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self {
            position: None,
            color,
        }
    }
}
