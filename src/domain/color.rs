//! Color assignment for new connections.
//!
//! Colors are best-effort distinct: [`RandomColorAssigner`] draws a random
//! bright color and makes no attempt to avoid colors already in use. Two
//! participants sharing a color is a cosmetic issue only.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use super::Color;

/// Produces the color for a newly connected participant.
pub trait ColorAssigner: Send + Sync + std::fmt::Debug {
    /// Returns a color for the next connection.
    fn assign(&self) -> Color;
}

/// Random bright colors, hue uniformly distributed.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomColorAssigner;

impl RandomColorAssigner {
    /// Creates a new assigner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ColorAssigner for RandomColorAssigner {
    fn assign(&self) -> Color {
        let mut rng = rand::rng();
        let hue = rng.random_range(0.0..360.0);
        let saturation = rng.random_range(0.55..=1.0);
        let value = rng.random_range(0.65..=1.0);
        let (r, g, b) = hsv_to_rgb(hue, saturation, value);
        Color::new(format!("#{r:02x}{g:02x}{b:02x}"))
    }
}

/// Hands out colors from a fixed list in round-robin order.
///
/// Deterministic, which makes it the assigner of choice for tests.
#[derive(Debug)]
pub struct FixedColorAssigner {
    palette: Vec<Color>,
    next: AtomicUsize,
}

impl FixedColorAssigner {
    /// Creates an assigner cycling through `palette`.
    ///
    /// An empty palette yields black for every connection.
    #[must_use]
    pub fn new<I, S>(palette: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            palette: palette.into_iter().map(Color::new).collect(),
            next: AtomicUsize::new(0),
        }
    }
}

impl ColorAssigner for FixedColorAssigner {
    fn assign(&self) -> Color {
        if self.palette.is_empty() {
            return Color::new("#000000");
        }
        let n = self.next.fetch_add(1, Ordering::Relaxed) % self.palette.len();
        self.palette
            .get(n)
            .cloned()
            .unwrap_or_else(|| Color::new("#000000"))
    }
}

/// Converts HSV (hue in degrees, saturation and value in `0..=1`) to 8-bit RGB.
fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (u8, u8, u8) {
    let chroma = value * saturation;
    let sector = (hue / 60.0).rem_euclid(6.0);
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u8 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = value - chroma;
    let to_byte = |c: f64| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}
