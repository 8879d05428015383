//! Decorative hearts shared by both screens.

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const HEART_GLYPHS: [&str; 6] = ["💕", "💗", "💖", "💝", "❤️", "🩷"];

/// Row of bobbing hearts under the sign-off.
pub const HEART_ROW: [&str; 7] = ["💕", "💗", "💖", "💝", "💘", "🩷", "❤️"];

/// Stagger between neighbours in the heart row.
pub const HEART_ROW_STAGGER_S: f64 = 0.12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingHeart {
    pub id: usize,
    pub glyph: String,
    pub left_pct: f64,
    pub size_px: f64,
    pub duration_s: f64,
    pub delay_s: f64,
    pub opacity: f64,
}

/// Randomized background layer. Glyphs cycle in order; the rest is random.
pub fn background<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<FloatingHeart> {
    (0..count)
        .map(|id| FloatingHeart {
            id,
            glyph: HEART_GLYPHS[id % HEART_GLYPHS.len()].to_string(),
            left_pct: rng.gen::<f64>() * 100.0,
            size_px: 14.0 + rng.gen::<f64>() * 8.0,
            duration_s: 6.0 + rng.gen::<f64>() * 6.0,
            delay_s: rng.gen::<f64>() * 10.0,
            opacity: 1.0,
        })
        .collect()
}

/// One heart of the sign-off row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowHeart {
    pub glyph: String,
    pub delay_s: f64,
}

/// The sign-off row, each heart starting [`HEART_ROW_STAGGER_S`] after its left neighbour.
pub fn heart_row() -> Vec<RowHeart> {
    HEART_ROW
        .iter()
        .enumerate()
        .map(|(i, glyph)| RowHeart {
            glyph: glyph.to_string(),
            delay_s: i as f64 * HEART_ROW_STAGGER_S,
        })
        .collect()
}

/// (glyph, left %, delay s, duration s, size px, opacity)
const AMBIENT: [(&str, f64, f64, f64, f64, f64); 15] = [
    ("💕", 5.0, 0.0, 14.0, 18.0, 0.2),
    ("💗", 15.0, 2.0, 16.0, 22.0, 0.25),
    ("💖", 25.0, 4.0, 13.0, 16.0, 0.18),
    ("❤️", 35.0, 1.0, 15.0, 20.0, 0.22),
    ("🩷", 45.0, 3.0, 17.0, 24.0, 0.2),
    ("💘", 55.0, 5.0, 14.0, 18.0, 0.25),
    ("💕", 65.0, 0.5, 16.0, 20.0, 0.18),
    ("💗", 75.0, 2.5, 15.0, 22.0, 0.22),
    ("💖", 85.0, 4.5, 13.0, 16.0, 0.2),
    ("❤️", 95.0, 1.5, 17.0, 24.0, 0.25),
    ("🩷", 10.0, 6.0, 14.0, 18.0, 0.18),
    ("💘", 30.0, 7.0, 16.0, 20.0, 0.22),
    ("💕", 50.0, 8.0, 15.0, 22.0, 0.2),
    ("💗", 70.0, 6.5, 13.0, 16.0, 0.25),
    ("💖", 90.0, 7.5, 17.0, 24.0, 0.18),
];

/// Fixed faint hearts drifting behind the proposal card.
pub fn ambient() -> Vec<FloatingHeart> {
    AMBIENT
        .iter()
        .enumerate()
        .map(
            |(id, &(glyph, left_pct, delay_s, duration_s, size_px, opacity))| FloatingHeart {
                id,
                glyph: glyph.to_string(),
                left_pct,
                size_px,
                duration_s,
                delay_s,
                opacity,
            },
        )
        .collect()
}
