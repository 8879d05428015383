//! Falling confetti for the celebration screen.
//!
//! A batch is generated once per celebration mount and never regenerated.
//! Each particle carries its own randomized start, timing, size, glyph,
//! drift and spin, and can be sampled at any time since mount.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const CONFETTI_GLYPHS: [&str; 13] = [
    "💖", "💕", "💗", "💝", "❤️", "🌹", "✨", "💘", "🩷", "🎀", "💐", "⭐", "🌸",
];

/// Vertical start above the viewport top, in pixels.
pub const START_OFFSET_PX: f64 = -70.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfettiSettings {
    pub count: usize,
    pub max_delay_s: f64,
    pub min_duration_s: f64,
    pub duration_spread_s: f64,
    pub min_size_px: f64,
    pub size_spread_px: f64,
}

impl Default for ConfettiSettings {
    fn default() -> Self {
        Self {
            count: 100,
            max_delay_s: 4.0,
            min_duration_s: 2.5,
            duration_spread_s: 3.0,
            min_size_px: 16.0,
            size_spread_px: 28.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: usize,
    pub glyph: String,
    /// Horizontal start as a percentage of the viewport width.
    pub left_pct: f64,
    pub delay_s: f64,
    pub duration_s: f64,
    pub size_px: f64,
    /// Sideways drift over the whole fall.
    pub drift_px: f64,
    /// Full turns over the fall; sign gives direction.
    pub spin_turns: f64,
}

/// Where a particle is at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallSample {
    pub progress: f64,
    pub x_offset_px: f64,
    /// Top edge as a percentage of viewport height (start is above 0).
    pub y_pct: f64,
    pub rotation_deg: f64,
    pub opacity: f64,
}

impl Particle {
    /// Sample the fall at `elapsed_s` since mount. `None` before the delay.
    pub fn sample(&self, elapsed_s: f64) -> Option<FallSample> {
        let t = elapsed_s - self.delay_s;
        if t < 0.0 {
            return None;
        }
        let progress = if self.duration_s > 0.0 {
            (t / self.duration_s).min(1.0)
        } else {
            1.0
        };
        Some(FallSample {
            progress,
            x_offset_px: self.drift_px * progress,
            y_pct: progress * 110.0,
            rotation_deg: self.spin_turns * 360.0 * progress,
            // full opacity for the first half, then fade out
            opacity: if progress < 0.5 { 1.0 } else { 2.0 * (1.0 - progress) },
        })
    }

    pub fn finished(&self, elapsed_s: f64) -> bool {
        elapsed_s >= self.delay_s + self.duration_s
    }
}

pub fn generate<R: Rng + ?Sized>(rng: &mut R, settings: &ConfettiSettings) -> Vec<Particle> {
    (0..settings.count)
        .map(|id| Particle {
            id,
            glyph: CONFETTI_GLYPHS
                .choose(rng)
                .copied()
                .unwrap_or(CONFETTI_GLYPHS[0])
                .to_string(),
            left_pct: rng.gen::<f64>() * 100.0,
            delay_s: rng.gen::<f64>() * settings.max_delay_s,
            duration_s: settings.min_duration_s + rng.gen::<f64>() * settings.duration_spread_s,
            size_px: settings.min_size_px + rng.gen::<f64>() * settings.size_spread_px,
            drift_px: rng.gen_range(-40.0..=40.0),
            spin_turns: rng.gen_range(-2.0..=2.0),
        })
        .collect()
}

/// One celebration's worth of confetti.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfettiLayer {
    particles: Vec<Particle>,
}

impl ConfettiLayer {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, settings: &ConfettiSettings) -> Self {
        Self {
            particles: generate(rng, settings),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles still falling at `elapsed_s`.
    pub fn active(&self, elapsed_s: f64) -> usize {
        self.particles
            .iter()
            .filter(|p| p.sample(elapsed_s).is_some() && !p.finished(elapsed_s))
            .count()
    }
}
