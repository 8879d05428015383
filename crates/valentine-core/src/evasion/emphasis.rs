//! Visual responses to failed attempts.
//!
//! Everything here is a pure function of the attempt count; renderers map
//! the numbers onto transforms, filters and shadows.

use serde::{Deserialize, Serialize};

use super::engine::MotionPhase;

pub const SCALE_CAP: f64 = 1.8;
pub const GLOW_CAP: u32 = 50;
pub const BRIGHTNESS_CAP: u32 = 120;
pub const SATURATION_CAP: u32 = 160;

/// Attempts after which the accept target pulses continuously.
const PULSE_AFTER: u32 = 2;
/// Attempts after which the nudge line appears.
const NUDGE_FROM: u32 = 4;

/// How loudly the accept target calls for attention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptEmphasis {
    pub scale: f64,
    pub glow_px: u32,
    pub brightness_pct: u32,
    pub saturation_pct: u32,
    pub pulsing: bool,
    pub bouncing: bool,
}

impl AcceptEmphasis {
    pub fn for_attempts(attempts: u32, bouncing: bool) -> Self {
        Self {
            scale: scale(attempts),
            glow_px: glow(attempts),
            brightness_pct: brightness(attempts),
            saturation_pct: saturation(attempts),
            pulsing: attempts > PULSE_AFTER,
            bouncing,
        }
    }
}

pub fn scale(attempts: u32) -> f64 {
    (1.0 + f64::from(attempts) * 0.065).min(SCALE_CAP)
}

pub fn glow(attempts: u32) -> u32 {
    // stronger ramp from six attempts on
    if attempts >= 6 {
        attempts.saturating_mul(6).min(GLOW_CAP)
    } else {
        attempts.saturating_mul(4).min(40)
    }
}

pub fn brightness(attempts: u32) -> u32 {
    100 + attempts.saturating_mul(2).min(20)
}

pub fn saturation(attempts: u32) -> u32 {
    100 + attempts.saturating_mul(8).min(60)
}

/// Appearance of the evasive target, which fades as it tires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvasiveStyle {
    pub opacity: f64,
    pub font_px: f64,
    pub press_scale: f64,
    pub shaking: bool,
    pub visible: bool,
}

impl EvasiveStyle {
    pub fn for_state(attempts: u32, phase: MotionPhase) -> Self {
        let a = f64::from(attempts);
        let opacity = match phase {
            MotionPhase::FadingOut | MotionPhase::Gone => 0.0,
            _ => (1.0 - a * 0.02).max(0.75),
        };
        Self {
            opacity,
            font_px: (15.0 - a * 0.08).max(13.0),
            press_scale: if phase == MotionPhase::Moving { 0.96 } else { 1.0 },
            shaking: phase == MotionPhase::Shaking,
            visible: phase != MotionPhase::Gone,
        }
    }
}

/// Secondary copy on the proposal card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalHints {
    /// "N failed attempts to say no", once there is at least one.
    pub failed_attempts: Option<String>,
    pub nudge: bool,
    /// The hint is replaced by the destiny message at the cap.
    pub destiny: bool,
}

impl ProposalHints {
    pub fn for_attempts(attempts: u32, max: u32) -> Self {
        let failed_attempts = (attempts > 0).then(|| {
            let plural = if attempts > 1 { "s" } else { "" };
            format!("{attempts} failed attempt{plural} to say no 😆")
        });
        Self {
            failed_attempts,
            nudge: attempts >= NUDGE_FROM,
            destiny: attempts >= max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn one_attempt() {
        let e = AcceptEmphasis::for_attempts(1, false);
        assert!((e.scale - 1.065).abs() < 1e-9);
        assert_eq!(e.glow_px, 4);
        assert_eq!(e.brightness_pct, 102);
        assert_eq!(e.saturation_pct, 108);
        assert!(!e.pulsing);
    }

    #[test]
    fn glow_switches_ramp_at_six() {
        assert_eq!(glow(5), 20);
        assert_eq!(glow(6), 36);
        assert_eq!(glow(9), 50);
    }

    #[test]
    fn zero_attempts_is_neutral() {
        let e = AcceptEmphasis::for_attempts(0, false);
        assert_eq!(e.scale, 1.0);
        assert_eq!(e.glow_px, 0);
        assert_eq!(e.brightness_pct, 100);
        assert_eq!(e.saturation_pct, 100);
    }

    #[test]
    fn evasive_style_decays_and_fades() {
        let fresh = EvasiveStyle::for_state(0, MotionPhase::Idle);
        assert_eq!(fresh.opacity, 1.0);
        assert_eq!(fresh.font_px, 15.0);

        let tired = EvasiveStyle::for_state(11, MotionPhase::Moving);
        assert!((tired.opacity - 0.78).abs() < 1e-9);
        assert_eq!(tired.press_scale, 0.96);

        let fading = EvasiveStyle::for_state(12, MotionPhase::FadingOut);
        assert_eq!(fading.opacity, 0.0);
        assert!(fading.visible);
        assert!(!EvasiveStyle::for_state(12, MotionPhase::Gone).visible);
    }

    #[test]
    fn hints_follow_attempts() {
        assert_eq!(ProposalHints::for_attempts(0, 12).failed_attempts, None);
        assert_eq!(
            ProposalHints::for_attempts(1, 12).failed_attempts.as_deref(),
            Some("1 failed attempt to say no 😆")
        );
        let h = ProposalHints::for_attempts(4, 12);
        assert_eq!(h.failed_attempts.as_deref(), Some("4 failed attempts to say no 😆"));
        assert!(h.nudge);
        assert!(!h.destiny);
        assert!(ProposalHints::for_attempts(12, 12).destiny);
    }

    proptest! {
        #[test]
        fn emphasis_is_monotonic_and_capped(a in 0u32..u32::MAX) {
            let lo = AcceptEmphasis::for_attempts(a, false);
            let hi = AcceptEmphasis::for_attempts(a.saturating_add(1), false);
            prop_assert!(lo.scale <= hi.scale);
            prop_assert!(lo.glow_px <= hi.glow_px);
            prop_assert!(lo.brightness_pct <= hi.brightness_pct);
            prop_assert!(lo.saturation_pct <= hi.saturation_pct);
            prop_assert!(hi.scale <= SCALE_CAP);
            prop_assert!(hi.glow_px <= GLOW_CAP);
            prop_assert!(hi.brightness_pct <= BRIGHTNESS_CAP);
            prop_assert!(hi.saturation_pct <= SATURATION_CAP);
        }
    }
}
