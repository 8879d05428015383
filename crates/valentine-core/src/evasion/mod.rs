//! The evasive "No" target and the accept target's reaction to it.

mod emphasis;
mod engine;
mod labels;

pub use emphasis::{
    brightness, glow, saturation, scale, AcceptEmphasis, EvasiveStyle, ProposalHints,
    BRIGHTNESS_CAP, GLOW_CAP, SATURATION_CAP, SCALE_CAP,
};
pub use engine::{EvasionEngine, EvasionSettings, EvasionView, MotionPhase, Trigger};
pub use labels::{LabelSet, DEFAULT_LABELS, DEFAULT_TERMINAL_LABEL};
