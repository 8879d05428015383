//! The celebration screen: staged reveal, confetti and hearts.

pub mod confetti;
pub mod hearts;
mod plan;
mod sequencer;

pub use confetti::{ConfettiLayer, ConfettiSettings, FallSample, Particle};
pub use hearts::{FloatingHeart, RowHeart};
pub use plan::{RevealPlan, RevealStage, RevealStep};
pub use sequencer::{MediaView, RestartView, RevealSequencer, RevealSettings, RevealView};
