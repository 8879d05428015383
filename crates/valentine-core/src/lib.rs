//! # Valentine Core Library
//!
//! This library provides the presentation logic for the Valentine proposal:
//! a card that asks the recipient to accept, an evasive "No" target that
//! dodges every attempt, and a staged celebration once they say yes.
//! Renderers (the terminal player, a web front-end) feed it input, a
//! layout probe and a clock, and draw the view it hands back.
//!
//! ## Architecture
//!
//! - **Evasion Engine**: a clock-driven state machine that moves the
//!   evasive target around a fixed ring of anchors and gives up after a
//!   capped number of attempts
//! - **Reveal Sequencer**: a forward-only chain of timed stages for the
//!   celebration screen, plus confetti and the restart action
//! - **Session**: routes input between the two screens and rebuilds
//!   everything on restart
//! - **Config**: TOML-based copy, timings and margins
//!
//! ## Key Components
//!
//! - [`Session`]: Entry point for renderers
//! - [`EvasionEngine`]: Evasive target state machine
//! - [`RevealSequencer`]: Celebration stage chain
//! - [`Timeline`]: Cancellable `(due, transition)` list both of them run on
//! - [`Config`]: Application configuration management

pub mod config;
pub mod error;
pub mod evasion;
pub mod events;
pub mod geometry;
pub mod media;
pub mod notify;
pub mod reveal;
pub mod session;
pub mod timer;

pub use config::Config;
pub use error::{ConfigError, CoreError, ValidationError};
pub use evasion::{EvasionEngine, EvasionSettings, LabelSet, MotionPhase, Trigger};
pub use events::Event;
pub use geometry::{LayoutProbe, Placement, Point, Rect, Size, StaticLayout};
pub use media::{MediaOutcome, PreloadFlag};
pub use notify::{AcceptNotifier, AcceptRecord, LogNotifier};
pub use reveal::{RevealPlan, RevealSequencer, RevealStage};
pub use session::{Screen, Session, SessionView};
pub use timer::Timeline;
