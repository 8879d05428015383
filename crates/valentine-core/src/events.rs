use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evasion::Trigger;
use crate::geometry::Point;
use crate::media::MediaOutcome;
use crate::reveal::RevealStage;
use crate::session::Screen;

/// Every state change in a session produces an Event.
/// Renderers redraw on them; `at_ms` is the session clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        at_ms: u64,
    },
    /// The renderer should start fetching the reaction clip.
    MediaPreloadRequested {
        url: String,
        at_ms: u64,
    },
    MediaLoaded {
        outcome: MediaOutcome,
        at_ms: u64,
    },
    /// Evasive target started its anticipation shake.
    AttemptStarted {
        attempt: u32,
        trigger: Trigger,
        /// This attempt removes the target instead of moving it.
        last: bool,
        at_ms: u64,
    },
    Relocated {
        attempts: u32,
        anchor_index: Option<usize>,
        position: Option<Point>,
        label: String,
        at_ms: u64,
    },
    AcceptBounce {
        active: bool,
        at_ms: u64,
    },
    Settled {
        at_ms: u64,
    },
    FadingOut {
        attempts: u32,
        position: Option<Point>,
        label: String,
        at_ms: u64,
    },
    EvasiveGone {
        at_ms: u64,
    },
    Accepted {
        session_id: Uuid,
        attempts: u32,
        at: DateTime<Utc>,
        at_ms: u64,
    },
    /// A view was torn down with transitions still pending.
    TimersCancelled {
        screen: Screen,
        count: usize,
        at_ms: u64,
    },
    ConfettiSpawned {
        count: usize,
        at_ms: u64,
    },
    StageAdvanced {
        stage: RevealStage,
        at_ms: u64,
    },
    /// Media content begins its reveal animation.
    MediaRevealStarted {
        at_ms: u64,
    },
    RestartRequested {
        at_ms: u64,
    },
    SessionReloaded {
        at_ms: u64,
    },
}

impl Event {
    /// Session clock time the event was produced at.
    pub fn at_ms(&self) -> u64 {
        match self {
            Event::SessionStarted { at_ms, .. }
            | Event::MediaPreloadRequested { at_ms, .. }
            | Event::MediaLoaded { at_ms, .. }
            | Event::AttemptStarted { at_ms, .. }
            | Event::Relocated { at_ms, .. }
            | Event::AcceptBounce { at_ms, .. }
            | Event::Settled { at_ms }
            | Event::FadingOut { at_ms, .. }
            | Event::EvasiveGone { at_ms }
            | Event::Accepted { at_ms, .. }
            | Event::TimersCancelled { at_ms, .. }
            | Event::ConfettiSpawned { at_ms, .. }
            | Event::StageAdvanced { at_ms, .. }
            | Event::MediaRevealStarted { at_ms }
            | Event::RestartRequested { at_ms }
            | Event::SessionReloaded { at_ms } => *at_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_snake_case_tag() {
        let ev = Event::StageAdvanced {
            stage: RevealStage::MediaShown,
            at_ms: 1200,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "stage_advanced");
        assert_eq!(json["stage"], "media_shown");
        assert_eq!(ev.at_ms(), 1200);
    }
}
