//! Evasion engine implementation.
//!
//! A clock-driven state machine for the evasive target. Like the reveal
//! sequencer it owns no thread: the caller feeds it triggers and calls
//! `tick()` with the current time and layout.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Shaking -> Moving -> Idle            (attempts < max - 1)
//! Idle -> Shaking -> FadingOut -> Gone         (attempts == max - 1)
//! ```
//!
//! Triggers that arrive outside `Idle` are dropped, never queued.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::emphasis::{AcceptEmphasis, EvasiveStyle, ProposalHints};
use super::labels::LabelSet;
use crate::events::Event;
use crate::geometry::{next_anchor, LayoutProbe, Placement, Point, ANCHORS, TERMINAL_ANCHOR};
use crate::timer::Timeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPhase {
    Idle,
    Shaking,
    Moving,
    FadingOut,
    Gone,
}

/// Input that counts as an attempt to activate the evasive target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    PointerEnter,
    Click,
    TouchStart,
}

/// Tunables for the evasive target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvasionSettings {
    pub max_attempts: u32,
    /// Shake before each move.
    pub anticipation_ms: u64,
    pub settle_ms: u64,
    pub fade_ms: u64,
    /// Accept-target bounce after each relocation.
    pub bounce_ms: u64,
    pub placement: Placement,
}

impl Default for EvasionSettings {
    fn default() -> Self {
        Self {
            max_attempts: 12,
            anticipation_ms: 120,
            settle_ms: 500,
            fade_ms: 800,
            bounce_ms: 400,
            placement: Placement::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Relocate,
    Settle,
    EndBounce,
    Finalize,
    Remove,
}

/// Renderable state of the proposal card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvasionView {
    pub phase: MotionPhase,
    pub attempts: u32,
    pub anchor_index: Option<usize>,
    pub anchor: Option<String>,
    /// `None` while the target sits at its initial inline position.
    pub position: Option<Point>,
    pub label: String,
    pub accept: AcceptEmphasis,
    pub evasive: EvasiveStyle,
    pub hints: ProposalHints,
}

#[derive(Debug, Clone)]
pub struct EvasionEngine {
    settings: EvasionSettings,
    labels: LabelSet,
    phase: MotionPhase,
    attempts: u32,
    anchor_index: Option<usize>,
    position: Option<Point>,
    bouncing: bool,
    mounted: bool,
    timeline: Timeline<Transition>,
}

impl EvasionEngine {
    pub fn new(settings: EvasionSettings, labels: LabelSet) -> Self {
        Self {
            settings,
            labels,
            phase: MotionPhase::Idle,
            attempts: 0,
            anchor_index: None,
            position: None,
            bouncing: false,
            mounted: true,
            timeline: Timeline::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn anchor_index(&self) -> Option<usize> {
        self.anchor_index
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn label(&self) -> &str {
        self.labels.label(self.attempts, self.settings.max_attempts)
    }

    pub fn is_bouncing(&self) -> bool {
        self.bouncing
    }

    pub fn pending_timers(&self) -> usize {
        self.timeline.len()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.timeline.next_due()
    }

    pub fn view(&self) -> EvasionView {
        EvasionView {
            phase: self.phase,
            attempts: self.attempts,
            anchor_index: self.anchor_index,
            anchor: self
                .anchor_index
                .and_then(|i| ANCHORS.get(i))
                .map(|a| a.name.to_string()),
            position: self.position,
            label: self.label().to_string(),
            accept: AcceptEmphasis::for_attempts(self.attempts, self.bouncing),
            evasive: EvasiveStyle::for_state(self.attempts, self.phase),
            hints: ProposalHints::for_attempts(self.attempts, self.settings.max_attempts),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Register an activation attempt. Returns `None` when it is dropped.
    pub fn trigger(&mut self, now_ms: u64, trigger: Trigger) -> Option<Event> {
        if !self.mounted || self.phase != MotionPhase::Idle {
            trace!(phase = ?self.phase, ?trigger, "dropping re-entrant trigger");
            return None;
        }

        self.phase = MotionPhase::Shaking;
        let last = self.attempts >= self.settings.max_attempts.saturating_sub(1);
        let next = if last {
            Transition::Finalize
        } else {
            Transition::Relocate
        };
        self.timeline
            .schedule(now_ms, self.settings.anticipation_ms, next);
        debug!(attempt = self.attempts + 1, last, "evasive target shaking");

        Some(Event::AttemptStarted {
            attempt: self.attempts + 1,
            trigger,
            last,
            at_ms: now_ms,
        })
    }

    /// Fire every transition due at `now_ms`, in order.
    pub fn tick(&mut self, now_ms: u64, layout: &dyn LayoutProbe) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some((due, transition)) = self.timeline.pop_due(now_ms) {
            self.apply(due, transition, layout, &mut events);
        }
        events
    }

    /// Tear down the proposal view. Pending transitions never fire.
    pub fn unmount(&mut self) -> usize {
        self.mounted = false;
        self.timeline.cancel_all()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply(
        &mut self,
        at: u64,
        transition: Transition,
        layout: &dyn LayoutProbe,
        events: &mut Vec<Event>,
    ) {
        match transition {
            Transition::Relocate => {
                self.phase = MotionPhase::Moving;
                let next = next_anchor(self.anchor_index);
                match self.settings.placement.resolve(next, layout) {
                    Some(p) => {
                        self.position = Some(p);
                        self.anchor_index = Some(next);
                    }
                    None => debug!(anchor = next, "container not laid out, target stays put"),
                }
                self.attempts += 1;
                self.bouncing = true;
                self.timeline
                    .schedule(at, self.settings.bounce_ms, Transition::EndBounce);
                self.timeline
                    .schedule(at, self.settings.settle_ms, Transition::Settle);

                debug!(attempts = self.attempts, anchor = ?self.anchor_index, "evasive target moved");
                events.push(Event::Relocated {
                    attempts: self.attempts,
                    anchor_index: self.anchor_index,
                    position: self.position,
                    label: self.label().to_string(),
                    at_ms: at,
                });
                events.push(Event::AcceptBounce {
                    active: true,
                    at_ms: at,
                });
            }
            Transition::Settle => {
                self.phase = MotionPhase::Idle;
                events.push(Event::Settled { at_ms: at });
            }
            Transition::EndBounce => {
                self.bouncing = false;
                events.push(Event::AcceptBounce {
                    active: false,
                    at_ms: at,
                });
            }
            Transition::Finalize => {
                self.phase = MotionPhase::FadingOut;
                self.attempts = self.settings.max_attempts;
                if let Some(p) = self.settings.placement.resolve(TERMINAL_ANCHOR, layout) {
                    self.position = Some(p);
                    self.anchor_index = Some(TERMINAL_ANCHOR);
                }
                self.timeline
                    .schedule(at, self.settings.fade_ms, Transition::Remove);

                debug!(attempts = self.attempts, "evasive target giving up");
                events.push(Event::FadingOut {
                    attempts: self.attempts,
                    position: self.position,
                    label: self.label().to_string(),
                    at_ms: at,
                });
            }
            Transition::Remove => {
                self.phase = MotionPhase::Gone;
                debug!("evasive target removed");
                events.push(Event::EvasiveGone { at_ms: at });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Size, StaticLayout};

    fn engine() -> EvasionEngine {
        EvasionEngine::new(EvasionSettings::default(), LabelSet::default())
    }

    /// One full trigger/settle cycle starting at `now`. Returns the settle time.
    fn dodge(e: &mut EvasionEngine, now: u64, layout: &StaticLayout) -> u64 {
        assert!(e.trigger(now, Trigger::PointerEnter).is_some());
        e.tick(now + 120, layout);
        e.tick(now + 620, layout);
        now + 620
    }

    #[test]
    fn single_trigger_moves_to_first_anchor() {
        let layout = StaticLayout::desktop();
        let mut e = engine();

        let ev = e.trigger(0, Trigger::Click).unwrap();
        assert!(matches!(ev, Event::AttemptStarted { attempt: 1, last: false, .. }));
        assert_eq!(e.phase(), MotionPhase::Shaking);

        assert!(e.tick(119, &layout).is_empty());
        let events = e.tick(120, &layout);
        assert!(matches!(events[0], Event::Relocated { attempts: 1, anchor_index: Some(0), .. }));
        assert_eq!(e.phase(), MotionPhase::Moving);
        assert_eq!(e.attempts(), 1);
        assert_eq!(e.anchor_index(), Some(0));
        assert_eq!(e.label(), "Why? 😢");
        assert!(e.is_bouncing());
        assert!((e.view().accept.scale - 1.065).abs() < 1e-9);

        e.tick(520, &layout);
        assert!(!e.is_bouncing());
        assert_eq!(e.phase(), MotionPhase::Moving);
        e.tick(620, &layout);
        assert_eq!(e.phase(), MotionPhase::Idle);
    }

    #[test]
    fn triggers_during_transition_are_dropped() {
        let layout = StaticLayout::desktop();
        let mut e = engine();
        e.trigger(0, Trigger::PointerEnter);

        assert!(e.trigger(10, Trigger::Click).is_none());
        assert_eq!(e.attempts(), 0);
        assert_eq!(e.anchor_index(), None);

        e.tick(120, &layout);
        assert!(e.trigger(200, Trigger::TouchStart).is_none());
        assert_eq!(e.attempts(), 1);
        assert_eq!(e.anchor_index(), Some(0));
        assert_eq!(e.pending_timers(), 2);
    }

    #[test]
    fn anchors_cycle_clockwise() {
        let layout = StaticLayout::desktop();
        let settings = EvasionSettings {
            max_attempts: 100,
            ..EvasionSettings::default()
        };
        let mut e = EvasionEngine::new(settings, LabelSet::default());
        let mut seen = Vec::new();
        let mut now = 0;
        for _ in 0..20 {
            now = dodge(&mut e, now, &layout) + 1;
            seen.push(e.anchor_index().unwrap());
        }
        let expected: Vec<usize> = (0..20).map(|i| i % 8).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn unmeasured_layout_counts_attempt_but_keeps_position() {
        let layout = StaticLayout::unmounted(Size::new(800.0, 600.0));
        let mut e = engine();
        let mut now = dodge(&mut e, 0, &layout);
        assert_eq!(e.attempts(), 1);
        assert_eq!(e.anchor_index(), None);
        assert_eq!(e.position(), None);

        // once laid out, the ring starts from the first anchor
        now = dodge(&mut e, now, &StaticLayout::desktop());
        assert_eq!(e.anchor_index(), Some(0));
        assert!(e.position().is_some());
        assert!(now > 0);
    }

    #[test]
    fn final_attempt_fades_then_disappears() {
        let layout = StaticLayout::desktop();
        let mut e = engine();
        let mut now = 0;
        for _ in 0..11 {
            now = dodge(&mut e, now, &layout);
        }
        assert_eq!(e.attempts(), 11);
        assert_eq!(e.phase(), MotionPhase::Idle);

        let ev = e.trigger(now, Trigger::Click).unwrap();
        assert!(matches!(ev, Event::AttemptStarted { attempt: 12, last: true, .. }));
        assert_eq!(e.attempts(), 11);

        e.tick(now + 120, &layout);
        assert_eq!(e.phase(), MotionPhase::FadingOut);
        assert_eq!(e.attempts(), 12);
        assert_eq!(e.anchor_index(), Some(TERMINAL_ANCHOR));
        assert_eq!(
            e.position(),
            EvasionSettings::default().placement.resolve(TERMINAL_ANCHOR, &layout)
        );
        assert_eq!(e.label(), "Okay… last chance was real 😭💔");
        assert!(e.trigger(now + 200, Trigger::Click).is_none());

        e.tick(now + 920, &layout);
        assert_eq!(e.phase(), MotionPhase::Gone);
        assert!(e.trigger(now + 1000, Trigger::Click).is_none());
        assert_eq!(e.attempts(), 12);
        assert_eq!(e.pending_timers(), 0);
    }

    #[test]
    fn coarse_tick_replays_whole_chain() {
        let layout = StaticLayout::desktop();
        let mut e = engine();
        e.trigger(0, Trigger::PointerEnter);
        let events = e.tick(10_000, &layout);
        let kinds: Vec<_> = events
            .iter()
            .map(|ev| match ev {
                Event::Relocated { at_ms, .. } => ("relocated", *at_ms),
                Event::AcceptBounce { active: true, at_ms } => ("bounce_on", *at_ms),
                Event::AcceptBounce { active: false, at_ms } => ("bounce_off", *at_ms),
                Event::Settled { at_ms } => ("settled", *at_ms),
                _ => ("other", 0),
            })
            .collect();
        assert_eq!(
            kinds,
            [
                ("relocated", 120),
                ("bounce_on", 120),
                ("bounce_off", 520),
                ("settled", 620)
            ]
        );
    }

    #[test]
    fn unmount_cancels_pending_transitions() {
        let layout = StaticLayout::desktop();
        let mut e = engine();
        e.trigger(0, Trigger::Click);
        assert_eq!(e.unmount(), 1);
        assert!(e.tick(10_000, &layout).is_empty());
        assert_eq!(e.attempts(), 0);
        assert!(e.trigger(20_000, Trigger::Click).is_none());
    }
}
