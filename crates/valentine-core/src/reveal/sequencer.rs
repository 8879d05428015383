//! Staged reveal of the celebration screen.
//!
//! Mounting schedules every stage of the [`RevealPlan`] at once, keyed to
//! the mount time. Stages only ever move forward and cannot be skipped.
//! The restart action becomes available with the last stage and, once
//! used, schedules a reload of the whole session.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::plan::{RevealPlan, RevealStage};
use crate::events::Event;
use crate::media::MediaOutcome;
use crate::timer::Timeline;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealSettings {
    /// Delay between the media container appearing and its content animating in.
    pub media_reveal_ms: u64,
    /// Busy period between pressing restart and the reload.
    pub restart_delay_ms: u64,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            media_reveal_ms: 50,
            restart_delay_ms: 800,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Advance(RevealStage),
    StartMediaReveal,
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaView {
    pub container_visible: bool,
    /// Placeholder shown until the clip has loaded (or failed to).
    pub placeholder: bool,
    pub animating: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestartView {
    pub visible: bool,
    pub enabled: bool,
    pub busy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealView {
    pub stage: RevealStage,
    pub card_visible: bool,
    pub message_visible: bool,
    pub media: MediaView,
    pub footer_visible: bool,
    pub restart: RestartView,
}

#[derive(Debug, Clone)]
pub struct RevealSequencer {
    settings: RevealSettings,
    stage: RevealStage,
    media_loaded: bool,
    media_animating: bool,
    restarting: bool,
    mounted: bool,
    timeline: Timeline<Transition>,
}

impl RevealSequencer {
    /// Mount the celebration view at `now_ms` and schedule every stage.
    pub fn mount(
        now_ms: u64,
        plan: &RevealPlan,
        settings: RevealSettings,
        media_ready: bool,
    ) -> Self {
        let mut timeline = Timeline::new();
        for step in plan.steps() {
            timeline.schedule(now_ms, step.offset_ms, Transition::Advance(step.stage));
        }
        Self {
            settings,
            stage: RevealStage::Hidden,
            media_loaded: media_ready,
            media_animating: false,
            restarting: false,
            mounted: true,
            timeline,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn stage(&self) -> RevealStage {
        self.stage
    }

    pub fn is_media_loaded(&self) -> bool {
        self.media_loaded
    }

    pub fn is_restarting(&self) -> bool {
        self.restarting
    }

    pub fn can_restart(&self) -> bool {
        self.mounted && self.stage == RevealStage::FullyRevealed && !self.restarting
    }

    pub fn pending_timers(&self) -> usize {
        self.timeline.len()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.timeline.next_due()
    }

    pub fn view(&self) -> RevealView {
        let media_visible = self.stage >= RevealStage::MediaShown;
        let rest_visible = self.stage >= RevealStage::FullyRevealed;
        RevealView {
            stage: self.stage,
            card_visible: self.stage >= RevealStage::CardShown,
            message_visible: self.stage >= RevealStage::MessageShown,
            media: MediaView {
                container_visible: media_visible,
                placeholder: media_visible && !self.media_loaded,
                animating: self.media_animating,
            },
            footer_visible: rest_visible,
            restart: RestartView {
                visible: rest_visible,
                enabled: self.can_restart(),
                busy: self.restarting,
            },
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Fire every transition due at `now_ms`, in order.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some((due, transition)) = self.timeline.pop_due(now_ms) {
            self.apply(due, transition, &mut events);
        }
        events
    }

    /// Record that the clip finished loading. Failure counts as loaded so
    /// the placeholder never sticks.
    pub fn media_loaded(&mut self, now_ms: u64, outcome: MediaOutcome) -> Option<Event> {
        if self.media_loaded || !self.mounted {
            return None;
        }
        self.media_loaded = true;
        debug!(?outcome, "celebration media resolved");
        Some(Event::MediaLoaded {
            outcome,
            at_ms: now_ms,
        })
    }

    /// Press the restart action. Disabled until fully revealed and after
    /// the first press.
    pub fn restart(&mut self, now_ms: u64) -> Option<Event> {
        if !self.can_restart() {
            return None;
        }
        self.restarting = true;
        self.timeline
            .schedule(now_ms, self.settings.restart_delay_ms, Transition::Reload);
        debug!("restart requested");
        Some(Event::RestartRequested { at_ms: now_ms })
    }

    /// Tear down the celebration view. Pending transitions never fire.
    pub fn unmount(&mut self) -> usize {
        self.mounted = false;
        self.timeline.cancel_all()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply(&mut self, at: u64, transition: Transition, events: &mut Vec<Event>) {
        match transition {
            Transition::Advance(stage) => {
                // forward only
                if stage <= self.stage {
                    return;
                }
                self.stage = stage;
                debug!(%stage, at_ms = at, "reveal stage advanced");
                events.push(Event::StageAdvanced { stage, at_ms: at });
                if stage >= RevealStage::MediaShown && !self.media_animating {
                    self.timeline.schedule(
                        at,
                        self.settings.media_reveal_ms,
                        Transition::StartMediaReveal,
                    );
                }
            }
            Transition::StartMediaReveal => {
                if self.media_animating {
                    return;
                }
                self.media_animating = true;
                events.push(Event::MediaRevealStarted { at_ms: at });
            }
            Transition::Reload => {
                self.mounted = false;
                self.timeline.cancel_all();
                events.push(Event::SessionReloaded { at_ms: at });
            }
        }
    }
}
