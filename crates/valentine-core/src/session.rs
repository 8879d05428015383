//! A single proposal session.
//!
//! Owns the two screens and routes input to whichever is mounted. The
//! only hand-off between them is acceptance: the proposal view is torn
//! down (its timers cancelled) and the celebration view mounts. Restart
//! rebuilds the whole session from its configuration.
//!
//! ```ignore
//! let mut session = Session::builder(config).seed(7).build()?;
//! session.start(0);
//! session.trigger(10, Trigger::PointerEnter);
//! session.tick(200, &layout);
//! session.accept(300);
//! ```

use std::sync::Arc;

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::events::Event;
use crate::evasion::{EvasionEngine, EvasionSettings, EvasionView, LabelSet, Trigger};
use crate::geometry::LayoutProbe;
use crate::media::{MediaOutcome, PreloadFlag};
use crate::notify::{AcceptNotifier, AcceptRecord, LogNotifier};
use crate::reveal::{
    hearts, ConfettiLayer, ConfettiSettings, FloatingHeart, Particle, RevealPlan, RevealSequencer,
    RevealSettings, RevealStage, RevealView, RowHeart,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Proposal,
    Celebration,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub screen: Screen,
    pub recipient: String,
    pub sender: String,
    pub media_url: String,
    pub background: Vec<FloatingHeart>,
    /// Faint fixed hearts behind the proposal card; empty on the celebration screen.
    pub ambient: Vec<FloatingHeart>,
    /// Present on the proposal screen.
    pub proposal: Option<EvasionView>,
    /// Present on the celebration screen.
    pub celebration: Option<CelebrationView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelebrationView {
    pub reveal: RevealView,
    pub mounted_at_ms: u64,
    pub confetti: Vec<Particle>,
    pub heart_row: Vec<RowHeart>,
}

struct Celebration {
    mounted_at_ms: u64,
    reveal: RevealSequencer,
    confetti: ConfettiLayer,
}

pub struct SessionBuilder {
    config: Config,
    seed: Option<u64>,
    preload: Option<Arc<PreloadFlag>>,
    notifier: Option<Arc<dyn AcceptNotifier>>,
}

impl SessionBuilder {
    /// Seed the particle generator for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use a private preload flag instead of the process-wide one.
    pub fn preload_flag(mut self, flag: Arc<PreloadFlag>) -> Self {
        self.preload = Some(flag);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn AcceptNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn build(self) -> Result<Session> {
        self.config.validate()?;
        let labels = self.config.labels()?;
        let plan = self.config.reveal_plan()?;
        let rng = match self.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::seed_from_u64(rand::thread_rng().gen()),
        };
        let mut session = Session {
            id: Uuid::new_v4(),
            evasion_settings: self.config.evasion_settings(),
            reveal_settings: self.config.reveal_settings(),
            confetti_settings: self.config.confetti_settings(),
            evasion: EvasionEngine::new(self.config.evasion_settings(), labels.clone()),
            labels,
            plan,
            celebration: None,
            screen: Screen::Proposal,
            background: Vec::new(),
            media_requested: false,
            preload: self.preload.unwrap_or_else(PreloadFlag::shared),
            notifier: self
                .notifier
                .unwrap_or_else(|| Arc::new(LogNotifier) as Arc<dyn AcceptNotifier>),
            rng,
            config: self.config,
        };
        session.background = hearts::background(&mut session.rng, session.config.hearts.count);
        Ok(session)
    }
}

pub struct Session {
    id: Uuid,
    config: Config,
    evasion_settings: EvasionSettings,
    reveal_settings: RevealSettings,
    confetti_settings: ConfettiSettings,
    labels: LabelSet,
    plan: RevealPlan,
    screen: Screen,
    evasion: EvasionEngine,
    celebration: Option<Celebration>,
    background: Vec<FloatingHeart>,
    /// A fetch is in flight for this session.
    media_requested: bool,
    preload: Arc<PreloadFlag>,
    notifier: Arc<dyn AcceptNotifier>,
    rng: Pcg64,
}

impl Session {
    pub fn builder(config: Config) -> SessionBuilder {
        SessionBuilder {
            config,
            seed: None,
            preload: None,
            notifier: None,
        }
    }

    pub fn new(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The proposal engine. Still readable after acceptance, but unmounted.
    pub fn evasion(&self) -> &EvasionEngine {
        &self.evasion
    }

    pub fn reveal(&self) -> Option<&RevealSequencer> {
        self.celebration.as_ref().map(|c| &c.reveal)
    }

    pub fn confetti(&self) -> Option<&ConfettiLayer> {
        self.celebration.as_ref().map(|c| &c.confetti)
    }

    pub fn stage(&self) -> RevealStage {
        self.reveal().map_or(RevealStage::Hidden, RevealSequencer::stage)
    }

    /// Due time of the next pending transition of the mounted view.
    pub fn next_due(&self) -> Option<u64> {
        match &self.celebration {
            Some(c) => c.reveal.next_due(),
            None => self.evasion.next_due(),
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            screen: self.screen,
            recipient: self.config.copy.recipient.clone(),
            sender: self.config.copy.sender.clone(),
            media_url: self.config.media.url.clone(),
            background: self.background.clone(),
            ambient: match self.screen {
                Screen::Proposal => hearts::ambient(),
                Screen::Celebration => Vec::new(),
            },
            proposal: (self.screen == Screen::Proposal).then(|| self.evasion.view()),
            celebration: self.celebration.as_ref().map(|c| CelebrationView {
                reveal: c.reveal.view(),
                mounted_at_ms: c.mounted_at_ms,
                confetti: c.confetti.particles().to_vec(),
                heart_row: hearts::heart_row(),
            }),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Announce the session and kick off the clip preload.
    pub fn start(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = vec![Event::SessionStarted {
            session_id: self.id,
            at_ms: now_ms,
        }];
        if self.config.media.preload {
            events.extend(self.request_media(now_ms));
        }
        events
    }

    /// Activation attempt on the evasive target.
    pub fn trigger(&mut self, now_ms: u64, trigger: Trigger) -> Option<Event> {
        if self.screen != Screen::Proposal {
            return None;
        }
        self.evasion.trigger(now_ms, trigger)
    }

    /// The accept target was activated. Never blocked on the proposal screen.
    pub fn accept(&mut self, now_ms: u64) -> Vec<Event> {
        if self.screen != Screen::Proposal {
            return Vec::new();
        }
        let mut events = Vec::new();

        let cancelled = self.evasion.unmount();
        if cancelled > 0 {
            events.push(Event::TimersCancelled {
                screen: Screen::Proposal,
                count: cancelled,
                at_ms: now_ms,
            });
        }

        let record = AcceptRecord {
            session_id: self.id,
            recipient: self.config.copy.recipient.clone(),
            attempts: self.evasion.attempts(),
            at: Utc::now(),
        };
        self.notifier.on_accept(&record);
        events.push(Event::Accepted {
            session_id: self.id,
            attempts: record.attempts,
            at: record.at,
            at_ms: now_ms,
        });

        let confetti = ConfettiLayer::spawn(&mut self.rng, &self.confetti_settings);
        events.push(Event::ConfettiSpawned {
            count: confetti.len(),
            at_ms: now_ms,
        });

        let reveal = RevealSequencer::mount(
            now_ms,
            &self.plan,
            self.reveal_settings,
            self.preload.is_set(),
        );
        self.celebration = Some(Celebration {
            mounted_at_ms: now_ms,
            reveal,
            confetti,
        });
        self.screen = Screen::Celebration;
        debug!(attempts = record.attempts, "celebration mounted");

        events.extend(self.request_media(now_ms));
        events
    }

    /// Fire every due transition of the mounted view.
    pub fn tick(&mut self, now_ms: u64, layout: &dyn LayoutProbe) -> Vec<Event> {
        let events = match self.celebration.as_mut() {
            Some(c) => c.reveal.tick(now_ms),
            None => self.evasion.tick(now_ms, layout),
        };

        let reload_at = events.iter().find_map(|e| match e {
            Event::SessionReloaded { at_ms } => Some(*at_ms),
            _ => None,
        });
        match reload_at {
            Some(at) => {
                let mut events = events;
                events.extend(self.reload(at));
                events
            }
            None => events,
        }
    }

    /// The clip finished loading (or failed to).
    pub fn media_loaded(&mut self, now_ms: u64, outcome: MediaOutcome) -> Vec<Event> {
        self.media_requested = false;
        self.preload.record(outcome);
        match self.celebration.as_mut() {
            Some(c) => c.reveal.media_loaded(now_ms, outcome).into_iter().collect(),
            None => vec![Event::MediaLoaded {
                outcome,
                at_ms: now_ms,
            }],
        }
    }

    /// Press the restart action on the celebration screen.
    pub fn restart(&mut self, now_ms: u64) -> Option<Event> {
        self.celebration.as_mut()?.reveal.restart(now_ms)
    }

    /// Tear down whatever is mounted, cancelling its pending transitions.
    pub fn teardown(&mut self, now_ms: u64) -> Vec<Event> {
        let (screen, count) = match self.celebration.as_mut() {
            Some(c) => (Screen::Celebration, c.reveal.unmount()),
            None => (Screen::Proposal, self.evasion.unmount()),
        };
        if count == 0 {
            return Vec::new();
        }
        vec![Event::TimersCancelled {
            screen,
            count,
            at_ms: now_ms,
        }]
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn request_media(&mut self, now_ms: u64) -> Option<Event> {
        if self.preload.is_set() || self.media_requested {
            return None;
        }
        self.media_requested = true;
        Some(Event::MediaPreloadRequested {
            url: self.config.media.url.clone(),
            at_ms: now_ms,
        })
    }

    /// Full reload: every counter, timer and stage back to its initial value.
    /// A clip fetch still in flight carries over to the new session.
    fn reload(&mut self, now_ms: u64) -> Vec<Event> {
        if let Some(c) = self.celebration.as_mut() {
            c.reveal.unmount();
        }
        self.celebration = None;
        self.screen = Screen::Proposal;
        self.id = Uuid::new_v4();
        self.evasion = EvasionEngine::new(self.evasion_settings, self.labels.clone());
        self.background = hearts::background(&mut self.rng, self.config.hearts.count);
        info!(session_id = %self.id, "session reloaded");
        self.start(now_ms)
    }
}
