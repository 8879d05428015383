use std::sync::Arc;

use clap::Args;
use tracing::debug;
use valentine_core::{
    Config, Event, MediaOutcome, PreloadFlag, Session, Size, StaticLayout, Trigger,
};

#[derive(Args)]
pub struct SimulateArgs {
    /// Attempts on the evasive target before anything else happens
    #[arg(long, default_value_t = 0)]
    pub no_attempts: u32,
    /// Accept after the attempts
    #[arg(long)]
    pub accept: bool,
    /// Press restart once the celebration is fully revealed (implies --accept)
    #[arg(long)]
    pub restart: bool,
    /// Seed for confetti and background hearts
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Virtual time the clip takes to load
    #[arg(long, default_value_t = 300)]
    pub media_ms: u64,
    /// Make the clip load fail
    #[arg(long)]
    pub media_fails: bool,
    /// Virtual time between scripted inputs
    #[arg(long, default_value_t = 100)]
    pub gap_ms: u64,
    /// Fire attempts 10ms apart instead of waiting for each dodge to settle
    #[arg(long)]
    pub rapid: bool,
    /// Run with the card not laid out
    #[arg(long)]
    pub unmounted: bool,
    /// Print the final view as JSON after the event log
    #[arg(long)]
    pub view: bool,
}

/// A session on a virtual clock with a simulated clip loader.
struct Sim {
    session: Session,
    layout: StaticLayout,
    now: u64,
    media_ms: u64,
    outcome: MediaOutcome,
    media_due: Option<u64>,
    log: Vec<Event>,
}

impl Sim {
    fn record(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            if let Event::MediaPreloadRequested { at_ms, .. } = &event {
                if self.media_due.is_none() {
                    self.media_due = Some(at_ms + self.media_ms);
                }
            }
            self.log.push(event);
        }
    }

    fn next_due(&self) -> Option<u64> {
        match (self.session.next_due(), self.media_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire everything due up to and including `t`, then park the clock at `t`.
    fn advance_to(&mut self, t: u64) {
        while let Some(due) = self.next_due().filter(|d| *d <= t) {
            self.step(due);
        }
        self.now = self.now.max(t);
    }

    /// Run until the session has no pending transitions.
    fn drain(&mut self) {
        while let Some(due) = self.session.next_due() {
            let due = self.media_due.map_or(due, |m| m.min(due));
            self.step(due);
        }
    }

    /// Run until nothing at all is pending, including the clip.
    fn drain_all(&mut self) {
        while let Some(due) = self.next_due() {
            self.step(due);
        }
    }

    fn step(&mut self, due: u64) {
        self.now = due;
        if self.media_due == Some(due) {
            self.media_due = None;
            debug!(at = due, outcome = ?self.outcome, "simulated clip load");
            let events = self.session.media_loaded(due, self.outcome);
            self.record(events);
        } else {
            let events = self.session.tick(due, &self.layout);
            self.record(events);
        }
    }

    fn wait(&mut self, ms: u64) {
        self.advance_to(self.now + ms);
    }
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let session = Session::builder(config)
        .seed(args.seed)
        .preload_flag(Arc::new(PreloadFlag::default()))
        .build()?;
    let layout = if args.unmounted {
        StaticLayout::unmounted(Size::new(1280.0, 800.0))
    } else {
        StaticLayout::desktop()
    };

    let mut sim = Sim {
        session,
        layout,
        now: 0,
        media_ms: args.media_ms,
        outcome: if args.media_fails {
            MediaOutcome::Failed
        } else {
            MediaOutcome::Loaded
        },
        media_due: None,
        log: Vec::new(),
    };
    script(&mut sim, &args);

    for event in &sim.log {
        println!("{}", serde_json::to_string(event)?);
    }
    if args.view {
        println!("{}", serde_json::to_string_pretty(&sim.session.view())?);
    }
    Ok(())
}

fn script(sim: &mut Sim, args: &SimulateArgs) {
    let started = sim.session.start(sim.now);
    sim.record(started);

    for _ in 0..args.no_attempts {
        let attempt = sim.session.trigger(sim.now, Trigger::Click);
        sim.record(attempt);
        if args.rapid {
            sim.wait(10);
        } else {
            sim.drain();
            sim.wait(args.gap_ms);
        }
    }

    if args.accept || args.restart {
        let accepted = sim.session.accept(sim.now);
        sim.record(accepted);
        sim.drain();

        if args.restart {
            sim.wait(args.gap_ms);
            let pressed = sim.session.restart(sim.now);
            sim.record(pressed);
            sim.drain();
        }
    }

    sim.drain_all();
    let now = sim.now;
    let cancelled = sim.session.teardown(now);
    sim.record(cancelled);
}
