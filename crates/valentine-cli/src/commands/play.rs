use std::time::{Duration, Instant};

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};
use valentine_core::media::{self, PreloadFlag};
use valentine_core::{Config, Event, MediaOutcome, Session, StaticLayout};

use crate::render::{self, Command};

const KEYS: &str = "keys: n/h/t try No · y Yes · r replay · q quit";

#[derive(Args)]
pub struct PlayArgs {
    /// Print events as JSON lines instead of drawing frames
    #[arg(long)]
    pub json: bool,
    /// Seed for confetti and background hearts
    #[arg(long)]
    pub seed: Option<u64>,
    /// Tick interval in milliseconds
    #[arg(long, default_value_t = 16)]
    pub tick_ms: u64,
}

pub fn run(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(play(args))
}

async fn play(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut builder = Session::builder(config).preload_flag(PreloadFlag::shared());
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let mut session = builder.build()?;
    let layout = StaticLayout::desktop();
    let client = reqwest::Client::new();

    let origin = Instant::now();
    let clock = move || origin.elapsed().as_millis() as u64;

    let (tx, mut rx) = mpsc::channel::<MediaOutcome>(4);
    let mut in_flight = 0usize;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut interval = tokio::time::interval(Duration::from_millis(args.tick_ms.max(1)));

    let out = Output { json: args.json };
    let started = session.start(clock());
    in_flight += spawn_fetches(&client, &tx, &started);
    out.emit(&session, &started, clock(), true)?;
    if !args.json {
        println!("{KEYS}");
    }

    loop {
        let (events, redraw) = tokio::select! {
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => match render::parse_command(&line) {
                    Some(Command::Quit) => break,
                    Some(command) => (apply(&mut session, command, clock()), true),
                    None => {
                        eprintln!("unknown input: {}", line.trim());
                        (Vec::new(), false)
                    }
                },
                None => {
                    debug!("stdin closed");
                    stdin_open = false;
                    (Vec::new(), false)
                }
            },
            Some(outcome) = rx.recv() => {
                in_flight = in_flight.saturating_sub(1);
                (session.media_loaded(clock(), outcome), false)
            }
            _ = interval.tick() => (session.tick(clock(), &layout), false),
        };

        in_flight += spawn_fetches(&client, &tx, &events);
        out.emit(&session, &events, clock(), redraw)?;

        if !stdin_open && in_flight == 0 && session.next_due().is_none() {
            break;
        }
    }

    let cancelled = session.teardown(clock());
    out.emit(&session, &cancelled, clock(), false)?;
    info!(session = %session.id(), "player closed");
    Ok(())
}

fn apply(session: &mut Session, command: Command, now_ms: u64) -> Vec<Event> {
    match command {
        Command::Attempt(trigger) => session.trigger(now_ms, trigger).into_iter().collect(),
        Command::Accept => session.accept(now_ms),
        Command::Restart => session.restart(now_ms).into_iter().collect(),
        Command::Redraw | Command::Quit => Vec::new(),
    }
}

/// Start a fetch for every clip request, returning how many were started.
fn spawn_fetches(
    client: &reqwest::Client,
    tx: &mpsc::Sender<MediaOutcome>,
    events: &[Event],
) -> usize {
    let mut started = 0;
    for event in events {
        if let Event::MediaPreloadRequested { url, .. } = event {
            let client = client.clone();
            let tx = tx.clone();
            let url = url.clone();
            tokio::spawn(async move {
                let outcome = media::fetch(&client, &url).await;
                let _ = tx.send(outcome).await;
            });
            started += 1;
        }
    }
    started
}

struct Output {
    json: bool,
}

impl Output {
    fn emit(
        &self,
        session: &Session,
        events: &[Event],
        now_ms: u64,
        redraw: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.json {
            for event in events {
                println!("{}", serde_json::to_string(event)?);
            }
        } else if redraw || !events.is_empty() {
            print!("{}", render::frame(&session.view(), now_ms));
        }
        Ok(())
    }
}
