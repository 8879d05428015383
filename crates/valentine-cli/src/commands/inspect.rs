use clap::Subcommand;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde_json::json;
use valentine_core::evasion::{AcceptEmphasis, EvasiveStyle, ProposalHints};
use valentine_core::geometry::ANCHORS;
use valentine_core::reveal::ConfettiLayer;
use valentine_core::{Config, MotionPhase, Rect, Size, StaticLayout};

#[derive(Subcommand)]
pub enum InspectAction {
    /// Label, emphasis and hints after N attempts
    Attempts {
        /// Number of completed attempts
        #[arg(long, default_value_t = 0)]
        attempts: u32,
    },
    /// Resolved position of every anchor for a layout
    Anchors {
        /// Viewport as WIDTHxHEIGHT
        #[arg(long, default_value = "1280x800", value_parser = parse_size)]
        viewport: Size,
        /// Container as LEFT,TOP,WIDTH,HEIGHT (omit for an unmounted card)
        #[arg(long, value_parser = parse_rect)]
        container: Option<Rect>,
        /// Measured target as WIDTHxHEIGHT
        #[arg(long, value_parser = parse_size)]
        target: Option<Size>,
    },
    /// Confetti particles for a seed
    Confetti {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Override the configured particle count
        #[arg(long)]
        count: Option<usize>,
    },
}

pub fn run(action: InspectAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    match action {
        InspectAction::Attempts { attempts } => {
            let labels = config.labels()?;
            let max = config.evasion.max_attempts;
            let attempts = attempts.min(max);
            let phase = if attempts >= max {
                MotionPhase::Gone
            } else {
                MotionPhase::Idle
            };
            let out = json!({
                "attempts": attempts,
                "max_attempts": max,
                "label": labels.label(attempts, max),
                "accept": AcceptEmphasis::for_attempts(attempts, false),
                "evasive": EvasiveStyle::for_state(attempts, phase),
                "hints": ProposalHints::for_attempts(attempts, max),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        InspectAction::Anchors {
            viewport,
            container,
            target,
        } => {
            let layout = StaticLayout {
                viewport,
                container,
                target,
            };
            let placement = config.evasion_settings().placement;
            let rows: Vec<_> = ANCHORS
                .iter()
                .enumerate()
                .map(|(i, anchor)| {
                    json!({
                        "index": i,
                        "name": anchor.name,
                        "position": placement.resolve(i, &layout),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        InspectAction::Confetti { seed, count } => {
            let mut settings = config.confetti_settings();
            if let Some(count) = count {
                settings.count = count;
            }
            let mut rng = Pcg64::seed_from_u64(seed);
            let layer = ConfettiLayer::spawn(&mut rng, &settings);
            println!("{}", serde_json::to_string_pretty(layer.particles())?);
        }
    }
    Ok(())
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width = w.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let height = h.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok(Size::new(width, height))
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [left, top, width, height] => Ok(Rect::new(*left, *top, *width, *height)),
        _ => Err(format!("expected LEFT,TOP,WIDTH,HEIGHT, got '{s}'")),
    }
}
