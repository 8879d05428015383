//! Plain-text rendering of a session view.

use std::fmt::Write;

use valentine_core::evasion::{EvasionView, MotionPhase};
use valentine_core::session::CelebrationView;
use valentine_core::{SessionView, Trigger};

const RULE: &str = "────────────────────────────────────────────";

pub fn frame(view: &SessionView, now_ms: u64) -> String {
    let mut out = String::new();
    writeln!(out, "{RULE}").ok();
    if let Some(p) = &view.proposal {
        proposal(&mut out, view, p);
    }
    if let Some(c) = &view.celebration {
        celebration(&mut out, view, c, now_ms);
    }
    writeln!(out, "{RULE}").ok();
    out
}

fn proposal(out: &mut String, view: &SessionView, p: &EvasionView) {
    let ambient = view
        .ambient
        .iter()
        .map(|h| h.glyph.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "  {ambient}").ok();
    writeln!(out, "  💖").ok();
    writeln!(out, "  {}, will you be my Valentine? 💖", view.recipient).ok();
    writeln!(out, "  You already know the answer 😏").ok();
    writeln!(out).ok();
    if p.hints.destiny {
        writeln!(out, "  I think destiny has been pretty clear by now.").ok();
        writeln!(out, "  Maybe it's time to click Yes").ok();
        writeln!(out, "  and let a little magic happen ✨").ok();
    } else {
        writeln!(out, "  You can try clicking No…").ok();
        writeln!(out, "  but maybe think twice before you do 😌").ok();
    }
    writeln!(out).ok();

    let a = &p.accept;
    writeln!(
        out,
        "  [ Yes 💕 ]{}  ×{:.2}  glow {}px  brightness {}%  saturate {}%{}",
        if a.bouncing { "↑" } else { "" },
        a.scale,
        a.glow_px,
        a.brightness_pct,
        a.saturation_pct,
        if a.pulsing { "  (pulsing)" } else { "" },
    )
    .ok();

    match p.phase {
        MotionPhase::Gone => {}
        phase => {
            let place = match (&p.anchor, p.position) {
                (Some(name), Some(pos)) => format!("{name} ({:.0}, {:.0})", pos.x, pos.y),
                _ => "under Yes".to_string(),
            };
            let motion = match phase {
                MotionPhase::Shaking => "  ~shaking~",
                MotionPhase::Moving => "  »moving»",
                MotionPhase::FadingOut => "  …fading",
                _ => "",
            };
            writeln!(
                out,
                "  [ {} ]  at {place}  opacity {:.2}{motion}",
                p.label, p.evasive.opacity
            )
            .ok();
        }
    }

    if let Some(caption) = &p.hints.failed_attempts {
        writeln!(out).ok();
        writeln!(out, "  {caption}").ok();
    }
    if p.hints.nudge {
        writeln!(
            out,
            "  Psst... the Yes button is looking really irresistible right now! 👀✨"
        )
        .ok();
    }
}

fn celebration(out: &mut String, view: &SessionView, c: &CelebrationView, now_ms: u64) {
    let r = &c.reveal;
    let elapsed_s = now_ms.saturating_sub(c.mounted_at_ms) as f64 / 1000.0;
    let falling = c
        .confetti
        .iter()
        .filter(|p| p.sample(elapsed_s).is_some() && !p.finished(elapsed_s))
        .take(12)
        .map(|p| p.glyph.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "  {falling}").ok();

    if !r.card_visible {
        return;
    }
    writeln!(out, "  💖").ok();
    writeln!(out, "  YAY!!! 💖").ok();
    writeln!(out, "  {} said YES!!", view.recipient).ok();
    if r.message_visible {
        writeln!(out).ok();
        writeln!(out, "  Thank you for accepting my proposal.").ok();
        writeln!(out, "  I promise you'll never regret this decision —").ok();
        writeln!(out, "  and one day, you'll be proud that you chose us.").ok();
    }
    if r.media.container_visible {
        writeln!(out).ok();
        if r.media.placeholder {
            writeln!(out, "  [ 🎉 loading… ]").ok();
        } else {
            writeln!(out, "  [ ▶ {} ]", view.media_url).ok();
        }
    }
    if r.footer_visible {
        writeln!(out).ok();
        writeln!(out, "  From your forever Valentine,").ok();
        writeln!(out, "  — {} 💘", view.sender).ok();
        let row = c
            .heart_row
            .iter()
            .map(|h| if elapsed_s >= h.delay_s { h.glyph.as_str() } else { "·" })
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "  {row}").ok();
        if r.restart.busy {
            writeln!(out, "  [ ◌ Loading... ]").ok();
        } else if r.restart.enabled {
            writeln!(out, "  [ Replay 💞 ]  (r)").ok();
        }
    }
}

/// Keys understood by the interactive player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Attempt(Trigger),
    Accept,
    Restart,
    Redraw,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_lowercase().as_str() {
        "" => Some(Command::Redraw),
        "n" | "no" | "click" => Some(Command::Attempt(Trigger::Click)),
        "h" | "hover" => Some(Command::Attempt(Trigger::PointerEnter)),
        "t" | "touch" => Some(Command::Attempt(Trigger::TouchStart)),
        "y" | "yes" => Some(Command::Accept),
        "r" | "replay" | "restart" => Some(Command::Restart),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}
