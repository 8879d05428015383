//! End-to-end session scenarios driven on a virtual clock.

use std::sync::Arc;

use valentine_core::evasion::DEFAULT_TERMINAL_LABEL;
use valentine_core::geometry::TERMINAL_ANCHOR;
use valentine_core::{
    Config, Event, MediaOutcome, MotionPhase, PreloadFlag, RevealStage, Screen, Session,
    StaticLayout, Trigger,
};

fn session() -> Session {
    Session::builder(Config::default())
        .seed(99)
        .preload_flag(Arc::new(PreloadFlag::default()))
        .build()
        .unwrap()
}

/// Trigger the evasive target and run its chain to completion.
fn dodge(s: &mut Session, now: &mut u64, layout: &StaticLayout) -> Vec<Event> {
    let mut events: Vec<Event> = s.trigger(*now, Trigger::PointerEnter).into_iter().collect();
    while let Some(due) = s.next_due() {
        *now = due;
        events.extend(s.tick(due, layout));
    }
    events
}

#[test]
fn first_attempt_moves_to_left_center() {
    let layout = StaticLayout::desktop();
    let mut s = session();
    let mut now = 0;
    dodge(&mut s, &mut now, &layout);

    let view = s.view().proposal.unwrap();
    assert_eq!(view.attempts, 1);
    assert_eq!(view.anchor_index, Some(0));
    assert_eq!(view.anchor.as_deref(), Some("left-center"));
    assert_eq!(view.label, "Why? 😢");
    assert!((view.accept.scale - 1.065).abs() < 1e-9);
    assert_eq!(view.phase, MotionPhase::Idle);
}

#[test]
fn immediate_accept_reveals_on_schedule() {
    let layout = StaticLayout::desktop();
    let mut s = session();
    s.start(0);
    s.accept(0);
    assert_eq!(s.screen(), Screen::Celebration);

    s.tick(1199, &layout);
    assert!(!s.view().celebration.unwrap().reveal.media.container_visible);
    s.tick(1200, &layout);
    let reveal = s.view().celebration.unwrap().reveal;
    assert!(reveal.media.container_visible);
    assert!(reveal.media.placeholder);
    assert!(!reveal.restart.visible);

    s.tick(1800, &layout);
    let restart = s.view().celebration.unwrap().reveal.restart;
    assert!(restart.visible && restart.enabled && !restart.busy);

    s.media_loaded(1900, MediaOutcome::Loaded);
    assert!(!s.view().celebration.unwrap().reveal.media.placeholder);
}

#[test]
fn max_attempts_remove_the_target() {
    let layout = StaticLayout::desktop();
    let mut s = session();
    let mut now = 0;
    let mut anchors = Vec::new();
    for _ in 0..11 {
        dodge(&mut s, &mut now, &layout);
        anchors.push(s.evasion().anchor_index().unwrap());
        now += 1;
    }
    assert_eq!(anchors, vec![0, 1, 2, 3, 4, 5, 6, 7, 0, 1, 2]);

    let events = dodge(&mut s, &mut now, &layout);
    let fading = events
        .iter()
        .find_map(|e| match e {
            Event::FadingOut { attempts, label, .. } => Some((*attempts, label.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(fading, (12, DEFAULT_TERMINAL_LABEL.to_string()));
    assert!(matches!(events.last(), Some(Event::EvasiveGone { .. })));

    assert_eq!(s.evasion().phase(), MotionPhase::Gone);
    assert_eq!(s.evasion().anchor_index(), Some(TERMINAL_ANCHOR));
    assert!(s.trigger(now + 1, Trigger::Click).is_none());
    assert_eq!(s.evasion().attempts(), 12);

    let view = s.view().proposal.unwrap();
    assert!(!view.evasive.visible);
    assert!(view.hints.destiny);

    // accept is still available
    assert!(!s.accept(now + 2).is_empty());
}

#[test]
fn restart_returns_everything_to_initial_values() {
    let layout = StaticLayout::desktop();
    let mut s = session();
    let mut now = 0;
    s.start(now);
    for _ in 0..3 {
        dodge(&mut s, &mut now, &layout);
    }
    s.accept(now);
    let mounted = now;
    s.tick(mounted + 1800, &layout);
    assert_eq!(s.stage(), RevealStage::FullyRevealed);

    assert!(s.restart(mounted + 2000).is_some());
    assert!(s.view().celebration.unwrap().reveal.restart.busy);
    s.tick(mounted + 2799, &layout);
    assert_eq!(s.screen(), Screen::Celebration);

    s.tick(mounted + 2800, &layout);
    assert_eq!(s.screen(), Screen::Proposal);
    assert_eq!(s.stage(), RevealStage::Hidden);
    let view = s.view().proposal.unwrap();
    assert_eq!(view.attempts, 0);
    assert_eq!(view.anchor_index, None);
    assert_eq!(view.position, None);
    assert_eq!(view.label, "No 😢");
}

#[test]
fn layout_not_ready_never_breaks_the_chain() {
    let unmounted = StaticLayout::unmounted(valentine_core::Size::new(800.0, 600.0));
    let mut s = session();
    let mut now = 0;
    for _ in 0..12 {
        dodge(&mut s, &mut now, &unmounted);
        now += 1;
    }
    assert_eq!(s.evasion().phase(), MotionPhase::Gone);
    assert_eq!(s.evasion().attempts(), 12);
    assert_eq!(s.evasion().position(), None);
}
