//! Randomised invariants over the host-side state machines.

use folio_wasm::config::Tuning;
use folio_wasm::curtain::{Curtain, Motion, Release};
use folio_wasm::filter::TagFilter;
use folio_wasm::gallery::{FrameThrottle, TapTracker, Tile, TileSet};
use folio_wasm::motion::{normalize, MotionState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn eased_position_stays_in_unit_square() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut motion = MotionState::new(&Tuning::default());
    for _ in 0..2_000 {
        let (x, y) = (rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0));
        motion.set_target(x, y);
        for _ in 0..rng.gen_range(0..5) {
            motion.tick();
            let current = motion.current();
            assert!((0.0..=1.0).contains(&current.x), "x escaped: {}", current.x);
            assert!((0.0..=1.0).contains(&current.y), "y escaped: {}", current.y);
        }
    }
}

#[test]
fn normalize_never_leaves_range() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..1_000 {
        let client = rng.gen_range(-5_000.0..5_000.0);
        let origin = rng.gen_range(-500.0..500.0);
        let extent = rng.gen_range(-10.0..2_000.0);
        let v = normalize(client, origin, extent);
        assert!((0.0..=1.0).contains(&v));
    }
}

#[test]
fn still_cursor_stops_writing() {
    let tuning = Tuning::default();
    let mut motion = MotionState::new(&tuning);
    motion.set_target(0.9, 0.1);
    let mut frames = 0;
    while !motion.is_idle() {
        motion.tick();
        frames += 1;
        assert!(frames < 10_000, "loop never went idle");
    }
    for _ in 0..100 {
        assert_eq!(motion.tick(), None);
    }

    motion.set_target(0.2, 0.2);
    assert!(motion.tick().is_some());
}

#[test]
fn clearing_filter_restores_neutral_markers() {
    let tiles = vec![
        Tile::new("a", vec!["light".into(), "stage".into()], ()),
        Tile::new("b", vec!["education".into()], ()),
        Tile::new("c", vec![], ()),
    ];
    let mut set = TileSet::new(tiles).unwrap();
    let before: Vec<_> = set.iter().map(|t| t.marker).collect();

    let pass = set.apply_filter(&TagFilter::from_values(["Stage", "education"]));
    assert!(pass.active);
    assert_eq!(pass.matched, 2);

    let pass = set.apply_filter(&TagFilter::default());
    assert!(!pass.active);
    let after: Vec<_> = set.iter().map(|t| t.marker).collect();
    assert_eq!(before, after);
}

#[test]
fn curtain_position_is_clamped_and_rescaled() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut curtain = Curtain::new(&Tuning::default());
    curtain.measure(400.0);
    for _ in 0..500 {
        curtain.begin_drag(rng.gen_range(-200.0..600.0));
        for _ in 0..rng.gen_range(1..8) {
            curtain.drag_to(rng.gen_range(-2_000.0..2_000.0));
            assert!((0.0..=curtain.max_extent()).contains(&curtain.position()));
        }
        curtain.end_drag();
        assert!((0.0..=curtain.max_extent()).contains(&curtain.position()));
    }

    let mut curtain = Curtain::new(&Tuning::default());
    curtain.measure(400.0);
    curtain.begin_drag(0.0);
    curtain.drag_to(100.0);
    curtain.end_drag();
    assert_eq!(curtain.position(), 100.0);
    curtain.measure(800.0);
    assert_eq!(curtain.position(), 200.0);
    assert_eq!(curtain.openness(), 0.25);
}

#[test]
fn curtain_click_toggles_and_drag_holds() {
    let mut curtain = Curtain::new(&Tuning::default());
    curtain.measure(300.0);

    curtain.begin_drag(50.0);
    curtain.drag_to(52.0);
    let (release, motion) = curtain.end_drag().unwrap();
    assert_eq!(release, Release::Snapped);
    assert!(matches!(motion, Motion::Snap { .. }));
    assert_eq!(curtain.position(), 300.0);
    assert!(curtain.is_dimmed());

    curtain.begin_drag(300.0);
    curtain.drag_to(180.0);
    assert_eq!(curtain.end_drag(), Some((Release::Held, Motion::Immediate)));
    assert_eq!(curtain.position(), 180.0);

    assert_eq!(curtain.end_drag(), None);
}

#[test]
fn slide_is_not_a_tap() {
    let mut taps = TapTracker::default();
    taps.start(Some("a".into()));
    assert_eq!(taps.end(0.0), Some("a".into()));

    taps.start(Some("a".into()));
    taps.moved();
    assert_eq!(taps.end(100.0), None);

    // A fresh gesture does not inherit the previous slide.
    taps.start(Some("b".into()));
    assert_eq!(taps.end(200.0), Some("b".into()));
}

#[test]
fn throttle_keeps_latest_sample() {
    let mut throttle = FrameThrottle::default();
    assert!(throttle.offer(1.0, 1.0));
    assert!(!throttle.offer(2.0, 3.0));
    assert_eq!(throttle.take(), Some((2.0, 3.0)));
    assert_eq!(throttle.take(), None);
    assert!(throttle.offer(4.0, 4.0));
}
