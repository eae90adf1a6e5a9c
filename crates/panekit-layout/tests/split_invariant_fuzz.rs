//! Property-style invariants for split sizing.
//!
//! Random operation streams (drags, container resizes, dock moves) run
//! against the public engine API; after every step the children of each
//! split must still tile their container and respect their limits.

use std::time::Duration;

use panekit_core::geometry::Size;
use panekit_layout::{
    HeadlessHost, LayoutEngine, Limits, RegionId, RootOptions, SizeSlot, SplitSpec,
};
use proptest::prelude::*;

type Engine = LayoutEngine<HeadlessHost<()>>;

const SETTLE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
enum Op {
    Drag { inner: bool, delta: f32 },
    ResizeRoot { width: f32, height: f32 },
    ToggleDock,
    Advance { millis: u64 },
}

fn slot_strategy() -> impl Strategy<Value = SizeSlot> {
    prop_oneof![
        (0.0_f32..1500.0).prop_map(SizeSlot::Pixels),
        (0.0_f32..=100.0).prop_map(SizeSlot::Percent),
        Just(SizeSlot::Auto),
    ]
}

/// Slot pairs that pass validation and are not content-driven.
fn slot_pair_strategy() -> impl Strategy<Value = [SizeSlot; 2]> {
    (slot_strategy(), slot_strategy())
        .prop_map(|(first, second)| match (first, second) {
            (SizeSlot::Auto, SizeSlot::Auto) => [SizeSlot::Percent(50.0), SizeSlot::Percent(50.0)],
            (SizeSlot::Percent(p), SizeSlot::Percent(_)) => {
                [SizeSlot::Percent(p), SizeSlot::Percent(100.0 - p)]
            }
            pair => [pair.0, pair.1],
        })
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (any::<bool>(), -800.0_f32..800.0)
            .prop_map(|(inner, delta)| Op::Drag { inner, delta }),
        2 => (100.0_f32..2000.0, 100.0_f32..2000.0)
            .prop_map(|(width, height)| Op::ResizeRoot { width, height }),
        1 => Just(Op::ToggleDock),
        1 => (0_u64..250).prop_map(|millis| Op::Advance { millis }),
    ]
}

/// Root split horizontally; its secondary split vertically.
fn build(
    outer: [SizeSlot; 2],
    inner: [SizeSlot; 2],
    minimizable: bool,
) -> (Engine, RegionId, RegionId) {
    let mut engine = LayoutEngine::new(HeadlessHost::new());
    let root = engine
        .create_root(RootOptions::default().with_size(Size::new(1200.0, 900.0)))
        .unwrap();
    let (_, right) = engine
        .split(root, &SplitSpec::horizontal(outer).minimizable(minimizable))
        .unwrap();
    engine.split(right, &SplitSpec::vertical(inner)).unwrap();
    (engine, root, right)
}

fn apply(engine: &mut Engine, root: RegionId, right: RegionId, op: &Op) {
    match *op {
        Op::Drag { inner, delta } => {
            let target = if inner { right } else { root };
            engine.resize_drag(target, delta).unwrap();
        }
        Op::ResizeRoot { width, height } => {
            engine.notify_size(root, Size::new(width, height)).unwrap();
        }
        Op::ToggleDock => {
            if engine.region(root).unwrap().minimizable() {
                engine.toggle_dock(root).unwrap();
            }
        }
        Op::Advance { millis } => {
            engine.advance(Duration::from_millis(millis));
        }
    }
}

fn assert_children_tile(engine: &Engine, root: RegionId) -> Result<(), TestCaseError> {
    for id in engine.subtree(root) {
        let region = engine.region(id).unwrap();
        let Some(orientation) = region.orientation() else {
            continue;
        };
        let extent = orientation.extent(region.size());
        let handle = region.handle_thickness();
        if extent < handle || extent <= 0.0 {
            continue;
        }
        let children = region.children();
        let first = orientation.extent(engine.region(children[0]).unwrap().size());
        let second = orientation.extent(engine.region(children[1]).unwrap().size());
        prop_assert!(first >= 0.0 && second >= 0.0);
        prop_assert!(
            (first + handle + second - extent).abs() <= 1.0,
            "region {}: {} + {} + {} != {}",
            id,
            first,
            handle,
            second,
            extent
        );
        prop_assert_eq!(
            orientation.cross_extent(engine.region(children[1]).unwrap().size()),
            orientation.cross_extent(region.size())
        );
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn children_always_tile_their_container(
        outer in slot_pair_strategy(),
        inner in slot_pair_strategy(),
        minimizable in any::<bool>(),
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let (mut engine, root, right) = build(outer, inner, minimizable);
        assert_children_tile(&engine, root)?;
        for op in &ops {
            apply(&mut engine, root, right, op);
            assert_children_tile(&engine, root)?;
        }
    }

    #[test]
    fn drags_never_break_satisfiable_limits(
        primary_min in 0.0_f32..400.0,
        primary_span in 100.0_f32..900.0,
        secondary_min in 0.0_f32..400.0,
        secondary_span in 100.0_f32..900.0,
        deltas in proptest::collection::vec(-1500.0_f32..1500.0, 1..30),
    ) {
        let mut engine: Engine = LayoutEngine::new(HeadlessHost::new());
        let root = engine
            .create_root(RootOptions::default().with_size(Size::new(1004.0, 600.0)))
            .unwrap();
        let (left, right) = engine.split(root, &SplitSpec::default()).unwrap();
        let inner = 1000.0_f32;
        let primary = (primary_min, primary_min + primary_span);
        let secondary = (secondary_min, secondary_min + secondary_span);
        let lo = secondary.0.max(inner - primary.1);
        let hi = secondary.1.min(inner - primary.0);
        prop_assume!(lo <= hi);

        let limits = |(min_width, max_width): (f32, f32)| Limits {
            min_width,
            max_width,
            ..Limits::default()
        };
        engine.set_limits(left, limits(primary)).unwrap();
        engine.set_limits(right, limits(secondary)).unwrap();

        for delta in deltas {
            engine.resize_drag(root, delta).unwrap();
            let first = engine.region(left).unwrap().size().width;
            let second = engine.region(right).unwrap().size().width;
            prop_assert!(
                first >= primary.0 - 1e-3 && first <= primary.1 + 1e-3,
                "primary {}",
                first
            );
            prop_assert!(
                second >= secondary.0 - 1e-3 && second <= secondary.1 + 1e-3,
                "secondary {}",
                second
            );
        }
    }

    #[test]
    fn extend_then_reduce_restores_exact_secondary(
        height in 200.0_f32..2000.0,
        secondary_pct in 1.0_f32..99.0,
        deltas in proptest::collection::vec(-300.0_f32..300.0, 0..6),
    ) {
        let mut engine: Engine = LayoutEngine::new(HeadlessHost::new());
        let root = engine
            .create_root(RootOptions::default().with_size(Size::new(800.0, height)))
            .unwrap();
        let spec = SplitSpec::vertical([
            SizeSlot::Percent(100.0 - secondary_pct),
            SizeSlot::Percent(secondary_pct),
        ])
        .minimizable(true);
        let (_, bottom) = engine.split(root, &spec).unwrap();
        for delta in deltas {
            engine.resize_drag(root, delta).unwrap();
        }
        let before = engine.region(bottom).unwrap().size().height;

        prop_assert!(engine.extend(root).unwrap());
        prop_assert_eq!(engine.region(bottom).unwrap().size().height, 0.0);
        engine.advance(SETTLE);
        prop_assert!(engine.reduce(root).unwrap());
        engine.advance(SETTLE);

        prop_assert_eq!(engine.region(bottom).unwrap().size().height, before);
        prop_assert_eq!(engine.region(root).unwrap().offset(), before);
    }
}
