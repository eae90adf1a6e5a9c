#![forbid(unsafe_code)]

//! Reconciling region sizes with what the surface reports.
//!
//! # Design
//!
//! Two kinds of watches connect the engine to host size notifications:
//!
//! - a **one-shot** watch on a split whose container had no extent when it
//!   was split; the first non-zero size resolves the split and the host
//!   subscription is cancelled right away;
//! - a **persistent** watch on the first pane of an `[Auto, Auto]` split;
//!   every report recomputes the second pane as the complement, until a
//!   manual resize takes over or the region is destroyed.
//!
//! Whenever sizes change, `on_resize` hooks run depth-first: the region
//! itself, then its primary subtree, then its secondary subtree. The visit
//! order and rects are snapshotted before any hook runs, and hooks get no
//! access to the engine, so the tree cannot change under the traversal.

use panekit_core::geometry::{Rect, Size};
use panekit_core::observer::{ObserverList, Subscription};
use web_time::Instant;

use crate::dock::DockPhase;
use crate::engine::{LayoutEngine, TrackingWatch};
use crate::error::LayoutError;
use crate::host::SurfaceHost;
use crate::region::{Region, RegionId, SizingMode};
use crate::spec::SizeSlot;
use crate::split::{child_rect, clamp_to_limits, slot_extents};

/// Payload handed to `on_resize` hooks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEvent {
    pub region: RegionId,
    pub rect: Rect,
}

impl<H: SurfaceHost> LayoutEngine<H> {
    /// Feed a size observed by the host for `node` into the engine.
    ///
    /// Returns whether the report changed anything. Reports for regions the
    /// engine sizes itself (resolved, non-root, untracked) are ignored, as are
    /// empty sizes for roots and regions still waiting for their first size.
    pub fn notify_size(&mut self, node: RegionId, size: Size) -> Result<bool, LayoutError> {
        let region = self.get(node)?;
        let is_root = region.parent.is_none();
        let limits = region.limits;

        if let Some(split) = self.tracking.get(&node).map(|watch| watch.split) {
            let Some(orientation) = self.get(split)?.orientation() else {
                return Ok(false);
            };
            let observed = orientation.extent(size).max(0.0);
            if let Some(tracked) = self.split_mut(split)
                && let SizingMode::Tracking { observed: slot } = &mut tracked.mode
            {
                *slot = Some(observed);
            }
            tracing::trace!(
                target: "panekit.layout",
                region = split.get(),
                pane = node.get(),
                observed,
                "tracked pane resized"
            );
            self.relayout(split);
            self.propagate(split);
            return Ok(true);
        }

        if !is_root && !self.first_size.contains_key(&node) {
            tracing::trace!(
                target: "panekit.layout",
                region = node.get(),
                "size report ignored; region is sized by its parent"
            );
            return Ok(false);
        }
        if size.is_empty() {
            tracing::trace!(target: "panekit.layout", region = node.get(), "empty size ignored");
            return Ok(false);
        }

        let size = if is_root {
            clamp_to_limits(limits, size)
        } else {
            size
        };
        let region = self.get_mut(node)?;
        region.rect = region.rect.with_size(size);
        self.relayout(node);
        self.propagate(node);
        Ok(true)
    }

    /// Register a hook invoked whenever `region`'s size is propagated.
    ///
    /// Hooks run in registration order; drop or cancel the returned guard to
    /// unsubscribe.
    pub fn on_resize(
        &mut self,
        region: RegionId,
        hook: impl Fn(&ResizeEvent) + 'static,
    ) -> Result<Subscription, LayoutError> {
        self.get(region)?;
        Ok(self
            .hooks
            .entry(region)
            .or_insert_with(ObserverList::new)
            .subscribe(hook))
    }

    /// Run `on_resize` hooks for `from` and its subtree, depth-first.
    ///
    /// Returns the number of regions visited.
    pub fn propagate(&mut self, from: RegionId) -> usize {
        let start = Instant::now();
        let span = tracing::debug_span!(
            "layout.propagate",
            region = from.get(),
            regions_visited = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );
        let _guard = span.enter();

        let visits: Vec<ResizeEvent> = self
            .subtree(from)
            .into_iter()
            .filter_map(|region| {
                self.regions.get(&region).map(|r| ResizeEvent {
                    region,
                    rect: r.rect,
                })
            })
            .collect();

        let mut hooks_run = 0;
        for event in &visits {
            if let Some(hooks) = self.hooks.get_mut(&event.region) {
                hooks_run += hooks.notify(event);
            }
        }

        let duration_us = start.elapsed().as_micros() as u64;
        span.record("regions_visited", visits.len() as u64);
        span.record("duration_us", duration_us);
        tracing::debug!(
            target: "panekit.layout",
            region = from.get(),
            regions_visited = visits.len() as u64,
            hooks_run = hooks_run as u64,
            duration_us,
            "resize propagated"
        );
        visits.len()
    }

    /// Recompute child rects below `id` from the current slots and limits.
    pub(crate) fn relayout(&mut self, id: RegionId) {
        let Some((container, _)) = self.axis_extents(id) else {
            return;
        };
        let unresolved = self
            .regions
            .get(&id)
            .and_then(|region| region.split.as_ref())
            .is_some_and(|split| !split.resolved);
        if container > 0.0 && unresolved {
            self.resolve_first(id, container);
        }
        let Some(extents) = self.computed_extents(id) else {
            return;
        };
        self.place_children(id, extents);
        let children = self.get(id).map(Region::children).unwrap_or_default();
        for child in children {
            self.relayout(child);
        }
    }

    /// `(primary, secondary)` extents for split `id` in its current rect.
    fn computed_extents(&self, id: RegionId) -> Option<(f32, f32)> {
        let region = self.regions.get(&id)?;
        let split = region.split.as_ref()?;
        let container = split.orientation.extent(region.rect.size());
        if container <= 0.0 {
            return Some((0.0, 0.0));
        }
        match split.mode {
            SizingMode::Tracking { observed } => {
                let first = observed.unwrap_or(0.0).clamp(0.0, container);
                Some((first, container - first))
            }
            SizingMode::Slots => {
                let inner = (container - split.handle).max(0.0);
                let (_, second) = slot_extents(split.slots, container, split.handle);
                let second = if split.dock.is_some_and(DockPhase::is_collapsed) {
                    second
                } else {
                    self.secondary_bounds(id, inner).apply(second)
                };
                Some((inner - second, second))
            }
        }
    }

    /// Set the rects of both children of `id`. The secondary always ends at
    /// the container's far edge.
    pub(crate) fn place_children(&mut self, id: RegionId, (first, second): (f32, f32)) {
        let Some(region) = self.regions.get(&id) else {
            return;
        };
        let Some(split) = &region.split else {
            return;
        };
        let rect = region.rect;
        let orientation = split.orientation;
        let container = orientation.extent(rect.size());
        let [a, b] = split.children();
        let second_offset = (container - second).max(0.0);

        if let Some(child) = self.regions.get_mut(&a) {
            child.rect = child_rect(rect, orientation, 0.0, first);
        }
        if let Some(child) = self.regions.get_mut(&b) {
            child.rect = child_rect(rect, orientation, second_offset, second);
        }
    }

    /// First non-zero extent for split `id`: freeze percentages of fixed
    /// splits and drop the one-shot watch.
    fn resolve_first(&mut self, id: RegionId, container: f32) {
        if let Some(split) = self.split_mut(id) {
            split.resolved = true;
            if split.fixed_size {
                for slot in &mut split.slots {
                    if let SizeSlot::Percent(pct) = *slot {
                        *slot = SizeSlot::Pixels(pct * container / 100.0);
                    }
                }
            }
        }
        if let Some(subscription) = self.first_size.remove(&id) {
            self.host.cancel(subscription);
            tracing::debug!(
                target: "panekit.layout",
                region = id.get(),
                extent = container,
                "first size resolved"
            );
        }
    }

    /// Register the one-shot watch for `id` unless one is already pending.
    pub(crate) fn await_first_size(&mut self, id: RegionId) {
        if self.first_size.contains_key(&id) {
            return;
        }
        let subscription = self.host.observe_size(id);
        let _ = self.first_size.insert(id, subscription);
        tracing::debug!(target: "panekit.layout", region = id.get(), "waiting for first size");
    }

    /// Watch `pane`, the first child of `split`, for as long as tracking lasts.
    pub(crate) fn start_tracking(&mut self, split: RegionId, pane: RegionId) {
        let subscription = self.host.observe_size(pane);
        if let Some(previous) = self
            .tracking
            .insert(pane, TrackingWatch { split, subscription })
        {
            self.host.cancel(previous.subscription);
        }
        tracing::debug!(
            target: "panekit.layout",
            region = split.get(),
            pane = pane.get(),
            "auto-tracking started"
        );
    }

    /// Drop auto-tracking on `split`, if active. Manual sizing takes over.
    pub(crate) fn stop_tracking(&mut self, split: RegionId) {
        if let Some(node) = self.split_mut(split)
            && matches!(node.mode, SizingMode::Tracking { .. })
        {
            node.mode = SizingMode::Slots;
        }
        let pane = self
            .tracking
            .iter()
            .find(|(_, watch)| watch.split == split)
            .map(|(pane, _)| *pane);
        if let Some(watch) = pane.and_then(|pane| self.tracking.remove(&pane)) {
            self.host.cancel(watch.subscription);
            tracing::debug!(target: "panekit.layout", region = split.get(), "auto-tracking cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use crate::registry::RootOptions;
    use crate::spec::SplitSpec;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::registry::LookupSpan;

    #[derive(Debug, Clone)]
    struct CapturedSpan {
        name: String,
        fields: HashMap<String, String>,
    }

    #[derive(Clone, Default)]
    struct SpanCapture {
        spans: Arc<Mutex<Vec<CapturedSpan>>>,
    }

    struct FieldVisitor(Vec<(String, String)>);

    impl tracing::field::Visit for FieldVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{value:?}")));
        }
        fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
            self.0.push((field.name().to_string(), value.to_string()));
        }
    }

    impl<S> tracing_subscriber::Layer<S> for SpanCapture
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _id: &tracing::span::Id,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = FieldVisitor(Vec::new());
            attrs.record(&mut visitor);
            self.spans.lock().unwrap().push(CapturedSpan {
                name: attrs.metadata().name().to_string(),
                fields: visitor.0.into_iter().collect(),
            });
        }

        fn on_record(
            &self,
            id: &tracing::span::Id,
            values: &tracing::span::Record<'_>,
            ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let Some(span) = ctx.span(id) else { return };
            let mut visitor = FieldVisitor(Vec::new());
            values.record(&mut visitor);
            let mut spans = self.spans.lock().unwrap();
            if let Some(captured) = spans.iter_mut().rev().find(|s| s.name == span.name()) {
                captured.fields.extend(visitor.0);
            }
        }
    }

    fn with_captured_spans(f: impl FnOnce()) -> Vec<CapturedSpan> {
        let capture = SpanCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        tracing::subscriber::with_default(subscriber, f);
        let spans = capture.spans.lock().unwrap().clone();
        spans
    }

    fn engine_with_root(width: f32, height: f32) -> (LayoutEngine<HeadlessHost<()>>, RegionId) {
        let mut engine = LayoutEngine::new(HeadlessHost::new());
        let root = engine
            .create_root(RootOptions::default().with_size(Size::new(width, height)))
            .unwrap();
        (engine, root)
    }

    #[test]
    fn hooks_run_parent_first_then_children() {
        let (mut engine, root) = engine_with_root(1000.0, 600.0);
        let (left, right) = engine.split(root, &SplitSpec::default()).unwrap();
        let halves = [SizeSlot::Percent(50.0), SizeSlot::Percent(50.0)];
        let (top, bottom) = engine.split(right, &SplitSpec::vertical(halves)).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut guards = Vec::new();
        for region in [bottom, top, right, left, root] {
            let seen = Rc::clone(&seen);
            guards.push(
                engine
                    .on_resize(region, move |event| seen.borrow_mut().push(event.region))
                    .unwrap(),
            );
        }

        assert_eq!(engine.propagate(root), 5);
        assert_eq!(*seen.borrow(), vec![root, left, right, top, bottom]);
    }

    #[test]
    fn dropped_hook_is_not_called() {
        let (mut engine, root) = engine_with_root(400.0, 400.0);
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let guard = engine
            .on_resize(root, move |_| *counter.borrow_mut() += 1)
            .unwrap();

        engine.notify_size(root, Size::new(500.0, 400.0)).unwrap();
        guard.cancel();
        engine.notify_size(root, Size::new(600.0, 400.0)).unwrap();
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn propagation_records_span_fields() {
        let (mut engine, root) = engine_with_root(800.0, 600.0);
        engine.split(root, &SplitSpec::default()).unwrap();

        let spans = with_captured_spans(|| {
            engine.propagate(root);
        });
        let span = spans
            .iter()
            .find(|s| s.name == "layout.propagate")
            .expect("layout.propagate span");
        assert_eq!(span.fields.get("region").map(String::as_str), Some("1"));
        assert_eq!(span.fields.get("regions_visited").map(String::as_str), Some("3"));
        assert!(span.fields.contains_key("duration_us"));
    }

    #[test]
    fn child_reports_are_ignored_once_resolved() {
        let (mut engine, root) = engine_with_root(800.0, 600.0);
        let (left, _) = engine.split(root, &SplitSpec::default()).unwrap();
        let before = engine.region(left).unwrap().rect();

        assert!(!engine.notify_size(left, Size::new(10.0, 10.0)).unwrap());
        assert_eq!(engine.region(left).unwrap().rect(), before);
    }

    #[test]
    fn root_reports_respect_root_limits() {
        let mut engine = LayoutEngine::new(HeadlessHost::<()>::new());
        let root = engine
            .create_root(
                RootOptions::default()
                    .with_size(Size::new(300.0, 300.0))
                    .with_limits(crate::region::Limits {
                        max_width: 500.0,
                        ..Default::default()
                    }),
            )
            .unwrap();
        engine.notify_size(root, Size::new(900.0, 300.0)).unwrap();
        assert_eq!(engine.region(root).unwrap().size(), Size::new(500.0, 300.0));
    }

    #[test]
    fn unknown_region_is_an_error() {
        let (mut engine, _) = engine_with_root(100.0, 100.0);
        let ghost = RegionId::new(99).unwrap();
        assert_eq!(
            engine.notify_size(ghost, Size::new(1.0, 1.0)),
            Err(LayoutError::UnknownRegion { region: ghost })
        );
    }
}
