#![forbid(unsafe_code)]

//! Splitting regions and sizing their children by hand.
//!
//! # Slot resolution
//!
//! Let `A` be the container extent on the split axis, `h` the handle
//! thickness and `inner = max(A - h, 0)`:
//!
//! | slots                 | primary              | secondary            |
//! |-----------------------|----------------------|----------------------|
//! | `[explicit, Auto]`    | `px(s0) - h/2`       | `inner - primary`    |
//! | `[Auto, explicit]`    | `inner - secondary`  | `px(s1) - h/2`       |
//! | `[explicit, explicit]`| `inner - secondary`  | `px(s1)`             |
//! | `[Auto, Auto]`        | observed content     | `A - primary`        |
//!
//! The secondary extent is then clamped so that neither child leaves its
//! [`Limits`](crate::region::Limits); the primary always takes the rest.
//! `[Auto, Auto]` pairs have no handle gap while tracking. The drag that ends
//! tracking takes the handle out of the secondary, so the primary still
//! moves by exactly the drag delta.
//!
//! # Invariants
//!
//! 1. `primary + h + secondary == A` for every resolved slot-driven split.
//! 2. Drags and `set_size` never move a child outside satisfiable limits.
//! 3. A split region keeps exactly two children for its whole life.

use panekit_core::geometry::{Point, Rect, Size};

use crate::dock::DockPhase;
use crate::engine::LayoutEngine;
use crate::error::LayoutError;
use crate::host::SurfaceHost;
use crate::region::{Limits, Region, RegionId, SizingMode, SplitNode};
use crate::spec::{Orientation, SizeSlot, SplitSpec};

/// Pointer state between pointer-down and pointer-up on a split handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub region: RegionId,
    pub last_pointer: Point,
    pub active: bool,
}

/// `(primary, secondary)` extents from the size slots alone.
pub(crate) fn slot_extents(slots: [SizeSlot; 2], container: f32, handle: f32) -> (f32, f32) {
    let inner = (container - handle).max(0.0);
    let half = handle / 2.0;
    match (slots[0].resolve(container), slots[1].resolve(container)) {
        (Some(first), None) => {
            let first = (first - half).clamp(0.0, inner);
            (first, inner - first)
        }
        (None, Some(second)) => {
            let second = (second - half).clamp(0.0, inner);
            (inner - second, second)
        }
        (Some(_), Some(second)) => {
            let second = second.clamp(0.0, inner);
            (inner - second, second)
        }
        // Only reachable once tracking has been dropped without a rewrite.
        (None, None) => {
            let second = inner / 2.0;
            (inner - second, second)
        }
    }
}

/// Allowed range for the secondary extent of one split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SecondaryBounds {
    pub(crate) lo: f32,
    pub(crate) hi: f32,
}

impl SecondaryBounds {
    /// Each child's limits, mirrored onto the sibling.
    pub(crate) fn new(primary: (f32, f32), secondary: (f32, f32), inner: f32) -> Self {
        let (primary_min, primary_max) = primary;
        let (secondary_min, secondary_max) = secondary;
        Self {
            lo: secondary_min.max(inner - primary_max).max(0.0),
            hi: secondary_max.min(inner - primary_min).min(inner).max(0.0),
        }
    }

    pub(crate) fn is_satisfiable(self) -> bool {
        self.lo <= self.hi
    }

    /// Clamp `extent`; the upper bound wins when the limits conflict.
    pub(crate) fn apply(self, extent: f32) -> f32 {
        extent.max(self.lo).min(self.hi)
    }
}

/// Rect of a child placed `offset` units into `parent` along the split axis.
pub(crate) fn child_rect(parent: Rect, orientation: Orientation, offset: f32, extent: f32) -> Rect {
    match orientation {
        Orientation::Horizontal => Rect::new(parent.x + offset, parent.y, extent, parent.height),
        Orientation::Vertical => Rect::new(parent.x, parent.y + offset, parent.width, extent),
    }
}

impl<H: SurfaceHost> LayoutEngine<H> {
    /// Split `id` into two child regions.
    ///
    /// On a leaf, any attached content moves to the new primary child. On a
    /// region that is already split, the existing split moves into a new
    /// container that becomes the primary child, so nothing below it is
    /// lost. When the region has no extent yet, sizing waits for the first
    /// non-zero size reported for it.
    pub fn split(
        &mut self,
        id: RegionId,
        spec: &SplitSpec,
    ) -> Result<(RegionId, RegionId), LayoutError> {
        spec.validate()?;
        let region = self.get(id)?;
        let rect = region.rect;
        let resplit = region.split.is_some();
        let had_content = region.has_content;

        let primary = if resplit {
            self.move_split_state(id)?
        } else {
            let primary = self.alloc_id();
            let mut leaf = Region::leaf(primary, Some(id), Rect::new(rect.x, rect.y, 0.0, 0.0));
            if had_content {
                self.host.transfer_content(id, primary);
                leaf.has_content = true;
            }
            let _ = self.regions.insert(primary, leaf);
            primary
        };
        let secondary = self.alloc_id();
        let _ = self.regions.insert(
            secondary,
            Region::leaf(secondary, Some(id), Rect::new(rect.x, rect.y, 0.0, 0.0)),
        );

        let auto_pair = spec.is_auto_pair();
        let node = SplitNode {
            orientation: spec.orientation,
            slots: spec.sizes,
            first: primary,
            second: secondary,
            resizeable: spec.resize,
            minimizable: spec.minimizable,
            fixed_size: spec.is_fixed_size(),
            handle: if spec.resize {
                self.config.handle_thickness
            } else {
                0.0
            },
            mode: if auto_pair {
                SizingMode::Tracking { observed: None }
            } else {
                SizingMode::Slots
            },
            resolved: false,
            dock: spec.minimizable.then_some(DockPhase::Expanded),
        };
        let region = self.get_mut(id)?;
        region.split = Some(node);
        region.has_content = false;
        region.offset = 0.0;

        if auto_pair {
            self.start_tracking(id, primary);
        }
        let deferred = spec.orientation.extent(rect.size()) <= 0.0;
        if deferred {
            self.await_first_size(id);
        }

        tracing::debug!(
            target: "panekit.layout",
            region = id.get(),
            primary = primary.get(),
            secondary = secondary.get(),
            orientation = spec.orientation.as_str(),
            resplit,
            deferred,
            "split applied"
        );

        self.relayout(id);
        Ok((primary, secondary))
    }

    /// Move the divider of `id` by `delta` units along the split axis.
    ///
    /// Positive deltas grow the primary child. Returns `false` when the move
    /// was ignored (unsized container, dock not expanded, non-finite delta).
    pub fn resize_drag(&mut self, id: RegionId, delta: f32) -> Result<bool, LayoutError> {
        let split = self.split_of(id, "resize_drag")?;
        if !split.resizeable {
            return Err(LayoutError::NotSplittable {
                region: id,
                operation: "resize_drag",
            });
        }
        if !delta.is_finite() || split.dock.is_some_and(|phase| phase != DockPhase::Expanded) {
            tracing::trace!(target: "panekit.layout", region = id.get(), delta, "drag ignored");
            return Ok(false);
        }
        let second = split.second;
        // A tracked pair has no handle gap; the handle comes out of the
        // secondary so the primary moves by exactly `delta`.
        let gap = match split.mode {
            SizingMode::Tracking { .. } => split.handle,
            SizingMode::Slots => 0.0,
        };
        let Some((container, inner)) = self.axis_extents(id) else {
            return Ok(false);
        };
        if container <= 0.0 {
            return Ok(false);
        }

        let current = self.extent_of(id, second) - gap;
        let bounds = self.secondary_bounds(id, inner);
        let next = bounds.apply(current - delta);
        tracing::trace!(
            target: "panekit.layout",
            region = id.get(),
            delta,
            from = current,
            to = next,
            "drag step"
        );

        self.stop_tracking(id);
        self.commit_secondary(id, next);
        self.propagate(id);
        Ok(true)
    }

    /// Start a drag session on the handle of `id`.
    pub fn begin_drag(&mut self, id: RegionId, pointer: Point) -> Result<(), LayoutError> {
        let split = self.split_of(id, "begin_drag")?;
        if !split.resizeable {
            return Err(LayoutError::NotSplittable {
                region: id,
                operation: "begin_drag",
            });
        }
        let _ = self.drags.insert(
            id,
            DragSession {
                region: id,
                last_pointer: pointer,
                active: true,
            },
        );
        tracing::debug!(
            target: "panekit.layout",
            region = id.get(),
            x = pointer.x,
            y = pointer.y,
            "drag started"
        );
        Ok(())
    }

    /// Feed a pointer move into the active drag session of `id`.
    ///
    /// Moves outside the container are remembered but not applied. Returns
    /// whether the divider moved.
    pub fn drag_to(&mut self, id: RegionId, pointer: Point) -> Result<bool, LayoutError> {
        let region = self.get(id)?;
        let rect = region.rect;
        let Some(orientation) = region.orientation() else {
            return Err(LayoutError::NotSplittable {
                region: id,
                operation: "drag_to",
            });
        };
        let Some(session) = self.drags.get_mut(&id) else {
            tracing::trace!(target: "panekit.layout", region = id.get(), "move without drag session");
            return Ok(false);
        };
        let last = std::mem::replace(&mut session.last_pointer, pointer);

        if !rect.contains(pointer) {
            tracing::trace!(
                target: "panekit.layout",
                region = id.get(),
                x = pointer.x,
                y = pointer.y,
                "pointer outside container"
            );
            return Ok(false);
        }
        let delta = orientation.coordinate(pointer) - orientation.coordinate(last);
        if delta == 0.0 {
            return Ok(false);
        }
        self.resize_drag(id, delta)
    }

    /// End the drag session of `id`, returning it if one was active.
    pub fn end_drag(&mut self, id: RegionId) -> Option<DragSession> {
        let mut session = self.drags.remove(&id)?;
        session.active = false;
        tracing::debug!(target: "panekit.layout", region = id.get(), "drag ended");
        Some(session)
    }

    #[must_use]
    pub fn drag_session(&self, id: RegionId) -> Option<&DragSession> {
        self.drags.get(&id)
    }

    /// Set the size of a region as `[primary, cross]`; `None` keeps the
    /// current value.
    ///
    /// For a root, primary is the width and cross the height. For a child,
    /// primary runs along the parent's split axis and moves the divider;
    /// the cross extent always follows the parent.
    pub fn set_size(&mut self, id: RegionId, sizes: [Option<f32>; 2]) -> Result<(), LayoutError> {
        for (index, value) in sizes.iter().enumerate() {
            if let Some(value) = value {
                SizeSlot::Pixels(*value).check(index)?;
            }
        }
        let region = self.get(id)?;
        let Some(parent) = region.parent else {
            let rect = region.rect;
            let size = clamp_to_limits(
                region.limits,
                Size::new(
                    sizes[0].unwrap_or(rect.width),
                    sizes[1].unwrap_or(rect.height),
                ),
            );
            self.get_mut(id)?.rect = rect.with_size(size);
            self.relayout(id);
            self.propagate(id);
            return Ok(());
        };

        let Some(value) = sizes[0] else {
            return Ok(());
        };
        let split = self.split_of(parent, "set_size")?;
        if split.dock.is_some_and(|phase| phase != DockPhase::Expanded) {
            tracing::trace!(target: "panekit.layout", region = id.get(), "set_size ignored while docked");
            return Ok(());
        }
        let is_secondary = split.second == id;
        let Some((container, inner)) = self.axis_extents(parent) else {
            return Ok(());
        };
        if container <= 0.0 {
            return Ok(());
        }
        let target = if is_secondary { value } else { inner - value };
        let next = self.secondary_bounds(parent, inner).apply(target);

        self.stop_tracking(parent);
        self.commit_secondary(parent, next);
        self.propagate(parent);
        Ok(())
    }

    /// Replace the resize limits of `id` and re-apply them.
    pub fn set_limits(&mut self, id: RegionId, limits: Limits) -> Result<(), LayoutError> {
        let region = self.get_mut(id)?;
        region.limits = limits;
        let anchor = match region.parent {
            Some(parent) => parent,
            None => {
                region.rect = region.rect.with_size(clamp_to_limits(limits, region.rect.size()));
                id
            }
        };
        self.relayout(anchor);
        self.propagate(anchor);
        Ok(())
    }

    /// Remove the drag handle of `id`; docking is disabled with it.
    ///
    /// A collapsed secondary is restored to its recorded extent first.
    pub fn disable_resize(&mut self, id: RegionId) -> Result<(), LayoutError> {
        let collapsed = self
            .split_of(id, "disable_resize")?
            .dock
            .is_some_and(DockPhase::is_collapsed);
        if collapsed && let Some((_, inner)) = self.axis_extents(id) {
            let offset = self.get(id)?.offset;
            let restored = self.secondary_bounds(id, inner).apply(offset);
            tracing::debug!(target: "panekit.dock", region = id.get(), restored, "collapsed pane restored");
            self.commit_secondary(id, restored);
        }
        if let Some(split) = self.split_mut(id) {
            split.resizeable = false;
            split.minimizable = false;
            split.handle = 0.0;
            split.dock = None;
        }
        let _ = self.drags.remove(&id);
        tracing::debug!(target: "panekit.layout", region = id.get(), "resize disabled");
        self.relayout(id);
        self.propagate(id);
        Ok(())
    }

    /// Attach content to `id`. On a split the content goes to the secondary
    /// child, recursively. Returns the leaf that received it.
    pub fn attach(&mut self, id: RegionId, content: H::Content) -> Result<RegionId, LayoutError> {
        let mut target = id;
        while let Some(split) = &self.get(target)?.split {
            target = split.second;
        }
        self.host.attach_content(target, content);
        self.get_mut(target)?.has_content = true;
        tracing::debug!(
            target: "panekit.layout",
            region = id.get(),
            leaf = target.get(),
            "content attached"
        );
        Ok(target)
    }

    /// Destroy a root and everything below it.
    ///
    /// Host subscriptions are cancelled, hooks and drag sessions dropped and
    /// content detached. Returns the number of regions removed.
    pub fn clear(&mut self, id: RegionId) -> Result<usize, LayoutError> {
        if self.get(id)?.parent.is_some() {
            return Err(LayoutError::NotSplittable {
                region: id,
                operation: "clear",
            });
        }
        let doomed = self.subtree(id);
        for region in &doomed {
            if let Some(subscription) = self.first_size.remove(region) {
                self.host.cancel(subscription);
            }
            if let Some(watch) = self.tracking.remove(region) {
                self.host.cancel(watch.subscription);
            }
            let _ = self.hooks.remove(region);
            let _ = self.drags.remove(region);
            if self.regions.remove(region).is_some_and(|r| r.has_content) {
                let _ = self.host.detach_content(*region);
            }
        }
        let _ = self.roots.remove(id);
        tracing::debug!(
            target: "panekit.layout",
            region = id.get(),
            removed = doomed.len(),
            "root cleared"
        );
        Ok(doomed.len())
    }

    /// Move the split state of `id` into a fresh container region and return
    /// the container.
    fn move_split_state(&mut self, id: RegionId) -> Result<RegionId, LayoutError> {
        let container = self.alloc_id();
        let region = self.get_mut(id)?;
        let rect = region.rect;
        let offset = std::mem::take(&mut region.offset);
        let mut moved = region.split.take();

        if let Some(split) = moved.as_mut() {
            split.dock = split.dock.map(DockPhase::settled);
            for child in split.children() {
                if let Some(child) = self.regions.get_mut(&child) {
                    child.parent = Some(container);
                }
            }
        }
        for watch in self.tracking.values_mut() {
            if watch.split == id {
                watch.split = container;
            }
        }
        let _ = self.drags.remove(&id);

        let mut region = Region::leaf(container, Some(id), rect);
        region.split = moved;
        region.offset = offset;
        let _ = self.regions.insert(container, region);
        tracing::debug!(
            target: "panekit.layout",
            region = id.get(),
            container = container.get(),
            "split state moved"
        );
        Ok(container)
    }

    /// `(container, inner)` extents of split `id` along its axis.
    pub(crate) fn axis_extents(&self, id: RegionId) -> Option<(f32, f32)> {
        let region = self.regions.get(&id)?;
        let split = region.split.as_ref()?;
        let container = split.orientation.extent(region.rect.size());
        Some((container, (container - split.handle).max(0.0)))
    }

    /// Extent of `child` along the split axis of `parent`.
    pub(crate) fn extent_of(&self, parent: RegionId, child: RegionId) -> f32 {
        let Some(orientation) = self.regions.get(&parent).and_then(Region::orientation) else {
            return 0.0;
        };
        self.regions
            .get(&child)
            .map_or(0.0, |region| orientation.extent(region.rect.size()))
    }

    pub(crate) fn secondary_bounds(&self, id: RegionId, inner: f32) -> SecondaryBounds {
        let Some(split) = self.regions.get(&id).and_then(|region| region.split.as_ref()) else {
            return SecondaryBounds::new((0.0, f32::INFINITY), (0.0, f32::INFINITY), inner);
        };
        let limits_of = |child: RegionId| {
            self.regions
                .get(&child)
                .map_or_else(Limits::default, |region| region.limits)
                .along(split.orientation)
        };
        let bounds = SecondaryBounds::new(limits_of(split.first), limits_of(split.second), inner);
        if !bounds.is_satisfiable() {
            tracing::warn!(
                target: "panekit.layout",
                region = id.get(),
                lo = bounds.lo,
                hi = bounds.hi,
                "split is overconstrained; honouring the upper bound"
            );
        }
        bounds
    }

    /// Pin the secondary child of `id` to `second`, rewrite the slots to
    /// match and lay out both subtrees. No-op while `id` has no extent.
    pub(crate) fn commit_secondary(&mut self, id: RegionId, second: f32) {
        let Some((container, inner)) = self.axis_extents(id) else {
            return;
        };
        // Nothing to measure against yet; keep the declared slots.
        if container <= 0.0 {
            return;
        }
        let second = second.clamp(0.0, inner);
        if let Some(split) = self.split_mut(id) {
            split.slots = if split.fixed_size {
                [SizeSlot::Pixels(inner - second), SizeSlot::Pixels(second)]
            } else {
                let pct = second * 100.0 / container;
                [SizeSlot::Percent(100.0 - pct), SizeSlot::Percent(pct)]
            };
        }
        self.place_children(id, (inner - second, second));
        let children = self.get(id).map(Region::children).unwrap_or_default();
        for child in children {
            self.relayout(child);
        }
    }
}

/// Clamp `size` into `limits`, the maximum winning over the minimum.
pub(crate) fn clamp_to_limits(limits: Limits, size: Size) -> Size {
    Size::new(
        size.width.max(limits.min_width).min(limits.max_width),
        size.height.max(limits.min_height).min(limits.max_height),
    )
}
