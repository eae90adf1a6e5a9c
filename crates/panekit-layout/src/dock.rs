#![forbid(unsafe_code)]

//! Collapsing and restoring the secondary pane of a minimizable split.
//!
//! ```text
//!  Expanded --extend()--> Extending --settle--> Extended
//!     ^                                            |
//!     +----settle---- Reducing <----reduce()-------+
//! ```
//!
//! Sizes change as soon as `extend()`/`reduce()` is called; the settle
//! continuation only finishes the transition and propagates the resize. It
//! runs when the host advances the engine clock past the configured delay.
//! Calls made in the wrong phase, or before the split has a size, are
//! no-ops, never errors.

use std::time::Duration;

use crate::engine::LayoutEngine;
use crate::error::LayoutError;
use crate::host::SurfaceHost;
use crate::region::RegionId;

/// Phase of the collapse/restore state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DockPhase {
    Expanded,
    Extending,
    Extended,
    Reducing,
}

impl DockPhase {
    /// True while the secondary pane is collapsed or collapsing.
    #[must_use]
    pub fn is_collapsed(self) -> bool {
        matches!(self, Self::Extending | Self::Extended)
    }

    /// Phase reached once any pending transition has finished.
    #[must_use]
    pub fn settled(self) -> Self {
        match self {
            Self::Extending => Self::Extended,
            Self::Reducing => Self::Expanded,
            other => other,
        }
    }
}

/// Work scheduled on the engine clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Continuation {
    /// Finish a dock transition of `region` started from `from`.
    Settle { region: RegionId, from: DockPhase },
}

impl<H: SurfaceHost> LayoutEngine<H> {
    /// Collapse the secondary pane of `id` to zero, remembering its extent.
    ///
    /// Returns `false` if the split is not `Expanded` or has no extent yet.
    pub fn extend(&mut self, id: RegionId) -> Result<bool, LayoutError> {
        let phase = self.dock_phase_of(id, "extend")?;
        if phase != DockPhase::Expanded {
            tracing::trace!(target: "panekit.dock", region = id.get(), ?phase, "extend ignored");
            return Ok(false);
        }
        if !self.has_extent(id) {
            tracing::trace!(target: "panekit.dock", region = id.get(), "extend ignored before first size");
            return Ok(false);
        }
        let second = self.get(id)?.children()[1];
        let offset = self.extent_of(id, second);

        self.stop_tracking(id);
        self.get_mut(id)?.offset = offset;
        self.set_dock_phase(id, DockPhase::Extending);
        self.commit_secondary(id, 0.0);
        self.schedule_settle(id, DockPhase::Extending);
        tracing::debug!(target: "panekit.dock", region = id.get(), offset, "extending");
        Ok(true)
    }

    /// Restore the secondary pane of `id` to the extent recorded by `extend`.
    ///
    /// Returns `false` if the split is not `Extended` or has no extent.
    pub fn reduce(&mut self, id: RegionId) -> Result<bool, LayoutError> {
        let phase = self.dock_phase_of(id, "reduce")?;
        if phase != DockPhase::Extended {
            tracing::trace!(target: "panekit.dock", region = id.get(), ?phase, "reduce ignored");
            return Ok(false);
        }
        let Some((container, inner)) = self.axis_extents(id) else {
            return Ok(false);
        };
        if container <= 0.0 {
            tracing::trace!(target: "panekit.dock", region = id.get(), "reduce ignored without extent");
            return Ok(false);
        }
        // Limits may have changed while collapsed.
        let offset = self.secondary_bounds(id, inner).apply(self.get(id)?.offset);

        self.set_dock_phase(id, DockPhase::Reducing);
        self.commit_secondary(id, offset);
        self.schedule_settle(id, DockPhase::Reducing);
        tracing::debug!(target: "panekit.dock", region = id.get(), offset, "reducing");
        Ok(true)
    }

    /// `extend` when expanded, `reduce` when extended, no-op otherwise.
    pub fn toggle_dock(&mut self, id: RegionId) -> Result<bool, LayoutError> {
        match self.dock_phase_of(id, "toggle_dock")? {
            DockPhase::Expanded => self.extend(id),
            DockPhase::Extended => self.reduce(id),
            DockPhase::Extending | DockPhase::Reducing => Ok(false),
        }
    }

    /// Advance the engine clock and run every continuation now due.
    ///
    /// Returns the number of continuations that ran; those whose region is
    /// gone or has moved on are dropped.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let mut ran = 0;
        for continuation in self.timeline.advance(dt) {
            if self.run_continuation(continuation) {
                ran += 1;
            }
        }
        ran
    }

    fn run_continuation(&mut self, continuation: Continuation) -> bool {
        match continuation {
            Continuation::Settle { region, from } => {
                let current = self
                    .regions
                    .get(&region)
                    .and_then(|r| r.split.as_ref())
                    .and_then(|split| split.dock);
                if current != Some(from) {
                    tracing::trace!(
                        target: "panekit.dock",
                        region = region.get(),
                        ?from,
                        "stale settle dropped"
                    );
                    return false;
                }
                let settled = from.settled();
                self.set_dock_phase(region, settled);
                tracing::debug!(target: "panekit.dock", region = region.get(), phase = ?settled, "dock settled");
                self.propagate(region);
                true
            }
        }
    }

    fn dock_phase_of(
        &self,
        id: RegionId,
        operation: &'static str,
    ) -> Result<DockPhase, LayoutError> {
        self.split_of(id, operation)?
            .dock
            .ok_or(LayoutError::NotSplittable {
                region: id,
                operation,
            })
    }

    /// True once split `id` has a non-zero extent along its axis.
    fn has_extent(&self, id: RegionId) -> bool {
        self.axis_extents(id)
            .is_some_and(|(container, _)| container > 0.0)
    }

    fn set_dock_phase(&mut self, id: RegionId, phase: DockPhase) {
        if let Some(split) = self.split_mut(id) {
            split.dock = Some(phase);
        }
    }

    fn schedule_settle(&mut self, region: RegionId, from: DockPhase) {
        let delay = self.config.settle_delay();
        let _ = self
            .timeline
            .schedule(delay, Continuation::Settle { region, from });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use crate::registry::RootOptions;
    use crate::spec::{SizeSlot, SplitSpec};
    use panekit_core::geometry::Size;

    const SETTLE: Duration = Duration::from_millis(100);

    fn docked() -> (LayoutEngine<HeadlessHost<()>>, RegionId, RegionId) {
        let mut engine = LayoutEngine::new(HeadlessHost::new());
        let root = engine
            .create_root(RootOptions::default().with_size(Size::new(1000.0, 1000.0)))
            .unwrap();
        let spec = SplitSpec::vertical([SizeSlot::Percent(70.0), SizeSlot::Percent(30.0)])
            .minimizable(true);
        let (_, bottom) = engine.split(root, &spec).unwrap();
        (engine, root, bottom)
    }

    #[test]
    fn settle_completes_transitions() {
        let (mut engine, root, _) = docked();
        assert!(engine.extend(root).unwrap());
        assert_eq!(engine.region(root).unwrap().dock_phase(), Some(DockPhase::Extending));

        assert_eq!(engine.advance(SETTLE / 2), 0);
        assert_eq!(engine.advance(SETTLE / 2), 1);
        assert_eq!(engine.region(root).unwrap().dock_phase(), Some(DockPhase::Extended));

        assert!(engine.reduce(root).unwrap());
        assert_eq!(engine.region(root).unwrap().dock_phase(), Some(DockPhase::Reducing));
        assert_eq!(engine.advance(SETTLE), 1);
        assert_eq!(engine.region(root).unwrap().dock_phase(), Some(DockPhase::Expanded));
    }

    #[test]
    fn wrong_phase_calls_are_no_ops() {
        let (mut engine, root, bottom) = docked();
        assert!(!engine.reduce(root).unwrap());
        assert!(engine.extend(root).unwrap());
        assert!(!engine.extend(root).unwrap());
        assert!(!engine.reduce(root).unwrap());
        assert_eq!(engine.pending_continuations(), 1);
        assert_eq!(engine.region(bottom).unwrap().size().height, 0.0);
    }

    #[test]
    fn toggle_alternates() {
        let (mut engine, root, bottom) = docked();
        assert!(engine.toggle_dock(root).unwrap());
        assert!(!engine.toggle_dock(root).unwrap());
        engine.advance(SETTLE);
        assert!(engine.toggle_dock(root).unwrap());
        engine.advance(SETTLE);
        assert_eq!(engine.region(bottom).unwrap().size().height, 300.0);
    }

    #[test]
    fn non_minimizable_split_has_no_dock() {
        let mut engine = LayoutEngine::new(HeadlessHost::<()>::new());
        let root = engine
            .create_root(RootOptions::default().with_size(Size::new(500.0, 500.0)))
            .unwrap();
        let (leaf, _) = engine.split(root, &SplitSpec::default()).unwrap();

        assert_eq!(
            engine.extend(root),
            Err(LayoutError::NotSplittable {
                region: root,
                operation: "extend"
            })
        );
        assert!(matches!(
            engine.reduce(leaf),
            Err(LayoutError::NotSplittable { operation: "reduce", .. })
        ));
    }

    #[test]
    fn settle_for_cleared_root_is_dropped() {
        let (mut engine, root, _) = docked();
        engine.extend(root).unwrap();
        engine.clear(root).unwrap();
        assert_eq!(engine.advance(SETTLE), 0);
    }

    #[test]
    fn dock_moves_wait_for_a_size() {
        let mut engine = LayoutEngine::new(HeadlessHost::<()>::new());
        let root = engine.create_root(RootOptions::default()).unwrap();
        let spec = SplitSpec::vertical([SizeSlot::Percent(70.0), SizeSlot::Percent(30.0)])
            .minimizable(true);
        engine.split(root, &spec).unwrap();

        assert!(!engine.extend(root).unwrap());
        assert!(!engine.toggle_dock(root).unwrap());
        assert_eq!(engine.pending_continuations(), 0);
        assert_eq!(
            engine.region(root).unwrap().slots(),
            Some([SizeSlot::Percent(70.0), SizeSlot::Percent(30.0)])
        );
    }

    #[test]
    fn extended_split_stays_collapsed_on_container_resize() {
        let (mut engine, root, bottom) = docked();
        engine.extend(root).unwrap();
        engine.advance(SETTLE);
        engine.notify_size(root, Size::new(1000.0, 1400.0)).unwrap();
        assert_eq!(engine.region(bottom).unwrap().size().height, 0.0);

        engine.reduce(root).unwrap();
        assert_eq!(engine.region(bottom).unwrap().size().height, 300.0);
    }
}
