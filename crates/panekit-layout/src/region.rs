#![forbid(unsafe_code)]

//! Region records stored in the engine's arena.
//!
//! A region is either a leaf (it holds content) or a split container that
//! owns exactly two child regions. Parent links are plain ids used for
//! lookups; ownership flows strictly from the arena.

use std::fmt;

use panekit_core::geometry::{Rect, Size};

use crate::dock::DockPhase;
use crate::spec::{Orientation, SizeSlot};

/// Stable identifier for regions.
///
/// `0` is reserved so ids are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(u64);

impl RegionId {
    /// Lowest valid region id.
    pub const MIN: Self = Self(1);

    /// Wrap a raw id, rejecting 0.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resize bounds for one region. Defaults to `[0, +inf]` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub min_width: f32,
    pub min_height: f32,
    pub max_width: f32,
    pub max_height: f32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_width: 0.0,
            min_height: 0.0,
            max_width: f32::INFINITY,
            max_height: f32::INFINITY,
        }
    }
}

impl Limits {
    /// `(min, max)` along the split axis of `orientation`.
    #[must_use]
    pub fn along(&self, orientation: Orientation) -> (f32, f32) {
        match orientation {
            Orientation::Horizontal => (self.min_width, self.max_width),
            Orientation::Vertical => (self.min_height, self.max_height),
        }
    }
}

/// What a region is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Leaf,
    HorizontalSplit,
    VerticalSplit,
}

/// How the children of a split get their extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SizingMode {
    /// Computed from the size slots.
    Slots,
    /// `[Auto, Auto]`: the first child's observed extent drives the second.
    Tracking { observed: Option<f32> },
}

/// Split container state.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SplitNode {
    pub(crate) orientation: Orientation,
    pub(crate) slots: [SizeSlot; 2],
    pub(crate) first: RegionId,
    pub(crate) second: RegionId,
    pub(crate) resizeable: bool,
    pub(crate) minimizable: bool,
    pub(crate) fixed_size: bool,
    pub(crate) handle: f32,
    pub(crate) mode: SizingMode,
    /// Set once the split has been laid out against a non-zero container.
    pub(crate) resolved: bool,
    pub(crate) dock: Option<DockPhase>,
}

impl SplitNode {
    pub(crate) fn children(&self) -> [RegionId; 2] {
        [self.first, self.second]
    }
}

/// A rectangular allocation of surface space.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub(crate) id: RegionId,
    pub(crate) parent: Option<RegionId>,
    pub(crate) rect: Rect,
    pub(crate) limits: Limits,
    pub(crate) split: Option<SplitNode>,
    pub(crate) offset: f32,
    pub(crate) has_content: bool,
}

impl Region {
    pub(crate) fn leaf(id: RegionId, parent: Option<RegionId>, rect: Rect) -> Self {
        Self {
            id,
            parent,
            rect,
            limits: Limits::default(),
            split: None,
            offset: 0.0,
            has_content: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Enclosing split container, if any.
    #[must_use]
    pub fn parent(&self) -> Option<RegionId> {
        self.parent
    }

    /// Resolved bounds on the surface.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Resolved width and height.
    #[must_use]
    pub fn size(&self) -> Size {
        self.rect.size()
    }

    #[must_use]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    #[must_use]
    pub fn kind(&self) -> RegionKind {
        match &self.split {
            None => RegionKind::Leaf,
            Some(split) => match split.orientation {
                Orientation::Horizontal => RegionKind::HorizontalSplit,
                Orientation::Vertical => RegionKind::VerticalSplit,
            },
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.split.is_none()
    }

    /// `[primary, secondary]` for splits, empty for leaves.
    #[must_use]
    pub fn children(&self) -> Vec<RegionId> {
        self.split
            .as_ref()
            .map(|split| split.children().to_vec())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn orientation(&self) -> Option<Orientation> {
        self.split.as_ref().map(|split| split.orientation)
    }

    /// Current size slots of a split (rewritten by drags and dock moves).
    #[must_use]
    pub fn slots(&self) -> Option<[SizeSlot; 2]> {
        self.split.as_ref().map(|split| split.slots)
    }

    /// Whether a drag handle sits between the children.
    #[must_use]
    pub fn resizeable(&self) -> bool {
        self.split.as_ref().is_some_and(|split| split.resizeable)
    }

    #[must_use]
    pub fn minimizable(&self) -> bool {
        self.split.as_ref().is_some_and(|split| split.minimizable)
    }

    #[must_use]
    pub fn fixed_size(&self) -> bool {
        self.split.as_ref().is_some_and(|split| split.fixed_size)
    }

    /// Handle thickness between the children; 0 for leaves and fixed splits.
    #[must_use]
    pub fn handle_thickness(&self) -> f32 {
        self.split.as_ref().map_or(0.0, |split| split.handle)
    }

    /// True while the first child's intrinsic extent drives the second.
    #[must_use]
    pub fn is_auto_tracking(&self) -> bool {
        self.split
            .as_ref()
            .is_some_and(|split| matches!(split.mode, SizingMode::Tracking { .. }))
    }

    /// Secondary extent recorded by the last `extend()`.
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Dock state, present only on minimizable splits.
    #[must_use]
    pub fn dock_phase(&self) -> Option<DockPhase> {
        self.split.as_ref().and_then(|split| split.dock)
    }

    /// Whether content has been attached to this leaf.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.has_content
    }
}
