#![forbid(unsafe_code)]

//! The region arena and everything the layout operations share.
//!
//! # Design
//!
//! Regions live in a `BTreeMap` keyed by [`RegionId`]. Children are owned
//! through the arena; `parent` links are plain ids, so moving a subtree is a
//! matter of rewriting ids, never of juggling references.
//!
//! Operations are split across modules by concern:
//! [`split`](crate::split) (splitting and manual sizing),
//! [`resize`](crate::resize) (host notifications and propagation),
//! [`dock`](crate::dock) (collapse/restore) and [`dsl`](crate::dsl)
//! (declarative trees).

use std::collections::BTreeMap;
use std::time::Duration;

use panekit_core::clock::Timeline;
use panekit_core::geometry::Rect;
use panekit_core::observer::ObserverList;
use rustc_hash::FxHashMap;

use crate::config::{LayoutConfig, LayoutConfigError};
use crate::dock::Continuation;
use crate::error::LayoutError;
use crate::host::{SizeSubscription, SurfaceHost};
use crate::region::{Region, RegionId, SplitNode};
use crate::registry::{LayoutRegistry, RootOptions};
use crate::resize::ResizeEvent;
use crate::split::DragSession;

/// Persistent watch on the first pane of an `[Auto, Auto]` split.
#[derive(Debug)]
pub(crate) struct TrackingWatch {
    pub(crate) split: RegionId,
    pub(crate) subscription: SizeSubscription,
}

/// Split-pane layout engine bound to one surface host.
pub struct LayoutEngine<H: SurfaceHost> {
    pub(crate) host: H,
    pub(crate) config: LayoutConfig,
    pub(crate) regions: BTreeMap<RegionId, Region>,
    next_id: RegionId,
    pub(crate) roots: LayoutRegistry,
    pub(crate) hooks: FxHashMap<RegionId, ObserverList<ResizeEvent>>,
    /// One-shot first-resolution watches, keyed by the observed split region.
    pub(crate) first_size: FxHashMap<RegionId, SizeSubscription>,
    /// Auto-tracking watches, keyed by the observed first pane.
    pub(crate) tracking: FxHashMap<RegionId, TrackingWatch>,
    pub(crate) drags: FxHashMap<RegionId, DragSession>,
    pub(crate) timeline: Timeline<Continuation>,
}

impl<H: SurfaceHost> std::fmt::Debug for LayoutEngine<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("regions", &self.regions.len())
            .field("roots", &self.roots.len())
            .field("pending_first_sizes", &self.first_size.len())
            .field("tracking", &self.tracking.len())
            .field("pending_continuations", &self.timeline.pending())
            .finish()
    }
}

impl<H: SurfaceHost> LayoutEngine<H> {
    /// Engine with [`LayoutConfig::default`].
    #[must_use]
    pub fn new(host: H) -> Self {
        Self {
            host,
            config: LayoutConfig::default(),
            regions: BTreeMap::new(),
            next_id: RegionId::MIN,
            roots: LayoutRegistry::new(),
            hooks: FxHashMap::default(),
            first_size: FxHashMap::default(),
            tracking: FxHashMap::default(),
            drags: FxHashMap::default(),
            timeline: Timeline::new(),
        }
    }

    /// Engine with a validated custom config.
    pub fn with_config(host: H, config: LayoutConfig) -> Result<Self, LayoutConfigError> {
        let config = config.validated()?;
        Ok(Self {
            config,
            ..Self::new(host)
        })
    }

    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn registry(&self) -> &LayoutRegistry {
        &self.roots
    }

    #[must_use]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    /// Number of live regions across all roots.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Current time on the engine's continuation clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timeline.now()
    }

    /// Scheduled continuations that have not run yet.
    #[must_use]
    pub fn pending_continuations(&self) -> usize {
        self.timeline.pending()
    }

    /// True while a one-shot first-resolution watch is registered on `id`.
    #[must_use]
    pub fn awaiting_first_size(&self, id: RegionId) -> bool {
        self.first_size.contains_key(&id)
    }

    /// Create a root region, optionally applying a layout tree to it.
    ///
    /// The layout is validated before anything is created.
    pub fn create_root(&mut self, options: RootOptions) -> Result<RegionId, LayoutError> {
        if let Some(layout) = &options.layout {
            layout.validate()?;
        }

        let id = self.alloc_id();
        let rect = match options.size {
            Some(size) => Rect::from_size(size.width, size.height),
            None => self.host.bounds(id),
        };
        let mut region = Region::leaf(id, None, rect);
        region.limits = options.limits;
        let _ = self.regions.insert(id, region);
        self.roots.insert(id, options.name.clone());

        tracing::debug!(
            target: "panekit.layout",
            region = id.get(),
            name = options.name.as_deref().unwrap_or(""),
            width = rect.width,
            height = rect.height,
            "root created"
        );

        if let Some(layout) = &options.layout {
            self.apply_layout(id, layout)?;
        }
        Ok(id)
    }

    /// Region ids of the subtree rooted at `id`, in pre-order.
    #[must_use]
    pub fn subtree(&self, id: RegionId) -> Vec<RegionId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(region) = self.regions.get(&next) else {
                continue;
            };
            order.push(next);
            if let Some(split) = &region.split {
                stack.push(split.second);
                stack.push(split.first);
            }
        }
        order
    }

    /// Leaf regions under `id`, left to right / top to bottom.
    #[must_use]
    pub fn leaves(&self, id: RegionId) -> Vec<RegionId> {
        self.subtree(id)
            .into_iter()
            .filter(|region| self.regions.get(region).is_some_and(Region::is_leaf))
            .collect()
    }

    pub(crate) fn alloc_id(&mut self) -> RegionId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    pub(crate) fn get(&self, id: RegionId) -> Result<&Region, LayoutError> {
        self.regions
            .get(&id)
            .ok_or(LayoutError::UnknownRegion { region: id })
    }

    pub(crate) fn get_mut(&mut self, id: RegionId) -> Result<&mut Region, LayoutError> {
        self.regions
            .get_mut(&id)
            .ok_or(LayoutError::UnknownRegion { region: id })
    }

    /// Split state of `id`, or `NotSplittable` naming `operation`.
    pub(crate) fn split_of(
        &self,
        id: RegionId,
        operation: &'static str,
    ) -> Result<&SplitNode, LayoutError> {
        self.get(id)?.split.as_ref().ok_or(LayoutError::NotSplittable {
            region: id,
            operation,
        })
    }

    pub(crate) fn split_mut(&mut self, id: RegionId) -> Option<&mut SplitNode> {
        self.regions.get_mut(&id).and_then(|region| region.split.as_mut())
    }
}
