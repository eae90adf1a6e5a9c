#![forbid(unsafe_code)]

//! Explicit registry of layout roots.
//!
//! Roots are looked up through the engine that owns them rather than
//! through any process-wide collection.

use std::collections::BTreeMap;

use panekit_core::geometry::Size;

use crate::dsl::LayoutSpec;
use crate::region::{Limits, RegionId};

/// How to build a new root region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootOptions {
    /// Optional lookup name.
    pub name: Option<String>,
    /// Initial size. `None` asks the host for the root's bounds.
    pub size: Option<Size>,
    pub limits: Limits,
    /// Split tree applied right after creation.
    pub layout: Option<LayoutSpec>,
}

impl RootOptions {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutSpec) -> Self {
        self.layout = Some(layout);
        self
    }
}

/// Live roots of one engine, in creation order.
#[derive(Debug, Default, Clone)]
pub struct LayoutRegistry {
    roots: BTreeMap<RegionId, Option<String>>,
}

impl LayoutRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, root: RegionId, name: Option<String>) {
        let _ = self.roots.insert(root, name);
    }

    pub(crate) fn remove(&mut self, root: RegionId) -> bool {
        self.roots.remove(&root).is_some()
    }

    #[must_use]
    pub fn contains(&self, root: RegionId) -> bool {
        self.roots.contains_key(&root)
    }

    /// First root registered under `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<RegionId> {
        self.roots
            .iter()
            .find(|(_, root_name)| root_name.as_deref() == Some(name))
            .map(|(id, _)| *id)
    }

    #[must_use]
    pub fn name(&self, root: RegionId) -> Option<&str> {
        self.roots.get(&root).and_then(|name| name.as_deref())
    }

    pub fn roots(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.roots.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
