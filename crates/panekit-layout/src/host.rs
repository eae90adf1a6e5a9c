#![forbid(unsafe_code)]

//! The boundary between the layout engine and the rendering environment.
//!
//! The engine never reads sizes on its own. A host hands out size
//! subscriptions for nodes it renders and later pushes the observed sizes
//! back with [`LayoutEngine::notify_size`](crate::LayoutEngine::notify_size).
//! Content is opaque to the engine; it only tells the host where to put it.

use std::collections::BTreeMap;

use panekit_core::geometry::Rect;
use rustc_hash::FxHashMap;

use crate::region::RegionId;

/// Token for one size subscription issued by a [`SurfaceHost`].
///
/// Deliberately not `Clone`: a subscription is cancelled by giving the token
/// back to the host.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SizeSubscription {
    id: u64,
    node: RegionId,
}

impl SizeSubscription {
    /// Create a token. Hosts choose `id`; it only has to be unique per host.
    #[must_use]
    pub const fn new(id: u64, node: RegionId) -> Self {
        Self { id, node }
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Node whose size is observed.
    #[must_use]
    pub const fn node(&self) -> RegionId {
        self.node
    }
}

/// Services the layout engine consumes from the rendering environment.
pub trait SurfaceHost {
    /// Whatever the host renders into a leaf region.
    type Content;

    /// Start observing the size of `node`. Changes are reported back through
    /// `LayoutEngine::notify_size` until the subscription is cancelled.
    fn observe_size(&mut self, node: RegionId) -> SizeSubscription;

    /// Stop observing.
    fn cancel(&mut self, subscription: SizeSubscription);

    /// Current bounds of `node` as the surface sees it.
    fn bounds(&self, node: RegionId) -> Rect;

    /// Place `content` into a leaf region.
    fn attach_content(&mut self, region: RegionId, content: Self::Content);

    /// Move whatever is attached to `from` over to `to`.
    fn transfer_content(&mut self, from: RegionId, to: RegionId);

    /// Remove and return the content attached to `region`.
    fn detach_content(&mut self, region: RegionId) -> Option<Self::Content>;
}

/// In-memory host for tests, benchmarks and server-side layout.
///
/// Records bounds set by the caller, every subscription handed out, and the
/// content attached to each region.
#[derive(Debug)]
pub struct HeadlessHost<C> {
    bounds: FxHashMap<RegionId, Rect>,
    live: BTreeMap<u64, RegionId>,
    cancelled: Vec<RegionId>,
    content: FxHashMap<RegionId, C>,
    next_subscription: u64,
}

impl<C> Default for HeadlessHost<C> {
    fn default() -> Self {
        Self {
            bounds: FxHashMap::default(),
            live: BTreeMap::new(),
            cancelled: Vec::new(),
            content: FxHashMap::default(),
            next_subscription: 1,
        }
    }
}

impl<C> HeadlessHost<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `rect` from [`SurfaceHost::bounds`] for `node`.
    pub fn set_bounds(&mut self, node: RegionId, rect: Rect) {
        let _ = self.bounds.insert(node, rect);
    }

    /// Nodes with at least one live size subscription, in issue order.
    #[must_use]
    pub fn observed_nodes(&self) -> Vec<RegionId> {
        self.live.values().copied().collect()
    }

    /// Live subscriptions on `node`.
    #[must_use]
    pub fn live_subscriptions(&self, node: RegionId) -> usize {
        self.live.values().filter(|observed| **observed == node).count()
    }

    /// Subscriptions on `node` that have been cancelled so far.
    #[must_use]
    pub fn cancelled_subscriptions(&self, node: RegionId) -> usize {
        self.cancelled
            .iter()
            .filter(|observed| **observed == node)
            .count()
    }

    /// Total subscriptions ever issued.
    #[must_use]
    pub fn issued_subscriptions(&self) -> u64 {
        self.next_subscription - 1
    }

    #[must_use]
    pub fn content(&self, region: RegionId) -> Option<&C> {
        self.content.get(&region)
    }
}

impl<C> SurfaceHost for HeadlessHost<C> {
    type Content = C;

    fn observe_size(&mut self, node: RegionId) -> SizeSubscription {
        let id = self.next_subscription;
        self.next_subscription += 1;
        let _ = self.live.insert(id, node);
        SizeSubscription::new(id, node)
    }

    fn cancel(&mut self, subscription: SizeSubscription) {
        if self.live.remove(&subscription.id()).is_some() {
            self.cancelled.push(subscription.node());
        }
    }

    fn bounds(&self, node: RegionId) -> Rect {
        self.bounds.get(&node).copied().unwrap_or_default()
    }

    fn attach_content(&mut self, region: RegionId, content: C) {
        let _ = self.content.insert(region, content);
    }

    fn transfer_content(&mut self, from: RegionId, to: RegionId) {
        if let Some(content) = self.content.remove(&from) {
            let _ = self.content.insert(to, content);
        }
    }

    fn detach_content(&mut self, region: RegionId) -> Option<C> {
        self.content.remove(&region)
    }
}
