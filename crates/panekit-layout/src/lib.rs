#![forbid(unsafe_code)]

//! Recursive split-pane layout.
//!
//! A [`LayoutEngine`] owns a tree of [`Region`]s per root. Each region is
//! either a leaf that holds content or a split with exactly two children.
//! Splits are sized from [`SplitSpec`] slots, by drags, by host size reports
//! (including regions split before the surface had a size), and by the
//! collapse/restore [`DockPhase`] machine.
//!
//! ```
//! use panekit_core::geometry::Size;
//! use panekit_layout::{HeadlessHost, LayoutEngine, RootOptions, SizeSlot, SplitSpec};
//!
//! let mut engine = LayoutEngine::new(HeadlessHost::<()>::new());
//! let root = engine
//!     .create_root(RootOptions::named("main").with_size(Size::new(1000.0, 800.0)))
//!     .unwrap();
//! let (sidebar, _) = engine
//!     .split(root, &SplitSpec::horizontal([SizeSlot::Pixels(240.0), SizeSlot::Auto]))
//!     .unwrap();
//! assert_eq!(engine.region(sidebar).unwrap().size().width, 238.0);
//! ```

pub mod config;
pub mod dock;
pub mod dsl;
mod engine;
pub mod error;
pub mod host;
pub mod region;
pub mod registry;
pub mod resize;
pub mod spec;
pub mod split;

pub use config::{LayoutConfig, LayoutConfigError};
pub use dock::DockPhase;
pub use dsl::LayoutSpec;
pub use engine::LayoutEngine;
pub use error::{LayoutError, SplitSpecProblem};
pub use host::{HeadlessHost, SizeSubscription, SurfaceHost};
pub use region::{Limits, Region, RegionId, RegionKind};
pub use registry::{LayoutRegistry, RootOptions};
pub use resize::ResizeEvent;
pub use spec::{Orientation, SizeSlot, SplitSpec};
pub use split::DragSession;
