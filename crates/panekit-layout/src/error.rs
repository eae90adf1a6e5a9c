#![forbid(unsafe_code)]

//! Error taxonomy for layout operations.

use std::fmt;

use crate::region::RegionId;
use crate::spec::SizeSlot;

/// Why a split description was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitSpecProblem {
    /// Orientation string was neither horizontal nor vertical.
    UnknownOrientation(String),
    /// A slot value is negative, non-finite, or a percentage outside `0..=100`.
    InvalidSlot { index: usize, slot: SizeSlot },
    /// Two percentage slots that do not describe the whole container.
    PercentagesDoNotSum { first: f32, second: f32 },
    /// `minimizable` was requested on a split without a drag handle.
    MinimizableWithoutResize,
    /// A layout node with `splits` must list exactly two children.
    WrongSplitCount { found: usize },
    /// Slot text that is not `auto`, `<n>px`, `<n>%`, `<n>rem` or a number.
    UnparsableSlot(String),
    /// The layout description could not be decoded at all.
    Malformed(String),
}

impl fmt::Display for SplitSpecProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOrientation(raw) => write!(f, "unknown orientation {raw:?}"),
            Self::InvalidSlot { index, slot } => write!(f, "slot {index} has invalid size {slot}"),
            Self::PercentagesDoNotSum { first, second } => write!(
                f,
                "percentages {first}% + {second}% must add up to 100%"
            ),
            Self::MinimizableWithoutResize => {
                write!(f, "a minimizable split must also be resizeable")
            }
            Self::WrongSplitCount { found } => {
                write!(f, "expected exactly 2 splits, found {found}")
            }
            Self::UnparsableSlot(raw) => write!(f, "cannot parse size slot {raw:?}"),
            Self::Malformed(msg) => write!(f, "malformed layout description: {msg}"),
        }
    }
}

/// Errors raised synchronously by layout operations.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The split description is missing, contradictory, or unparsable.
    InvalidSplitSpec { problem: SplitSpecProblem },
    /// A split-only operation was invoked on a region that cannot honour it.
    NotSplittable {
        region: RegionId,
        operation: &'static str,
    },
    /// The region id does not name a live region.
    UnknownRegion { region: RegionId },
}

impl LayoutError {
    pub(crate) fn invalid(problem: SplitSpecProblem) -> Self {
        Self::InvalidSplitSpec { problem }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSplitSpec { problem } => write!(f, "invalid split spec: {problem}"),
            Self::NotSplittable { region, operation } => write!(
                f,
                "{operation} is not available on region {}",
                region.get()
            ),
            Self::UnknownRegion { region } => write!(f, "region {} not found", region.get()),
        }
    }
}

impl std::error::Error for LayoutError {}

impl From<SplitSpecProblem> for LayoutError {
    fn from(problem: SplitSpecProblem) -> Self {
        Self::invalid(problem)
    }
}
