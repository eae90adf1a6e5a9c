#![forbid(unsafe_code)]

//! Split descriptions: orientation, size slots, and validation.

use std::fmt;
use std::str::FromStr;

use panekit_core::geometry::{Point, Size};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SplitSpecProblem;

/// Surface units per `rem`/`em` when parsing slot text.
pub const REM_PX: f32 = 16.0;

/// Tolerance used when checking that two percentages cover the container.
const PERCENT_SUM_EPSILON: f32 = 0.01;

/// Direction in which a split arranges its two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Children side by side; the split axis is the width.
    #[default]
    Horizontal,
    /// Children stacked; the split axis is the height.
    Vertical,
}

impl Orientation {
    /// Extent of `size` along the split axis.
    #[must_use]
    pub fn extent(self, size: Size) -> f32 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Extent of `size` across the split axis.
    #[must_use]
    pub fn cross_extent(self, size: Size) -> f32 {
        match self {
            Self::Horizontal => size.height,
            Self::Vertical => size.width,
        }
    }

    /// Coordinate of `point` along the split axis.
    #[must_use]
    pub fn coordinate(self, point: Point) -> f32 {
        match self {
            Self::Horizontal => point.x,
            Self::Vertical => point.y,
        }
    }

    /// Build a size from an extent along the axis and one across it.
    #[must_use]
    pub fn compose(self, along: f32, across: f32) -> Size {
        match self {
            Self::Horizontal => Size::new(along, across),
            Self::Vertical => Size::new(across, along),
        }
    }

    /// Lowercase name used in layout descriptions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

impl FromStr for Orientation {
    type Err = SplitSpecProblem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("horizontal") || trimmed.eq_ignore_ascii_case("h") {
            Ok(Self::Horizontal)
        } else if trimmed.eq_ignore_ascii_case("vertical") || trimmed.eq_ignore_ascii_case("v") {
            Ok(Self::Vertical)
        } else {
            Err(SplitSpecProblem::UnknownOrientation(s.to_owned()))
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Orientation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Orientation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How much of the split axis one child asks for.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SizeSlot {
    /// An absolute extent in surface units.
    Pixels(f32),
    /// A share of the container extent, `0..=100`.
    Percent(f32),
    /// Whatever is left over, or content-driven when both slots are `Auto`.
    #[default]
    Auto,
}

impl SizeSlot {
    /// Concrete extent against a container of `available` units.
    ///
    /// `None` for [`SizeSlot::Auto`].
    #[must_use]
    pub fn resolve(self, available: f32) -> Option<f32> {
        match self {
            Self::Pixels(px) => Some(px),
            // Multiply first: 30 * 1000 / 100 is exact where 0.3 * 1000 is not.
            Self::Percent(pct) => Some(pct * available / 100.0),
            Self::Auto => None,
        }
    }

    /// True for [`SizeSlot::Auto`].
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    pub(crate) fn check(self, index: usize) -> Result<(), SplitSpecProblem> {
        let ok = match self {
            Self::Pixels(px) => px.is_finite() && px >= 0.0,
            Self::Percent(pct) => pct.is_finite() && (0.0..=100.0).contains(&pct),
            Self::Auto => true,
        };
        if ok {
            Ok(())
        } else {
            Err(SplitSpecProblem::InvalidSlot { index, slot: self })
        }
    }
}

impl FromStr for SizeSlot {
    type Err = SplitSpecProblem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let number = |raw: &str| {
            raw.trim()
                .parse::<f32>()
                .map_err(|_| SplitSpecProblem::UnparsableSlot(s.to_owned()))
        };

        if text == "auto" {
            Ok(Self::Auto)
        } else if let Some(raw) = text.strip_suffix('%') {
            Ok(Self::Percent(number(raw)?))
        } else if let Some(raw) = text.strip_suffix("px") {
            Ok(Self::Pixels(number(raw)?))
        } else if let Some(raw) = text.strip_suffix("rem") {
            Ok(Self::Pixels(number(raw)? * REM_PX))
        } else if let Some(raw) = text.strip_suffix("em") {
            Ok(Self::Pixels(number(raw)? * REM_PX))
        } else {
            Ok(Self::Pixels(number(&text)?))
        }
    }
}

impl fmt::Display for SizeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels(px) => write!(f, "{px}px"),
            Self::Percent(pct) => write!(f, "{pct}%"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

impl Serialize for SizeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SizeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(px) => Ok(Self::Pixels(px as f32)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Everything `split()` needs to know about a new pair of regions.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSpec {
    pub orientation: Orientation,
    /// `[primary, secondary]`.
    pub sizes: [SizeSlot; 2],
    /// Whether a drag handle sits between the two children.
    pub resize: bool,
    /// Whether the secondary child can be collapsed with `extend()`.
    pub minimizable: bool,
    /// Suppress percentage recomputation on container resize.
    ///
    /// `None` means "fixed unless resizeable".
    pub fixed_size: Option<bool>,
}

impl Default for SplitSpec {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            sizes: [SizeSlot::Percent(50.0), SizeSlot::Percent(50.0)],
            resize: true,
            minimizable: false,
            fixed_size: None,
        }
    }
}

impl SplitSpec {
    /// Side-by-side split with the given slots.
    #[must_use]
    pub fn horizontal(sizes: [SizeSlot; 2]) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            sizes,
            ..Self::default()
        }
    }

    /// Stacked split with the given slots.
    #[must_use]
    pub fn vertical(sizes: [SizeSlot; 2]) -> Self {
        Self {
            orientation: Orientation::Vertical,
            sizes,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn resize(mut self, resize: bool) -> Self {
        self.resize = resize;
        self
    }

    #[must_use]
    pub fn minimizable(mut self, minimizable: bool) -> Self {
        self.minimizable = minimizable;
        self
    }

    #[must_use]
    pub fn fixed_size(mut self, fixed: bool) -> Self {
        self.fixed_size = Some(fixed);
        self
    }

    /// Resolved `fixed_size` flag.
    #[must_use]
    pub fn is_fixed_size(&self) -> bool {
        self.fixed_size.unwrap_or(!self.resize)
    }

    /// Both slots are content-driven.
    #[must_use]
    pub fn is_auto_pair(&self) -> bool {
        self.sizes[0].is_auto() && self.sizes[1].is_auto()
    }

    /// Reject missing, contradictory, or out-of-range descriptions.
    pub fn validate(&self) -> Result<(), SplitSpecProblem> {
        for (index, slot) in self.sizes.iter().enumerate() {
            slot.check(index)?;
        }
        if let [SizeSlot::Percent(first), SizeSlot::Percent(second)] = self.sizes
            && ((first + second) - 100.0).abs() > PERCENT_SUM_EPSILON
        {
            return Err(SplitSpecProblem::PercentagesDoNotSum { first, second });
        }
        if self.minimizable && !self.resize {
            return Err(SplitSpecProblem::MinimizableWithoutResize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slot_text_forms() {
        assert_eq!("auto".parse::<SizeSlot>(), Ok(SizeSlot::Auto));
        assert_eq!("300px".parse::<SizeSlot>(), Ok(SizeSlot::Pixels(300.0)));
        assert_eq!(" 120 ".parse::<SizeSlot>(), Ok(SizeSlot::Pixels(120.0)));
        assert_eq!("70%".parse::<SizeSlot>(), Ok(SizeSlot::Percent(70.0)));
        assert_eq!("2rem".parse::<SizeSlot>(), Ok(SizeSlot::Pixels(32.0)));
        assert_eq!("1.5em".parse::<SizeSlot>(), Ok(SizeSlot::Pixels(24.0)));
        assert_eq!(
            "wide".parse::<SizeSlot>(),
            Err(SplitSpecProblem::UnparsableSlot("wide".into()))
        );
    }

    #[test]
    fn parses_orientation_shorthands() {
        assert_eq!("H".parse::<Orientation>(), Ok(Orientation::Horizontal));
        assert_eq!("vertical".parse::<Orientation>(), Ok(Orientation::Vertical));
        assert_eq!(
            "diagonal".parse::<Orientation>(),
            Err(SplitSpecProblem::UnknownOrientation("diagonal".into()))
        );
    }

    #[test]
    fn percent_resolution_is_exact_for_whole_numbers() {
        assert_eq!(SizeSlot::Percent(30.0).resolve(1000.0), Some(300.0));
        assert_eq!(SizeSlot::Percent(70.0).resolve(1000.0), Some(700.0));
        assert_eq!(SizeSlot::Auto.resolve(1000.0), None);
    }

    #[test]
    fn rejects_contradictory_specs() {
        let over = SplitSpec::horizontal([SizeSlot::Percent(60.0), SizeSlot::Percent(60.0)]);
        assert!(matches!(
            over.validate(),
            Err(SplitSpecProblem::PercentagesDoNotSum { .. })
        ));

        let negative = SplitSpec::vertical([SizeSlot::Pixels(-4.0), SizeSlot::Auto]);
        assert!(matches!(
            negative.validate(),
            Err(SplitSpecProblem::InvalidSlot { index: 0, .. })
        ));

        let too_big = SplitSpec::vertical([SizeSlot::Auto, SizeSlot::Percent(140.0)]);
        assert!(matches!(
            too_big.validate(),
            Err(SplitSpecProblem::InvalidSlot { index: 1, .. })
        ));

        let stuck = SplitSpec::default().resize(false).minimizable(true);
        assert_eq!(
            stuck.validate(),
            Err(SplitSpecProblem::MinimizableWithoutResize)
        );
    }

    #[test]
    fn fixed_size_defaults_to_not_resizeable() {
        assert!(!SplitSpec::default().is_fixed_size());
        assert!(SplitSpec::default().resize(false).is_fixed_size());
        assert!(SplitSpec::default().fixed_size(true).is_fixed_size());
    }

    #[test]
    fn slots_round_trip_through_json() {
        let slots: Vec<SizeSlot> = serde_json::from_str(r#"["30%", 200, "auto"]"#).unwrap();
        assert_eq!(
            slots,
            vec![
                SizeSlot::Percent(30.0),
                SizeSlot::Pixels(200.0),
                SizeSlot::Auto
            ]
        );
        assert_eq!(
            serde_json::to_string(&slots).unwrap(),
            r#"["30%","200px","auto"]"#
        );
    }
}
