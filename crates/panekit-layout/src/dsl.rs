#![forbid(unsafe_code)]

//! Declarative split trees.
//!
//! A [`LayoutSpec`] node either is a leaf (no `splits`) or lists exactly two
//! children, each of which may carry the `size` it wants inside its parent:
//!
//! ```json
//! { "type": "horizontal",
//!   "splits": [ { "size": "20%" },
//!               { "type": "vertical",
//!                 "splits": [ { "size": "60%" }, { "size": "40%" } ] } ] }
//! ```
//!
//! The whole tree is validated before the first region is split.

use serde::{Deserialize, Serialize};

use crate::engine::LayoutEngine;
use crate::error::{LayoutError, SplitSpecProblem};
use crate::host::SurfaceHost;
use crate::region::RegionId;
use crate::spec::{Orientation, SizeSlot, SplitSpec};

fn default_true() -> bool {
    true
}

/// One node of a declarative split tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    #[serde(default, alias = "type")]
    pub orientation: Orientation,
    /// Size this node asks for inside its parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeSlot>,
    #[serde(default = "default_true")]
    pub resize: bool,
    #[serde(default)]
    pub minimizable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splits: Option<Vec<LayoutSpec>>,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            size: None,
            resize: true,
            minimizable: false,
            splits: None,
        }
    }
}

impl LayoutSpec {
    /// A leaf with no size preference.
    #[must_use]
    pub fn leaf() -> Self {
        Self::default()
    }

    /// A leaf asking for `size` inside its parent.
    #[must_use]
    pub fn sized(size: SizeSlot) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    /// A side-by-side split of `first` and `second`.
    #[must_use]
    pub fn horizontal(first: Self, second: Self) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            splits: Some(vec![first, second]),
            ..Self::default()
        }
    }

    /// A stacked split of `first` and `second`.
    #[must_use]
    pub fn vertical(first: Self, second: Self) -> Self {
        Self {
            orientation: Orientation::Vertical,
            splits: Some(vec![first, second]),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn size(mut self, size: SizeSlot) -> Self {
        self.size = Some(size);
        self
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

    /// Parse and validate a JSON description.
    pub fn from_json_str(s: &str) -> Result<Self, LayoutError> {
        let spec: Self = serde_json::from_str(s)
            .map_err(|e| LayoutError::invalid(SplitSpecProblem::Malformed(e.to_string())))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parse and validate a TOML description.
    pub fn from_toml_str(s: &str) -> Result<Self, LayoutError> {
        let spec: Self = toml::from_str(s)
            .map_err(|e| LayoutError::invalid(SplitSpecProblem::Malformed(e.to_string())))?;
        spec.validate()?;
        Ok(spec)
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.splits.is_none()
    }

    /// Number of leaves the tree produces.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match &self.splits {
            None => 1,
            Some(children) => children.iter().map(Self::leaf_count).sum(),
        }
    }

    /// The split this node performs, derived from its children's sizes.
    ///
    /// Children without sizes share the container evenly; a single missing
    /// size takes whatever is left.
    pub fn split_spec(&self) -> Result<Option<SplitSpec>, SplitSpecProblem> {
        let Some(children) = &self.splits else {
            return Ok(None);
        };
        let [first, second] = children.as_slice() else {
            return Err(SplitSpecProblem::WrongSplitCount {
                found: children.len(),
            });
        };
        let sizes = match (first.size, second.size) {
            (None, None) => [SizeSlot::Percent(50.0), SizeSlot::Percent(50.0)],
            (first, second) => [
                first.unwrap_or(SizeSlot::Auto),
                second.unwrap_or(SizeSlot::Auto),
            ],
        };
        Ok(Some(SplitSpec {
            orientation: self.orientation,
            sizes,
            resize: self.resize,
            minimizable: self.minimizable,
            fixed_size: None,
        }))
    }

    /// Validate every node of the tree.
    pub fn validate(&self) -> Result<(), SplitSpecProblem> {
        if let Some(spec) = self.split_spec()? {
            spec.validate()?;
        }
        if let Some(slot) = self.size {
            slot.check(0)?;
        }
        for child in self.splits.iter().flatten() {
            child.validate()?;
        }
        Ok(())
    }
}

impl<H: SurfaceHost> LayoutEngine<H> {
    /// Split `root` recursively as described by `layout`.
    ///
    /// Nothing is mutated unless the whole tree is valid. A leaf description
    /// leaves `root` untouched. Returns the leaves created, in order.
    pub fn apply_layout(
        &mut self,
        root: RegionId,
        layout: &LayoutSpec,
    ) -> Result<Vec<RegionId>, LayoutError> {
        layout.validate()?;
        self.get(root)?;

        let mut leaves = Vec::with_capacity(layout.leaf_count());
        self.apply_node(root, layout, &mut leaves)?;
        tracing::debug!(
            target: "panekit.layout",
            region = root.get(),
            leaves = leaves.len(),
            "layout applied"
        );
        Ok(leaves)
    }

    fn apply_node(
        &mut self,
        region: RegionId,
        node: &LayoutSpec,
        leaves: &mut Vec<RegionId>,
    ) -> Result<(), LayoutError> {
        let (Some(spec), Some(children)) = (node.split_spec()?, &node.splits) else {
            leaves.push(region);
            return Ok(());
        };
        let (first, second) = self.split(region, &spec)?;
        self.apply_node(first, &children[0], leaves)?;
        self.apply_node(second, &children[1], leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sizes_default_to_even_halves() {
        let spec = LayoutSpec::horizontal(LayoutSpec::leaf(), LayoutSpec::leaf())
            .split_spec()
            .unwrap()
            .unwrap();
        assert_eq!(spec.sizes, [SizeSlot::Percent(50.0), SizeSlot::Percent(50.0)]);
    }

    #[test]
    fn one_missing_size_becomes_auto() {
        let footer = LayoutSpec::sized(SizeSlot::Pixels(120.0));
        let spec = LayoutSpec::vertical(LayoutSpec::leaf(), footer)
            .split_spec()
            .unwrap()
            .unwrap();
        assert_eq!(spec.sizes, [SizeSlot::Auto, SizeSlot::Pixels(120.0)]);
        assert_eq!(spec.orientation, Orientation::Vertical);
    }

    #[test]
    fn parses_type_alias_and_defaults() {
        let spec = LayoutSpec::from_json_str(
            r#"{"type": "vertical", "splits": [{"size": "30%"}, {"size": 200}]}"#,
        )
        .unwrap();
        assert_eq!(spec.orientation, Orientation::Vertical);
        assert!(spec.resize);
        assert!(!spec.minimizable);
        assert_eq!(spec.leaf_count(), 2);
    }

    #[test]
    fn parses_toml_tree() {
        let spec = LayoutSpec::from_toml_str(
            r#"
            orientation = "horizontal"
            minimizable = true

            [[splits]]
            size = "75%"

            [[splits]]
            size = "25%"
            "#,
        )
        .unwrap();
        assert!(spec.minimizable);
        assert_eq!(
            spec.splits.as_ref().map(|s| s[1].size),
            Some(Some(SizeSlot::Percent(25.0)))
        );
    }

    #[test]
    fn rejects_three_way_split() {
        let err = LayoutSpec::from_json_str(r#"{"splits": [{}, {}, {}]}"#).unwrap_err();
        assert_eq!(
            err,
            LayoutError::invalid(SplitSpecProblem::WrongSplitCount { found: 3 })
        );
    }

    #[test]
    fn unknown_orientation_is_malformed() {
        let err = LayoutSpec::from_json_str(r#"{"type": "diagonal"}"#).unwrap_err();
        assert!(err.to_string().contains("diagonal"), "{err}");
    }

    #[test]
    fn nested_problems_are_found() {
        let bad = LayoutSpec::horizontal(
            LayoutSpec::leaf(),
            LayoutSpec::vertical(
                LayoutSpec::sized(SizeSlot::Percent(80.0)),
                LayoutSpec::sized(SizeSlot::Percent(80.0)),
            ),
        );
        assert!(matches!(
            bad.validate(),
            Err(SplitSpecProblem::PercentagesDoNotSum { .. })
        ));
    }
}
