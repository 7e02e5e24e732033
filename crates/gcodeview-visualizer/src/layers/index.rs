//! Distinct Z levels of a set of polylines.

use gcodeview_core::{Polyline, ToolPaths};

/// Sorted distinct Z levels, each with the height of the slice below it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerIndex {
    levels: Vec<f64>,
    heights: Vec<f64>,
}

impl LayerIndex {
    /// Levels from the first-point Z of every polyline.
    pub fn from_polylines<'a>(lines: impl IntoIterator<Item = &'a Polyline>) -> Self {
        Self::from_levels(lines.into_iter().filter_map(Polyline::z).collect())
    }

    /// Levels across every tool of an interpreter result.
    pub fn from_tool_paths(paths: &ToolPaths) -> Self {
        Self::from_polylines(paths.iter().flat_map(|tool| tool.polylines.iter()))
    }

    fn from_levels(mut levels: Vec<f64>) -> Self {
        // -0.0 and 0.0 must land on the same level
        for z in &mut levels {
            *z += 0.0;
        }
        levels.sort_by(f64::total_cmp);
        levels.dedup();

        let heights = levels
            .iter()
            .enumerate()
            .map(|(i, &z)| if i == 0 { z } else { z - levels[i - 1] })
            .collect();

        Self { levels, heights }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Strictly increasing Z levels.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn height(&self, layer: usize) -> Option<f64> {
        self.heights.get(layer).copied()
    }

    /// Layer whose Z equals `z` exactly.
    pub fn layer_of(&self, z: f64) -> Option<usize> {
        let z = z + 0.0;
        self.levels.binary_search_by(|level| level.total_cmp(&z)).ok()
    }

    /// Height of the layer a polyline starts on.
    pub fn height_of(&self, line: &Polyline) -> Option<f64> {
        line.z().and_then(|z| self.layer_of(z)).and_then(|i| self.height(i))
    }

    /// Iterate over `(z, height)` pairs, lowest first.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.levels.iter().copied().zip(self.heights.iter().copied())
    }
}
