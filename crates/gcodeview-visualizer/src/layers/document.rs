//! Per-layer line document
//!
//! Shape: `{"layers":[[{"z":..,"height":..,"lines":[[[x,y],..],..]},..],..]}`
//! with one outer entry per rendered tool and one record per Z level. Every
//! number is rounded to 4 decimals and the encoding is compact.

use std::io::Write;

use gcodeview_core::constants::LAYER_DOCUMENT_PRECISION;
use gcodeview_core::{LayerOptions, Result, ToolPaths};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::index::LayerIndex;

/// Round to the document precision, ties to even. Negative zero becomes zero.
pub fn round4(value: f64) -> f64 {
    let scale = 10f64.powi(LAYER_DOCUMENT_PRECISION);
    (value * scale).round_ties_even() / scale + 0.0
}

/// One Z level of one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    /// Middle of the slice: level minus half the height
    pub z: f64,
    pub height: f64,
    /// XY projection of each polyline starting on this level
    pub lines: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerDocument {
    pub layers: Vec<Vec<LayerRecord>>,
}

impl LayerDocument {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Group the polylines of every tool by layer.
    ///
    /// All tools share the same Z levels. The second tool is shifted along X
    /// by the extruder separation.
    pub fn build(paths: &ToolPaths, options: &LayerOptions) -> Self {
        let index = LayerIndex::from_tool_paths(paths);

        let layers = paths
            .iter()
            .enumerate()
            .map(|(position, tool)| {
                let x_shift = if position == 1 {
                    options.extruder_separation
                } else {
                    0.0
                };

                let mut records: Vec<LayerRecord> = index
                    .iter()
                    .map(|(z, height)| LayerRecord {
                        z: round4(z - height / 2.0),
                        height: round4(height),
                        lines: Vec::new(),
                    })
                    .collect();

                for line in &tool.polylines {
                    let Some(layer) = line.z().and_then(|z| index.layer_of(z)) else {
                        continue;
                    };
                    let xy = line
                        .iter()
                        .map(|p| [round4(p.x + x_shift), round4(p.y)])
                        .collect();
                    records[layer].lines.push(xy);
                }

                records
            })
            .collect();

        debug!(
            "Built layer document: {} tools, {} layers",
            paths.len(),
            index.len()
        );
        Self { layers }
    }

    pub fn tool_count(&self) -> usize {
        self.layers.len()
    }

    /// Compact JSON encoding.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Compact JSON encoding written straight into `writer`.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }
}
