//! Caller-supplied options for each conversion stage.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ANGLE_TOLERANCE, DEFAULT_AREA_TOLERANCE, DEFAULT_EXTRUDER_SEPARATION,
    DEFAULT_LINE_HEIGHT, DEFAULT_LINE_WIDTH,
};
use crate::types::ToolSet;

/// Which tools and geometry classes the interpreter records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Tools to render, in output order
    pub tools: ToolSet,
    /// Drop skirt, support, support-interface and prime-tower moves
    pub ignore_support: bool,
    /// Drop infill moves
    pub ignore_infill: bool,
}

impl FilterOptions {
    pub fn new(tools: ToolSet) -> Self {
        Self {
            tools,
            ..Self::default()
        }
    }

    pub fn with_ignore_support(mut self, ignore: bool) -> Self {
        self.ignore_support = ignore;
        self
    }

    pub fn with_ignore_infill(mut self, ignore: bool) -> Self {
        self.ignore_infill = ignore;
        self
    }
}

/// Tolerances for collinear point pruning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyTolerances {
    /// Minimum triangle area in mm²
    pub area: f64,
    /// Minimum angle measure (area over the product of the adjacent edge lengths)
    pub angle: f64,
}

impl SimplifyTolerances {
    /// Two-point paths shorter than this are dropped.
    pub fn min_length(&self) -> f64 {
        self.area.sqrt()
    }
}

impl Default for SimplifyTolerances {
    fn default() -> Self {
        Self {
            area: DEFAULT_AREA_TOLERANCE,
            angle: DEFAULT_ANGLE_TOLERANCE,
        }
    }
}

/// Options specific to the layer document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerOptions {
    /// X offset (mm) applied to the second rendered tool
    pub extruder_separation: f64,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            extruder_separation: DEFAULT_EXTRUDER_SEPARATION,
        }
    }
}

/// How tall each extruded ribbon is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "value")]
pub enum LineHeight {
    /// Same height for every ribbon
    Fixed(f64),
    /// Distance to the next lower Z level of the same tool (the Z itself for the lowest level)
    Layer,
}

impl Default for LineHeight {
    fn default() -> Self {
        Self::Fixed(DEFAULT_LINE_HEIGHT)
    }
}

/// Options specific to the mesh document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshOptions {
    /// Full ribbon width in mm
    pub line_width: f64,
    pub line_height: LineHeight,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            line_height: LineHeight::default(),
        }
    }
}

/// Everything one conversion call needs besides the toolpath itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub filter: FilterOptions,
    pub simplify: SimplifyTolerances,
    pub layers: LayerOptions,
    pub mesh: MeshOptions,
}

/// Visualization document produced by a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Per-layer line document
    Json,
    /// Wavefront OBJ ribbon mesh
    Obj,
}

impl OutputFormat {
    /// File extension for documents of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Obj => "obj",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "obj" => Ok(Self::Obj),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}
