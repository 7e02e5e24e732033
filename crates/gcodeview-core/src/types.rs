//! Toolpath data model shared by the interpreter, simplifier, layer and mesh stages.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TOOLS, MAX_TOOL_INDEX};
use crate::error::GcodeError;

/// A recorded machine position and its cumulative extrusion amount.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub e: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64, e: f64) -> Self {
        Self { x, y, z, e }
    }

    /// Builds a point from an `[x, y, z, e]` axis array.
    pub fn from_axes(axes: [f64; 4]) -> Self {
        Self::new(axes[0], axes[1], axes[2], axes[3])
    }

    /// Position without the extrusion component.
    pub fn xyz(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// One continuous extrusion path of a single tool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Z of the first point, which identifies the layer the path belongs to.
    pub fn z(&self) -> Option<f64> {
        self.first().map(|p| p.z)
    }

    /// True when the first and last points share exactly the same XY position.
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() > 1 => first.xy() == last.xy(),
            _ => false,
        }
    }
}

impl From<Vec<Point>> for Polyline {
    fn from(points: Vec<Point>) -> Self {
        Self { points }
    }
}

impl FromIterator<Point> for Polyline {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Polyline {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Ordered set of tool (extruder) indices to render.
///
/// The order defines output order; duplicates are dropped keeping the first
/// occurrence. Indices must lie in `0..=MAX_TOOL_INDEX`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct ToolSet {
    tools: Vec<u8>,
}

impl ToolSet {
    pub fn new<I: IntoIterator<Item = u8>>(tools: I) -> Result<Self, GcodeError> {
        let mut ordered: Vec<u8> = Vec::new();
        for tool in tools {
            if tool > MAX_TOOL_INDEX {
                return Err(GcodeError::ToolOutOfRange {
                    tool: u32::from(tool),
                    max: MAX_TOOL_INDEX,
                });
            }
            if !ordered.contains(&tool) {
                ordered.push(tool);
            }
        }
        Ok(Self { tools: ordered })
    }

    /// An empty include set; converting with it yields empty output.
    pub fn empty() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn contains(&self, tool: u8) -> bool {
        self.tools.contains(&tool)
    }

    /// Output slot of `tool`, if it is included.
    pub fn position(&self, tool: u8) -> Option<usize> {
        self.tools.iter().position(|&t| t == tool)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.tools
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.tools.iter().copied()
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        Self {
            tools: DEFAULT_TOOLS.to_vec(),
        }
    }
}

impl TryFrom<Vec<u8>> for ToolSet {
    type Error = GcodeError;

    fn try_from(tools: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(tools)
    }
}

impl From<ToolSet> for Vec<u8> {
    fn from(set: ToolSet) -> Self {
        set.tools
    }
}

/// Polylines recorded for one tool.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolPolylines {
    pub tool: u8,
    pub polylines: Vec<Polyline>,
}

impl ToolPolylines {
    pub fn new(tool: u8) -> Self {
        Self {
            tool,
            polylines: Vec::new(),
        }
    }
}

/// Interpreter output: one entry per rendered tool, in include-set order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolPaths {
    pub tools: Vec<ToolPolylines>,
}

impl ToolPaths {
    pub fn new(tools: Vec<ToolPolylines>) -> Self {
        Self { tools }
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Total number of polylines across all tools.
    pub fn polyline_count(&self) -> usize {
        self.tools.iter().map(|t| t.polylines.len()).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ToolPolylines> {
        self.tools.iter()
    }
}
