//! Shared defaults for the conversion pipeline.

/// Highest tool index reachable with a `T<n>` command.
pub const MAX_TOOL_INDEX: u8 = 6;

/// Tools rendered when the caller does not restrict the include set.
pub const DEFAULT_TOOLS: [u8; 7] = [0, 1, 2, 3, 4, 5, 6];

/// X shift (mm) applied to the second rendered tool in the layer document.
/// Print cores on dual-extrusion machines sit roughly this far apart.
pub const DEFAULT_EXTRUDER_SEPARATION: f64 = 18.0;

/// Minimum triangle area (mm²) for an interior point to survive simplification.
pub const DEFAULT_AREA_TOLERANCE: f64 = 1e-2;

/// Minimum angle measure for an interior point to survive simplification.
pub const DEFAULT_ANGLE_TOLERANCE: f64 = 1e-3;

/// Ribbon width (mm): 80% of a 0.4 mm nozzle.
pub const DEFAULT_LINE_WIDTH: f64 = 0.8 * 0.4;

/// Ribbon height (mm) when a fixed line height is used.
pub const DEFAULT_LINE_HEIGHT: f64 = 0.2;

/// Decimal places kept in the layer document.
pub const LAYER_DOCUMENT_PRECISION: i32 = 4;

/// Decimal places written for OBJ vertex coordinates.
pub const OBJ_PRECISION: usize = 4;

/// Concurrent conversions allowed by a default worker pool.
pub const DEFAULT_WORKERS: usize = 6;

/// Inputs at or above this size skip infill unless the caller decides otherwise.
pub const INFILL_AUTO_LIMIT_BYTES: u64 = 10 * 1024 * 1024;
