//! # GCodeView Visualizer
//!
//! Turns sliced 3D printer G-code into visualization documents.
//! Includes the toolpath interpreter, polyline simplification, the per-layer
//! line document, ribbon meshes with OBJ output and a bounded conversion pool.

pub mod convert;
pub mod gcode;
pub mod geometry;
pub mod layers;
pub mod mesh;
pub mod pool;
pub mod utils;

pub use convert::{
    convert, extract_tool_paths, gcode_to_json, gcode_to_layers, gcode_to_mesh,
    gcode_to_mesh_with_cache, gcode_to_obj, write_gcode_json, write_gcode_obj,
};

pub use gcode::{
    interpret_lines, interpret_reader, parse_line, Axis, AxisWord, Command, FeatureType,
    Interpreter, InterpreterStats, Line, Positioning,
};

pub use geometry::{corner_measures, Simplifier};

pub use layers::{round4, LayerDocument, LayerIndex, LayerRecord};

pub use mesh::{
    obj_to_string, ribbon_faces, ribbon_normals, ribbon_vertices, write_obj, Mesh, MeshBuilder,
    TopologyCache, TOPOLOGY_CACHE_CAPACITY,
};

pub use pool::{ConversionJob, ConversionPool, FileConversionJob};

pub use utils::{FileReadStats, GcodeFileReader};
