//! Ribbon meshes for extruded polylines
//!
//! This module provides:
//! - Per-point ribbon offsets and the resulting vertex layout
//! - Face topology shared by every polyline with the same point count
//! - Wavefront OBJ output

pub mod builder;
pub mod obj;
pub mod topology;

pub use builder::{ribbon_normals, ribbon_vertices, Mesh, MeshBuilder};
pub use obj::{obj_to_string, write_obj};
pub use topology::{ribbon_faces, TopologyCache, TOPOLOGY_CACHE_CAPACITY};
