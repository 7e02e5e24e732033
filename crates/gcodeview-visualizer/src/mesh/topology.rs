//! Ribbon face topology
//!
//! The faces of a ribbon only depend on the number of points of its
//! polyline, so they are computed once per point count and shared.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::trace;

/// Point counts cached at most; larger sets of sizes are computed on demand.
pub const TOPOLOGY_CACHE_CAPACITY: usize = 1024;

/// Triangles of a ribbon around a polyline of `points` points, 0-based.
///
/// Vertex layout: `2 * points` bottom vertices followed by `2 * points` top
/// vertices, each point contributing its right then left offset. Yields
/// `8 * points - 4` faces.
pub fn ribbon_faces(points: usize) -> Vec<[u32; 3]> {
    if points < 2 {
        return Vec::new();
    }

    let n = (2 * points) as u32;
    let mut faces = Vec::with_capacity(8 * points - 4);

    for i in (0..n - 2).step_by(2) {
        // bottom
        faces.push([i, i + 1, i + 3]);
        faces.push([i, i + 3, i + 2]);
        // top
        faces.push([i + n, i + n + 3, i + n + 1]);
        faces.push([i + n, i + n + 2, i + n + 3]);
        // right
        faces.push([i, i + 2, i + n]);
        faces.push([i + 2, i + n + 2, i + n]);
        // left
        faces.push([i + 1, i + n + 1, i + 3]);
        faces.push([i + 3, i + n + 1, i + n + 3]);
    }

    // end caps
    faces.push([0, n + 1, 1]);
    faces.push([0, n, n + 1]);
    faces.push([n - 2, n - 1, 2 * n - 1]);
    faces.push([n - 2, 2 * n - 1, 2 * n - 2]);

    faces
}

/// Read-through cache of [`ribbon_faces`] keyed by point count.
#[derive(Debug, Default)]
pub struct TopologyCache {
    entries: RwLock<HashMap<usize, Arc<[[u32; 3]]>>>,
}

impl TopologyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache.
    pub fn global() -> &'static TopologyCache {
        static GLOBAL: OnceLock<TopologyCache> = OnceLock::new();
        GLOBAL.get_or_init(TopologyCache::new)
    }

    /// Faces for `points` points, computed on first use.
    pub fn faces(&self, points: usize) -> Arc<[[u32; 3]]> {
        if let Some(faces) = self.entries.read().get(&points) {
            return Arc::clone(faces);
        }

        let faces: Arc<[[u32; 3]]> = ribbon_faces(points).into();
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(&points) {
            return Arc::clone(existing);
        }
        if entries.len() < TOPOLOGY_CACHE_CAPACITY {
            trace!("Caching ribbon topology for {} points", points);
            entries.insert(points, Arc::clone(&faces));
        }
        faces
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
