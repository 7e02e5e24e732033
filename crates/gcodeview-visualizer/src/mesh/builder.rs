//! Ribbon mesh construction
//!
//! Every polyline becomes a closed box-section ribbon: each point is offset
//! to both sides by half the line width, once at the bottom of the extruded
//! line and once at its top.

use gcodeview_core::{Error, LineHeight, MeshOptions, Point, Result, ToolPaths};
use glam::DVec2;
use tracing::debug;

use super::topology::TopologyCache;
use crate::layers::LayerIndex;

fn xy(point: &Point) -> DVec2 {
    DVec2::new(point.x, point.y)
}

/// Rescale `normal` to `half_width`. A zero vector is left as is.
fn scale_to(normal: DVec2, half_width: f64) -> DVec2 {
    let length = normal.length();
    let scale = if length == 0.0 { 1.0 } else { length };
    normal * (half_width / scale)
}

/// Side offset for every point of a polyline, `half_width` long.
///
/// Endpoints use the perpendicular of their only segment. Interior points
/// sum the perpendiculars of both adjacent segments, except at a hairpin
/// where those cancel out and the incoming perpendicular is used alone.
pub fn ribbon_normals(points: &[Point], half_width: f64) -> Vec<DVec2> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }

    let mut normals = Vec::with_capacity(n);
    normals.push(scale_to((xy(&points[1]) - xy(&points[0])).perp(), half_width));

    for w in points.windows(3) {
        let (a, b, c) = (xy(&w[0]), xy(&w[1]), xy(&w[2]));
        let prev = b - a;
        let next = b - c;
        let last_normal = DVec2::new(-prev.y, prev.x);
        let next_normal = DVec2::new(next.y, -next.x);
        let normal = if last_normal == -next_normal {
            last_normal
        } else {
            last_normal + next_normal
        };
        normals.push(scale_to(normal, half_width));
    }

    normals.push(scale_to((xy(&points[n - 1]) - xy(&points[n - 2])).perp(), half_width));
    normals
}

/// The `4 * n` vertices of one ribbon: `2 * n` bottom vertices at
/// `z - line_height`, then `2 * n` top vertices at `z`.
pub fn ribbon_vertices(points: &[Point], line_width: f64, line_height: f64) -> Vec<[f64; 3]> {
    let normals = ribbon_normals(points, line_width / 2.0);

    let top: Vec<[f64; 3]> = points
        .iter()
        .zip(&normals)
        .flat_map(|(p, normal)| {
            [
                [p.x - normal.x, p.y - normal.y, p.z],
                [p.x + normal.x, p.y + normal.y, p.z],
            ]
        })
        .collect();

    let mut vertices: Vec<[f64; 3]> = top
        .iter()
        .map(|v| [v[0], v[1], v[2] - line_height])
        .collect();
    vertices.extend(top);
    vertices
}

/// Flat vertex and triangle buffers. Face indices are 0-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append a vertex block and its local faces.
    pub fn append(&mut self, vertices: Vec<[f64; 3]>, faces: &[[u32; 3]]) -> Result<()> {
        if u32::try_from(self.vertices.len() + vertices.len()).is_err() {
            return Err(Error::other("mesh exceeds the u32 vertex index range"));
        }
        let offset = self.vertices.len() as u32;

        self.vertices.extend(vertices);
        self.faces
            .extend(faces.iter().map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]));
        Ok(())
    }
}

/// Builds one ribbon per polyline.
#[derive(Debug, Clone, Copy)]
pub struct MeshBuilder<'a> {
    options: MeshOptions,
    cache: &'a TopologyCache,
}

impl MeshBuilder<'static> {
    /// Builder sharing the process-wide topology cache.
    pub fn new(options: MeshOptions) -> Self {
        Self::with_cache(options, TopologyCache::global())
    }
}

impl<'a> MeshBuilder<'a> {
    pub fn with_cache(options: MeshOptions, cache: &'a TopologyCache) -> Self {
        Self { options, cache }
    }

    pub fn options(&self) -> &MeshOptions {
        &self.options
    }

    /// Mesh every polyline of every tool, tools in order.
    pub fn build(&self, paths: &ToolPaths) -> Result<Mesh> {
        let mut mesh = Mesh::new();

        for tool in paths.iter() {
            let index = match self.options.line_height {
                LineHeight::Layer => Some(LayerIndex::from_polylines(&tool.polylines)),
                LineHeight::Fixed(_) => None,
            };

            for line in tool.polylines.iter().filter(|line| line.len() >= 2) {
                let height = match (self.options.line_height, &index) {
                    (LineHeight::Fixed(height), _) => height,
                    (LineHeight::Layer, Some(index)) => index.height_of(line).unwrap_or(0.0),
                    (LineHeight::Layer, None) => 0.0,
                };

                let vertices = ribbon_vertices(line.points(), self.options.line_width, height);
                let faces = self.cache.faces(line.len());
                mesh.append(vertices, &faces)?;
            }
        }

        debug!(
            "Built mesh: {} vertices, {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcodeview_core::{Polyline, ToolPolylines};

    fn points(coords: &[[f64; 3]]) -> Vec<Point> {
        coords
            .iter()
            .map(|p| Point::new(p[0], p[1], p[2], 0.0))
            .collect()
    }

    fn approx(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_segment_vertices() {
        let line = points(&[[0.0, 0.0, 0.2], [10.0, 0.0, 0.2]]);
        let vertices = ribbon_vertices(&line, 0.4, 0.2);
        assert_eq!(vertices.len(), 8);
        assert!(approx(vertices[0], [0.0, -0.2, 0.0]));
        assert!(approx(vertices[1], [0.0, 0.2, 0.0]));
        assert!(approx(vertices[6], [10.0, -0.2, 0.2]));
        assert!(approx(vertices[7], [10.0, 0.2, 0.2]));
    }

    #[test]
    fn test_straight_interior_normal() {
        let line = points(&[[0.0, 0.0, 0.2], [5.0, 0.0, 0.2], [10.0, 0.0, 0.2]]);
        let normals = ribbon_normals(&line, 0.5);
        for normal in normals {
            assert!((normal - DVec2::new(0.0, 0.5)).length() < 1e-12);
        }
    }

    #[test]
    fn test_corner_normal_bisects() {
        let line = points(&[[0.0, 0.0, 0.2], [10.0, 0.0, 0.2], [10.0, 10.0, 0.2]]);
        let normal = ribbon_normals(&line, 1.0)[1];
        let expected = DVec2::new(-1.0, 1.0).normalize();
        assert!((normal - expected).length() < 1e-12);
    }

    #[test]
    fn test_hairpin_uses_incoming_normal() {
        let line = points(&[[0.0, 0.0, 0.2], [10.0, 0.0, 0.2], [0.0, 0.0, 0.2]]);
        let normal = ribbon_normals(&line, 1.0)[1];
        assert!((normal - DVec2::new(0.0, 1.0)).length() < 1e-12);
    }

    #[test]
    fn test_duplicate_points_do_not_produce_nan() {
        let line = points(&[[1.0, 1.0, 0.2], [1.0, 1.0, 0.2]]);
        let vertices = ribbon_vertices(&line, 0.32, 0.2);
        assert!(vertices.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_build_offsets_faces() {
        let line: Polyline = points(&[[0.0, 0.0, 0.2], [10.0, 0.0, 0.2]]).into();
        let mut tool = ToolPolylines::new(0);
        tool.polylines = vec![line.clone(), line];

        let cache = TopologyCache::new();
        let mesh = MeshBuilder::with_cache(MeshOptions::default(), &cache)
            .build(&ToolPaths::new(vec![tool]))
            .unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.face_count(), 24);
        assert_eq!(mesh.faces[12], [8, 9, 11]);
        assert!(mesh.faces.iter().flatten().all(|&v| v < 16));
    }

    #[test]
    fn test_layer_heights() {
        let mut tool = ToolPolylines::new(0);
        tool.polylines = vec![
            points(&[[0.0, 0.0, 0.3], [10.0, 0.0, 0.3]]).into(),
            points(&[[0.0, 0.0, 0.5], [10.0, 0.0, 0.5]]).into(),
        ];
        let options = MeshOptions {
            line_height: LineHeight::Layer,
            ..MeshOptions::default()
        };

        let cache = TopologyCache::new();
        let mesh = MeshBuilder::with_cache(options, &cache)
            .build(&ToolPaths::new(vec![tool]))
            .unwrap();
        assert!((mesh.vertices[0][2] - 0.0).abs() < 1e-12);
        assert!((mesh.vertices[8][2] - 0.3).abs() < 1e-12);
    }
}
