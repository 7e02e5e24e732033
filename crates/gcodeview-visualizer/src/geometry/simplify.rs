//! Collinear point pruning
//!
//! Slicers emit long runs of nearly collinear points. Each pass looks at every
//! interior point together with its two neighbours and drops the ones whose
//! triangle is too small or too flat. Passes repeat until nothing more is
//! dropped or the polyline reaches its minimum size (3 points for a closed
//! loop, 2 otherwise).

use gcodeview_core::{Point, Polyline, SimplifyTolerances, ToolPaths};
use glam::DVec3;
use tracing::debug;

fn xyz(point: &Point) -> DVec3 {
    DVec3::from_array(point.xyz())
}

/// Triangle area and angle measure of the corner at `b`.
///
/// The angle measure is the area divided by the product of the two edges
/// meeting at `b`. A zero-length edge yields an angle measure of 0.
pub fn corner_measures(a: DVec3, b: DVec3, c: DVec3) -> (f64, f64) {
    let area = (a - c).cross(b - c).length() / 2.0;
    let edges = (b - a).length() * (c - b).length();
    let angle = if edges > 0.0 { area / edges } else { 0.0 };
    (area, angle)
}

/// Prunes nearly collinear points from polylines.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Simplifier {
    tolerances: SimplifyTolerances,
}

impl Simplifier {
    pub fn new(tolerances: SimplifyTolerances) -> Self {
        Self { tolerances }
    }

    /// Simplify one polyline. Returns `None` if it should be dropped
    /// altogether (fewer than 2 points, or a 2-point path shorter than
    /// [`SimplifyTolerances::min_length`]).
    pub fn simplify_polyline(&self, polyline: &Polyline) -> Option<Polyline> {
        if polyline.len() < 2 {
            return None;
        }

        let minimum = if polyline.is_closed() { 3 } else { 2 };
        let mut points = polyline.points().to_vec();

        while points.len() > minimum {
            let keep = self.interior_keep_mask(&points);
            if keep.iter().all(|&k| k) {
                break;
            }

            let last = points.len() - 1;
            let mut index = 0;
            points.retain(|_| {
                let kept = index == 0 || index == last || keep[index - 1];
                index += 1;
                kept
            });
        }

        if points.len() == 2 {
            let length = xyz(&points[1]).distance(xyz(&points[0]));
            if length < self.tolerances.min_length() {
                return None;
            }
        }

        Some(Polyline::from(points))
    }

    /// One entry per interior point, true if the point survives this pass.
    fn interior_keep_mask(&self, points: &[Point]) -> Vec<bool> {
        points
            .windows(3)
            .map(|w| {
                let (area, angle) = corner_measures(xyz(&w[0]), xyz(&w[1]), xyz(&w[2]));
                area > self.tolerances.area && angle > self.tolerances.angle
            })
            .collect()
    }

    /// Simplify every polyline in place, dropping the ones that vanish.
    pub fn simplify_lines(&self, lines: &mut Vec<Polyline>) {
        let before: usize = lines.iter().map(Polyline::len).sum();
        *lines = lines
            .iter()
            .filter_map(|line| self.simplify_polyline(line))
            .collect();
        let after: usize = lines.iter().map(Polyline::len).sum();
        debug!("Simplified {} points down to {}", before, after);
    }

    /// Simplify the polylines of every tool.
    pub fn simplify_tool_paths(&self, paths: &mut ToolPaths) {
        for tool in &mut paths.tools {
            self.simplify_lines(&mut tool.polylines);
        }
    }
}
