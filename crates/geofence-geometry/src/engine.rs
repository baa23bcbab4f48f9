//! Geometry engine: vertex lists in, `geo` polygons and boolean operations out.
//!
//! Coordinates map as x = longitude, y = latitude. Every operation is pure and
//! leaves its inputs untouched.

use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{
    Area, BooleanOps, Contains, Coord, Intersects, LineString, MultiPolygon, Point, Polygon,
};
use geofence_core::LatLng;

use crate::error::GeometryError;
use crate::precision::PrecisionModel;

/// Outcome of a ring simplicity check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Validity {
    Valid,
    /// The ring crosses or touches itself; `at` is the first offending point.
    SelfIntersecting { at: LatLng },
}

impl Validity {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeometryEngine {
    precision: PrecisionModel,
}

impl GeometryEngine {
    #[must_use]
    pub fn new(precision: PrecisionModel) -> Self {
        Self { precision }
    }

    #[must_use]
    pub fn precision(&self) -> &PrecisionModel {
        &self.precision
    }

    /// Builds a polygon from an open vertex ring.
    ///
    /// Vertices are snapped to the precision model and consecutive duplicates
    /// collapsed; a trailing vertex equal to the first is dropped, then the
    /// ring is closed again by `Polygon::new`.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::NonFiniteCoordinate`] if any vertex is NaN or infinite.
    /// - [`GeometryError::TooFewPoints`] if fewer than 3 distinct points remain.
    pub fn build_polygon(&self, vertices: &[LatLng]) -> Result<Polygon<f64>, GeometryError> {
        let mut ring: Vec<Coord<f64>> = Vec::with_capacity(vertices.len() + 1);
        for v in vertices {
            if !v.lat.is_finite() || !v.lng.is_finite() {
                return Err(GeometryError::NonFiniteCoordinate {
                    lat: v.lat,
                    lng: v.lng,
                });
            }
            let c = self.precision.snap_coord(Coord { x: v.lng, y: v.lat });
            if ring.last() != Some(&c) {
                ring.push(c);
            }
        }
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }

        let distinct = count_distinct(&ring);
        if distinct < 3 {
            return Err(GeometryError::TooFewPoints { distinct });
        }

        Ok(Polygon::new(LineString::new(ring), vec![]))
    }

    /// Checks the exterior ring for self-intersections.
    ///
    /// Non-adjacent edges may not meet at all. Adjacent edges may only share
    /// their common vertex; a collinear overlap (a spike folding back on
    /// itself) is also reported.
    #[must_use]
    pub fn validate(&self, polygon: &Polygon<f64>) -> Validity {
        let edges: Vec<_> = polygon.exterior().lines().collect();
        let n = edges.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                match line_intersection(edges[i], edges[j]) {
                    None => {}
                    Some(LineIntersection::Collinear { intersection }) => {
                        let at = intersection.start;
                        // Two adjacent collinear edges legitimately share one endpoint.
                        if !(adjacent && intersection.start == intersection.end) {
                            return self_intersecting(at);
                        }
                    }
                    Some(LineIntersection::SinglePoint { intersection, .. }) => {
                        if !adjacent {
                            return self_intersecting(intersection);
                        }
                    }
                }
            }
        }
        Validity::Valid
    }

    /// True when `a` and `b` share at least one point (boundaries touching counts).
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn intersects(&self, a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
        a.intersects(b)
    }

    /// Folds pairwise unions left to right. An empty input yields an empty
    /// multi-polygon.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OperationFailed`] if the geometry library panics.
    #[allow(clippy::unused_self)]
    pub fn union_all(&self, polygons: &[Polygon<f64>]) -> Result<MultiPolygon<f64>, GeometryError> {
        guarded("union", || {
            polygons
                .iter()
                .fold(MultiPolygon::new(vec![]), |acc, p| acc.union(p))
        })
    }

    /// The portion of `a` not covered by `b`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OperationFailed`] if the geometry library panics.
    #[allow(clippy::unused_self)]
    pub fn difference(
        &self,
        a: &Polygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Result<MultiPolygon<f64>, GeometryError> {
        guarded("difference", || a.difference(b))
    }

    /// Area shared by `a` and `b`, in squared degrees.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OperationFailed`] if the geometry library panics.
    #[allow(clippy::unused_self)]
    pub fn overlap_area(
        &self,
        a: &Polygon<f64>,
        b: &impl BooleanOps<Scalar = f64>,
    ) -> Result<f64, GeometryError> {
        guarded("intersection", || a.intersection(b).unsigned_area())
    }

    /// Overlap that grid snapping alone may introduce between neighbours:
    /// a band one grid step wide along the perimeter, never less than a cell.
    #[must_use]
    pub fn snapping_tolerance(&self, polygon: &Polygon<f64>) -> f64 {
        let perimeter: f64 = polygon
            .exterior()
            .lines()
            .map(|l| l.dx().hypot(l.dy()))
            .sum();
        (perimeter * self.precision.step()).max(self.precision.cell_area())
    }

    /// Exterior ring of `polygon` as an open vertex list on the precision grid.
    #[must_use]
    pub fn exterior_vertices(&self, polygon: &Polygon<f64>) -> Vec<LatLng> {
        open_ring(
            polygon
                .exterior()
                .0
                .iter()
                .map(|c| self.precision.snap_coord(*c)),
        )
    }

    /// Like [`exterior_vertices`](Self::exterior_vertices), but a vertex
    /// whose nearest grid point falls inside `obstacle` moves to the nearest
    /// corner of its grid cell that does not.
    ///
    /// Vertices on the obstacle boundary stay put; only the interior counts.
    #[must_use]
    pub fn snap_outside(
        &self,
        polygon: &Polygon<f64>,
        obstacle: &MultiPolygon<f64>,
    ) -> Vec<LatLng> {
        open_ring(polygon.exterior().0.iter().map(|raw| {
            let snapped = self.precision.snap_coord(*raw);
            if !obstacle.contains(&Point::from(snapped)) {
                return snapped;
            }
            self.precision
                .cell_corners(*raw)
                .into_iter()
                .find(|corner| !obstacle.contains(&Point::from(*corner)))
                .unwrap_or(snapped)
        }))
    }
}

/// Collects grid coordinates into an open ring: consecutive duplicates
/// collapse and the closing vertex is dropped.
fn open_ring(coords: impl Iterator<Item = Coord<f64>>) -> Vec<LatLng> {
    let mut out: Vec<LatLng> = Vec::new();
    for c in coords {
        let v = LatLng::new(c.y, c.x);
        if out.last() != Some(&v) {
            out.push(v);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

fn self_intersecting(at: Coord<f64>) -> Validity {
    Validity::SelfIntersecting {
        at: LatLng::new(at.y, at.x),
    }
}

fn count_distinct(ring: &[Coord<f64>]) -> usize {
    let mut keys: Vec<(u64, u64)> = ring.iter().map(|c| (c.x.to_bits(), c.y.to_bits())).collect();
    keys.sort_unstable();
    keys.dedup();
    keys.len()
}

/// Runs a boolean operation, converting a panic inside the geometry library
/// into a [`GeometryError::OperationFailed`].
fn guarded<T>(op: &'static str, f: impl FnOnce() -> T) -> Result<T, GeometryError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "geometry library panicked".to_owned());
        tracing::warn!(op, reason = %reason, "geometry operation failed");
        GeometryError::OperationFailed { op, reason }
    })
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
