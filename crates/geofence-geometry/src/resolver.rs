//! Overlap resolution for a candidate geofence edit.
//!
//! A candidate is checked for self-intersection first, then against every
//! other store's polygon. Overlapping area is carved out of the candidate
//! with a single difference against the union of all conflicting polygons.

use geo::{Area, MultiPolygon, Polygon};
use geofence_core::{LatLng, StoreId};

use crate::engine::{GeometryEngine, Validity};
use crate::error::GeometryError;

/// Classification of a candidate polygon.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Fewer than 3 vertices; the drawing is not finished.
    Incomplete,
    /// Fewer than 3 distinct vertices on the precision grid.
    Degenerate { distinct: usize },
    SelfIntersecting { at: LatLng },
    /// No other store is touched; the candidate is accepted verbatim.
    ValidAsIs { vertices: Vec<LatLng> },
    /// Overlap was removed; `vertices` is the remaining exterior ring.
    Trimmed { vertices: Vec<LatLng> },
    /// Nothing of the candidate survives the difference.
    FullyConsumed,
    /// The remainder splits into several polygons.
    TooFragmented { parts: usize },
    /// The remainder has holes: the candidate surrounds another store.
    Encloses,
    GeometryFailure { reason: String },
}

/// What the caller should do with the candidate shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Leave everything as it was.
    Ignore,
    /// Throw the shape away; stored coordinates stay unchanged.
    Discard,
    /// Store the resolved vertices and mark the edit valid.
    Accept,
    /// Keep the candidate vertices as drawn but mark the edit invalid.
    KeepInvalid,
}

impl Resolution {
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        match self {
            Resolution::Incomplete => Disposition::Ignore,
            Resolution::Degenerate { .. }
            | Resolution::SelfIntersecting { .. }
            | Resolution::GeometryFailure { .. } => Disposition::Discard,
            Resolution::ValidAsIs { .. } | Resolution::Trimmed { .. } => Disposition::Accept,
            Resolution::FullyConsumed
            | Resolution::TooFragmented { .. }
            | Resolution::Encloses => Disposition::KeepInvalid,
        }
    }

    /// Vertices to store when the candidate is accepted.
    #[must_use]
    pub fn accepted_vertices(&self) -> Option<&[LatLng]> {
        match self {
            Resolution::ValidAsIs { vertices } | Resolution::Trimmed { vertices } => {
                Some(vertices)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.disposition() == Disposition::Accept
    }

    /// User-facing explanation, `None` for outcomes that need no message.
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Resolution::Incomplete | Resolution::ValidAsIs { .. } | Resolution::Trimmed { .. } => {
                None
            }
            Resolution::Degenerate { .. } => {
                Some("Polygon needs at least 3 distinct points, please draw again")
            }
            Resolution::SelfIntersecting { .. } => {
                Some("Polygon is overlapping itself, please draw again")
            }
            Resolution::FullyConsumed => {
                Some("Polygon lies inside another store's area, please move the polygon outside")
            }
            Resolution::TooFragmented { .. } => Some("Too much overlapping, please draw again"),
            Resolution::Encloses => {
                Some("Polygon surrounds another store's area, please draw again")
            }
            Resolution::GeometryFailure { .. } => {
                Some("Could not process the polygon, please draw again")
            }
        }
    }
}

pub struct OverlapResolver<'e> {
    engine: &'e GeometryEngine,
}

impl<'e> OverlapResolver<'e> {
    #[must_use]
    pub fn new(engine: &'e GeometryEngine) -> Self {
        Self { engine }
    }

    /// Classifies `candidate` against `others`, the geofences of every store
    /// except the one being edited.
    ///
    /// Obstacles that cannot be built into a polygon are skipped.
    pub fn resolve<'a, I>(&self, candidate: &[LatLng], others: I) -> Resolution
    where
        I: IntoIterator<Item = (StoreId, &'a [LatLng])>,
    {
        if candidate.len() < 3 {
            return Resolution::Incomplete;
        }

        let polygon = match self.engine.build_polygon(candidate) {
            Ok(polygon) => polygon,
            Err(GeometryError::TooFewPoints { distinct }) => {
                return Resolution::Degenerate { distinct };
            }
            Err(e) => {
                return Resolution::GeometryFailure {
                    reason: e.to_string(),
                }
            }
        };

        if let Validity::SelfIntersecting { at } = self.engine.validate(&polygon) {
            tracing::debug!(lat = at.lat, lng = at.lng, "candidate ring self-intersects");
            return Resolution::SelfIntersecting { at };
        }

        let conflicts: Vec<Polygon<f64>> = others
            .into_iter()
            .filter(|(_, coords)| !coords.is_empty())
            .filter_map(|(store_id, coords)| match self.engine.build_polygon(coords) {
                Ok(p) => Some((store_id, p)),
                Err(e) => {
                    tracing::warn!(%store_id, error = %e, "skipping unusable stored geofence");
                    None
                }
            })
            .filter(|(_, p)| self.engine.intersects(&polygon, p))
            .map(|(store_id, p)| {
                tracing::debug!(%store_id, "candidate overlaps stored geofence");
                p
            })
            .collect();

        if conflicts.is_empty() {
            return Resolution::ValidAsIs {
                vertices: candidate.to_vec(),
            };
        }

        match self.trim(&polygon, &conflicts) {
            Ok(resolution) => resolution,
            Err(e) => Resolution::GeometryFailure {
                reason: e.to_string(),
            },
        }
    }

    fn trim(
        &self,
        polygon: &Polygon<f64>,
        conflicts: &[Polygon<f64>],
    ) -> Result<Resolution, GeometryError> {
        let obstacle = self.engine.union_all(conflicts)?;
        let remainder = self.engine.difference(polygon, &obstacle)?;
        let mut parts = self.significant_parts(remainder);

        match parts.len() {
            0 => return Ok(Resolution::FullyConsumed),
            1 => {}
            n => return Ok(Resolution::TooFragmented { parts: n }),
        }

        let part = parts.remove(0);
        if !part.interiors().is_empty() {
            return Ok(Resolution::Encloses);
        }

        // Crossing points of the difference lie off the grid; rounding them
        // may land inside a neighbour, so those move to a free cell corner.
        let vertices = self.engine.snap_outside(&part, &obstacle);
        if vertices.len() < 3 {
            return Ok(Resolution::FullyConsumed);
        }

        // Snapping the remainder back onto the grid can fold thin slivers.
        let Ok(snapped) = self.engine.build_polygon(&vertices) else {
            return Ok(Resolution::FullyConsumed);
        };
        if !self.engine.validate(&snapped).is_valid() {
            return Ok(Resolution::TooFragmented { parts: 1 });
        }

        let overlap = self.engine.overlap_area(&snapped, &obstacle)?;
        let tolerance = self.engine.snapping_tolerance(&snapped);
        if overlap > tolerance {
            tracing::debug!(overlap, tolerance, "snapped remainder still overlaps");
            return Ok(Resolution::TooFragmented { parts: 1 });
        }

        Ok(Resolution::Trimmed { vertices })
    }

    /// Drops remainder pieces smaller than one precision cell.
    fn significant_parts(&self, remainder: MultiPolygon<f64>) -> Vec<Polygon<f64>> {
        let min_area = self.engine.precision().cell_area();
        remainder
            .into_iter()
            .filter(|p| p.unsigned_area() > min_area)
            .collect()
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
