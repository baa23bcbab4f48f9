//! Fixed precision model for lat/lng degrees.
//!
//! Coordinates are snapped to a decimal grid before any validity check so
//! that floating-point noise from the map widget (vertices dragged onto the
//! same pixel, values round-tripped through JSON) cannot produce spurious
//! micro self-intersections. Seven decimals is roughly 1.1 cm at the equator,
//! well below anything a user can draw, and far above `f64` noise.

use geo::Coord;

pub const DEFAULT_DECIMALS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecisionModel {
    scale: f64,
}

impl PrecisionModel {
    /// Grid of `10^-decimals` degrees. `decimals` is clamped to `0..=15`.
    #[must_use]
    pub fn from_decimals(decimals: u32) -> Self {
        #[allow(clippy::cast_possible_wrap)]
        let exp = decimals.min(15) as i32;
        Self {
            scale: 10f64.powi(exp),
        }
    }

    #[must_use]
    pub fn snap(&self, value: f64) -> f64 {
        // `+ 0.0` folds -0.0 into 0.0 so equal points compare equal bitwise.
        (value * self.scale).round() / self.scale + 0.0
    }

    #[must_use]
    pub fn snap_coord(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.snap(coord.x),
            y: self.snap(coord.y),
        }
    }

    /// The four grid points around `coord`, nearest first.
    ///
    /// Coordinates already on the grid along an axis yield duplicates.
    #[must_use]
    pub fn cell_corners(&self, coord: Coord<f64>) -> [Coord<f64>; 4] {
        let (x0, x1) = self.bracket(coord.x);
        let (y0, y1) = self.bracket(coord.y);
        let mut corners = [
            Coord { x: x0, y: y0 },
            Coord { x: x1, y: y0 },
            Coord { x: x0, y: y1 },
            Coord { x: x1, y: y1 },
        ];
        let dist = |c: &Coord<f64>| (c.x - coord.x).hypot(c.y - coord.y);
        corners.sort_by(|a, b| dist(a).total_cmp(&dist(b)));
        corners
    }

    /// Spacing between adjacent grid lines, in degrees.
    #[must_use]
    pub fn step(&self) -> f64 {
        1.0 / self.scale
    }

    /// Area of a single grid cell, in squared degrees.
    ///
    /// Polygons smaller than this are below the model's resolution and are
    /// treated as numerical debris.
    #[must_use]
    pub fn cell_area(&self) -> f64 {
        1.0 / (self.scale * self.scale)
    }

    fn bracket(&self, value: f64) -> (f64, f64) {
        let scaled = value * self.scale;
        (
            scaled.floor() / self.scale + 0.0,
            scaled.ceil() / self.scale + 0.0,
        )
    }
}

impl Default for PrecisionModel {
    fn default() -> Self {
        Self::from_decimals(DEFAULT_DECIMALS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snaps_to_decimal_grid() {
        let pm = PrecisionModel::from_decimals(3);
        assert!((pm.snap(1.234_49) - 1.234).abs() < f64::EPSILON);
        assert!((pm.snap(-6.123_56) - -6.124).abs() < f64::EPSILON);
    }

    #[test]
    fn default_keeps_seven_decimals() {
        let pm = PrecisionModel::default();
        assert!((pm.snap(106.816_666_64) - 106.816_666_6).abs() < 1e-9);
    }

    #[test]
    fn noise_collapses_to_same_value() {
        let pm = PrecisionModel::default();
        let a = pm.snap(0.1 + 0.2);
        let b = pm.snap(0.3);
        assert!((a - b).abs() < f64::EPSILON);
    }

    #[test]
    fn cell_corners_bracket_the_point_nearest_first() {
        let pm = PrecisionModel::from_decimals(1);
        let corners = pm.cell_corners(Coord { x: 0.26, y: 1.04 });
        assert!((corners[0].x - 0.3).abs() < 1e-12 && (corners[0].y - 1.0).abs() < 1e-12);
        assert!((corners[3].x - 0.2).abs() < 1e-12 && (corners[3].y - 1.1).abs() < 1e-12);
    }

    #[test]
    fn step_is_one_grid_spacing() {
        let pm = PrecisionModel::from_decimals(3);
        assert!((pm.step() - 0.001).abs() < 1e-15);
    }

    #[test]
    fn cell_area_matches_grid() {
        let pm = PrecisionModel::from_decimals(2);
        assert!((pm.cell_area() - 0.0001).abs() < 1e-12);
    }
}
