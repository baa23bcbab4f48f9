//! Polygon validation and overlap resolution for store geofences.
//!
//! [`GeometryEngine`] turns vertex lists into `geo` polygons under a fixed
//! precision model and exposes the boolean predicates and operations the
//! resolver needs. [`OverlapResolver`] classifies a candidate edit against
//! every other store's geofence and trims it when possible.

pub mod engine;
pub mod error;
pub mod precision;
pub mod resolver;

pub use engine::{GeometryEngine, Validity};
pub use error::GeometryError;
pub use precision::PrecisionModel;
pub use resolver::{Disposition, OverlapResolver, Resolution};
