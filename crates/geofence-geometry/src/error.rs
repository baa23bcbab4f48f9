use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("polygon needs at least 3 distinct points, got {distinct}")]
    TooFewPoints { distinct: usize },

    #[error("coordinate is not finite: ({lat}, {lng})")]
    NonFiniteCoordinate { lat: f64, lng: f64 },

    /// The geometry library failed while computing `op`.
    #[error("{op} failed: {reason}")]
    OperationFailed { op: &'static str, reason: String },
}
