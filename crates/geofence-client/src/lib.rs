//! REST client for the store list and per-store geofence persistence.

pub mod client;
pub mod error;
pub(crate) mod retry;
pub(crate) mod types;

pub use client::GeofenceClient;
pub use error::ClientError;
