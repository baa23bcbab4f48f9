use std::future::Future;

use crate::store::{LatLng, Store, StoreId};

/// Remote persistence for store geofences.
///
/// The editor only talks to the REST gateway through this trait so that it
/// can be driven against an in-memory fake in tests.
pub trait StoreGateway {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches every store with its current geofence.
    fn list_stores(&self) -> impl Future<Output = Result<Vec<Store>, Self::Error>> + Send;

    /// Replaces the geofence of `store_id` with `coordinates`.
    ///
    /// An empty slice removes the geofence.
    fn save_store_polygon(
        &self,
        store_id: StoreId,
        coordinates: &[LatLng],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
