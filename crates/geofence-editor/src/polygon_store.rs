//! In-memory list of stores and their current geofences.

use std::collections::HashMap;

use geofence_core::{LatLng, Store, StoreId};

use crate::error::EditorError;

#[derive(Debug, Clone, Default)]
pub struct PolygonStore {
    stores: Vec<Store>,
    index: HashMap<StoreId, usize>,
}

impl PolygonStore {
    /// Builds the store list, keeping the first record for a repeated id.
    #[must_use]
    pub fn new(stores: Vec<Store>) -> Self {
        let mut kept = Vec::with_capacity(stores.len());
        let mut index = HashMap::with_capacity(stores.len());
        for store in stores {
            if index.contains_key(&store.store_id) {
                tracing::warn!(
                    store_id = %store.store_id,
                    "duplicate store id in store list; ignoring"
                );
                continue;
            }
            index.insert(store.store_id, kept.len());
            kept.push(store);
        }
        Self {
            stores: kept,
            index,
        }
    }

    #[must_use]
    pub fn get(&self, store_id: StoreId) -> Option<&Store> {
        self.index.get(&store_id).map(|&i| &self.stores[i])
    }

    #[must_use]
    pub fn contains(&self, store_id: StoreId) -> bool {
        self.index.contains_key(&store_id)
    }

    #[must_use]
    pub fn coordinates(&self, store_id: StoreId) -> Option<&[LatLng]> {
        self.get(store_id).map(|s| s.coordinates.as_slice())
    }

    /// Replaces the geofence of `store_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownStore`] if the id is not in the list.
    pub fn set_coordinates(
        &mut self,
        store_id: StoreId,
        coordinates: Vec<LatLng>,
    ) -> Result<(), EditorError> {
        let i = *self
            .index
            .get(&store_id)
            .ok_or(EditorError::UnknownStore(store_id))?;
        self.stores[i].coordinates = coordinates;
        Ok(())
    }

    /// Geofences of every store except `exclude`, in list order.
    pub fn other_polygons(
        &self,
        exclude: StoreId,
    ) -> impl Iterator<Item = (StoreId, &[LatLng])> + '_ {
        self.stores
            .iter()
            .filter(move |s| s.store_id != exclude && s.has_geofence())
            .map(|s| (s.store_id, s.coordinates.as_slice()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Store> + '_ {
        self.stores.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}
