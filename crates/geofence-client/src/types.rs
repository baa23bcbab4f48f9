//! Wire shapes of the store API that do not belong to the shared model.

use geofence_core::{LatLng, Store};
use serde::{Deserialize, Serialize};

/// `GET /stores` answers either with a bare array or wrapped in `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StoreList {
    Bare(Vec<Store>),
    Envelope { data: Vec<Store> },
}

impl StoreList {
    pub(crate) fn into_stores(self) -> Vec<Store> {
        match self {
            StoreList::Bare(stores) | StoreList::Envelope { data: stores } => stores,
        }
    }
}

/// Body of `PUT /stores/{id}/geofence`.
#[derive(Debug, Serialize)]
pub(crate) struct GeofencePayload<'a> {
    pub coordinates: &'a [LatLng],
}

/// Error body; only `message` is used.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use geofence_core::StoreId;

    use super::*;

    #[test]
    fn store_list_accepts_bare_array() {
        let json = r#"[{"storeId": 1, "storeName": "A", "coordinates": []}]"#;
        let list: StoreList = serde_json::from_str(json).unwrap();
        let stores = list.into_stores();
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].store_id, StoreId(1));
    }

    #[test]
    fn store_list_accepts_data_envelope() {
        let json = r#"{"data": [{"storeId": 2, "storeName": "B"}], "total": 1}"#;
        let list: StoreList = serde_json::from_str(json).unwrap();
        let stores = list.into_stores();
        assert_eq!(stores.len(), 1);
        assert!(stores[0].coordinates.is_empty());
    }

    #[test]
    fn payload_serializes_coordinates_only() {
        let coords = [LatLng::new(-6.2, 106.8)];
        let body = serde_json::to_value(GeofencePayload {
            coordinates: &coords,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"coordinates": [{"lat": -6.2, "lng": 106.8}]})
        );
    }
}
