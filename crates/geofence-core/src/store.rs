//! Store records as exchanged with the REST gateway.

use serde::{Deserialize, Deserializer, Serialize};

/// Gateway-assigned store identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(pub i64);

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single geofence vertex in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A store and its delivery-area boundary.
///
/// `coordinates` is the open ring of the geofence (the closing vertex is not
/// repeated). An empty list means the store has no geofence yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub store_id: StoreId,
    pub store_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub coordinates: Vec<LatLng>,
}

impl Store {
    #[must_use]
    pub fn has_geofence(&self) -> bool {
        !self.coordinates.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<LatLng>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<LatLng>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_wire_format() {
        let json = r#"{
            "storeId": 17,
            "storeName": "Kemang",
            "coordinates": [{"lat": -6.26, "lng": 106.81}, {"lat": -6.27, "lng": 106.82}]
        }"#;
        let store: Store = serde_json::from_str(json).expect("valid store json");
        assert_eq!(store.store_id, StoreId(17));
        assert_eq!(store.store_name, "Kemang");
        assert_eq!(store.coordinates.len(), 2);
        assert_eq!(store.coordinates[0], LatLng::new(-6.26, 106.81));
        assert!(store.has_geofence());
    }

    #[test]
    fn null_coordinates_become_empty() {
        let json = r#"{"storeId": 3, "storeName": "Senayan", "coordinates": null}"#;
        let store: Store = serde_json::from_str(json).expect("valid store json");
        assert!(store.coordinates.is_empty());
        assert!(!store.has_geofence());
    }

    #[test]
    fn missing_coordinates_become_empty() {
        let json = r#"{"storeId": 4, "storeName": "Menteng"}"#;
        let store: Store = serde_json::from_str(json).expect("valid store json");
        assert!(store.coordinates.is_empty());
    }

    #[test]
    fn serializes_with_wire_names() {
        let store = Store {
            store_id: StoreId(9),
            store_name: "Blok M".to_owned(),
            coordinates: vec![],
        };
        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(value["storeId"], 9);
        assert_eq!(value["storeName"], "Blok M");
        assert!(value["coordinates"].as_array().unwrap().is_empty());
    }
}
