use std::time::Duration;

use geofence_core::{AppConfig, LatLng};
use geofence_geometry::PrecisionModel;

/// Editor tuning derived from [`AppConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    /// Settle window for vertex path mutations.
    pub debounce: Duration,
    pub default_center: LatLng,
    pub precision: PrecisionModel,
}

impl EditorSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            default_center: config.default_center,
            precision: PrecisionModel::from_decimals(config.coordinate_decimals),
        }
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            default_center: LatLng::new(-6.2, 106.816_666),
            precision: PrecisionModel::default(),
        }
    }
}
