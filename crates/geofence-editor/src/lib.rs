//! Interactive geofence editing: the polygon store, the selection/edit state
//! machine with its confirmation gates, and the adapter that turns map-widget
//! draw and edit events into overlap resolution.

pub mod adapter;
pub mod debounce;
pub mod error;
pub mod notice;
pub mod overlay;
pub mod polygon_store;
pub mod session;
pub mod settings;

pub use adapter::{ActionKind, MapEditor};
pub use debounce::Debouncer;
pub use error::EditorError;
pub use notice::{Notice, NoticeLevel};
pub use overlay::{OverlayHandle, OverlayStyle, OverlayTable};
pub use polygon_store::PolygonStore;
pub use session::{ConfirmKind, EditSession, EditorState, GeofenceEditor, Transition};
pub use settings::EditorSettings;
