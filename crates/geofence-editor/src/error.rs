use geofence_core::StoreId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("unknown store {0}")]
    UnknownStore(StoreId),

    #[error("no store is selected")]
    NoSelection,

    /// An edit arrived for a store other than the one being edited.
    #[error("store {0} is not the store being edited")]
    NotSelected(StoreId),

    #[error("a confirmation is already pending")]
    ConfirmationPending,

    #[error("no confirmation is pending")]
    NothingPending,

    /// The current polygon overlaps another store and cannot be saved.
    #[error("polygon is invalid and cannot be saved")]
    SaveBlocked,

    #[error("nothing to save")]
    NotDirty,

    #[error("failed to save store {store_id}: {message}")]
    Persistence { store_id: StoreId, message: String },

    #[error("failed to load stores: {0}")]
    Load(String),
}
