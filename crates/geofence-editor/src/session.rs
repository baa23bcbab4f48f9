//! Selection and edit state machine.
//!
//! At most one store is edited at a time. Leaving a dirty edit (selecting
//! another store, unselecting, discarding) goes through a discard
//! confirmation unless the caller bypasses the dirty gate; saving and
//! removing a geofence always ask first. Nothing here is asynchronous except
//! the persist call made when a save is confirmed.

use geofence_core::{LatLng, Store, StoreGateway, StoreId};
use geofence_geometry::{Disposition, Resolution};

use crate::error::EditorError;
use crate::notice::Notice;
use crate::polygon_store::PolygonStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Unselected,
    SelectedClean,
    SelectedDirty,
    ConfirmingTransition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    /// First save of a store that had no geofence when the list was loaded.
    Publish,
    Save,
    Discard,
    RemoveRadius,
}

/// Result of a state-machine action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Done,
    /// The action is parked until [`GeofenceEditor::confirm`] or
    /// [`GeofenceEditor::cancel`] is called.
    AwaitingConfirmation(ConfirmKind),
}

/// What runs once the pending confirmation is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    Select(StoreId),
    Unselect,
    Persist,
    RemoveRadius,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingConfirmation {
    kind: ConfirmKind,
    continuation: Continuation,
}

/// The store currently being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub store_id: StoreId,
    /// Coordinates at selection time.
    pub snapshot: Vec<LatLng>,
    pub is_dirty: bool,
    /// False while the last edit left an unresolvable overlap.
    pub is_valid: bool,
}

#[derive(Debug)]
pub struct GeofenceEditor {
    stores: PolygonStore,
    /// Store list as last loaded or saved; discards restore from here.
    original: PolygonStore,
    session: Option<EditSession>,
    pending: Option<PendingConfirmation>,
    notices: Vec<Notice>,
    center: LatLng,
    default_center: LatLng,
}

impl GeofenceEditor {
    #[must_use]
    pub fn new(stores: Vec<Store>, default_center: LatLng) -> Self {
        let stores = PolygonStore::new(stores);
        Self {
            original: stores.clone(),
            stores,
            session: None,
            pending: None,
            notices: Vec::new(),
            center: default_center,
            default_center,
        }
    }

    /// Fetches the store list once and builds an editor over it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Load`] if the gateway call fails.
    pub async fn load<G: StoreGateway>(
        gateway: &G,
        default_center: LatLng,
    ) -> Result<Self, EditorError> {
        let stores = gateway
            .list_stores()
            .await
            .map_err(|e| EditorError::Load(e.to_string()))?;
        tracing::info!(count = stores.len(), "loaded stores for geofence editing");
        Ok(Self::new(stores, default_center))
    }

    #[must_use]
    pub fn state(&self) -> EditorState {
        match (&self.pending, &self.session) {
            (Some(_), _) => EditorState::ConfirmingTransition,
            (None, Some(s)) if s.is_dirty => EditorState::SelectedDirty,
            (None, Some(_)) => EditorState::SelectedClean,
            (None, None) => EditorState::Unselected,
        }
    }

    #[must_use]
    pub fn stores(&self) -> &PolygonStore {
        &self.stores
    }

    #[must_use]
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn selected_store(&self) -> Option<StoreId> {
        self.session.as_ref().map(|s| s.store_id)
    }

    #[must_use]
    pub fn pending_confirmation(&self) -> Option<ConfirmKind> {
        self.pending.map(|p| p.kind)
    }

    /// Current map viewport center.
    #[must_use]
    pub fn center(&self) -> LatLng {
        self.center
    }

    /// Takes every queued notice, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Starts editing `store_id`.
    ///
    /// While the current edit is dirty this parks a discard confirmation
    /// instead, unless `bypass_dirty_gate` is set; only the confirmed-discard
    /// continuation sets it. Leaving a dirty edit always restores the
    /// abandoned store's original geofence.
    ///
    /// # Errors
    ///
    /// - [`EditorError::ConfirmationPending`] while another confirmation is open.
    /// - [`EditorError::UnknownStore`] if `store_id` is not in the list.
    pub fn select(
        &mut self,
        store_id: StoreId,
        bypass_dirty_gate: bool,
    ) -> Result<Transition, EditorError> {
        self.ensure_no_pending()?;
        if !self.stores.contains(store_id) {
            return Err(EditorError::UnknownStore(store_id));
        }
        if self.selected_store() == Some(store_id) {
            return Ok(Transition::Done);
        }
        if self.is_dirty() && !bypass_dirty_gate {
            return Ok(self.park(ConfirmKind::Discard, Continuation::Select(store_id)));
        }

        self.close_session();
        let snapshot = self
            .stores
            .coordinates(store_id)
            .map(<[LatLng]>::to_vec)
            .unwrap_or_default();
        self.center = snapshot.first().copied().unwrap_or(self.default_center);
        tracing::info!(%store_id, vertices = snapshot.len(), "store selected");
        self.session = Some(EditSession {
            store_id,
            snapshot,
            is_dirty: false,
            is_valid: true,
        });
        Ok(Transition::Done)
    }

    /// Stops editing. Gated like [`GeofenceEditor::select`].
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ConfirmationPending`] while another confirmation is open.
    pub fn unselect(&mut self, bypass_dirty_gate: bool) -> Result<Transition, EditorError> {
        self.ensure_no_pending()?;
        if self.is_dirty() && !bypass_dirty_gate {
            return Ok(self.park(ConfirmKind::Discard, Continuation::Unselect));
        }
        self.close_session();
        Ok(Transition::Done)
    }

    /// Asks to persist the current edit.
    ///
    /// # Errors
    ///
    /// - [`EditorError::ConfirmationPending`] while another confirmation is open.
    /// - [`EditorError::NoSelection`] when no store is selected.
    /// - [`EditorError::SaveBlocked`] while the edit is invalid.
    /// - [`EditorError::NotDirty`] when nothing changed.
    pub fn request_save(&mut self) -> Result<Transition, EditorError> {
        self.ensure_no_pending()?;
        let session = self.session.as_ref().ok_or(EditorError::NoSelection)?;
        if !session.is_valid {
            return Err(EditorError::SaveBlocked);
        }
        if !session.is_dirty {
            return Err(EditorError::NotDirty);
        }
        let first_publication = self
            .original
            .get(session.store_id)
            .is_some_and(|s| !s.has_geofence());
        let kind = if first_publication {
            ConfirmKind::Publish
        } else {
            ConfirmKind::Save
        };
        Ok(self.park(kind, Continuation::Persist))
    }

    /// Asks to drop the current edit. A clean edit is simply closed.
    ///
    /// # Errors
    ///
    /// - [`EditorError::ConfirmationPending`] while another confirmation is open.
    /// - [`EditorError::NoSelection`] when no store is selected.
    pub fn request_discard(&mut self) -> Result<Transition, EditorError> {
        self.ensure_no_pending()?;
        if self.session.is_none() {
            return Err(EditorError::NoSelection);
        }
        self.unselect(false)
    }

    /// Asks to clear the selected store's geofence.
    ///
    /// # Errors
    ///
    /// - [`EditorError::ConfirmationPending`] while another confirmation is open.
    /// - [`EditorError::NoSelection`] when no store is selected.
    pub fn request_remove_radius(&mut self) -> Result<Transition, EditorError> {
        self.ensure_no_pending()?;
        let store_id = self.selected_store().ok_or(EditorError::NoSelection)?;
        if self.stores.coordinates(store_id).is_some_and(<[LatLng]>::is_empty) {
            return Ok(Transition::Done);
        }
        Ok(self.park(ConfirmKind::RemoveRadius, Continuation::RemoveRadius))
    }

    /// Drops the pending confirmation without running it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NothingPending`] if nothing is waiting.
    pub fn cancel(&mut self) -> Result<ConfirmKind, EditorError> {
        let pending = self.pending.take().ok_or(EditorError::NothingPending)?;
        tracing::debug!(kind = ?pending.kind, "confirmation cancelled");
        Ok(pending.kind)
    }

    /// Runs the pending confirmation's continuation.
    ///
    /// A confirmed save calls `gateway`; on failure the edit stays selected
    /// and dirty so the user can retry.
    ///
    /// # Errors
    ///
    /// - [`EditorError::NothingPending`] if nothing is waiting.
    /// - [`EditorError::Persistence`] if the save call fails.
    pub async fn confirm<G: StoreGateway>(&mut self, gateway: &G) -> Result<(), EditorError> {
        let pending = self.pending.take().ok_or(EditorError::NothingPending)?;
        tracing::debug!(kind = ?pending.kind, "confirmation accepted");
        match pending.continuation {
            Continuation::Select(store_id) => self.select(store_id, true).map(|_| ()),
            Continuation::Unselect => self.unselect(true).map(|_| ()),
            Continuation::RemoveRadius => self.clear_geofence(),
            Continuation::Persist => self.persist(gateway).await,
        }
    }

    /// Records the outcome of overlap resolution for `candidate`, the path the
    /// user drew or edited for `store_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NotSelected`] unless `store_id` is being edited.
    pub fn apply_resolution(
        &mut self,
        store_id: StoreId,
        candidate: &[LatLng],
        resolution: &Resolution,
    ) -> Result<(), EditorError> {
        if self.selected_store() != Some(store_id) {
            return Err(EditorError::NotSelected(store_id));
        }
        match resolution.disposition() {
            Disposition::Ignore => return Ok(()),
            Disposition::Discard => {}
            Disposition::Accept => {
                let vertices = resolution.accepted_vertices().unwrap_or(candidate).to_vec();
                self.update_selected(vertices, true)?;
            }
            Disposition::KeepInvalid => {
                self.update_selected(candidate.to_vec(), false)?;
            }
        }
        if let Some(message) = resolution.message() {
            tracing::info!(%store_id, message, "polygon edit rejected");
            self.notices.push(Notice::error(message));
        }
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_dirty)
    }

    fn ensure_no_pending(&self) -> Result<(), EditorError> {
        if self.pending.is_some() {
            return Err(EditorError::ConfirmationPending);
        }
        Ok(())
    }

    fn park(&mut self, kind: ConfirmKind, continuation: Continuation) -> Transition {
        tracing::debug!(?kind, "awaiting confirmation");
        self.pending = Some(PendingConfirmation { kind, continuation });
        Transition::AwaitingConfirmation(kind)
    }

    /// Ends the session, restoring the store's original geofence if dirty.
    fn close_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if session.is_dirty || !session.is_valid {
            let original = self
                .original
                .coordinates(session.store_id)
                .map(<[LatLng]>::to_vec)
                .unwrap_or_default();
            if self.stores.set_coordinates(session.store_id, original).is_ok() {
                tracing::info!(store_id = %session.store_id, "discarded unsaved geofence edit");
            }
        }
    }

    fn update_selected(&mut self, vertices: Vec<LatLng>, valid: bool) -> Result<(), EditorError> {
        let session = self.session.as_mut().ok_or(EditorError::NoSelection)?;
        session.is_dirty = vertices != session.snapshot;
        session.is_valid = valid;
        self.stores.set_coordinates(session.store_id, vertices)
    }

    fn clear_geofence(&mut self) -> Result<(), EditorError> {
        self.update_selected(Vec::new(), true)?;
        self.notices.push(Notice::info("Store radius removed, save to apply"));
        Ok(())
    }

    async fn persist<G: StoreGateway>(&mut self, gateway: &G) -> Result<(), EditorError> {
        let session = self.session.as_ref().ok_or(EditorError::NoSelection)?;
        let store_id = session.store_id;
        let coordinates = self
            .stores
            .coordinates(store_id)
            .map(<[LatLng]>::to_vec)
            .unwrap_or_default();

        match gateway.save_store_polygon(store_id, &coordinates).await {
            Ok(()) => {
                tracing::info!(%store_id, vertices = coordinates.len(), "store geofence saved");
                self.original.set_coordinates(store_id, coordinates)?;
                self.session = None;
                self.notices.push(Notice::info("Store polygon saved"));
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(%store_id, error = %message, "store geofence save failed");
                self.notices.push(Notice::error(message.clone()));
                Err(EditorError::Persistence { store_id, message })
            }
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
