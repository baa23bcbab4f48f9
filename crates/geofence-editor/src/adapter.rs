//! Draw/edit adapter between the map widget and the editor.
//!
//! Widget events arrive here: a finished drawing, vertex path mutations,
//! drag start/end, clicks. Path mutations are debounced; a drag end resolves
//! immediately. After every resolution or user action the overlay table is
//! reconciled with the polygon store so that the map always shows stored
//! coordinates, styled by selection and validity.

use std::time::Instant;

use geofence_core::{LatLng, StoreGateway, StoreId};
use geofence_geometry::{Disposition, GeometryEngine, OverlapResolver, Resolution};

use crate::debounce::Debouncer;
use crate::error::EditorError;
use crate::notice::Notice;
use crate::overlay::{OverlayHandle, OverlayStyle, OverlayTable};
use crate::session::{GeofenceEditor, Transition};
use crate::settings::EditorSettings;

/// Whether a resolution was triggered by a new drawing or an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Add,
    Update,
}

#[derive(Debug)]
pub struct MapEditor {
    editor: GeofenceEditor,
    engine: GeometryEngine,
    overlays: OverlayTable,
    debouncer: Debouncer<OverlayHandle>,
    dragging: Option<OverlayHandle>,
    drawing: bool,
}

impl MapEditor {
    #[must_use]
    pub fn new(editor: GeofenceEditor, settings: &EditorSettings) -> Self {
        let mut map = Self {
            editor,
            engine: GeometryEngine::new(settings.precision),
            overlays: OverlayTable::new(),
            debouncer: Debouncer::new(settings.debounce),
            dragging: None,
            drawing: false,
        };
        map.reconcile();
        map
    }

    /// Loads the store list through `gateway` and puts every geofence on the map.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Load`] if the store list cannot be fetched.
    pub async fn load<G: StoreGateway>(
        gateway: &G,
        settings: &EditorSettings,
    ) -> Result<Self, EditorError> {
        let editor = GeofenceEditor::load(gateway, settings.default_center).await?;
        Ok(Self::new(editor, settings))
    }

    #[must_use]
    pub fn editor(&self) -> &GeofenceEditor {
        &self.editor
    }

    #[must_use]
    pub fn overlays(&self) -> &OverlayTable {
        &self.overlays
    }

    #[must_use]
    pub fn drawing_enabled(&self) -> bool {
        self.drawing
    }

    /// When the next debounced resolution is due, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.editor.drain_notices()
    }

    /// Arms the drawing tool. Only a selected store without a geofence may
    /// draw one, and never while a confirmation is open.
    pub fn enable_drawing(&mut self) -> bool {
        let can_draw = self.editor.pending_confirmation().is_none()
            && self
                .editor
                .selected_store()
                .and_then(|id| self.editor.stores().coordinates(id))
                .is_some_and(<[LatLng]>::is_empty);
        self.drawing = can_draw;
        can_draw
    }

    // -----------------------------------------------------------------------
    // Widget events
    // -----------------------------------------------------------------------

    /// A polygon drawing was finished on the map.
    ///
    /// Without a selected store (or an armed drawing tool) the shape is
    /// dropped immediately and `None` is returned.
    pub fn on_polygon_complete(&mut self, path: Vec<LatLng>) -> Option<Resolution> {
        let Some(store_id) = self.editor.selected_store() else {
            tracing::debug!("discarding polygon drawn with no store selected");
            return None;
        };
        if !self.drawing {
            tracing::debug!(%store_id, "discarding polygon drawn while drawing is disabled");
            return None;
        }
        let handle = self.overlays.create(store_id, path, OverlayStyle::editing(true));
        self.overlays.attach(handle);
        self.resolve(handle, ActionKind::Add)
    }

    /// A vertex was moved, inserted or removed. Returns `true` when a
    /// debounced resolution was scheduled.
    pub fn on_path_changed(
        &mut self,
        handle: OverlayHandle,
        path: Vec<LatLng>,
        now: Instant,
    ) -> bool {
        if !self.overlays.set_path(handle, path) {
            return false;
        }
        if self.dragging == Some(handle) {
            return false;
        }
        self.debouncer.touch(handle, now);
        true
    }

    pub fn on_drag_start(&mut self, handle: OverlayHandle) {
        self.dragging = Some(handle);
        self.debouncer.cancel(handle);
    }

    /// The drag gesture is the settle point, so this resolves immediately.
    pub fn on_drag_end(&mut self, handle: OverlayHandle, path: Vec<LatLng>) -> Option<Resolution> {
        if self.dragging == Some(handle) {
            self.dragging = None;
        }
        self.debouncer.cancel(handle);
        if !self.overlays.set_path(handle, path) {
            return None;
        }
        self.resolve(handle, ActionKind::Update)
    }

    /// Selects the store owning the clicked overlay.
    ///
    /// # Errors
    ///
    /// Same as [`GeofenceEditor::select`]; an unknown handle is ignored.
    pub fn on_overlay_click(&mut self, handle: OverlayHandle) -> Result<Transition, EditorError> {
        match self.overlays.owner(handle) {
            Some(store_id) => self.select(store_id),
            None => Ok(Transition::Done),
        }
    }

    /// Runs every debounced resolution whose settle window has elapsed.
    pub fn tick(&mut self, now: Instant) -> Vec<Resolution> {
        self.debouncer
            .take_due(now)
            .into_iter()
            .filter_map(|handle| self.resolve(handle, ActionKind::Update))
            .collect()
    }

    // -----------------------------------------------------------------------
    // User actions
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Same as [`GeofenceEditor::select`].
    pub fn select(&mut self, store_id: StoreId) -> Result<Transition, EditorError> {
        self.flush();
        let result = self.editor.select(store_id, false);
        self.reconcile();
        result
    }

    /// # Errors
    ///
    /// Same as [`GeofenceEditor::unselect`].
    pub fn unselect(&mut self) -> Result<Transition, EditorError> {
        self.flush();
        let result = self.editor.unselect(false);
        self.reconcile();
        result
    }

    /// # Errors
    ///
    /// Same as [`GeofenceEditor::request_save`].
    pub fn request_save(&mut self) -> Result<Transition, EditorError> {
        self.flush();
        let result = self.editor.request_save();
        self.reconcile();
        result
    }

    /// # Errors
    ///
    /// Same as [`GeofenceEditor::request_discard`].
    pub fn request_discard(&mut self) -> Result<Transition, EditorError> {
        self.flush();
        let result = self.editor.request_discard();
        self.reconcile();
        result
    }

    /// # Errors
    ///
    /// Same as [`GeofenceEditor::request_remove_radius`].
    pub fn request_remove_radius(&mut self) -> Result<Transition, EditorError> {
        self.flush();
        let result = self.editor.request_remove_radius();
        self.reconcile();
        result
    }

    /// # Errors
    ///
    /// Same as [`GeofenceEditor::cancel`].
    pub fn cancel(&mut self) -> Result<(), EditorError> {
        let result = self.editor.cancel().map(|_| ());
        self.reconcile();
        result
    }

    /// # Errors
    ///
    /// Same as [`GeofenceEditor::confirm`].
    pub async fn confirm<G: StoreGateway>(&mut self, gateway: &G) -> Result<(), EditorError> {
        let result = self.editor.confirm(gateway).await;
        self.reconcile();
        result
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Settles pending debounced edits before an action reads the store.
    fn flush(&mut self) {
        for handle in self.debouncer.take_all() {
            self.resolve(handle, ActionKind::Update);
        }
    }

    fn resolve(&mut self, handle: OverlayHandle, kind: ActionKind) -> Option<Resolution> {
        let store_id = self.overlays.owner(handle)?;
        if self.editor.selected_store() != Some(store_id)
            || self.editor.pending_confirmation().is_some()
        {
            tracing::debug!(%store_id, "ignoring edit of a polygon that is not editable");
            self.reconcile();
            return None;
        }

        let candidate = self.overlays.get_path(handle)?.to_vec();
        let resolution = OverlapResolver::new(&self.engine)
            .resolve(&candidate, self.editor.stores().other_polygons(store_id));
        tracing::debug!(%store_id, ?kind, ?resolution, "resolved polygon edit");

        // An unfinished ring is not an edit yet.
        if resolution.disposition() == Disposition::Ignore {
            return Some(resolution);
        }

        if let Err(e) = self
            .editor
            .apply_resolution(store_id, &candidate, &resolution)
        {
            tracing::warn!(%store_id, error = %e, "could not apply polygon edit");
        }
        if kind == ActionKind::Add {
            self.drawing = false;
        }
        self.reconcile();
        Some(resolution)
    }

    /// Brings overlays in line with the polygon store: one attached overlay
    /// per store with a geofence, the selected one styled for editing.
    fn reconcile(&mut self) {
        let selected = self.editor.selected_store();
        let confirming = self.editor.pending_confirmation().is_some();
        let valid = self.editor.session().is_none_or(|s| s.is_valid);

        for store in self.editor.stores().iter() {
            let existing = self.overlays.handle_for(store.store_id);
            if !store.has_geofence() {
                if let Some(handle) = existing {
                    self.overlays.detach(handle);
                    self.overlays.remove(handle);
                    self.debouncer.cancel(handle);
                }
                continue;
            }

            let handle = match existing {
                Some(handle) => {
                    if self.overlays.get_path(handle) != Some(store.coordinates.as_slice()) {
                        self.overlays.set_path(handle, store.coordinates.clone());
                    }
                    handle
                }
                None => self.overlays.create(
                    store.store_id,
                    store.coordinates.clone(),
                    OverlayStyle::idle(),
                ),
            };

            let style = if selected != Some(store.store_id) {
                OverlayStyle::idle()
            } else if confirming {
                OverlayStyle {
                    editable: false,
                    draggable: false,
                    ..OverlayStyle::editing(valid)
                }
            } else {
                OverlayStyle::editing(valid)
            };
            self.overlays.set_style(handle, style);
            self.overlays.attach(handle);
        }

        let selected_has_geofence = selected
            .and_then(|id| self.editor.stores().coordinates(id))
            .is_none_or(|c| !c.is_empty());
        if confirming || selected_has_geofence {
            self.drawing = false;
        }
    }
}

#[cfg(test)]
#[path = "adapter_test.rs"]
mod tests;
