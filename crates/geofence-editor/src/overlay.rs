//! Side-table of map overlays.
//!
//! The map widget's polygon objects are referred to by an opaque
//! [`OverlayHandle`]; everything the editor needs to know about them (owning
//! store, current path, style, whether they are on the map) lives here rather
//! than on the widget objects themselves.

use std::collections::HashMap;

use geofence_core::{LatLng, StoreId};

pub const EDIT_VALID_COLOR: &str = "#14b8a6";
pub const EDIT_INVALID_COLOR: &str = "#ef4444";
pub const IDLE_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    pub editable: bool,
    pub draggable: bool,
    pub stroke_color: &'static str,
    pub fill_color: &'static str,
}

impl OverlayStyle {
    /// Style of a polygon that is not being edited.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            editable: false,
            draggable: false,
            stroke_color: IDLE_COLOR,
            fill_color: IDLE_COLOR,
        }
    }

    /// Style of the polygon under edit, colored by geometric validity.
    #[must_use]
    pub const fn editing(valid: bool) -> Self {
        let color = if valid {
            EDIT_VALID_COLOR
        } else {
            EDIT_INVALID_COLOR
        };
        Self {
            editable: true,
            draggable: true,
            stroke_color: color,
            fill_color: color,
        }
    }
}

#[derive(Debug, Clone)]
struct OverlayEntry {
    store_id: StoreId,
    path: Vec<LatLng>,
    style: OverlayStyle,
    attached: bool,
}

/// One overlay per store, keyed both ways.
#[derive(Debug, Default)]
pub struct OverlayTable {
    next_id: u64,
    entries: HashMap<OverlayHandle, OverlayEntry>,
    by_store: HashMap<StoreId, OverlayHandle>,
}

impl OverlayTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached overlay for `store_id`, replacing any existing one.
    pub fn create(
        &mut self,
        store_id: StoreId,
        path: Vec<LatLng>,
        style: OverlayStyle,
    ) -> OverlayHandle {
        if let Some(old) = self.by_store.get(&store_id).copied() {
            self.remove(old);
        }
        self.next_id += 1;
        let handle = OverlayHandle(self.next_id);
        self.entries.insert(
            handle,
            OverlayEntry {
                store_id,
                path,
                style,
                attached: false,
            },
        );
        self.by_store.insert(store_id, handle);
        handle
    }

    #[must_use]
    pub fn handle_for(&self, store_id: StoreId) -> Option<OverlayHandle> {
        self.by_store.get(&store_id).copied()
    }

    #[must_use]
    pub fn owner(&self, handle: OverlayHandle) -> Option<StoreId> {
        self.entries.get(&handle).map(|e| e.store_id)
    }

    #[must_use]
    pub fn get_path(&self, handle: OverlayHandle) -> Option<&[LatLng]> {
        self.entries.get(&handle).map(|e| e.path.as_slice())
    }

    /// Returns `false` if the handle is unknown.
    pub fn set_path(&mut self, handle: OverlayHandle, path: Vec<LatLng>) -> bool {
        let Some(entry) = self.entries.get_mut(&handle) else {
            return false;
        };
        entry.path = path;
        true
    }

    #[must_use]
    pub fn style(&self, handle: OverlayHandle) -> Option<OverlayStyle> {
        self.entries.get(&handle).map(|e| e.style)
    }

    pub fn set_style(&mut self, handle: OverlayHandle, style: OverlayStyle) -> bool {
        let Some(entry) = self.entries.get_mut(&handle) else {
            return false;
        };
        entry.style = style;
        true
    }

    pub fn attach(&mut self, handle: OverlayHandle) -> bool {
        self.set_attached(handle, true)
    }

    pub fn detach(&mut self, handle: OverlayHandle) -> bool {
        self.set_attached(handle, false)
    }

    #[must_use]
    pub fn is_attached(&self, handle: OverlayHandle) -> bool {
        self.entries.get(&handle).is_some_and(|e| e.attached)
    }

    /// Detaches and forgets the overlay.
    pub fn remove(&mut self, handle: OverlayHandle) -> bool {
        match self.entries.remove(&handle) {
            Some(entry) => {
                self.by_store.remove(&entry.store_id);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn set_attached(&mut self, handle: OverlayHandle, attached: bool) -> bool {
        let Some(entry) = self.entries.get_mut(&handle) else {
            return false;
        };
        entry.attached = attached;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> Vec<LatLng> {
        vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(1.0, 1.0),
        ]
    }

    #[test]
    fn create_registers_both_directions() {
        let mut table = OverlayTable::new();
        let h = table.create(StoreId(4), path(), OverlayStyle::idle());
        assert_eq!(table.handle_for(StoreId(4)), Some(h));
        assert_eq!(table.owner(h), Some(StoreId(4)));
        assert_eq!(table.get_path(h), Some(path().as_slice()));
        assert!(!table.is_attached(h));
    }

    #[test]
    fn create_replaces_the_previous_overlay_of_a_store() {
        let mut table = OverlayTable::new();
        let first = table.create(StoreId(4), path(), OverlayStyle::idle());
        let second = table.create(StoreId(4), vec![], OverlayStyle::idle());
        assert_ne!(first, second);
        assert_eq!(table.len(), 1);
        assert_eq!(table.owner(first), None);
    }

    #[test]
    fn attach_detach_and_remove() {
        let mut table = OverlayTable::new();
        let h = table.create(StoreId(1), path(), OverlayStyle::idle());
        assert!(table.attach(h));
        assert!(table.is_attached(h));
        assert!(table.detach(h));
        assert!(!table.is_attached(h));
        assert!(table.remove(h));
        assert!(table.handle_for(StoreId(1)).is_none());
        assert!(!table.set_path(h, path()));
        assert!(!table.remove(h));
    }

    #[test]
    fn editing_style_tracks_validity() {
        assert_eq!(OverlayStyle::editing(true).stroke_color, EDIT_VALID_COLOR);
        assert_eq!(OverlayStyle::editing(false).fill_color, EDIT_INVALID_COLOR);
        assert!(OverlayStyle::editing(false).editable);
        assert!(!OverlayStyle::idle().draggable);
    }
}
