//! `resolve`: runs a candidate polygon for one store through the same
//! draw/edit path the map uses, optionally saving the result.

use std::path::Path;

use anyhow::Context;
use geofence_client::GeofenceClient;
use geofence_core::{AppConfig, LatLng, StoreId};
use geofence_editor::{EditorError, EditorSettings, MapEditor, NoticeLevel, Transition};
use geofence_geometry::Resolution;

/// Reads a JSON array of `{"lat", "lng"}` vertices.
pub(crate) fn read_polygon(path: &Path) -> anyhow::Result<Vec<LatLng>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read polygon file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("polygon file {} is not a JSON vertex array", path.display()))
}

/// Selects `store_id` and feeds `candidate` in as an edit of its geofence,
/// or as a fresh drawing when the store has none.
pub(crate) fn apply_candidate(
    map: &mut MapEditor,
    store_id: StoreId,
    candidate: Vec<LatLng>,
) -> anyhow::Result<Resolution> {
    map.select(store_id)?;
    let resolution = match map.overlays().handle_for(store_id) {
        Some(handle) => map.on_drag_end(handle, candidate),
        None => {
            map.enable_drawing();
            map.on_polygon_complete(candidate)
        }
    };
    resolution.with_context(|| format!("store {store_id} is not editable"))
}

fn describe(resolution: &Resolution) -> String {
    match resolution {
        Resolution::ValidAsIs { vertices } => {
            format!("accepted unchanged ({} vertices)", vertices.len())
        }
        Resolution::Trimmed { vertices } => {
            format!("trimmed against neighbouring stores ({} vertices)", vertices.len())
        }
        other => other
            .message()
            .map_or_else(|| format!("{other:?}"), str::to_owned),
    }
}

fn print_notices(map: &mut MapEditor) {
    for notice in map.drain_notices() {
        let level = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        println!("  [{level}] {}", notice.message);
    }
}

/// Loads the stores, resolves the polygon in `polygon_path` for `store_id`
/// and, with `save`, confirms and persists the result.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the stores cannot be loaded,
/// the store is unknown, the result is invalid while `save` is set, or the
/// save call fails.
pub(crate) async fn run_resolve(
    config: &AppConfig,
    store_id: i64,
    polygon_path: &Path,
    save: bool,
) -> anyhow::Result<()> {
    let candidate = read_polygon(polygon_path)?;
    let client = GeofenceClient::new(config)?;
    let settings = EditorSettings::from_config(config);
    let mut map = MapEditor::load(&client, &settings).await?;

    let store_id = StoreId(store_id);
    let resolution = apply_candidate(&mut map, store_id, candidate)?;
    println!("store {store_id}: {}", describe(&resolution));
    if let Some(vertices) = resolution.accepted_vertices() {
        println!("{}", serde_json::to_string_pretty(vertices)?);
    }
    print_notices(&mut map);

    if !save {
        return Ok(());
    }
    if !resolution.is_valid() {
        anyhow::bail!("resolved polygon for store {store_id} is not valid; nothing saved");
    }

    match map.request_save() {
        Ok(Transition::AwaitingConfirmation(kind)) => {
            tracing::info!(%store_id, ?kind, "confirming save");
            map.confirm(&client).await?;
        }
        Ok(Transition::Done) => {}
        Err(EditorError::NotDirty) => {
            println!("store {store_id}: geofence unchanged, nothing to save");
        }
        Err(e) => return Err(e.into()),
    }
    print_notices(&mut map);
    Ok(())
}
