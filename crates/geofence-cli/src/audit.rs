//! `audit`: checks every stored geofence for self-intersection and every
//! pair of stores for overlapping areas.

use geofence_client::GeofenceClient;
use geofence_core::{AppConfig, Store, StoreId};
use geofence_geometry::{GeometryEngine, PrecisionModel, Validity};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Finding {
    /// The stored ring could not be turned into a polygon at all.
    Unbuildable { store_id: StoreId, reason: String },
    SelfIntersecting {
        store_id: StoreId,
        lat: f64,
        lng: f64,
    },
    /// Two geofences share a positive area, in square degrees.
    Overlap { a: StoreId, b: StoreId, area: f64 },
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Finding::Unbuildable { store_id, reason } => {
                write!(f, "store {store_id}: invalid geofence ({reason})")
            }
            Finding::SelfIntersecting { store_id, lat, lng } => {
                write!(f, "store {store_id}: geofence crosses itself near ({lat}, {lng})")
            }
            Finding::Overlap { a, b, area } => {
                write!(f, "stores {a} and {b}: geofences overlap ({area:.3e} deg²)")
            }
        }
    }
}

/// Audits `stores` without touching the network.
pub(crate) fn audit_stores(engine: &GeometryEngine, stores: &[Store]) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut valid = Vec::new();

    for store in stores.iter().filter(|s| s.has_geofence()) {
        let polygon = match engine.build_polygon(&store.coordinates) {
            Ok(polygon) => polygon,
            Err(e) => {
                findings.push(Finding::Unbuildable {
                    store_id: store.store_id,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        match engine.validate(&polygon) {
            Validity::Valid => valid.push((store.store_id, polygon)),
            Validity::SelfIntersecting { at } => findings.push(Finding::SelfIntersecting {
                store_id: store.store_id,
                lat: at.lat,
                lng: at.lng,
            }),
        }
    }

    for (i, (a, pa)) in valid.iter().enumerate() {
        for (b, pb) in &valid[i + 1..] {
            if !engine.intersects(pa, pb) {
                continue;
            }
            // Neighbours trimmed against each other may share a snapping band.
            let tolerance = engine
                .snapping_tolerance(pa)
                .min(engine.snapping_tolerance(pb));
            match engine.overlap_area(pa, pb) {
                Ok(area) if area > tolerance => findings.push(Finding::Overlap {
                    a: *a,
                    b: *b,
                    area,
                }),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(store_a = %a, store_b = %b, error = %e, "overlap check failed");
                }
            }
        }
    }

    findings
}

/// Fetches the store list and prints every finding.
///
/// # Errors
///
/// Returns an error if the store list cannot be fetched or any issue is found.
pub(crate) async fn run_audit(config: &AppConfig) -> anyhow::Result<()> {
    let client = GeofenceClient::new(config)?;
    let stores = client.list_stores().await?;
    let engine = GeometryEngine::new(PrecisionModel::from_decimals(config.coordinate_decimals));

    let findings = audit_stores(&engine, &stores);
    let with_geofence = stores.iter().filter(|s| s.has_geofence()).count();
    println!(
        "audited {} stores ({with_geofence} with a geofence)",
        stores.len()
    );
    for finding in &findings {
        println!("  {finding}");
    }

    if findings.is_empty() {
        println!("no issues found");
        Ok(())
    } else {
        anyhow::bail!("audit found {} issue(s)", findings.len())
    }
}

#[cfg(test)]
mod tests {
    use geofence_core::LatLng;
    use geofence_geometry::{OverlapResolver, Resolution};

    use super::*;

    fn square(lat: f64, lng: f64, size: f64) -> Vec<LatLng> {
        vec![
            LatLng::new(lat, lng),
            LatLng::new(lat + size, lng),
            LatLng::new(lat + size, lng + size),
            LatLng::new(lat, lng + size),
        ]
    }

    fn store(id: i64, coordinates: Vec<LatLng>) -> Store {
        Store {
            store_id: StoreId(id),
            store_name: format!("Store {id}"),
            coordinates,
        }
    }

    #[test]
    fn clean_layout_has_no_findings() {
        let stores = vec![
            store(1, square(0.0, 0.0, 1.0)),
            store(2, square(0.0, 1.0, 1.0)),
            store(3, vec![]),
        ];
        assert!(audit_stores(&GeometryEngine::default(), &stores).is_empty());
    }

    #[test]
    fn reports_overlapping_pair_once() {
        let stores = vec![
            store(1, square(0.0, 0.0, 1.0)),
            store(2, square(0.5, 0.5, 1.0)),
        ];
        let findings = audit_stores(&GeometryEngine::default(), &stores);
        assert_eq!(findings.len(), 1);
        let Finding::Overlap { a, b, area } = &findings[0] else {
            panic!("expected overlap, got {findings:?}");
        };
        assert_eq!((*a, *b), (StoreId(1), StoreId(2)));
        assert!((area - 0.25).abs() < 1e-9);
    }

    #[test]
    fn trimmed_neighbour_passes_the_audit() {
        let engine = GeometryEngine::default();
        let slanted = vec![
            LatLng::new(-1.0, 0.5),
            LatLng::new(-1.0, 2.0),
            LatLng::new(2.0, 2.0),
            LatLng::new(2.0, 0.6),
        ];
        let resolution = OverlapResolver::new(&engine).resolve(
            &square(0.0, 0.0, 1.0),
            [(StoreId(2), slanted.as_slice())],
        );
        let Resolution::Trimmed { vertices } = resolution else {
            panic!("expected Trimmed, got {resolution:?}");
        };

        let stores = vec![store(1, vertices), store(2, slanted)];
        let findings = audit_stores(&engine, &stores);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn reports_self_intersection_and_skips_it_for_overlaps() {
        let bowtie = vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(1.0, 1.0),
            LatLng::new(1.0, 0.0),
            LatLng::new(0.0, 1.0),
        ];
        let stores = vec![store(1, bowtie), store(2, square(0.0, 0.0, 1.0))];
        let findings = audit_stores(&GeometryEngine::default(), &stores);
        assert_eq!(findings.len(), 1);
        assert!(matches!(
            findings[0],
            Finding::SelfIntersecting { store_id: StoreId(1), .. }
        ));
    }

    #[test]
    fn reports_degenerate_ring() {
        let line = vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(1.0, 1.0),
            LatLng::new(0.0, 0.0),
        ];
        let findings = audit_stores(&GeometryEngine::default(), &[store(4, line)]);
        assert!(matches!(
            findings[0],
            Finding::Unbuildable { store_id: StoreId(4), .. }
        ));
    }

    #[test]
    fn finding_display_names_the_stores() {
        let text = Finding::Overlap {
            a: StoreId(1),
            b: StoreId(2),
            area: 0.25,
        }
        .to_string();
        assert!(text.contains("stores 1 and 2"));
    }
}
