//! Polyline-to-stop snapping
//!
//! Pure function used by the stops-shaped trip creation: every route
//! point snaps to its nearest known stop; the result is deduplicated by
//! stop id preserving traversal order.

use crate::domain::route::{GeoPoint, Stop};

/// Snap each route point to the nearest stop, deduplicating by stop id
/// in traversal order. Empty when either input is empty.
pub fn snap_route_to_stops(route: &[GeoPoint], stops: &'static [Stop]) -> Vec<&'static Stop> {
    if stops.is_empty() {
        return Vec::new();
    }

    let mut seen = Vec::new();
    let mut result: Vec<&'static Stop> = Vec::new();
    for point in route {
        let nearest = stops
            .iter()
            .min_by(|a, b| {
                let da = point.distance_meters(&GeoPoint::new(a.lat, a.lng));
                let db = point.distance_meters(&GeoPoint::new(b.lat, b.lng));
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("stops is non-empty");
        if !seen.contains(&nearest.id) {
            seen.push(nearest.id);
            result.push(nearest);
        }
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::routing::catalog::STOPS;

    fn near(stop_id: &str, dlat: f64, dlng: f64) -> GeoPoint {
        let stop = STOPS.iter().find(|s| s.id == stop_id).unwrap();
        GeoPoint::new(stop.lat + dlat, stop.lng + dlng)
    }

    #[test]
    fn empty_route_snaps_to_nothing() {
        assert!(snap_route_to_stops(&[], STOPS).is_empty());
    }

    #[test]
    fn points_snap_to_their_nearest_stop() {
        let route = vec![near("portal_norte", 0.0005, 0.0), near("calle_146", -0.0004, 0.0)];
        let snapped = snap_route_to_stops(&route, STOPS);
        assert_eq!(snapped.len(), 2);
        assert_eq!(snapped[0].id, "portal_norte");
        assert_eq!(snapped[1].id, "calle_146");
    }

    #[test]
    fn duplicates_collapse_preserving_order() {
        let route = vec![
            near("portal_norte", 0.0001, 0.0),
            near("portal_norte", -0.0001, 0.0),
            near("toberin", 0.0001, 0.0),
            near("portal_norte", 0.0002, 0.0),
        ];
        let snapped = snap_route_to_stops(&route, STOPS);
        let ids: Vec<_> = snapped.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["portal_norte", "toberin"]);
    }

    #[test]
    fn traversal_order_is_kept_not_geographic_order() {
        // South-to-north route: stops must come out south-first
        let route = vec![near("calle_100", 0.0001, 0.0), near("portal_norte", 0.0001, 0.0)];
        let snapped = snap_route_to_stops(&route, STOPS);
        let ids: Vec<_> = snapped.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["calle_100", "portal_norte"]);
    }

    #[test]
    fn deterministic() {
        let route = vec![near("mazuren", 0.0003, 0.0001), near("prado", 0.0002, -0.0001)];
        let a = snap_route_to_stops(&route, STOPS);
        let b = snap_route_to_stops(&route, STOPS);
        assert_eq!(
            a.iter().map(|s| s.id).collect::<Vec<_>>(),
            b.iter().map(|s| s.id).collect::<Vec<_>>()
        );
    }
}
