//! Static Transmilenio catalog
//!
//! The northern-corridor slice relevant to campus commutes. Stops double
//! as the snap targets for stops-shaped trip creation; stations and
//! routes feed the public lookup endpoints.

use serde::Serialize;

use crate::domain::route::Stop;

/// Trunk line serving the catalog
#[derive(Debug, Clone, Serialize)]
pub struct TransmilenioRoute {
    pub id: &'static str,
    pub name: &'static str,
    pub stations: &'static [&'static str],
}

/// Northern Autopista Norte corridor, south-bound order
pub const STOPS: &[Stop] = &[
    Stop { id: "portal_norte", name: "Portal Norte", lat: 4.7546, lng: -74.0459 },
    Stop { id: "toberin", name: "Toberín", lat: 4.7462, lng: -74.0469 },
    Stop { id: "cardio_infantil", name: "Cardio Infantil", lat: 4.7399, lng: -74.0482 },
    Stop { id: "mazuren", name: "Mazurén", lat: 4.7329, lng: -74.0497 },
    Stop { id: "calle_146", name: "Calle 146", lat: 4.7268, lng: -74.0510 },
    Stop { id: "calle_142", name: "Calle 142", lat: 4.7211, lng: -74.0522 },
    Stop { id: "alcala", name: "Alcalá", lat: 4.7143, lng: -74.0536 },
    Stop { id: "prado", name: "Prado", lat: 4.7071, lng: -74.0550 },
    Stop { id: "calle_127", name: "Calle 127", lat: 4.7032, lng: -74.0558 },
    Stop { id: "pepe_sierra", name: "Pepe Sierra", lat: 4.6950, lng: -74.0575 },
    Stop { id: "calle_106", name: "Calle 106", lat: 4.6892, lng: -74.0586 },
    Stop { id: "calle_100", name: "Calle 100", lat: 4.6826, lng: -74.0599 },
];

/// Stations are the stops with full platform infrastructure; on this
/// corridor slice that is every stop.
pub fn stations() -> &'static [Stop] {
    STOPS
}

pub const ROUTES: &[TransmilenioRoute] = &[
    TransmilenioRoute {
        id: "B74",
        name: "Portal Norte - Calle 100",
        stations: &[
            "portal_norte",
            "toberin",
            "mazuren",
            "calle_146",
            "calle_127",
            "calle_100",
        ],
    },
    TransmilenioRoute {
        id: "D70",
        name: "Portal Norte (expreso)",
        stations: &["portal_norte", "calle_146", "calle_100"],
    },
    TransmilenioRoute {
        id: "B13",
        name: "Portal Norte - Pepe Sierra",
        stations: &[
            "portal_norte",
            "cardio_infantil",
            "alcala",
            "prado",
            "pepe_sierra",
        ],
    },
];

/// Find one stop by id
pub fn find_stop(id: &str) -> Option<&'static Stop> {
    STOPS.iter().find(|s| s.id == id)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_ids_are_unique() {
        let mut ids: Vec<_> = STOPS.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), STOPS.len());
    }

    #[test]
    fn route_stations_exist() {
        for route in ROUTES {
            for station in route.stations {
                assert!(find_stop(station).is_some(), "unknown station {station}");
            }
        }
    }

    #[test]
    fn find_stop_by_id() {
        assert_eq!(find_stop("portal_norte").unwrap().name, "Portal Norte");
        assert!(find_stop("nowhere").is_none());
    }
}
