//! OSRM adapter (polyline5 geometry)

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::route::{GeoPoint, RouteSummary, TravelMode};
use crate::domain::{DomainError, DomainResult};

use super::{http_client, RouteProvider};

const PROVIDER: &str = "osrm";
const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org";

pub struct OsrmProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OsrmProvider {
    pub fn new(base_url: Option<String>) -> DomainResult<Self> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    fn profile(mode: TravelMode) -> &'static str {
        match mode {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Cycling => "cycling",
        }
    }
}

#[derive(Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: Option<String>,
}

#[async_trait]
impl RouteProvider for OsrmProvider {
    async fn lookup(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> DomainResult<RouteSummary> {
        // OSRM takes lng,lat;lng,lat in the path
        let url = format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=polyline",
            self.base_url,
            Self::profile(mode),
            origin.lng,
            origin.lat,
            destination.lng,
            destination.lat
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::RouteProvider {
                provider: PROVIDER,
                status: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::RouteProvider {
                provider: PROVIDER,
                status: status.to_string(),
            });
        }

        let parsed: OsrmResponse =
            response
                .json()
                .await
                .map_err(|e| DomainError::RouteProvider {
                    provider: PROVIDER,
                    status: e.to_string(),
                })?;
        if parsed.code != "Ok" {
            return Err(DomainError::RouteProvider {
                provider: PROVIDER,
                status: parsed.code,
            });
        }
        let route = parsed
            .routes
            .into_iter()
            .next()
            .ok_or(DomainError::RouteProvider {
                provider: PROVIDER,
                status: "empty route set".to_string(),
            })?;

        Ok(RouteSummary {
            distance_meters: route.distance,
            duration_seconds: route.duration,
            encoded_polyline: route.geometry,
            provider: PROVIDER,
        })
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
