//! OpenRouteService adapter

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::domain::route::{GeoPoint, RouteSummary, TravelMode};
use crate::domain::{DomainError, DomainResult};

use super::{http_client, RouteProvider};

const PROVIDER: &str = "ors";
const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

pub struct OrsProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OrsProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> DomainResult<Self> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    fn profile(mode: TravelMode) -> &'static str {
        match mode {
            TravelMode::Driving => "driving-car",
            TravelMode::Walking => "foot-walking",
            TravelMode::Cycling => "cycling-regular",
        }
    }
}

#[derive(Deserialize)]
struct OrsResponse {
    routes: Vec<OrsRoute>,
}

#[derive(Deserialize)]
struct OrsRoute {
    summary: OrsSummary,
    geometry: Option<String>,
}

#[derive(Deserialize)]
struct OrsSummary {
    distance: f64,
    duration: f64,
}

#[async_trait]
impl RouteProvider for OrsProvider {
    async fn lookup(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> DomainResult<RouteSummary> {
        let url = format!(
            "{}/v2/directions/{}",
            self.base_url,
            Self::profile(mode)
        );
        // ORS takes [lng, lat] pairs
        let body = json!({
            "coordinates": [
                [origin.lng, origin.lat],
                [destination.lng, destination.lat]
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&body)
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

        let parsed: OrsResponse =
            response
                .json()
                .await
                .map_err(|e| DomainError::RouteProvider {
                    provider: PROVIDER,
                    status: e.to_string(),
                })?;
        let route = parsed
            .routes
            .into_iter()
            .next()
            .ok_or(DomainError::RouteProvider {
                provider: PROVIDER,
                status: "empty route set".to_string(),
            })?;

        Ok(RouteSummary {
            distance_meters: route.summary.distance,
            duration_seconds: route.summary.duration,
            encoded_polyline: route.geometry,
            provider: PROVIDER,
        })
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
