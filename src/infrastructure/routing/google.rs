//! Google Directions adapter
//!
//! Aggregates all legs of the first route; duration prefers
//! `duration_in_traffic` when the API returns it.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::route::{GeoPoint, RouteSummary, TravelMode};
use crate::domain::{DomainError, DomainResult};

use super::{http_client, RouteProvider};

const PROVIDER: &str = "google";
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

pub struct GoogleProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> DomainResult<Self> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    fn mode(mode: TravelMode) -> &'static str {
        match mode {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Cycling => "bicycling",
        }
    }
}

#[derive(Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
    overview_polyline: Option<OverviewPolyline>,
}

#[derive(Deserialize)]
struct OverviewPolyline {
    points: String,
}

#[derive(Deserialize)]
struct DirectionsLeg {
    distance: ValueField,
    duration: ValueField,
    duration_in_traffic: Option<ValueField>,
}

#[derive(Deserialize)]
struct ValueField {
    value: f64,
}

#[async_trait]
impl RouteProvider for GoogleProvider {
    async fn lookup(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> DomainResult<RouteSummary> {
        let url = format!("{}/maps/api/directions/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("origin", format!("{},{}", origin.lat, origin.lng)),
                (
                    "destination",
                    format!("{},{}", destination.lat, destination.lng),
                ),
                ("mode", Self::mode(mode).to_string()),
                ("departure_time", "now".to_string()),
                ("key", self.api_key.clone()),
            ])
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

        let parsed: DirectionsResponse =
            response
                .json()
                .await
                .map_err(|e| DomainError::RouteProvider {
                    provider: PROVIDER,
                    status: e.to_string(),
                })?;
        if parsed.status != "OK" {
            return Err(DomainError::RouteProvider {
                provider: PROVIDER,
                status: parsed.status,
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

        let distance_meters: f64 = route.legs.iter().map(|l| l.distance.value).sum();
        let duration_seconds: f64 = route
            .legs
            .iter()
            .map(|l| {
                l.duration_in_traffic
                    .as_ref()
                    .map(|d| d.value)
                    .unwrap_or(l.duration.value)
            })
            .sum();

        Ok(RouteSummary {
            distance_meters,
            duration_seconds,
            encoded_polyline: route.overview_polyline.map(|p| p.points),
            provider: PROVIDER,
        })
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
