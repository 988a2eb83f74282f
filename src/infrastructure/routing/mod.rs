//! Route provider adapters
//!
//! Every provider sits behind `RouteProvider`, so the core stays
//! testable without network access. Adapter failures surface as
//! `ROUTE_PROVIDER_ERROR` carrying the provider name and upstream
//! status.

pub mod catalog;
mod google;
mod ors;
mod osrm;

pub use google::GoogleProvider;
pub use ors::OrsProvider;
pub use osrm::OsrmProvider;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{RouteProviderKind, RoutingConfig};
use crate::domain::route::{GeoPoint, RouteSummary, TravelMode};
use crate::domain::DomainResult;

/// Per-request timeout on outbound provider calls
pub(crate) const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Distance, duration and polyline for one origin/destination pair
    async fn lookup(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> DomainResult<RouteSummary>;

    /// Name echoed into errors and cache entries
    fn name(&self) -> &'static str;
}

/// Build the configured provider adapter
pub fn make_provider(config: &RoutingConfig) -> DomainResult<Arc<dyn RouteProvider>> {
    let provider: Arc<dyn RouteProvider> = match config.provider {
        RouteProviderKind::Ors => Arc::new(OrsProvider::new(
            config.api_key.clone(),
            config.base_url.clone(),
        )?),
        RouteProviderKind::Osrm => Arc::new(OsrmProvider::new(config.base_url.clone())?),
        RouteProviderKind::Google => Arc::new(GoogleProvider::new(
            config.api_key.clone(),
            config.base_url.clone(),
        )?),
    };
    Ok(provider)
}

pub(crate) fn http_client(provider: &'static str) -> DomainResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(PROVIDER_TIMEOUT)
        .build()
        .map_err(|e| crate::domain::DomainError::RouteProvider {
            provider,
            status: e.to_string(),
        })
}
