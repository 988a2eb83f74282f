//! Resource modules: one dto + handlers pair per resource

pub mod auth;
pub mod health;
pub mod maps;
pub mod metrics;
pub mod trips;
pub mod vehicles;

use std::sync::Arc;

use crate::application::routing::RouteCache;
use crate::application::tariff::TariffCalculator;
use crate::application::trips::TripService;
use crate::application::vehicles::VehicleService;
use crate::application::IdentityService;
use crate::config::UploadConfig;
use crate::infrastructure::storage::BlobStore;

/// Unified state shared by every resource handler
#[derive(Clone)]
pub struct ApiState {
    pub identity: Arc<IdentityService>,
    pub vehicles: Arc<VehicleService>,
    pub trips: Arc<TripService>,
    pub tariff: TariffCalculator,
    pub route_cache: Arc<RouteCache>,
    pub blob_store: Arc<dyn BlobStore>,
    pub uploads: UploadConfig,
}
