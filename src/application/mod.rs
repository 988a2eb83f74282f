//! Use-case orchestration on top of the domain and infrastructure
//! facades.

pub mod identity;
pub mod routing;
pub mod tariff;
pub mod trips;
pub mod vehicles;

#[cfg(test)]
mod flows_test;

pub use identity::{IdentityService, InMemoryRevocationStore, TokenRevocationStore};
pub use routing::RouteCache;
pub use tariff::{TariffCalculator, TariffSuggestion};
pub use trips::TripService;
pub use vehicles::VehicleService;
