//! HTTP REST API
//!
//! - `common`: error type, validated-JSON and upload extractors
//! - `middleware`: bearer-token authentication with revocation checks
//! - `modules`: one module per resource (dto + handlers)
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use common::ApiError;
pub use router::{create_api_router, create_degraded_router};
