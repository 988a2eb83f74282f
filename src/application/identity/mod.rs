pub mod revocation;
pub mod service;

pub use revocation::{InMemoryRevocationStore, TokenRevocationStore};
pub use service::{AuthResult, IdentityService, ProfileUpdate, RegisterInput};
