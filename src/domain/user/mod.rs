pub mod model;
pub mod repository;

pub use model::{PasswordReset, PaymentMethod, Role, RoleSet, User};
pub use repository::{PasswordResetRepository, UserRepository};
