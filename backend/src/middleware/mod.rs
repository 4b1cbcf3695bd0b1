//! Request middleware and extractors

pub mod auth;
pub mod validation;

pub use auth::{auth_middleware, require_admin, AuthUser, CurrentUser};
pub use validation::ValidatedJson;
