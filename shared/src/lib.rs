//! Shared types and models for the MSME Business Directory
//!
//! This crate contains types shared between the backend, the browser (via WASM),
//! and other components of the system. Everything here is free of I/O so the
//! business rules can be exercised without a database or HTTP layer.

pub mod models;
pub mod search;
pub mod types;
pub mod validation;

pub use models::*;
pub use search::*;
pub use types::*;
pub use validation::*;
