//! Database models for the MSME Business Directory
//!
//! Re-exports models from the shared crate and adds the table rows

mod admin;
mod business;
mod director;
mod owner;

pub use admin::*;
pub use business::*;
pub use director::*;
pub use owner::*;
pub use shared::models::*;
