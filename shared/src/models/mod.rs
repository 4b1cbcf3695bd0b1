//! Domain models for the MSME Business Directory

mod business;
mod owner;

pub use business::*;
pub use owner::*;
