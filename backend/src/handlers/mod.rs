//! HTTP handlers for the MSME Business Directory

pub mod auth;
pub mod health;
pub mod msme;
pub mod upload;

pub use auth::*;
pub use health::*;
pub use msme::*;
pub use upload::*;

use serde::Deserialize;
use shared::Pagination;

/// `page` / `limit` query parameters; unparseable values fall back to defaults
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_raw(self.page.as_deref(), self.limit.as_deref())
    }
}
