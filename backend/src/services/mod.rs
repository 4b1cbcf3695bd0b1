//! Business logic services for the MSME Business Directory

pub mod auth;
pub mod msme;
pub mod notification;
pub mod ownership;
pub mod search;
pub mod upload;

pub use auth::AuthService;
pub use msme::MsmeService;
pub use notification::{Notification, NotificationService};
pub use upload::UploadService;
