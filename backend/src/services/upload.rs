//! File upload destinations and storage

use std::path::PathBuf;

use serde::Serialize;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::{AppError, AppResult};
use shared::validation::{FileKind, UploadRule};

/// Who may upload to a destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadAccess {
    Public,
    Admin,
}

/// One upload endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadDestination {
    /// Route path segment under `/uploads`
    pub path: &'static str,
    pub rule: UploadRule,
    pub access: UploadAccess,
}

impl UploadDestination {
    const fn new(path: &'static str, rule: UploadRule, access: UploadAccess) -> Self {
        Self { path, rule, access }
    }

    /// Request body limit: the file plus room for multipart framing
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.rule.max_size_bytes())
            .unwrap_or(usize::MAX)
            .saturating_add(1024 * 1024)
    }
}

pub const UPLOAD_DESTINATIONS: &[UploadDestination] = &[
    UploadDestination::new(
        "/business-categories-image",
        UploadRule::new(FileKind::Image, 50, "businessCategories"),
        UploadAccess::Admin,
    ),
    UploadDestination::new(
        "/partners-logo-image",
        UploadRule::new(FileKind::Image, 50, "partnersLogo"),
        UploadAccess::Admin,
    ),
    UploadDestination::new(
        "/team-member-image",
        UploadRule::new(FileKind::Image, 50, "teamMemberImage"),
        UploadAccess::Admin,
    ),
    UploadDestination::new(
        "/home-banner-image",
        UploadRule::new(FileKind::Image, 50, "homeBannerImage"),
        UploadAccess::Admin,
    ),
    UploadDestination::new(
        "/blog-image",
        UploadRule::new(FileKind::Image, 50, "blogImage"),
        UploadAccess::Admin,
    ),
    UploadDestination::new(
        "/service-provider-categories-image",
        UploadRule::new(FileKind::Image, 50, "serviceProviderCategoriesImage"),
        UploadAccess::Admin,
    ),
    UploadDestination::new(
        "/service-providers-image",
        UploadRule::new(FileKind::Image, 50, "serviceProvidersImage"),
        UploadAccess::Admin,
    ),
    UploadDestination::new(
        "/business-image",
        UploadRule::new(FileKind::Image, 50, "businessImage"),
        UploadAccess::Public,
    ),
    UploadDestination::new(
        "/downloads",
        UploadRule::new(FileKind::Document, 100, "downloadsFile"),
        UploadAccess::Admin,
    ),
    UploadDestination::new(
        "/business-profile",
        UploadRule::new(FileKind::Document, 100, "businessProfile"),
        UploadAccess::Public,
    ),
    UploadDestination::new(
        "/incorporation-image",
        UploadRule::new(FileKind::ImageOrDocument, 100, "incorporationProfile"),
        UploadAccess::Public,
    ),
];

/// Where an accepted file ended up
#[derive(Debug, Serialize)]
pub struct StoredFile {
    pub message: String,
    pub file_name: String,
    /// Path relative to the upload root
    pub file_path: String,
    pub url: String,
}

/// Writes accepted files under the upload root
#[derive(Clone)]
pub struct UploadService {
    root: PathBuf,
    public_base_url: String,
}

impl UploadService {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            root: PathBuf::from(&config.dir),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check the file against the rule and write it under a generated name
    pub async fn store(
        &self,
        rule: &UploadRule,
        original_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> AppResult<StoredFile> {
        let ext = rule.check_file(original_name, content_type)?;
        rule.check_size(bytes.len() as u64)?;

        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        let dir = self.root.join(rule.folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to create {}: {}", dir.display(), e)))?;

        let path = dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to write {}: {}", path.display(), e)))?;

        let file_path = format!("{}/{}", rule.folder, file_name);
        tracing::info!(folder = rule.folder, file = %file_name, size = bytes.len(), "Stored upload");

        Ok(StoredFile {
            message: "File uploaded successfully".to_string(),
            url: format!("{}/{}", self.public_base_url, file_path),
            file_name,
            file_path,
        })
    }
}
