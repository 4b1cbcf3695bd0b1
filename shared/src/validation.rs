//! Validation utilities for the MSME Business Directory
//!
//! Pure business rules shared by the backend and the browser build: ownership
//! structure checks, owner gender summaries, upload restrictions and
//! credential formats.

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Gender, GenderSummary, OwnerInput, OwnershipType};

// ============================================================================
// Ownership Validations
// ============================================================================

/// Why a set of owners does not fit the declared ownership type
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OwnershipError {
    #[error("Ownership type is required when owners are provided")]
    MissingOwnershipType,

    #[error("Invalid ownership type: {0}. Expected Individual or Partnership")]
    UnknownOwnershipType(String),

    #[error("At least one owner is required")]
    NoOwners,

    #[error("Owner {index} has an invalid gender: {value}. Expected Male or Female")]
    InvalidGender { index: usize, value: String },

    #[error("Individual ownership must have exactly one owner, got {0}")]
    IndividualOwnerCount(usize),

    #[error("Partnership ownership must have at least two owners, got {0}")]
    PartnershipOwnerCount(usize),
}

/// Check that the owners match the declared ownership type
pub fn validate_ownership(
    ownership_type: Option<&str>,
    owners: &[OwnerInput],
) -> Result<OwnershipType, OwnershipError> {
    let raw_type = ownership_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(OwnershipError::MissingOwnershipType)?;
    let ownership: OwnershipType = raw_type
        .parse()
        .map_err(|_| OwnershipError::UnknownOwnershipType(raw_type.to_string()))?;

    if owners.is_empty() {
        return Err(OwnershipError::NoOwners);
    }

    for (index, owner) in owners.iter().enumerate() {
        if owner.gender.trim().parse::<Gender>().is_err() {
            return Err(OwnershipError::InvalidGender {
                index: index + 1,
                value: owner.gender.clone(),
            });
        }
    }

    let count = owners.len();
    let (min, max) = ownership.owner_count_bounds();
    let within = count >= min && max.map_or(true, |max| count <= max);
    if !within {
        return Err(match ownership {
            OwnershipType::Individual => OwnershipError::IndividualOwnerCount(count),
            OwnershipType::Partnership => OwnershipError::PartnershipOwnerCount(count),
        });
    }

    Ok(ownership)
}

/// Summarize owner genders; `None` when there are no recognizable owners
pub fn compute_gender_summary(owners: &[OwnerInput]) -> Option<GenderSummary> {
    let genders: HashSet<Gender> = owners
        .iter()
        .filter_map(|o| o.gender.trim().parse().ok())
        .collect();

    match (genders.contains(&Gender::Male), genders.contains(&Gender::Female)) {
        (true, true) => Some(GenderSummary::Both),
        (true, false) => Some(GenderSummary::Male),
        (false, true) => Some(GenderSummary::Female),
        (false, false) => None,
    }
}

// ============================================================================
// Upload Validations
// ============================================================================

/// Accepted extensions for image uploads
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Accepted extensions for document uploads
pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "csv",
];

const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "text/csv",
];

/// Category of file an upload destination accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Document,
    ImageOrDocument,
}

impl FileKind {
    pub fn label(self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Document => "document",
            FileKind::ImageOrDocument => "image-document",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "image" => Some(FileKind::Image),
            "document" => Some(FileKind::Document),
            "image-document" => Some(FileKind::ImageOrDocument),
            _ => None,
        }
    }

    fn accepts_extension(self, ext: &str) -> bool {
        let image = IMAGE_EXTENSIONS.contains(&ext);
        let document = DOCUMENT_EXTENSIONS.contains(&ext);
        match self {
            FileKind::Image => image,
            FileKind::Document => document,
            FileKind::ImageOrDocument => image || document,
        }
    }

    fn accepts_mime(self, mime: &str) -> bool {
        let image = IMAGE_MIME_TYPES.contains(&mime);
        let document = DOCUMENT_MIME_TYPES.contains(&mime);
        match self {
            FileKind::Image => image,
            FileKind::Document => document,
            FileKind::ImageOrDocument => image || document,
        }
    }
}

/// Restrictions for one upload destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadRule {
    pub kind: FileKind,
    pub max_size_mb: u64,
    /// Folder under the upload root the file is stored in
    pub folder: &'static str,
}

impl UploadRule {
    pub const fn new(kind: FileKind, max_size_mb: u64, folder: &'static str) -> Self {
        Self {
            kind,
            max_size_mb,
            folder,
        }
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb * 1024 * 1024
    }

    /// Check a file name and declared content type; returns the lowercased extension
    pub fn check_file(&self, file_name: &str, content_type: Option<&str>) -> Result<String, UploadError> {
        let ext = file_extension(file_name).ok_or_else(|| UploadError::MissingExtension(file_name.to_string()))?;
        if !self.kind.accepts_extension(&ext) {
            return Err(UploadError::UnsupportedType {
                kind: self.kind.label(),
                found: ext,
            });
        }

        let mime = content_type
            .map(|m| m.split(';').next().unwrap_or(m).trim().to_lowercase())
            .unwrap_or_default();
        if !self.kind.accepts_mime(&mime) {
            return Err(UploadError::UnsupportedType {
                kind: self.kind.label(),
                found: if mime.is_empty() { "unknown".to_string() } else { mime },
            });
        }

        Ok(ext)
    }

    pub fn check_size(&self, size_bytes: u64) -> Result<(), UploadError> {
        if size_bytes == 0 {
            return Err(UploadError::Empty);
        }
        if size_bytes > self.max_size_bytes() {
            return Err(UploadError::TooLarge {
                max_mb: self.max_size_mb,
            });
        }
        Ok(())
    }
}

/// Why an uploaded file was refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("No file was provided in the 'file' field")]
    MissingFile,

    #[error("File '{0}' has no extension")]
    MissingExtension(String),

    #[error("Only {kind} files are allowed, got {found}")]
    UnsupportedType { kind: &'static str, found: String },

    #[error("File exceeds the {max_mb} MB limit")]
    TooLarge { max_mb: u64 },

    #[error("File is empty")]
    Empty,
}

/// Lowercased extension of a file name, ignoring any directory part
pub fn file_extension(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

// ============================================================================
// Credential Validations
// ============================================================================

/// Number of digits in a password-reset code
pub const OTP_LENGTH: usize = 6;

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters");
    }
    if password.len() > 72 {
        return Err("Password must be at most 72 bytes");
    }
    Ok(())
}

/// Validate the shape of a password-reset code
pub fn validate_otp_format(otp: &str) -> Result<(), &'static str> {
    if otp.len() == OTP_LENGTH && otp.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("OTP must be a 6-digit code")
    }
}

/// Validate a year of establishment against the current year
pub fn validate_establishment_year(year: i32, current_year: i32) -> Result<(), &'static str> {
    if year < 1800 {
        return Err("Establishment year is too far in the past");
    }
    if year > current_year {
        return Err("Establishment year cannot be in the future");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners(genders: &[&str]) -> Vec<OwnerInput> {
        genders.iter().map(|g| OwnerInput::new(*g)).collect()
    }

    #[test]
    fn individual_needs_exactly_one_owner() {
        assert_eq!(
            validate_ownership(Some("Individual"), &owners(&["Female"])),
            Ok(OwnershipType::Individual)
        );
        assert_eq!(
            validate_ownership(Some("Individual"), &owners(&["Female", "Male"])),
            Err(OwnershipError::IndividualOwnerCount(2))
        );
    }

    #[test]
    fn partnership_needs_two_or_more() {
        assert_eq!(
            validate_ownership(Some("Partnership"), &owners(&["Male"])),
            Err(OwnershipError::PartnershipOwnerCount(1))
        );
        assert_eq!(
            validate_ownership(Some("Partnership"), &owners(&["Male", "Male", "Female"])),
            Ok(OwnershipType::Partnership)
        );
    }

    #[test]
    fn empty_owner_list_is_rejected() {
        assert_eq!(
            validate_ownership(Some("Individual"), &[]),
            Err(OwnershipError::NoOwners)
        );
    }

    #[test]
    fn ownership_type_must_be_known() {
        assert_eq!(
            validate_ownership(None, &owners(&["Male"])),
            Err(OwnershipError::MissingOwnershipType)
        );
        assert_eq!(
            validate_ownership(Some("Cooperative"), &owners(&["Male"])),
            Err(OwnershipError::UnknownOwnershipType("Cooperative".into()))
        );
    }

    #[test]
    fn owner_gender_must_be_known() {
        let err = validate_ownership(Some("Partnership"), &owners(&["Male", "unknown"])).unwrap_err();
        assert_eq!(
            err,
            OwnershipError::InvalidGender {
                index: 2,
                value: "unknown".into()
            }
        );
    }

    #[test]
    fn gender_summary_reflects_mix() {
        assert_eq!(compute_gender_summary(&owners(&["Male", "Male"])), Some(GenderSummary::Male));
        assert_eq!(compute_gender_summary(&owners(&["Female"])), Some(GenderSummary::Female));
        assert_eq!(
            compute_gender_summary(&owners(&["Female", "Male"])),
            Some(GenderSummary::Both)
        );
        assert_eq!(compute_gender_summary(&[]), None);
    }

    #[test]
    fn image_rule_rejects_documents() {
        let rule = UploadRule::new(FileKind::Image, 50, "businessImage");
        assert_eq!(rule.check_file("logo.PNG", Some("image/png")), Ok("png".to_string()));
        assert!(matches!(
            rule.check_file("profile.pdf", Some("application/pdf")),
            Err(UploadError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn content_type_must_agree_with_kind() {
        let rule = UploadRule::new(FileKind::Image, 50, "businessImage");
        assert!(matches!(
            rule.check_file("payload.png", Some("application/x-msdownload")),
            Err(UploadError::UnsupportedType { .. })
        ));
        assert!(rule.check_file("photo.jpg", None).is_err());
        assert_eq!(
            rule.check_file("photo.jpg", Some("image/jpeg; charset=binary")),
            Ok("jpg".to_string())
        );
    }

    #[test]
    fn mixed_rule_accepts_both_kinds() {
        let rule = UploadRule::new(FileKind::ImageOrDocument, 100, "incorporationProfile");
        assert!(rule.check_file("cert.pdf", Some("application/pdf")).is_ok());
        assert!(rule.check_file("cert.jpeg", Some("image/jpeg")).is_ok());
        assert!(rule.check_file("cert.exe", Some("application/octet-stream")).is_err());
    }

    #[test]
    fn size_limit_is_inclusive() {
        let rule = UploadRule::new(FileKind::Document, 1, "downloadsFile");
        assert_eq!(rule.check_size(1024 * 1024), Ok(()));
        assert_eq!(rule.check_size(1024 * 1024 + 1), Err(UploadError::TooLarge { max_mb: 1 }));
        assert_eq!(rule.check_size(0), Err(UploadError::Empty));
    }

    #[test]
    fn extension_parsing() {
        assert_eq!(file_extension("a/b/report.Final.XLSX"), Some("xlsx".into()));
        assert_eq!(file_extension("..\\evil.pdf"), Some("pdf".into()));
        assert_eq!(file_extension(".env"), None);
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn otp_format() {
        assert!(validate_otp_format("123456").is_ok());
        assert!(validate_otp_format("12345").is_err());
        assert!(validate_otp_format("12a456").is_err());
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long-enough").is_ok());
        assert!(validate_password(&"x".repeat(73)).is_err());
    }

    #[test]
    fn establishment_year_bounds() {
        assert!(validate_establishment_year(2015, 2026).is_ok());
        assert!(validate_establishment_year(2030, 2026).is_err());
        assert!(validate_establishment_year(1700, 2026).is_err());
    }
}
