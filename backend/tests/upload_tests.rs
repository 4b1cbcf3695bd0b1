//! Upload restriction tests
//!
//! Property-based and unit tests for:
//! - accepted extensions and content types per file kind
//! - size limits
//! - extension parsing

use proptest::prelude::*;
use shared::{
    file_extension, FileKind, UploadError, UploadRule, DOCUMENT_EXTENSIONS, IMAGE_EXTENSIONS,
};

const IMAGE: UploadRule = UploadRule::new(FileKind::Image, 50, "businessImage");
const DOCUMENT: UploadRule = UploadRule::new(FileKind::Document, 100, "businessProfile");
const EITHER: UploadRule = UploadRule::new(FileKind::ImageOrDocument, 100, "incorporationProfile");

fn image_mime(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        _ => "image/webp",
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn image_extensions_pass_in_any_case(
        stem in "[a-zA-Z0-9_-]{1,20}",
        ext in prop::sample::select(IMAGE_EXTENSIONS),
        upper in any::<bool>(),
    ) {
        let shown = if upper { ext.to_uppercase() } else { ext.to_string() };
        let name = format!("{}.{}", stem, shown);
        prop_assert_eq!(IMAGE.check_file(&name, Some(image_mime(ext))), Ok(ext.to_string()));
        prop_assert_eq!(EITHER.check_file(&name, Some(image_mime(ext))), Ok(ext.to_string()));
    }

    #[test]
    fn documents_are_never_images(
        stem in "[a-z]{1,12}",
        ext in prop::sample::select(DOCUMENT_EXTENSIONS),
    ) {
        let name = format!("{}.{}", stem, ext);
        let rejected = matches!(
            IMAGE.check_file(&name, Some("application/pdf")),
            Err(UploadError::UnsupportedType { .. })
        );
        prop_assert!(rejected);
    }

    #[test]
    fn sizes_up_to_the_limit_are_accepted(size in 1u64..=50 * 1024 * 1024) {
        prop_assert_eq!(IMAGE.check_size(size), Ok(()));
    }

    #[test]
    fn sizes_over_the_limit_are_rejected(extra in 1u64..10 * 1024 * 1024) {
        prop_assert_eq!(
            IMAGE.check_size(IMAGE.max_size_bytes() + extra),
            Err(UploadError::TooLarge { max_mb: 50 })
        );
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn declared_type_must_match_extension_kind() {
        assert!(matches!(
            IMAGE.check_file("photo.png", Some("application/pdf")),
            Err(UploadError::UnsupportedType { .. })
        ));
        assert!(matches!(
            DOCUMENT.check_file("profile.pdf", None),
            Err(UploadError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        assert_eq!(
            DOCUMENT.check_file("notes.txt", Some("text/plain; charset=utf-8")),
            Ok("txt".to_string())
        );
    }

    #[test]
    fn image_document_accepts_both() {
        assert_eq!(EITHER.check_file("cert.pdf", Some("application/pdf")), Ok("pdf".to_string()));
        assert_eq!(EITHER.check_file("cert.jpeg", Some("image/jpeg")), Ok("jpeg".to_string()));
    }

    #[test]
    fn extension_parsing_edge_cases() {
        assert_eq!(file_extension("archive.tar.GZ"), Some("gz".to_string()));
        assert_eq!(file_extension("C:\\docs\\report.PDF"), Some("pdf".to_string()));
        assert_eq!(file_extension(".env"), None);
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn missing_extension_is_reported() {
        assert_eq!(
            IMAGE.check_file("README", Some("image/png")),
            Err(UploadError::MissingExtension("README".to_string()))
        );
    }

    #[test]
    fn empty_file_is_rejected() {
        assert_eq!(DOCUMENT.check_size(0), Err(UploadError::Empty));
    }

    #[test]
    fn kind_labels_round_trip() {
        for kind in [FileKind::Image, FileKind::Document, FileKind::ImageOrDocument] {
            assert_eq!(FileKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(FileKind::from_label("video"), None);
    }
}
