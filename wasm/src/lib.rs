//! WebAssembly module for the MSME Business Directory
//!
//! Lets the registration and upload forms run the same checks as the server
//! before anything is submitted:
//! - Ownership structure and owner gender summary
//! - Upload kind and size limits
//! - Password and reset code formats

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("msme-directory validation loaded"));
}

fn parse_owners(owners_json: &str) -> Result<Vec<OwnerInput>, String> {
    serde_json::from_str(owners_json).map_err(|e| format!("Invalid owners JSON: {}", e))
}

/// Ownership check; returns the accepted ownership type
fn check_owners(ownership_type: &str, owners_json: &str) -> Result<String, String> {
    let owners = parse_owners(owners_json)?;
    validate_ownership(Some(ownership_type), &owners)
        .map(|ownership| ownership.as_str().to_string())
        .map_err(|e| e.to_string())
}

fn summarize_owners(owners_json: &str) -> Result<Option<String>, String> {
    let owners = parse_owners(owners_json)?;
    Ok(compute_gender_summary(&owners).map(|s| s.as_str().to_string()))
}

fn check_upload(
    kind: &str,
    max_size_mb: u32,
    file_name: &str,
    content_type: &str,
    size_bytes: f64,
) -> Result<String, String> {
    let kind = FileKind::from_label(kind).ok_or_else(|| format!("Unknown file kind: {}", kind))?;
    let rule = UploadRule::new(kind, u64::from(max_size_mb), "");
    let content_type = Some(content_type).filter(|c| !c.is_empty());
    let ext = rule.check_file(file_name, content_type).map_err(|e| e.to_string())?;
    rule.check_size(size_bytes.max(0.0) as u64)
        .map_err(|e| e.to_string())?;
    Ok(ext)
}

/// Validate owners (`[{"gender": "Male"}, ...]`) against an ownership type
#[wasm_bindgen]
pub fn validate_owners(ownership_type: &str, owners_json: &str) -> Result<String, JsValue> {
    check_owners(ownership_type, owners_json).map_err(|e| JsValue::from_str(&e))
}

/// `Male`, `Female` or `Both`; undefined when no owner has a known gender
#[wasm_bindgen]
pub fn owner_gender_summary(owners_json: &str) -> Result<Option<String>, JsValue> {
    summarize_owners(owners_json).map_err(|e| JsValue::from_str(&e))
}

/// Pre-check a file for an upload field; returns the normalized extension
#[wasm_bindgen]
pub fn validate_upload(
    kind: &str,
    max_size_mb: u32,
    file_name: &str,
    content_type: &str,
    size_bytes: f64,
) -> Result<String, JsValue> {
    check_upload(kind, max_size_mb, file_name, content_type, size_bytes)
        .map_err(|e| JsValue::from_str(&e))
}

/// Error message for a weak password, or undefined when acceptable
#[wasm_bindgen]
pub fn password_problem(password: &str) -> Option<String> {
    validate_password(password).err().map(str::to_string)
}

#[wasm_bindgen]
pub fn is_valid_reset_code(otp: &str) -> bool {
    validate_otp_format(otp).is_ok()
}

/// Keyword split the way the directory search does it
#[wasm_bindgen]
pub fn search_terms(keyword: &str) -> js_sys::Array {
    shared::search::tokenize_keyword(keyword)
        .into_iter()
        .map(|term| JsValue::from_str(&term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_owners() {
        assert_eq!(check_owners("Individual", r#"[{"gender":"Female"}]"#).unwrap(), "Individual");
        assert!(check_owners("Individual", r#"[{"gender":"Female"},{"gender":"Male"}]"#).is_err());
        assert!(check_owners("Partnership", "not json").is_err());
    }

    #[test]
    fn test_summarize_owners() {
        assert_eq!(
            summarize_owners(r#"[{"gender":"Female"},{"gender":"Male"}]"#).unwrap(),
            Some("Both".to_string())
        );
        assert_eq!(summarize_owners("[]").unwrap(), None);
    }

    #[test]
    fn test_check_upload() {
        assert_eq!(check_upload("image", 50, "logo.PNG", "image/png", 2048.0).unwrap(), "png");
        assert!(check_upload("image", 50, "logo.pdf", "application/pdf", 2048.0).is_err());
        assert!(check_upload("document", 1, "a.pdf", "application/pdf", 2.0 * 1024.0 * 1024.0).is_err());
        assert!(check_upload("video", 50, "a.mp4", "video/mp4", 10.0).is_err());
    }

    #[test]
    fn test_reset_code_format() {
        assert!(is_valid_reset_code("012345"));
        assert!(!is_valid_reset_code("12345"));
        assert!(!is_valid_reset_code("12a456"));
    }
}
