//! Business owner models

use serde::{Deserialize, Serialize};

/// An owner as submitted with a registration or update
///
/// Gender is kept as free text here; `validate_ownership` decides whether it
/// names a known value so the caller gets one consistent error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnerInput {
    pub gender: String,
}

impl OwnerInput {
    pub fn new(gender: impl Into<String>) -> Self {
        Self {
            gender: gender.into(),
        }
    }
}
