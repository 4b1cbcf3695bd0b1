//! Business classification models
//!
//! Text-valued columns are stored as plain strings in the database; these
//! enums are the canonical spellings that filters and validation accept.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a string does not name a known variant
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Review state of a business listing, stored as a small integer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "i16", into = "i16")]
pub enum VerificationStatus {
    /// Submitted and awaiting review
    Pending,
    /// Approved and publicly listed
    Verified,
    /// Reviewed and declined
    Unverified,
}

impl VerificationStatus {
    /// Path value meaning "every status" in admin listings
    pub const ALL_CODE: i16 = 0;

    pub fn code(self) -> i16 {
        match self {
            VerificationStatus::Pending => 1,
            VerificationStatus::Verified => 2,
            VerificationStatus::Unverified => 3,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(VerificationStatus::Pending),
            2 => Some(VerificationStatus::Verified),
            3 => Some(VerificationStatus::Unverified),
            _ => None,
        }
    }

    /// Interpret an admin listing filter where `0` selects every status
    pub fn from_filter_code(code: i16) -> Result<Option<Self>, ParseEnumError> {
        if code == Self::ALL_CODE {
            return Ok(None);
        }
        Self::from_code(code)
            .map(Some)
            .ok_or_else(|| ParseEnumError::new("verification status", &code.to_string()))
    }

    pub fn label(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Unverified => "unverified",
        }
    }
}

impl TryFrom<i16> for VerificationStatus {
    type Error = ParseEnumError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| ParseEnumError::new("verification status", &code.to_string()))
    }
}

impl From<VerificationStatus> for i16 {
    fn from(status: VerificationStatus) -> Self {
        status.code()
    }
}

/// Gender of a single business owner
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            other => Err(ParseEnumError::new("gender", other)),
        }
    }
}

/// Gender distribution across all owners of a business
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GenderSummary {
    Male,
    Female,
    Both,
}

impl GenderSummary {
    pub fn as_str(self) -> &'static str {
        match self {
            GenderSummary::Male => "Male",
            GenderSummary::Female => "Female",
            GenderSummary::Both => "Both",
        }
    }
}

impl FromStr for GenderSummary {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(GenderSummary::Male),
            "Female" => Ok(GenderSummary::Female),
            "Both" => Ok(GenderSummary::Both),
            other => Err(ParseEnumError::new("gender summary", other)),
        }
    }
}

impl fmt::Display for GenderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared legal ownership structure
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OwnershipType {
    Individual,
    Partnership,
}

impl OwnershipType {
    pub fn as_str(self) -> &'static str {
        match self {
            OwnershipType::Individual => "Individual",
            OwnershipType::Partnership => "Partnership",
        }
    }

    /// Inclusive bounds on the number of owners this structure allows
    pub fn owner_count_bounds(self) -> (usize, Option<usize>) {
        match self {
            OwnershipType::Individual => (1, Some(1)),
            OwnershipType::Partnership => (2, None),
        }
    }
}

impl FromStr for OwnershipType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Individual" => Ok(OwnershipType::Individual),
            "Partnership" => Ok(OwnershipType::Partnership),
            other => Err(ParseEnumError::new("ownership type", other)),
        }
    }
}

/// Formal registration state of the business
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BusinessType {
    Registered,
    Unregistered,
}

impl BusinessType {
    pub fn as_str(self) -> &'static str {
        match self {
            BusinessType::Registered => "Registered",
            BusinessType::Unregistered => "Unregistered",
        }
    }
}

impl FromStr for BusinessType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Registered" => Ok(BusinessType::Registered),
            "Unregistered" => Ok(BusinessType::Unregistered),
            other => Err(ParseEnumError::new("business type", other)),
        }
    }
}

/// Settlement classification of the business location
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RuralUrbanClassification {
    Rural,
    Urban,
    #[serde(rename = "Semi Urban")]
    SemiUrban,
}

impl RuralUrbanClassification {
    pub fn as_str(self) -> &'static str {
        match self {
            RuralUrbanClassification::Rural => "Rural",
            RuralUrbanClassification::Urban => "Urban",
            RuralUrbanClassification::SemiUrban => "Semi Urban",
        }
    }
}

impl FromStr for RuralUrbanClassification {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Rural" => Ok(RuralUrbanClassification::Rural),
            "Urban" => Ok(RuralUrbanClassification::Urban),
            "Semi Urban" => Ok(RuralUrbanClassification::SemiUrban),
            other => Err(ParseEnumError::new("rural/urban classification", other)),
        }
    }
}

/// Whether the business is owned by a person with a disability
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DisabilityOwned {
    Yes,
    No,
}

impl DisabilityOwned {
    pub fn as_str(self) -> &'static str {
        match self {
            DisabilityOwned::Yes => "Yes",
            DisabilityOwned::No => "No",
        }
    }
}

impl FromStr for DisabilityOwned {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yes" => Ok(DisabilityOwned::Yes),
            "No" => Ok(DisabilityOwned::No),
            other => Err(ParseEnumError::new("disability owned", other)),
        }
    }
}

/// Kind of account a session token was issued to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// A registered business logging in with its own credentials
    User,
    /// A directory administrator
    Admin,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::User => "user",
            UserType::Admin => "admin",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_status_codes_round_trip() {
        for status in [
            VerificationStatus::Pending,
            VerificationStatus::Verified,
            VerificationStatus::Unverified,
        ] {
            assert_eq!(VerificationStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(VerificationStatus::from_code(0), None);
        assert_eq!(VerificationStatus::from_code(4), None);
    }

    #[test]
    fn filter_code_zero_means_all() {
        assert_eq!(VerificationStatus::from_filter_code(0), Ok(None));
        assert_eq!(
            VerificationStatus::from_filter_code(2),
            Ok(Some(VerificationStatus::Verified))
        );
        assert!(VerificationStatus::from_filter_code(9).is_err());
    }

    #[test]
    fn verification_status_serializes_as_integer() {
        let json = serde_json::to_string(&VerificationStatus::Verified).unwrap();
        assert_eq!(json, "2");
        let parsed: VerificationStatus = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, VerificationStatus::Unverified);
        assert!(serde_json::from_str::<VerificationStatus>("7").is_err());
    }

    #[test]
    fn semi_urban_uses_spaced_spelling() {
        assert_eq!(
            "Semi Urban".parse::<RuralUrbanClassification>(),
            Ok(RuralUrbanClassification::SemiUrban)
        );
        assert!("SemiUrban".parse::<RuralUrbanClassification>().is_err());
        let json = serde_json::to_string(&RuralUrbanClassification::SemiUrban).unwrap();
        assert_eq!(json, "\"Semi Urban\"");
    }

    #[test]
    fn user_type_is_lowercase_on_the_wire() {
        assert_eq!(serde_json::to_string(&UserType::Admin).unwrap(), "\"admin\"");
        assert_eq!(UserType::User.as_str(), "user");
    }
}
