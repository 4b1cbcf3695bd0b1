//! Ownership rule tests
//!
//! Property-based and unit tests for:
//! - owner count per ownership type
//! - owner gender checks
//! - gender summary derivation

use proptest::prelude::*;
use shared::{
    compute_gender_summary, validate_ownership, GenderSummary, OwnerInput, OwnershipError,
    OwnershipType,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn gender_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("Male".to_string()), Just("Female".to_string())]
}

fn owners_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<OwnerInput>> {
    prop::collection::vec(gender_strategy().prop_map(OwnerInput::new), min..=max)
}

/// Gender values outside the accepted vocabulary
fn bad_gender_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}".prop_filter("must not be a known gender", |g| g != "Male" && g != "Female")
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn individual_accepts_exactly_one_owner(owners in owners_strategy(1, 1)) {
        prop_assert_eq!(validate_ownership(Some("Individual"), &owners), Ok(OwnershipType::Individual));
    }

    #[test]
    fn individual_rejects_several_owners(owners in owners_strategy(2, 8)) {
        let count = owners.len();
        prop_assert_eq!(
            validate_ownership(Some("Individual"), &owners),
            Err(OwnershipError::IndividualOwnerCount(count))
        );
    }

    #[test]
    fn partnership_accepts_two_or_more(owners in owners_strategy(2, 12)) {
        prop_assert_eq!(validate_ownership(Some("Partnership"), &owners), Ok(OwnershipType::Partnership));
    }

    #[test]
    fn unknown_gender_is_reported_with_position(
        mut owners in owners_strategy(2, 6),
        bad in bad_gender_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let index = pick.index(owners.len());
        owners[index] = OwnerInput::new(bad.clone());
        let result = validate_ownership(Some("Partnership"), &owners);
        let is_invalid_gender = matches!(result, Err(OwnershipError::InvalidGender { .. }));
        prop_assert!(is_invalid_gender);
    }

    #[test]
    fn summary_is_both_only_for_mixed_owners(owners in owners_strategy(1, 10)) {
        let males = owners.iter().filter(|o| o.gender == "Male").count();
        let females = owners.len() - males;
        let expected = match (males > 0, females > 0) {
            (true, true) => GenderSummary::Both,
            (true, false) => GenderSummary::Male,
            _ => GenderSummary::Female,
        };
        prop_assert_eq!(compute_gender_summary(&owners), Some(expected));
    }

    #[test]
    fn summary_ignores_owner_order(owners in owners_strategy(1, 10)) {
        let mut reversed = owners.clone();
        reversed.reverse();
        prop_assert_eq!(compute_gender_summary(&owners), compute_gender_summary(&reversed));
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn partnership_with_one_owner_is_rejected() {
        let owners = vec![OwnerInput::new("Female")];
        assert_eq!(
            validate_ownership(Some("Partnership"), &owners),
            Err(OwnershipError::PartnershipOwnerCount(1))
        );
    }

    #[test]
    fn empty_owner_list_is_rejected() {
        assert_eq!(validate_ownership(Some("Individual"), &[]), Err(OwnershipError::NoOwners));
    }

    #[test]
    fn ownership_type_is_required() {
        let owners = vec![OwnerInput::new("Male")];
        assert_eq!(validate_ownership(None, &owners), Err(OwnershipError::MissingOwnershipType));
        assert_eq!(validate_ownership(Some("  "), &owners), Err(OwnershipError::MissingOwnershipType));
    }

    #[test]
    fn other_ownership_types_are_rejected() {
        let owners = vec![OwnerInput::new("Male"), OwnerInput::new("Female")];
        assert!(matches!(
            validate_ownership(Some("Cooperative"), &owners),
            Err(OwnershipError::UnknownOwnershipType(_))
        ));
    }

    #[test]
    fn no_owners_means_no_summary() {
        assert_eq!(compute_gender_summary(&[]), None);
    }
}
