//! Owner and director persistence
//!
//! Owners are only written after the ownership rules pass, and replacement
//! always happens inside the caller's transaction so a failed insert leaves
//! the previous set untouched.

use sqlx::{Postgres, Transaction};

use crate::error::AppResult;
use crate::models::{
    DirectorRow, GenderSummary, NewDirector, NewOwner, OwnerInput, OwnerRow, OwnershipType,
};
use crate::repository;
use shared::validation::{compute_gender_summary, validate_ownership};

/// Owners that passed validation, with the derived summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipPlan {
    pub ownership_type: OwnershipType,
    pub gender_summary: Option<GenderSummary>,
    pub genders: Vec<String>,
}

impl OwnershipPlan {
    /// Validate owners against the declared ownership type
    pub fn prepare(ownership_type: Option<&str>, owners: &[OwnerInput]) -> AppResult<Self> {
        let ownership_type = validate_ownership(ownership_type, owners)?;
        Ok(Self {
            ownership_type,
            gender_summary: compute_gender_summary(owners),
            genders: owners.iter().map(|o| o.gender.trim().to_string()).collect(),
        })
    }

    pub fn gender_summary_str(&self) -> Option<String> {
        self.gender_summary.map(|s| s.as_str().to_string())
    }

    fn rows_for(&self, business_id: i64) -> Vec<NewOwner> {
        self.genders
            .iter()
            .map(|gender| NewOwner {
                business_id,
                gender: gender.clone(),
            })
            .collect()
    }
}

/// Insert the planned owners for a new business
pub async fn insert_owners(
    tx: &mut Transaction<'_, Postgres>,
    business_id: i64,
    plan: &OwnershipPlan,
) -> AppResult<Vec<OwnerRow>> {
    repository::bulk_insert(&mut **tx, plan.rows_for(business_id)).await
}

/// Swap the owners of a business for the planned set
pub async fn replace_owners(
    tx: &mut Transaction<'_, Postgres>,
    business_id: i64,
    plan: &OwnershipPlan,
) -> AppResult<Vec<OwnerRow>> {
    let removed = repository::delete_by::<OwnerRow, _>(&mut **tx, "business_id", business_id).await?;
    tracing::debug!(business_id, removed, "Replacing business owners");
    insert_owners(tx, business_id, plan).await
}

/// Swap the directors of a business
pub async fn replace_directors(
    tx: &mut Transaction<'_, Postgres>,
    business_id: i64,
    directors: Vec<NewDirector>,
) -> AppResult<Vec<DirectorRow>> {
    repository::delete_by::<DirectorRow, _>(&mut **tx, "business_id", business_id).await?;
    repository::bulk_insert(&mut **tx, directors).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn plan_trims_genders_and_summarizes() {
        let owners = vec![OwnerInput::new("Male "), OwnerInput::new("Female")];
        let plan = OwnershipPlan::prepare(Some("Partnership"), &owners).unwrap();
        assert_eq!(plan.ownership_type, OwnershipType::Partnership);
        assert_eq!(plan.gender_summary_str().as_deref(), Some("Both"));
        assert_eq!(plan.genders, vec!["Male", "Female"]);
    }

    #[test]
    fn invalid_plan_is_rejected_before_any_write() {
        let owners = vec![OwnerInput::new("Male"), OwnerInput::new("Male")];
        let err = OwnershipPlan::prepare(Some("Individual"), &owners).unwrap_err();
        assert!(matches!(err, AppError::Ownership(_)));
    }

    #[test]
    fn rows_carry_business_id() {
        let plan = OwnershipPlan::prepare(Some("Individual"), &[OwnerInput::new("Female")]).unwrap();
        let rows = plan.rows_for(42);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].business_id, 42);
        assert_eq!(rows[0].gender, "Female");
    }
}
