//! MSME business service: registration, listing, search, updates and review

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::{Validate, ValidationError};

use crate::error::{field_errors, AppError, AppResult};
use crate::models::{
    BusinessRow, BusinessType, DirectorRow, DisabilityOwned, NewBusiness, NewDirector, OwnerInput,
    OwnerRow, OwnershipType, RuralUrbanClassification, VerificationStatus,
};
use crate::repository::{self, Filter, OrderBy, Record};
use crate::services::auth::{hash_password, normalize_email};
use crate::services::ownership::{self, OwnershipPlan};
use crate::services::search;
use shared::search::SearchCriteria;
use shared::validation::{validate_establishment_year, validate_password};
use shared::{PaginatedResponse, Pagination};

// ============================================================================
// Request bodies
// ============================================================================

/// Director submitted with a registration or update
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DirectorInput {
    #[validate(length(min = 1, max = 255, message = "Director name is required"))]
    pub name: String,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    #[validate(length(max = 50))]
    pub contact_number: Option<String>,
    #[validate(email(message = "Director email address is invalid"))]
    pub email_address: Option<String>,
}

impl DirectorInput {
    fn into_new(self, business_id: i64) -> NewDirector {
        NewDirector {
            business_id,
            name: self.name.trim().to_string(),
            gender: self.gender,
            nationality: self.nationality,
            contact_number: self.contact_number,
            email_address: self.email_address.map(|e| normalize_email(&e)),
        }
    }
}

/// Input for registering a new business with its directors and owners
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterBusinessInput {
    #[validate(length(min = 1, max = 255, message = "Name of organization is required"))]
    pub name_of_organization: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email_address: String,
    #[validate(length(min = 5, max = 50, message = "Contact number must be 5-50 characters"))]
    pub contact_number: String,
    #[validate(custom = "password_rule")]
    pub password: String,
    pub primary_contact_name: Option<String>,
    pub website: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Region is required"))]
    pub region: String,
    pub inkhundla: Option<String>,
    pub town: Option<String>,
    pub street_address: Option<String>,
    #[validate(custom = "rural_urban_rule")]
    pub rural_urban_classification: Option<String>,
    #[validate(range(min = 1, message = "Business category is required"))]
    pub business_category_id: i64,
    pub business_category_name: Option<String>,
    pub business_sub_category_id: Option<i64>,
    pub business_sub_category_name: Option<String>,
    #[validate(custom = "business_type_rule")]
    pub business_type: Option<String>,
    #[serde(alias = "ownerType")]
    pub owner_type: Option<String>,
    #[serde(alias = "ownershipType")]
    #[validate(custom = "ownership_type_rule")]
    pub ownership_type: Option<String>,
    pub brief_company_description: Option<String>,
    pub product_offered: Option<String>,
    pub service_offered: Option<String>,
    pub employees: Option<String>,
    #[validate(range(min = 1800, message = "Establishment year is too far in the past"))]
    pub establishment_year: Option<i32>,
    pub turnover: Option<String>,
    #[validate(custom = "disability_rule")]
    pub disability_owned: Option<String>,
    pub business_image: Option<String>,
    pub business_profile: Option<String>,
    pub incorporation_document: Option<String>,
    #[serde(default, alias = "directorsInfo")]
    pub directors_info: Vec<DirectorInput>,
    pub owners: Option<Vec<OwnerInput>>,
}

/// Partial update of a business; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBusinessInput {
    #[validate(length(min = 1, max = 255))]
    pub name_of_organization: Option<String>,
    #[validate(email(message = "A valid email address is required"))]
    pub email_address: Option<String>,
    #[validate(length(min = 5, max = 50))]
    pub contact_number: Option<String>,
    pub primary_contact_name: Option<String>,
    pub website: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub region: Option<String>,
    pub inkhundla: Option<String>,
    pub town: Option<String>,
    pub street_address: Option<String>,
    #[validate(custom = "rural_urban_rule")]
    pub rural_urban_classification: Option<String>,
    #[validate(range(min = 1))]
    pub business_category_id: Option<i64>,
    pub business_category_name: Option<String>,
    pub business_sub_category_id: Option<i64>,
    pub business_sub_category_name: Option<String>,
    #[validate(custom = "business_type_rule")]
    pub business_type: Option<String>,
    #[serde(alias = "ownerType")]
    pub owner_type: Option<String>,
    #[serde(alias = "ownershipType")]
    #[validate(custom = "ownership_type_rule")]
    pub ownership_type: Option<String>,
    pub brief_company_description: Option<String>,
    pub product_offered: Option<String>,
    pub service_offered: Option<String>,
    pub employees: Option<String>,
    #[validate(range(min = 1800, message = "Establishment year is too far in the past"))]
    pub establishment_year: Option<i32>,
    pub turnover: Option<String>,
    #[validate(custom = "disability_rule")]
    pub disability_owned: Option<String>,
    pub business_image: Option<String>,
    pub business_profile: Option<String>,
    pub incorporation_document: Option<String>,
    #[serde(alias = "directorsInfo")]
    pub directors_info: Option<Vec<DirectorInput>>,
    pub owners: Option<Vec<OwnerInput>>,
}

/// Review decision for a business
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyBusinessInput {
    pub is_verified: VerificationStatus,
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn password_rule(password: &str) -> Result<(), ValidationError> {
    validate_password(password).map_err(|message| rule_error("password", message))
}

fn rural_urban_rule(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<RuralUrbanClassification>()
        .map(|_| ())
        .map_err(|_| rule_error("rural_urban_classification", "Must be Rural, Urban or Semi Urban"))
}

fn business_type_rule(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<BusinessType>()
        .map(|_| ())
        .map_err(|_| rule_error("business_type", "Must be Registered or Unregistered"))
}

fn ownership_type_rule(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<OwnershipType>()
        .map(|_| ())
        .map_err(|_| rule_error("ownership_type", "Must be Individual or Partnership"))
}

fn disability_rule(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<DisabilityOwned>()
        .map(|_| ())
        .map_err(|_| rule_error("disability_owned", "Must be Yes or No"))
}

/// Year bounds depend on the clock, so they are checked outside the derive
fn check_establishment_year(year: Option<i32>) -> AppResult<()> {
    match year {
        Some(year) => validate_establishment_year(year, Utc::now().year()).map_err(|message| {
            AppError::Validation {
                field: "establishment_year".to_string(),
                message: message.to_string(),
            }
        }),
        None => Ok(()),
    }
}

/// Validate each director, naming the failing entry by position
fn validate_directors(directors: &[DirectorInput]) -> AppResult<()> {
    for (index, director) in directors.iter().enumerate() {
        if let Err(errors) = director.validate() {
            let first = field_errors(&errors).into_iter().next();
            let (field, message) = first
                .map(|e| (e.field, e.message))
                .unwrap_or_else(|| ("name".to_string(), "Director is invalid".to_string()));
            return Err(AppError::Validation {
                field: format!("directors_info[{}].{}", index, field),
                message,
            });
        }
    }
    Ok(())
}

// ============================================================================
// Responses
// ============================================================================

/// A business with its directors and owners
#[derive(Debug, Serialize)]
pub struct BusinessWithPeople {
    #[serde(flatten)]
    pub business: BusinessRow,
    pub directors: Vec<DirectorRow>,
    pub owners: Vec<OwnerRow>,
}

/// Flat row written by the CSV export
#[derive(Debug, Serialize)]
pub struct BusinessExportRow {
    pub id: i64,
    pub name_of_organization: String,
    pub email_address: String,
    pub contact_number: String,
    pub region: String,
    pub inkhundla: Option<String>,
    pub town: Option<String>,
    pub business_category_name: Option<String>,
    pub business_sub_category_name: Option<String>,
    pub business_type: Option<String>,
    pub ownership_type: Option<String>,
    pub owner_gender_summary: Option<String>,
    pub employees: Option<String>,
    pub turnover: Option<String>,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
}

impl From<BusinessRow> for BusinessExportRow {
    fn from(b: BusinessRow) -> Self {
        let status = VerificationStatus::from_code(b.is_verified)
            .map(VerificationStatus::label)
            .unwrap_or("unknown");
        Self {
            id: b.id,
            name_of_organization: b.name_of_organization,
            email_address: b.email_address,
            contact_number: b.contact_number,
            region: b.region,
            inkhundla: b.inkhundla,
            town: b.town,
            business_category_name: b.business_category_name,
            business_sub_category_name: b.business_sub_category_name,
            business_type: b.business_type,
            ownership_type: b.ownership_type,
            owner_gender_summary: b.owner_gender_summary,
            employees: b.employees,
            turnover: b.turnover,
            status,
            created_at: b.created_at,
        }
    }
}

// ============================================================================
// Service
// ============================================================================

/// MSME business service
#[derive(Clone)]
pub struct MsmeService {
    db: PgPool,
}

impl MsmeService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a business with its directors and owners in one transaction
    pub async fn register(&self, input: RegisterBusinessInput) -> AppResult<BusinessWithPeople> {
        if input.directors_info.is_empty() {
            return Err(AppError::Validation {
                field: "directors_info".to_string(),
                message: "At least one director is required".to_string(),
            });
        }
        validate_directors(&input.directors_info)?;
        check_establishment_year(input.establishment_year)?;

        let plan = match &input.owners {
            Some(owners) => Some(OwnershipPlan::prepare(input.ownership_type.as_deref(), owners)?),
            None => None,
        };

        let email = normalize_email(&input.email_address);
        if self.email_exists(&email).await? {
            return Err(AppError::DuplicateEntry("email_address".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let new_business = NewBusiness {
            name_of_organization: input.name_of_organization.trim().to_string(),
            email_address: email,
            contact_number: input.contact_number,
            primary_contact_name: input.primary_contact_name,
            website: input.website,
            region: input.region,
            inkhundla: input.inkhundla,
            town: input.town.map(|t| t.trim().to_string()),
            street_address: input.street_address,
            rural_urban_classification: input.rural_urban_classification,
            business_category_id: input.business_category_id,
            business_category_name: input.business_category_name,
            business_sub_category_id: input.business_sub_category_id,
            business_sub_category_name: input.business_sub_category_name,
            business_type: input.business_type,
            owner_type: input.owner_type,
            ownership_type: plan
                .as_ref()
                .map(|p| p.ownership_type.as_str().to_string())
                .or(input.ownership_type),
            brief_company_description: input.brief_company_description,
            product_offered: input.product_offered,
            service_offered: input.service_offered,
            employees: input.employees,
            establishment_year: input.establishment_year,
            turnover: input.turnover,
            disability_owned: input.disability_owned,
            business_image: input.business_image,
            business_profile: input.business_profile,
            incorporation_document: input.incorporation_document,
            is_verified: VerificationStatus::Pending.code(),
            owner_gender_summary: plan.as_ref().and_then(OwnershipPlan::gender_summary_str),
            password_hash,
        };

        let mut tx = self.db.begin().await?;

        let business = repository::bulk_insert(&mut *tx, vec![new_business])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Business insert returned no row".to_string()))?;

        let directors = input
            .directors_info
            .into_iter()
            .map(|d| d.into_new(business.id))
            .collect();
        let directors = repository::bulk_insert(&mut *tx, directors).await?;

        let owners = match &plan {
            Some(plan) => ownership::insert_owners(&mut tx, business.id, plan).await?,
            None => Vec::new(),
        };

        tx.commit().await?;

        tracing::info!(
            business_id = business.id,
            directors = directors.len(),
            owners = owners.len(),
            "Registered business"
        );

        Ok(BusinessWithPeople {
            business,
            directors,
            owners,
        })
    }

    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        repository::exists_by::<BusinessRow>(&self.db, "email_address", normalize_email(email)).await
    }

    // ========================================================================
    // Listings
    // ========================================================================

    fn verified() -> Filter {
        Filter::new().eq("is_verified", VerificationStatus::Verified.code())
    }

    /// Verified businesses, newest first
    pub async fn list_verified(&self, pagination: Pagination) -> AppResult<PaginatedResponse<BusinessRow>> {
        repository::list(&self.db, &Self::verified(), OrderBy::desc("id"), pagination).await
    }

    /// Admin listing by review status; `None` lists every status
    pub async fn list_by_status(
        &self,
        status: Option<VerificationStatus>,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<BusinessRow>> {
        let filter = match status {
            Some(status) => Filter::new().eq("is_verified", status.code()),
            None => Filter::new(),
        };
        repository::list(&self.db, &filter, OrderBy::desc("id"), pagination).await
    }

    /// Verified businesses in a category
    pub async fn list_by_category(
        &self,
        category_id: i64,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<BusinessRow>> {
        let filter = Self::verified().eq("business_category_id", category_id);
        repository::list(&self.db, &filter, OrderBy::desc("id"), pagination).await
    }

    /// Verified businesses in a category, each with directors and owners
    pub async fn list_by_category_with_people(
        &self,
        category_id: i64,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<BusinessWithPeople>> {
        let page = self.list_by_category(category_id, pagination).await?;
        let ids: Vec<i64> = page.data.iter().map(|b| b.id).collect();

        let mut directors = group_by_business(self.fetch_for_businesses::<DirectorRow>(&ids).await?, |d| d.business_id);
        let mut owners = group_by_business(self.fetch_for_businesses::<OwnerRow>(&ids).await?, |o| o.business_id);

        Ok(page.map(|business| BusinessWithPeople {
            directors: directors.remove(&business.id).unwrap_or_default(),
            owners: owners.remove(&business.id).unwrap_or_default(),
            business,
        }))
    }

    /// Verified businesses whose name contains the text
    pub async fn search_by_name(&self, name: &str, pagination: Pagination) -> AppResult<PaginatedResponse<BusinessRow>> {
        let filter = Self::verified().like_any(&["name_of_organization"], name.trim());
        repository::list(&self.db, &filter, OrderBy::asc("name_of_organization"), pagination).await
    }

    /// Verified businesses in a region
    pub async fn search_by_region(&self, region: &str, pagination: Pagination) -> AppResult<PaginatedResponse<BusinessRow>> {
        let filter = Self::verified().eq("region", region.trim());
        repository::list(&self.db, &filter, OrderBy::desc("id"), pagination).await
    }

    /// Filtered, keyword-searched verified listing
    pub async fn filter(&self, criteria: &SearchCriteria, pagination: Pagination) -> AppResult<PaginatedResponse<BusinessRow>> {
        let (filter, order) = search::build_query(criteria);
        tracing::debug!(
            filters = criteria.filters.len(),
            terms = criteria.keyword_terms.len(),
            "Running directory search"
        );
        repository::list(&self.db, &filter, order, pagination).await
    }

    /// Rows for the CSV export, optionally limited to one status
    pub async fn export(&self, status: Option<VerificationStatus>) -> AppResult<Vec<BusinessExportRow>> {
        let filter = match status {
            Some(status) => Filter::new().eq("is_verified", status.code()),
            None => Filter::new(),
        };
        let rows = repository::find_all::<BusinessRow>(&self.db, &filter, OrderBy::asc("id")).await?;
        Ok(rows.into_iter().map(BusinessExportRow::from).collect())
    }

    // ========================================================================
    // Single business
    // ========================================================================

    pub async fn get(&self, id: i64) -> AppResult<BusinessRow> {
        repository::find_by_id::<BusinessRow>(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Business".to_string()))
    }

    /// Business with its directors and owners
    pub async fn details(&self, id: i64) -> AppResult<BusinessWithPeople> {
        let business = self.get(id).await?;
        let directors = repository::find_all_by::<DirectorRow>(&self.db, "business_id", id).await?;
        let owners = repository::find_all_by::<OwnerRow>(&self.db, "business_id", id).await?;
        Ok(BusinessWithPeople {
            business,
            directors,
            owners,
        })
    }

    /// Apply a partial update; owner and director sets are replaced atomically
    pub async fn update(&self, id: i64, input: UpdateBusinessInput) -> AppResult<BusinessWithPeople> {
        let existing = self.get(id).await?;

        if let Some(directors) = &input.directors_info {
            validate_directors(directors)?;
        }
        check_establishment_year(input.establishment_year)?;

        let plan = self.plan_ownership_change(&existing, &input).await?;

        let email = input.email_address.as_deref().map(normalize_email);
        if let Some(email) = &email {
            if *email != existing.email_address && self.email_exists(email).await? {
                return Err(AppError::DuplicateEntry("email_address".to_string()));
            }
        }

        let mut tx = self.db.begin().await?;

        let business = sqlx::query_as::<_, BusinessRow>(&format!(
            r#"
            UPDATE msme_businesses SET
                name_of_organization = $1, email_address = $2, contact_number = $3,
                primary_contact_name = $4, website = $5, region = $6, inkhundla = $7, town = $8,
                street_address = $9, rural_urban_classification = $10, business_category_id = $11,
                business_category_name = $12, business_sub_category_id = $13,
                business_sub_category_name = $14, business_type = $15, owner_type = $16,
                ownership_type = $17, brief_company_description = $18, product_offered = $19,
                service_offered = $20, employees = $21, establishment_year = $22, turnover = $23,
                disability_owned = $24, business_image = $25, business_profile = $26,
                incorporation_document = $27, owner_gender_summary = $28, updated_at = NOW()
            WHERE id = $29
            RETURNING {}
            "#,
            BusinessRow::COLUMNS
        ))
        .bind(input.name_of_organization.map(|n| n.trim().to_string()).unwrap_or(existing.name_of_organization))
        .bind(email.unwrap_or(existing.email_address))
        .bind(input.contact_number.unwrap_or(existing.contact_number))
        .bind(input.primary_contact_name.or(existing.primary_contact_name))
        .bind(input.website.or(existing.website))
        .bind(input.region.unwrap_or(existing.region))
        .bind(input.inkhundla.or(existing.inkhundla))
        .bind(input.town.map(|t| t.trim().to_string()).or(existing.town))
        .bind(input.street_address.or(existing.street_address))
        .bind(input.rural_urban_classification.or(existing.rural_urban_classification))
        .bind(input.business_category_id.unwrap_or(existing.business_category_id))
        .bind(input.business_category_name.or(existing.business_category_name))
        .bind(input.business_sub_category_id.or(existing.business_sub_category_id))
        .bind(input.business_sub_category_name.or(existing.business_sub_category_name))
        .bind(input.business_type.or(existing.business_type))
        .bind(input.owner_type.or(existing.owner_type))
        .bind(
            plan.as_ref()
                .map(|p| p.ownership_type.as_str().to_string())
                .or(existing.ownership_type),
        )
        .bind(input.brief_company_description.or(existing.brief_company_description))
        .bind(input.product_offered.or(existing.product_offered))
        .bind(input.service_offered.or(existing.service_offered))
        .bind(input.employees.or(existing.employees))
        .bind(input.establishment_year.or(existing.establishment_year))
        .bind(input.turnover.or(existing.turnover))
        .bind(input.disability_owned.or(existing.disability_owned))
        .bind(input.business_image.or(existing.business_image))
        .bind(input.business_profile.or(existing.business_profile))
        .bind(input.incorporation_document.or(existing.incorporation_document))
        .bind(match &plan {
            Some(plan) => plan.gender_summary_str(),
            None => existing.owner_gender_summary,
        })
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if let (Some(plan), Some(_)) = (&plan, &input.owners) {
            ownership::replace_owners(&mut tx, id, plan).await?;
        }

        if let Some(directors) = input.directors_info {
            let rows = directors.into_iter().map(|d| d.into_new(id)).collect();
            ownership::replace_directors(&mut tx, id, rows).await?;
        }

        tx.commit().await?;

        tracing::info!(business_id = id, "Updated business");

        let directors = repository::find_all_by::<DirectorRow>(&self.db, "business_id", id).await?;
        let owners = repository::find_all_by::<OwnerRow>(&self.db, "business_id", id).await?;
        Ok(BusinessWithPeople {
            business,
            directors,
            owners,
        })
    }

    /// Validate the ownership fields of an update against what is stored
    ///
    /// New owners are checked against the new or stored ownership type; a new
    /// ownership type alone is checked against the stored owners.
    async fn plan_ownership_change(
        &self,
        existing: &BusinessRow,
        input: &UpdateBusinessInput,
    ) -> AppResult<Option<OwnershipPlan>> {
        match (&input.ownership_type, &input.owners) {
            (_, Some(owners)) => {
                let ownership_type = input
                    .ownership_type
                    .as_deref()
                    .or(existing.ownership_type.as_deref());
                Ok(Some(OwnershipPlan::prepare(ownership_type, owners)?))
            }
            (Some(ownership_type), None) => {
                let stored: Vec<OwnerInput> =
                    repository::find_all_by::<OwnerRow>(&self.db, "business_id", existing.id)
                        .await?
                        .into_iter()
                        .map(|o| OwnerInput::new(o.gender))
                        .collect();
                Ok(Some(OwnershipPlan::prepare(Some(ownership_type), &stored)?))
            }
            (None, None) => Ok(None),
        }
    }

    /// Delete a business; directors and owners cascade
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !repository::delete_by_id::<BusinessRow, _>(&self.db, id).await? {
            return Err(AppError::NotFound("Business".to_string()));
        }
        tracing::info!(business_id = id, "Deleted business");
        Ok(())
    }

    /// Record a review decision
    pub async fn verify(&self, id: i64, status: VerificationStatus) -> AppResult<BusinessRow> {
        let business = sqlx::query_as::<_, BusinessRow>(&format!(
            "UPDATE msme_businesses SET is_verified = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            BusinessRow::COLUMNS
        ))
        .bind(status.code())
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Business".to_string()))?;

        tracing::info!(business_id = id, status = status.label(), "Business review recorded");
        Ok(business)
    }

    /// Serialize rows to CSV with a header line
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }

    async fn fetch_for_businesses<T: Record>(&self, ids: &[i64]) -> AppResult<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM {} WHERE business_id = ANY($1) ORDER BY id ASC",
            T::COLUMNS,
            T::TABLE
        );
        let rows = sqlx::query_as::<_, T>(&sql).bind(ids).fetch_all(&self.db).await?;
        Ok(rows)
    }
}

fn group_by_business<T>(rows: Vec<T>, key: impl Fn(&T) -> i64) -> HashMap<i64, Vec<T>> {
    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}
