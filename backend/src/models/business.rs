//! Business listing rows

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::query_builder::Separated;
use sqlx::Postgres;

use crate::repository::{NewRecord, Record};

/// A stored business listing
///
/// Credential columns are read so that login and password reset can check
/// them, but they never leave the service.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BusinessRow {
    pub id: i64,
    pub name_of_organization: String,
    pub email_address: String,
    pub contact_number: String,
    pub primary_contact_name: Option<String>,
    pub website: Option<String>,
    pub region: String,
    pub inkhundla: Option<String>,
    pub town: Option<String>,
    pub street_address: Option<String>,
    pub rural_urban_classification: Option<String>,
    pub business_category_id: i64,
    pub business_category_name: Option<String>,
    pub business_sub_category_id: Option<i64>,
    pub business_sub_category_name: Option<String>,
    pub business_type: Option<String>,
    pub owner_type: Option<String>,
    pub ownership_type: Option<String>,
    pub brief_company_description: Option<String>,
    pub product_offered: Option<String>,
    pub service_offered: Option<String>,
    pub employees: Option<String>,
    pub establishment_year: Option<i32>,
    pub turnover: Option<String>,
    pub disability_owned: Option<String>,
    pub business_image: Option<String>,
    pub business_profile: Option<String>,
    pub incorporation_document: Option<String>,
    pub is_verified: i16,
    pub owner_gender_summary: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub otp_hash: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for BusinessRow {
    const TABLE: &'static str = "msme_businesses";
    const COLUMNS: &'static str = "id, name_of_organization, email_address, contact_number, \
        primary_contact_name, website, region, inkhundla, town, street_address, \
        rural_urban_classification, business_category_id, business_category_name, \
        business_sub_category_id, business_sub_category_name, business_type, owner_type, \
        ownership_type, brief_company_description, product_offered, service_offered, employees, \
        establishment_year, turnover, disability_owned, business_image, business_profile, \
        incorporation_document, is_verified, owner_gender_summary, password_hash, otp_hash, \
        otp_expiry, created_at, updated_at";
}

/// Columns a business is registered with
#[derive(Debug, Clone)]
pub struct NewBusiness {
    pub name_of_organization: String,
    pub email_address: String,
    pub contact_number: String,
    pub primary_contact_name: Option<String>,
    pub website: Option<String>,
    pub region: String,
    pub inkhundla: Option<String>,
    pub town: Option<String>,
    pub street_address: Option<String>,
    pub rural_urban_classification: Option<String>,
    pub business_category_id: i64,
    pub business_category_name: Option<String>,
    pub business_sub_category_id: Option<i64>,
    pub business_sub_category_name: Option<String>,
    pub business_type: Option<String>,
    pub owner_type: Option<String>,
    pub ownership_type: Option<String>,
    pub brief_company_description: Option<String>,
    pub product_offered: Option<String>,
    pub service_offered: Option<String>,
    pub employees: Option<String>,
    pub establishment_year: Option<i32>,
    pub turnover: Option<String>,
    pub disability_owned: Option<String>,
    pub business_image: Option<String>,
    pub business_profile: Option<String>,
    pub incorporation_document: Option<String>,
    pub is_verified: i16,
    pub owner_gender_summary: Option<String>,
    pub password_hash: String,
}

impl NewRecord for NewBusiness {
    type Output = BusinessRow;
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "name_of_organization",
        "email_address",
        "contact_number",
        "primary_contact_name",
        "website",
        "region",
        "inkhundla",
        "town",
        "street_address",
        "rural_urban_classification",
        "business_category_id",
        "business_category_name",
        "business_sub_category_id",
        "business_sub_category_name",
        "business_type",
        "owner_type",
        "ownership_type",
        "brief_company_description",
        "product_offered",
        "service_offered",
        "employees",
        "establishment_year",
        "turnover",
        "disability_owned",
        "business_image",
        "business_profile",
        "incorporation_document",
        "is_verified",
        "owner_gender_summary",
        "password_hash",
    ];

    fn push_row(self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.name_of_organization)
            .push_bind(self.email_address)
            .push_bind(self.contact_number)
            .push_bind(self.primary_contact_name)
            .push_bind(self.website)
            .push_bind(self.region)
            .push_bind(self.inkhundla)
            .push_bind(self.town)
            .push_bind(self.street_address)
            .push_bind(self.rural_urban_classification)
            .push_bind(self.business_category_id)
            .push_bind(self.business_category_name)
            .push_bind(self.business_sub_category_id)
            .push_bind(self.business_sub_category_name)
            .push_bind(self.business_type)
            .push_bind(self.owner_type)
            .push_bind(self.ownership_type)
            .push_bind(self.brief_company_description)
            .push_bind(self.product_offered)
            .push_bind(self.service_offered)
            .push_bind(self.employees)
            .push_bind(self.establishment_year)
            .push_bind(self.turnover)
            .push_bind(self.disability_owned)
            .push_bind(self.business_image)
            .push_bind(self.business_profile)
            .push_bind(self.incorporation_document)
            .push_bind(self.is_verified)
            .push_bind(self.owner_gender_summary)
            .push_bind(self.password_hash);
    }
}
