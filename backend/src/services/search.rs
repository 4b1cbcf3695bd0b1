//! Translation of normalized search criteria into a directory query

use shared::search::{FilterField, FilterValue, SearchCriteria, SortOrder};

use crate::models::VerificationStatus;
use crate::repository::{BindValue, Filter, OrderBy};

/// Columns every keyword term is matched against
pub const KEYWORD_COLUMNS: &[&str] = &[
    "name_of_organization",
    "business_category_name",
    "business_sub_category_name",
    "business_type",
    "brief_company_description",
    "product_offered",
    "service_offered",
    "town",
    "region",
    "inkhundla",
    "street_address",
    "contact_number",
    "email_address",
    "primary_contact_name",
    "owner_type",
    "ownership_type",
    "rural_urban_classification",
];

/// Column backing a filter field
pub fn column_for(field: FilterField) -> &'static str {
    match field {
        FilterField::BusinessCategoryId => "business_category_id",
        FilterField::BusinessSubCategoryId => "business_sub_category_id",
        FilterField::Region => "region",
        FilterField::Inkhundla => "inkhundla",
        FilterField::Town => "town",
        FilterField::RuralUrbanClassification => "rural_urban_classification",
        FilterField::Employees => "employees",
        FilterField::EstablishmentYear => "establishment_year",
        FilterField::Turnover => "turnover",
        FilterField::OwnerType => "owner_type",
        FilterField::OwnershipType => "ownership_type",
        FilterField::DisabilityOwned => "disability_owned",
        FilterField::BusinessType => "business_type",
        FilterField::OwnerGenderSummary => "owner_gender_summary",
    }
}

pub fn order_for(sort: SortOrder) -> OrderBy {
    match sort {
        SortOrder::Newest => OrderBy::desc("id"),
        SortOrder::Oldest => OrderBy::asc("id"),
        SortOrder::NameAsc => OrderBy::asc("name_of_organization"),
        SortOrder::NameDesc => OrderBy::desc("name_of_organization"),
    }
}

/// Filter over verified listings matching the criteria
pub fn build_query(criteria: &SearchCriteria) -> (Filter, OrderBy) {
    let mut filter = Filter::new().eq("is_verified", VerificationStatus::Verified.code());

    for (field, value) in &criteria.filters {
        let bind = match value {
            FilterValue::Text(s) => BindValue::Text(s.clone()),
            FilterValue::Int(i) => BindValue::Int(*i),
        };
        filter = filter.eq(column_for(*field), bind);
    }

    for term in &criteria.keyword_terms {
        filter = filter.like_any(KEYWORD_COLUMNS, term);
    }

    (filter, order_for(criteria.sort))
}
