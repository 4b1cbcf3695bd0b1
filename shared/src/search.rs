//! Directory search criteria
//!
//! Turns the loosely-typed query string of the public filter endpoint into a
//! normalized set of equality filters, keyword terms and a sort order. Values
//! that are empty, `All`, or outside the accepted vocabulary are dropped
//! rather than rejected so that shared links keep working.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    BusinessType, DisabilityOwned, GenderSummary, OwnershipType, RuralUrbanClassification,
};

/// Upper bound on keyword terms accepted in one query
pub const MAX_KEYWORD_TERMS: usize = 10;

/// Query the filter endpoint refuses to run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Keyword has {count} terms; at most {max} are allowed")]
    TooManyKeywordTerms { count: usize, max: usize },
}

/// Raw query parameters accepted by the filter endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub business_category_id: Option<String>,
    pub business_sub_category_id: Option<String>,
    pub region: Option<String>,
    pub inkhundla: Option<String>,
    pub town: Option<String>,
    pub rural_urban_classification: Option<String>,
    pub employees: Option<String>,
    pub establishment_year: Option<String>,
    pub owner_gender: Option<String>,
    pub ownership_type: Option<String>,
    #[serde(alias = "ownerType")]
    pub owner_type: Option<String>,
    pub business_type: Option<String>,
    pub turnover: Option<String>,
    pub disability_owned: Option<String>,
    pub keyword: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Business attribute a filter applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    BusinessCategoryId,
    BusinessSubCategoryId,
    Region,
    Inkhundla,
    Town,
    RuralUrbanClassification,
    Employees,
    EstablishmentYear,
    Turnover,
    OwnerType,
    OwnershipType,
    DisabilityOwned,
    BusinessType,
    OwnerGenderSummary,
}

/// Typed value for an equality filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
}

impl FilterValue {
    fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }
}

/// Result ordering for directory listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently registered first
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    /// Resolve a `sort` parameter; `relevance` groups by name when searching
    pub fn resolve(raw: Option<&str>, has_keyword: bool) -> Self {
        match raw.map(str::trim) {
            Some("newest") => SortOrder::Newest,
            Some("oldest") => SortOrder::Oldest,
            Some("name_asc") => SortOrder::NameAsc,
            Some("name_desc") => SortOrder::NameDesc,
            Some("relevance") if has_keyword => SortOrder::NameAsc,
            _ => SortOrder::Newest,
        }
    }
}

/// Normalized search request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub filters: Vec<(FilterField, FilterValue)>,
    /// Lowercased terms; every term must match at least one searchable column
    pub keyword_terms: Vec<String>,
    pub sort: SortOrder,
}

impl SearchCriteria {
    /// Fails when the keyword has more than [`MAX_KEYWORD_TERMS`] terms
    pub fn from_params(params: &SearchParams) -> Result<Self, SearchError> {
        let mut filters = Vec::new();

        let mut push_selectable = |field: FilterField, raw: &Option<String>| {
            if let Some(value) = selectable(raw) {
                filters.push((field, FilterValue::text(value)));
            }
        };
        push_selectable(FilterField::Region, &params.region);
        push_selectable(FilterField::Inkhundla, &params.inkhundla);
        push_selectable(FilterField::Employees, &params.employees);
        push_selectable(FilterField::Turnover, &params.turnover);
        push_selectable(FilterField::OwnerType, &params.owner_type);

        if let Some(id) = selectable(&params.business_category_id).and_then(parse_int) {
            filters.push((FilterField::BusinessCategoryId, FilterValue::Int(id)));
        }
        if let Some(id) = selectable(&params.business_sub_category_id).and_then(parse_int) {
            filters.push((FilterField::BusinessSubCategoryId, FilterValue::Int(id)));
        }
        if let Some(year) = selectable(&params.establishment_year).and_then(parse_int) {
            filters.push((FilterField::EstablishmentYear, FilterValue::Int(year)));
        }

        if let Some(town) = params.town.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            filters.push((FilterField::Town, FilterValue::text(town)));
        }

        if let Some(class) = params
            .rural_urban_classification
            .as_deref()
            .and_then(|v| v.parse::<RuralUrbanClassification>().ok())
        {
            filters.push((FilterField::RuralUrbanClassification, FilterValue::text(class.as_str())));
        }

        if let Some(ownership) = params
            .ownership_type
            .as_deref()
            .and_then(|v| v.parse::<OwnershipType>().ok())
        {
            filters.push((FilterField::OwnershipType, FilterValue::text(ownership.as_str())));
        }

        if let Some(disability) = params.disability_owned.as_deref().and_then(normalize_yes_no) {
            filters.push((FilterField::DisabilityOwned, FilterValue::text(disability.as_str())));
        }

        if let Some(business_type) = params.business_type.as_deref().and_then(normalize_business_type) {
            filters.push((FilterField::BusinessType, FilterValue::text(business_type.as_str())));
        }

        if let Some(summary) = params
            .owner_gender
            .as_deref()
            .and_then(|v| v.parse::<GenderSummary>().ok())
        {
            filters.push((FilterField::OwnerGenderSummary, FilterValue::text(summary.as_str())));
        }

        let keyword_terms = params
            .keyword
            .as_deref()
            .map(tokenize_keyword)
            .unwrap_or_default();
        if keyword_terms.len() > MAX_KEYWORD_TERMS {
            return Err(SearchError::TooManyKeywordTerms {
                count: keyword_terms.len(),
                max: MAX_KEYWORD_TERMS,
            });
        }

        let sort = SortOrder::resolve(params.sort.as_deref(), !keyword_terms.is_empty());

        Ok(Self {
            filters,
            keyword_terms,
            sort,
        })
    }

    pub fn has_keyword(&self) -> bool {
        !self.keyword_terms.is_empty()
    }
}

/// Value of a dropdown-style parameter, ignoring empty and `All`
fn selectable(raw: &Option<String>) -> Option<&str> {
    raw.as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "All")
}

fn parse_int(value: &str) -> Option<i64> {
    value.parse().ok()
}

/// Accept `yes`/`no` in any case
pub fn normalize_yes_no(raw: &str) -> Option<DisabilityOwned> {
    match raw.trim().to_lowercase().as_str() {
        "yes" => Some(DisabilityOwned::Yes),
        "no" => Some(DisabilityOwned::No),
        _ => None,
    }
}

/// Accept `Registered`/`Unregistered`, or `yes`/`no` meaning the same
pub fn normalize_business_type(raw: &str) -> Option<BusinessType> {
    let trimmed = raw.trim();
    match trimmed.to_lowercase().as_str() {
        "yes" => return Some(BusinessType::Registered),
        "no" => return Some(BusinessType::Unregistered),
        _ => {}
    }
    trimmed.parse().ok()
}

/// Split a free-text keyword into lowercased whitespace-separated terms
pub fn tokenize_keyword(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SearchParams {
        SearchParams::default()
    }

    fn value_of(criteria: &SearchCriteria, field: FilterField) -> Option<&FilterValue> {
        criteria
            .filters
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v)
    }

    #[test]
    fn empty_params_yield_no_filters() {
        let criteria = SearchCriteria::from_params(&params()).unwrap();
        assert!(criteria.filters.is_empty());
        assert!(!criteria.has_keyword());
        assert_eq!(criteria.sort, SortOrder::Newest);
    }

    #[test]
    fn all_is_treated_as_absent() {
        let mut p = params();
        p.region = Some("All".into());
        p.business_category_id = Some("All".into());
        p.turnover = Some("  ".into());
        let criteria = SearchCriteria::from_params(&p).unwrap();
        assert!(criteria.filters.is_empty());
    }

    #[test]
    fn category_ids_are_numeric() {
        let mut p = params();
        p.business_category_id = Some("12".into());
        p.business_sub_category_id = Some("abc".into());
        let criteria = SearchCriteria::from_params(&p).unwrap();
        assert_eq!(
            value_of(&criteria, FilterField::BusinessCategoryId),
            Some(&FilterValue::Int(12))
        );
        assert_eq!(value_of(&criteria, FilterField::BusinessSubCategoryId), None);
    }

    #[test]
    fn town_is_trimmed() {
        let mut p = params();
        p.town = Some("  Mbabane ".into());
        let criteria = SearchCriteria::from_params(&p).unwrap();
        assert_eq!(
            value_of(&criteria, FilterField::Town),
            Some(&FilterValue::Text("Mbabane".into()))
        );
    }

    #[test]
    fn restricted_vocabularies_drop_unknown_values() {
        let mut p = params();
        p.rural_urban_classification = Some("Suburban".into());
        p.ownership_type = Some("Cooperative".into());
        p.owner_gender = Some("Other".into());
        let criteria = SearchCriteria::from_params(&p).unwrap();
        assert!(criteria.filters.is_empty());
    }

    #[test]
    fn yes_no_values_are_mapped() {
        let mut p = params();
        p.disability_owned = Some(" YES ".into());
        p.business_type = Some("no".into());
        let criteria = SearchCriteria::from_params(&p).unwrap();
        assert_eq!(
            value_of(&criteria, FilterField::DisabilityOwned),
            Some(&FilterValue::Text("Yes".into()))
        );
        assert_eq!(
            value_of(&criteria, FilterField::BusinessType),
            Some(&FilterValue::Text("Unregistered".into()))
        );
    }

    #[test]
    fn owner_type_alias_is_accepted() {
        let p: SearchParams = serde_json::from_str(r#"{"ownerType":"Youth"}"#).unwrap();
        let criteria = SearchCriteria::from_params(&p).unwrap();
        assert_eq!(
            value_of(&criteria, FilterField::OwnerType),
            Some(&FilterValue::Text("Youth".into()))
        );
    }

    #[test]
    fn keyword_is_split_and_lowercased() {
        assert_eq!(
            tokenize_keyword("  IT Services\tMbabane "),
            vec!["it", "services", "mbabane"]
        );
        assert!(tokenize_keyword("   ").is_empty());
    }

    #[test]
    fn extra_keyword_terms_are_rejected_not_dropped() {
        let mut p = params();
        p.keyword = Some("a b c d e f g h i j zzzz-never-matches".into());
        assert_eq!(
            SearchCriteria::from_params(&p),
            Err(SearchError::TooManyKeywordTerms { count: 11, max: MAX_KEYWORD_TERMS })
        );

        p.keyword = Some("a b c d e f g h i j".into());
        let criteria = SearchCriteria::from_params(&p).unwrap();
        assert_eq!(criteria.keyword_terms.len(), MAX_KEYWORD_TERMS);
        assert_eq!(criteria.keyword_terms.last().map(String::as_str), Some("j"));
    }

    #[test]
    fn relevance_depends_on_keyword() {
        assert_eq!(SortOrder::resolve(Some("relevance"), true), SortOrder::NameAsc);
        assert_eq!(SortOrder::resolve(Some("relevance"), false), SortOrder::Newest);
        assert_eq!(SortOrder::resolve(Some("oldest"), false), SortOrder::Oldest);
        assert_eq!(SortOrder::resolve(Some("bogus"), true), SortOrder::Newest);
    }
}
