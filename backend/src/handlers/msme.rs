//! MSME business handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use shared::search::{SearchCriteria, SearchParams};
use shared::{PaginatedResponse, Pagination};

use super::PageQuery;
use crate::error::{AppError, AppResult};
use crate::middleware::{CurrentUser, ValidatedJson};
use crate::models::{BusinessRow, VerificationStatus};
use crate::services::msme::{
    BusinessWithPeople, RegisterBusinessInput, UpdateBusinessInput, VerifyBusinessInput,
};
use crate::services::{MsmeService, Notification};
use crate::AppState;

/// Message plus the affected record
#[derive(Serialize)]
pub struct MutationResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> MutationResponse<T> {
    fn new(message: &str, data: T) -> Self {
        Self {
            message: message.to_string(),
            data,
        }
    }
}

#[derive(Serialize)]
pub struct EmailExistsResponse {
    pub exists: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub status: Option<String>,
}

/// Register a business with its directors and owners
pub async fn register_business(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterBusinessInput>,
) -> AppResult<(StatusCode, Json<MutationResponse<BusinessWithPeople>>)> {
    let service = MsmeService::new(state.db.clone());
    let created = service.register(body).await?;

    state.notifier.dispatch(
        &created.business.email_address,
        Notification::RegistrationReceived {
            business_name: created.business.name_of_organization.clone(),
        },
    );

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::new("MSME and directors saved successfully", created)),
    ))
}

/// Verified businesses, newest first
pub async fn list_businesses(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BusinessRow>>> {
    let service = MsmeService::new(state.db.clone());
    Ok(Json(service.list_verified(query.pagination()).await?))
}

/// Whether an email address is already registered
pub async fn check_email_exists(
    State(state): State<AppState>,
    Path(email_address): Path<String>,
) -> AppResult<Json<EmailExistsResponse>> {
    let service = MsmeService::new(state.db.clone());
    let exists = service.email_exists(&email_address).await?;
    let message = if exists {
        "Email already exists"
    } else {
        "Email does not exist"
    };
    Ok(Json(EmailExistsResponse {
        exists,
        message: message.to_string(),
    }))
}

/// Parse a status path segment where `0` means every status
fn parse_status_filter(raw: &str) -> AppResult<Option<VerificationStatus>> {
    raw.trim()
        .parse::<i16>()
        .ok()
        .and_then(|code| VerificationStatus::from_filter_code(code).ok())
        .ok_or_else(|| AppError::Validation {
            field: "is_verified".to_string(),
            message: "Status must be 0 (all), 1 (pending), 2 (verified) or 3 (unverified)".to_string(),
        })
}

/// Admin listing by review status
pub async fn list_businesses_by_status(
    State(state): State<AppState>,
    Path(is_verified): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BusinessRow>>> {
    let status = parse_status_filter(&is_verified)?;
    let service = MsmeService::new(state.db.clone());
    Ok(Json(service.list_by_status(status, query.pagination()).await?))
}

pub async fn list_businesses_by_category(
    State(state): State<AppState>,
    Path(business_category_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BusinessRow>>> {
    let service = MsmeService::new(state.db.clone());
    Ok(Json(
        service
            .list_by_category(business_category_id, query.pagination())
            .await?,
    ))
}

/// Category listing with directors and owners embedded
pub async fn list_businesses_by_category_v2(
    State(state): State<AppState>,
    Path(business_category_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BusinessWithPeople>>> {
    let service = MsmeService::new(state.db.clone());
    Ok(Json(
        service
            .list_by_category_with_people(business_category_id, query.pagination())
            .await?,
    ))
}

pub async fn search_businesses_by_name(
    State(state): State<AppState>,
    Path(name_of_organization): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BusinessRow>>> {
    let service = MsmeService::new(state.db.clone());
    Ok(Json(
        service
            .search_by_name(&name_of_organization, query.pagination())
            .await?,
    ))
}

pub async fn search_businesses_by_region(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BusinessRow>>> {
    let service = MsmeService::new(state.db.clone());
    Ok(Json(service.search_by_region(&region, query.pagination()).await?))
}

/// Directory search with filters, keywords and sorting
pub async fn filter_businesses(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<PaginatedResponse<BusinessRow>>> {
    let criteria = SearchCriteria::from_params(&params)?;
    let pagination = Pagination::from_raw(params.page.as_deref(), params.limit.as_deref());
    let service = MsmeService::new(state.db.clone());
    Ok(Json(service.filter(&criteria, pagination).await?))
}

/// CSV export of businesses, optionally by status
pub async fn export_businesses(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let status = match query.status.as_deref() {
        Some(raw) => parse_status_filter(raw)?,
        None => None,
    };

    let service = MsmeService::new(state.db.clone());
    let rows = service.export(status).await?;
    let csv = MsmeService::export_to_csv(&rows)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"msme_businesses.csv\""),
        ],
        csv,
    )
        .into_response())
}

/// Business with its directors and owners
pub async fn get_business_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BusinessWithPeople>> {
    let service = MsmeService::new(state.db.clone());
    Ok(Json(service.details(id).await?))
}

/// Partial update by the business itself or an admin
pub async fn update_business(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(body): ValidatedJson<UpdateBusinessInput>,
) -> AppResult<Json<MutationResponse<BusinessWithPeople>>> {
    if !user.can_manage_business(id) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = MsmeService::new(state.db.clone());
    let updated = service.update(id, body).await?;
    Ok(Json(MutationResponse::new("MSME Business updated successfully", updated)))
}

pub async fn delete_business(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let service = MsmeService::new(state.db.clone());
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record a review decision and tell the business
pub async fn verify_business(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(body): ValidatedJson<VerifyBusinessInput>,
) -> AppResult<Json<MutationResponse<BusinessRow>>> {
    let service = MsmeService::new(state.db.clone());
    let business = service.verify(id, body.is_verified).await?;

    state.notifier.dispatch(
        &business.email_address,
        Notification::StatusChanged {
            business_name: business.name_of_organization.clone(),
            status: body.is_verified,
        },
    );

    Ok(Json(MutationResponse::new("MSME Business updated successfully", business)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_accepts_all_and_known_codes() {
        assert_eq!(parse_status_filter("0").unwrap(), None);
        assert_eq!(parse_status_filter("2").unwrap(), Some(VerificationStatus::Verified));
        assert_eq!(parse_status_filter(" 3 ").unwrap(), Some(VerificationStatus::Unverified));
    }

    #[test]
    fn status_filter_rejects_unknown() {
        assert!(matches!(parse_status_filter("7"), Err(AppError::Validation { .. })));
        assert!(matches!(parse_status_filter("verified"), Err(AppError::Validation { .. })));
    }
}
