//! Authentication middleware
//!
//! JWT authentication and admin-only access control

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::error::AppError;
use crate::models::UserType;
use crate::services::auth::decode_claims;
use crate::AppState;

/// Authenticated account extracted from the JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub user_type: UserType,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }

    /// Admins manage every listing; a business only its own
    pub fn can_manage_business(&self, business_id: i64) -> bool {
        self.is_admin() || (self.user_type == UserType::User && self.id == business_id)
    }
}

/// Authentication middleware that validates bearer tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| AppError::Unauthorized("Missing or invalid Authorization header".to_string()))?;

    let claims = decode_claims(bearer.token(), &state.config.jwt.secret)?;

    let id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::InvalidToken)?;

    request.extensions_mut().insert(AuthUser {
        id,
        email: claims.email,
        user_type: claims.user_type,
    });

    Ok(next.run(request).await)
}

/// Rejects requests whose token was not issued to an administrator
///
/// Must run after [`auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.is_admin() => Ok(next.run(request).await),
        Some(_) => Err(AppError::InsufficientPermissions),
        None => Err(AppError::Unauthorized("Authentication required".to_string())),
    }
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, user_type: UserType) -> AuthUser {
        AuthUser {
            id,
            email: "x@y.z".to_string(),
            user_type,
        }
    }

    #[test]
    fn business_manages_only_itself() {
        let owner = user(7, UserType::User);
        assert!(owner.can_manage_business(7));
        assert!(!owner.can_manage_business(8));
        assert!(!owner.is_admin());
    }

    #[test]
    fn admin_manages_everything() {
        let admin = user(1, UserType::Admin);
        assert!(admin.can_manage_business(7));
        assert!(admin.can_manage_business(1));
    }
}
