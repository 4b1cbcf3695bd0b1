//! Authentication service for business and admin login, tokens and password reset

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, CryptoRng, Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sqlx::PgPool;

use crate::config::{AdminConfig, Config};
use crate::error::{AppError, AppResult};
use crate::models::{AdminRow, BusinessRow, NewAdmin, UserType};
use crate::repository::{self, Filter};
use shared::validation::{validate_otp_format, validate_password, OTP_LENGTH};

type HmacSha256 = Hmac<Sha256>;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // Business or admin ID
    pub email: String,
    pub user_type: UserType,
    pub exp: i64,
    pub iat: i64,
}

/// A signed access token
#[derive(Debug, Serialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Code handed to the mailer after a reset request
#[derive(Debug)]
pub struct IssuedOtp {
    pub business: BusinessRow,
    pub otp: String,
    pub expiry_minutes: i64,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    otp_expiry_minutes: i64,
    otp_max_attempts: i32,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            otp_expiry_minutes: config.otp.expiry_minutes,
            otp_max_attempts: config.otp.max_attempts,
        }
    }

    // ========================================================================
    // Login
    // ========================================================================

    /// Authenticate a registered business with email and password
    pub async fn login_user(&self, email: &str, password: &str) -> AppResult<(BusinessRow, AuthToken)> {
        let email = normalize_email(email);
        let business = repository::find_one_by::<BusinessRow>(&self.db, "email_address", email.as_str())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !check_password(password, &business.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.generate_token(business.id, &business.email_address, UserType::User)?;
        tracing::info!(business_id = business.id, "Business signed in");
        Ok((business, token))
    }

    /// Authenticate a directory administrator
    pub async fn login_admin(&self, email: &str, password: &str) -> AppResult<(AdminRow, AuthToken)> {
        let email = normalize_email(email);
        let admin = repository::find_one_by::<AdminRow>(&self.db, "email", email.as_str())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !check_password(password, &admin.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.generate_token(admin.id, &admin.email, UserType::Admin)?;
        tracing::info!(admin_id = admin.id, "Administrator signed in");
        Ok((admin, token))
    }

    /// Create the configured administrator when no admin exists yet
    pub async fn ensure_bootstrap_admin(&self, config: &AdminConfig) -> AppResult<()> {
        let (Some(email), Some(password)) = (&config.bootstrap_email, &config.bootstrap_password) else {
            return Ok(());
        };

        if repository::count::<AdminRow>(&self.db, &Filter::new()).await? > 0 {
            return Ok(());
        }

        validate_password(password).map_err(|message| AppError::Validation {
            field: "admin.bootstrap_password".to_string(),
            message: message.to_string(),
        })?;

        let admin = NewAdmin {
            email: normalize_email(email),
            password_hash: hash_password(password)?,
            name: config
                .bootstrap_name
                .clone()
                .unwrap_or_else(|| "Administrator".to_string()),
        };
        let created = repository::bulk_insert(&self.db, vec![admin]).await?;
        if let Some(admin) = created.first() {
            tracing::info!(admin_id = admin.id, email = %admin.email, "Bootstrapped administrator account");
        }
        Ok(())
    }

    // ========================================================================
    // Tokens
    // ========================================================================

    /// Generate an access token
    pub fn generate_token(&self, id: i64, email: &str, user_type: UserType) -> AppResult<AuthToken> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_token_expiry);

        let claims = Claims {
            sub: id.to_string(),
            email: email.to_string(),
            user_type,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AuthToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Validate access token and return claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode_claims(token, &self.jwt_secret)
    }

    // ========================================================================
    // Password reset
    // ========================================================================

    /// Store a fresh reset code for the business and return it for mailing
    pub async fn issue_otp(&self, email: &str) -> AppResult<IssuedOtp> {
        let email = normalize_email(email);
        let business = self.business_for_reset(&email).await?;

        let otp = generate_otp(&mut OsRng);
        let otp_hash = hash_otp(&self.jwt_secret, &business.email_address, &otp)?;
        let expiry = Utc::now() + Duration::minutes(self.otp_expiry_minutes);

        sqlx::query(
            r#"
            UPDATE msme_businesses
            SET otp_hash = $1, otp_expiry = $2, otp_attempts = 0, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(&otp_hash)
        .bind(expiry)
        .bind(business.id)
        .execute(&self.db)
        .await?;

        tracing::info!(business_id = business.id, "Password reset code issued");
        Ok(IssuedOtp {
            business,
            otp,
            expiry_minutes: self.otp_expiry_minutes,
        })
    }

    /// Check a reset code without consuming it
    pub async fn verify_otp(&self, email: &str, otp: &str) -> AppResult<()> {
        let email = normalize_email(email);
        let business = repository::find_one_by::<BusinessRow>(&self.db, "email_address", email.as_str())
            .await?
            .ok_or(AppError::InvalidOtp)?;
        self.check_otp_counted(&business, otp).await
    }

    /// Set a new password after re-checking the reset code; the code is cleared
    pub async fn reset_password(&self, email: &str, otp: &str, password: &str) -> AppResult<BusinessRow> {
        validate_password(password).map_err(|message| AppError::Validation {
            field: "password".to_string(),
            message: message.to_string(),
        })?;

        let email = normalize_email(email);
        let business = repository::find_one_by::<BusinessRow>(&self.db, "email_address", email.as_str())
            .await?
            .ok_or(AppError::InvalidOtp)?;
        self.check_otp_counted(&business, otp).await?;

        let password_hash = hash_password(password)?;

        // Only the request that still sees the checked code may consume it
        let updated = sqlx::query_as::<_, BusinessRow>(&format!(
            r#"
            UPDATE msme_businesses
            SET password_hash = $1, otp_hash = NULL, otp_expiry = NULL, otp_attempts = 0,
                updated_at = NOW()
            WHERE id = $2 AND otp_hash = $3 AND otp_expiry > NOW()
            RETURNING {}
            "#,
            <BusinessRow as repository::Record>::COLUMNS
        ))
        .bind(&password_hash)
        .bind(business.id)
        .bind(&business.otp_hash)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidOtp)?;

        tracing::info!(business_id = updated.id, "Password reset completed");
        Ok(updated)
    }

    async fn business_for_reset(&self, email: &str) -> AppResult<BusinessRow> {
        repository::find_one_by::<BusinessRow>(&self.db, "email_address", email)
            .await?
            .ok_or_else(|| AppError::Validation {
                field: "email_address".to_string(),
                message: "Invalid email address".to_string(),
            })
    }

    /// Check a code; a wrong guess against a stored code counts as a failed attempt
    async fn check_otp_counted(&self, business: &BusinessRow, otp: &str) -> AppResult<()> {
        match self.check_otp(business, otp, Utc::now()) {
            Err(AppError::InvalidOtp) if business.otp_hash.is_some() => {
                self.record_failed_attempt(business.id).await?;
                Err(AppError::InvalidOtp)
            }
            other => other,
        }
    }

    /// Bump the failure count, clearing the code once the limit is reached
    async fn record_failed_attempt(&self, business_id: i64) -> AppResult<()> {
        let cleared: Option<bool> = sqlx::query_scalar(
            r#"
            UPDATE msme_businesses
            SET otp_attempts = otp_attempts + 1,
                otp_hash = CASE WHEN otp_attempts + 1 >= $2 THEN NULL ELSE otp_hash END,
                otp_expiry = CASE WHEN otp_attempts + 1 >= $2 THEN NULL ELSE otp_expiry END
            WHERE id = $1 AND otp_hash IS NOT NULL
            RETURNING otp_hash IS NULL
            "#,
        )
        .bind(business_id)
        .bind(self.otp_max_attempts)
        .fetch_optional(&self.db)
        .await?;

        if cleared == Some(true) {
            tracing::warn!(business_id, "Password reset code cleared after repeated failures");
        }
        Ok(())
    }

    fn check_otp(&self, business: &BusinessRow, otp: &str, now: DateTime<Utc>) -> AppResult<()> {
        validate_otp_format(otp).map_err(|_| AppError::InvalidOtp)?;

        let (Some(stored), Some(expiry)) = (&business.otp_hash, business.otp_expiry) else {
            return Err(AppError::InvalidOtp);
        };
        if !otp_is_current(expiry, now) {
            return Err(AppError::InvalidOtp);
        }
        if !otp_matches(&self.jwt_secret, &business.email_address, otp, stored) {
            return Err(AppError::InvalidOtp);
        }
        Ok(())
    }
}

/// Decode and validate JWT token
pub fn decode_claims(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// Emails are compared and stored lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST).map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn check_password(password: &str, password_hash: &str) -> AppResult<bool> {
    verify(password, password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

// ============================================================================
// One-time codes
// ============================================================================

/// Uniformly random zero-padded numeric code
pub fn generate_otp<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    let upper = 10u32.pow(OTP_LENGTH as u32);
    format!("{:0width$}", rng.gen_range(0..upper), width = OTP_LENGTH)
}

fn otp_mac(secret: &str, email: &str, otp: &str) -> AppResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Internal("Failed to create HMAC".to_string()))?;
    mac.update(email.as_bytes());
    mac.update(b":");
    mac.update(otp.as_bytes());
    Ok(mac)
}

/// Keyed hash of a code, bound to the account email
pub fn hash_otp(secret: &str, email: &str, otp: &str) -> AppResult<String> {
    let mac = otp_mac(secret, email, otp)?;
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Constant-time comparison against a stored hash
pub fn otp_matches(secret: &str, email: &str, otp: &str, stored: &str) -> bool {
    let Ok(expected) = BASE64.decode(stored) else {
        return false;
    };
    match otp_mac(secret, email, otp) {
        Ok(mac) => mac.verify_slice(&expected).is_ok(),
        Err(_) => false,
    }
}

pub fn otp_is_current(expiry: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now < expiry
}
