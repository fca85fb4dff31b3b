//! Staff authentication.
//!
//! PIN login against an in-memory staff directory (argon2 hashes), HS256
//! access tokens, and the [`CurrentStaff`] extractor for protected routes.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use kaori_core::StaffRole;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Staff Directory
// =============================================================================

/// A staff account.
#[derive(Debug, Clone, Serialize)]
pub struct StaffUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: StaffRole,
    /// Home store; `None` for accounts that span stores.
    pub store_id: Option<String>,
    #[serde(skip_serializing)]
    pub pin_hash: String,
}

/// Known staff accounts.
#[derive(Debug, Clone, Default)]
pub struct StaffDirectory {
    users: Vec<StaffUser>,
}

impl StaffDirectory {
    pub fn new(users: Vec<StaffUser>) -> Self {
        StaffDirectory { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Returns the user if `email` exists and `pin` matches its hash.
    pub fn verify_pin(&self, email: &str, pin: &str) -> Option<&StaffUser> {
        let email = email.trim();
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .filter(|u| verify_pin(pin, &u.pin_hash))
    }
}

/// Verify a PIN against its hash.
fn verify_pin(pin: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(pin.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Hash a PIN for storage.
pub fn hash_pin(pin: &str) -> Result<String, ApiError> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash PIN: {}", e)))?;

    Ok(hash.to_string())
}

// =============================================================================
// JWT
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: StaffRole,
    pub store_id: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// JWT ID
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    access_lifetime_hours: i64,
}

impl JwtManager {
    pub fn new(secret: String, access_lifetime_hours: i64) -> Self {
        JwtManager {
            secret,
            access_lifetime_hours,
        }
    }

    pub fn access_lifetime_secs(&self) -> i64 {
        self.access_lifetime_hours * 3600
    }

    /// Generate an access token for `user` working in `store_id`.
    pub fn generate_access_token(&self, user: &StaffUser, store_id: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.access_lifetime_hours);

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            store_id: store_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {}", e)))
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Login
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct PinLoginRequest {
    pub email: String,
    pub pin: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: StaffUser,
}

/// Checks the PIN and issues an access token.
pub fn login_with_pin(state: &AppState, req: &PinLoginRequest) -> Result<LoginResponse, ApiError> {
    let Some(user) = state.staff().verify_pin(&req.email, &req.pin) else {
        warn!(email = %req.email, "PIN login rejected");
        return Err(ApiError::Unauthorized("Invalid email or PIN".to_string()));
    };

    let store_id = user
        .store_id
        .clone()
        .unwrap_or_else(|| state.config().server.default_store_id.clone());
    let access_token = state.jwt().generate_access_token(user, &store_id)?;

    info!(user_id = %user.id, role = %user.role, store_id = %store_id, "Staff logged in");

    Ok(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt().access_lifetime_secs(),
        user: user.clone(),
    })
}

// =============================================================================
// Extractor
// =============================================================================

/// Authenticated staff member making the request.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentStaff {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: StaffRole,
    pub store_id: String,
}

impl CurrentStaff {
    /// Super admins see every store, everyone else only their own.
    pub fn can_see_store(&self, store_id: &str) -> bool {
        self.role == StaffRole::SuperAdmin || self.store_id == store_id
    }

    /// Fails with `Forbidden` unless the caller has one of `allowed`.
    pub fn require_role(&self, allowed: &[StaffRole]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "Role {} may not perform this action",
                self.role
            )))
        }
    }
}

impl From<Claims> for CurrentStaff {
    fn from(claims: Claims) -> Self {
        CurrentStaff {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
            store_id: claims.store_id,
        }
    }
}

/// Resolves a raw token (query parameter or header value) to the staff member.
pub fn staff_from_token(state: &AppState, token: &str) -> Result<CurrentStaff, ApiError> {
    state.jwt().validate_token(token).map(CurrentStaff::from)
}

impl FromRequestParts<AppState> for CurrentStaff {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Authorization header required".to_string()))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header".to_string()))?;

        match state.jwt().validate_token(token) {
            Ok(claims) => Ok(CurrentStaff::from(claims)),
            Err(e) => {
                warn!(uri = %parts.uri, error = %e, "Rejected bearer token");
                Err(e)
            }
        }
    }
}
