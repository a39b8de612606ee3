//! Staff authentication and the superuser gate.
//!
//! Customers never authenticate; only the staff surface is protected.
//! A single provisioned owner account logs in with username/password and
//! receives a short-lived JWT carrying a `superuser` claim. Every staff
//! route is wrapped by [`staff_gate_middleware`], which turns missing,
//! invalid, or under-privileged credentials into a forbidden outcome and
//! logs the acting principal for audit.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;

/// Claim structure for staff JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub superuser: bool,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated staff principal extracted from a validated token
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub username: String,
    pub superuser: bool,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_ttl: Duration,
}

pub struct AuthService {
    config: AuthConfig,
    admin_username: String,
    admin_password_sha256: String,
}

impl AuthService {
    pub fn new(config: AuthConfig, admin_username: String, admin_password_sha256: String) -> Self {
        Self {
            config,
            admin_username,
            admin_password_sha256,
        }
    }

    pub fn from_app_config(cfg: &AppConfig) -> Self {
        Self::new(
            AuthConfig {
                jwt_secret: cfg.jwt_secret.clone(),
                issuer: cfg.auth_issuer.clone(),
                audience: cfg.auth_audience.clone(),
                token_ttl: Duration::from_secs(cfg.jwt_expiration_secs),
            },
            cfg.admin_username.clone(),
            cfg.admin_password_sha256.clone(),
        )
    }

    /// Checks the provisioned owner credentials. Passwords are compared
    /// as SHA-256 digests; the plaintext is never stored.
    pub fn verify_credentials(&self, username: &str, password: &str) -> bool {
        if username != self.admin_username {
            return false;
        }
        let digest = hex::encode(Sha256::digest(password.as_bytes()));
        digest.eq_ignore_ascii_case(&self.admin_password_sha256)
    }

    pub fn issue_token(&self, username: &str, superuser: bool) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            superuser,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.config.token_ttl.as_secs() as i64,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::Internal(format!("token encoding failed: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<StaffUser, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {}", e)))?;

        Ok(StaffUser {
            username: data.claims.sub,
            superuser: data.claims.superuser,
        })
    }

    pub fn token_ttl_secs(&self) -> u64 {
        self.config.token_ttl.as_secs()
    }
}

/// Gate for staff routes. Unauthenticated and under-privileged requests
/// both resolve to a forbidden outcome; the attempt is logged with the
/// acting principal (or "anonymous") for audit.
pub async fn staff_gate_middleware(mut request: Request, next: Next) -> Result<Response, ServiceError> {
    let auth_service = request
        .extensions()
        .get::<Arc<AuthService>>()
        .cloned()
        .ok_or_else(|| ServiceError::Internal("auth service not available".to_string()))?;

    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    let user = match bearer {
        Some(token) => match auth_service.validate_token(token) {
            Ok(user) => user,
            Err(_) => {
                warn!(principal = "anonymous", path = %request.uri().path(), "rejected staff request with invalid token");
                return Err(ServiceError::Forbidden(
                    "you do not have permission to access this area".to_string(),
                ));
            }
        },
        None => {
            warn!(principal = "anonymous", path = %request.uri().path(), "rejected unauthenticated staff request");
            return Err(ServiceError::Forbidden(
                "you do not have permission to access this area".to_string(),
            ));
        }
    };

    if !user.superuser {
        warn!(principal = %user.username, path = %request.uri().path(), "rejected staff request from non-superuser");
        return Err(ServiceError::Forbidden(
            "you do not have permission to access this area".to_string(),
        ));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Extension methods for Router to attach the staff gate
pub trait StaffRouterExt {
    fn with_superuser(self) -> Self;
}

impl<S> StaffRouterExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_superuser(self) -> Self {
        self.layer(axum::middleware::from_fn(staff_gate_middleware))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

pub fn auth_routes() -> Router<Arc<AuthService>> {
    Router::new().route("/login", post(login_handler))
}

async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    if !auth_service.verify_credentials(&credentials.username, &credentials.password) {
        warn!(principal = %credentials.username, "failed staff login attempt");
        return Err(ServiceError::Unauthorized("invalid credentials".to_string()));
    }

    let token = auth_service.issue_token(&credentials.username, true)?;
    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: auth_service.token_ttl_secs(),
    }))
}
