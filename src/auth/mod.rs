//! Bearer-token authentication and role gating.
//!
//! The hosted identity provider issues the tokens; this service only
//! verifies them and reads the `role` claim to gate admin surfaces. In
//! development the `/auth/token` endpoint can mint short-lived tokens so the
//! API is usable without the provider.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    async_trait,
    extract::{Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ErrorResponse;
use crate::models::Role;

/// Errors raised while authenticating a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token expired")]
    ExpiredToken,
    #[error("Insufficient role")]
    InsufficientRole,
    #[error("Token issuance is disabled")]
    IssuanceDisabled,
    #[error("Internal auth error: {0}")]
    Internal(String),
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth | Self::InvalidToken(_) | Self::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::InsufficientRole | Self::IssuanceDisabled => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            details: None,
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (profile id)
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
    /// "admin" or "client"
    pub role: String,
    /// JWT ID (unique identifier for this token)
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_ttl: Duration,
    pub allow_dev_tokens: bool,
}

/// Verifies inbound tokens and (in development) issues them.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn from_app_config(cfg: &AppConfig) -> Self {
        Self::new(AuthConfig {
            jwt_secret: cfg.jwt_secret.clone(),
            issuer: cfg.auth_issuer.clone(),
            audience: cfg.auth_audience.clone(),
            token_ttl: Duration::from_secs(cfg.jwt_expiration as u64),
            allow_dev_tokens: cfg.allow_dev_tokens,
        })
    }

    pub fn allow_dev_tokens(&self) -> bool {
        self.config.allow_dev_tokens
    }

    pub fn token_ttl(&self) -> Duration {
        self.config.token_ttl
    }

    /// Validates a bearer token and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.audience.as_str()]);
        validation.set_issuer(&[self.config.issuer.as_str()]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;
        Ok(data.claims)
    }

    /// Issues a signed token for the given identity.
    pub fn generate_token(
        &self,
        subject: Uuid,
        role: Role,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            name,
            email,
            role: role.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.config.token_ttl.as_secs() as i64,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

fn auth_user_from_claims(claims: Claims) -> Result<AuthUser, AuthError> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AuthError::InvalidToken("subject is not a valid UUID".into()))?;
    let role = Role::from_str(&claims.role)
        .map_err(|_| AuthError::InvalidToken(format!("unknown role '{}'", claims.role)))?;
    Ok(AuthUser {
        user_id,
        name: claims.name,
        email: claims.email,
        role,
    })
}

/// Authentication middleware that extracts and validates bearer tokens.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return AuthError::Internal("Authentication service not available".into())
                .into_response();
        }
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    let token = match token {
        Some(token) if !token.is_empty() => token,
        _ => return AuthError::MissingAuth.into_response(),
    };

    match auth_service
        .validate_token(token)
        .and_then(auth_user_from_claims)
    {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            warn!(error = %e, "Rejected request with invalid credentials");
            e.into_response()
        }
    }
}

/// Role middleware to check that the caller holds the required role.
/// Admins pass every role check.
pub async fn role_middleware(
    State(required_role): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AuthError::MissingAuth)?;

    if user.is_admin() || user.role.to_string() == required_role {
        return Ok(next.run(request).await);
    }
    Err(AuthError::InsufficientRole)
}

#[async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            role.to_string(),
            role_middleware,
        ))
        .with_auth()
    }
}

/// Development token request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DevTokenRequest {
    /// Profile id the token is issued for; generated when omitted.
    pub sub: Option<Uuid>,
    pub role: Role,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Issued token response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Authentication routes
pub fn auth_routes() -> axum::Router<Arc<AuthService>> {
    axum::Router::new().route("/token", axum::routing::post(dev_token_handler))
}

/// Issues a development token. Refuses outside development.
pub async fn dev_token_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(request): Json<DevTokenRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    if !auth_service.allow_dev_tokens() {
        return Err(AuthError::IssuanceDisabled);
    }

    let subject = request.sub.unwrap_or_else(Uuid::new_v4);
    let access_token =
        auth_service.generate_token(subject, request.role, request.name, request.email)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: auth_service.token_ttl().as_secs(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service(allow_dev_tokens: bool) -> AuthService {
        AuthService::new(AuthConfig {
            jwt_secret: "a_sufficiently_long_testing_secret_0123456789".into(),
            issuer: "kitstudio-auth".into(),
            audience: "kitstudio-api".into(),
            token_ttl: Duration::from_secs(3600),
            allow_dev_tokens,
        })
    }

    #[test]
    fn token_round_trips_with_role_and_subject() {
        let service = test_service(true);
        let subject = Uuid::new_v4();
        let token = service
            .generate_token(subject, Role::Admin, Some("Ayu".into()), None)
            .unwrap();

        let claims = service.validate_token(&token).unwrap();
        let user = auth_user_from_claims(claims).unwrap();
        assert_eq!(user.user_id, subject);
        assert!(user.is_admin());
        assert_eq!(user.name.as_deref(), Some("Ayu"));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = test_service(true);
        let token = service
            .generate_token(Uuid::new_v4(), Role::Client, None, None)
            .unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(service.validate_token(&tampered).is_err());
    }

    #[test]
    fn token_from_another_audience_is_rejected() {
        let issuing = AuthService::new(AuthConfig {
            jwt_secret: "a_sufficiently_long_testing_secret_0123456789".into(),
            issuer: "kitstudio-auth".into(),
            audience: "some-other-api".into(),
            token_ttl: Duration::from_secs(3600),
            allow_dev_tokens: true,
        });
        let verifying = test_service(true);
        let token = issuing
            .generate_token(Uuid::new_v4(), Role::Client, None, None)
            .unwrap();
        assert!(verifying.validate_token(&token).is_err());
    }

    #[test]
    fn unknown_role_in_claims_is_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            name: None,
            email: None,
            role: "superuser".into(),
            jti: Uuid::new_v4().to_string(),
            iat: 0,
            exp: 0,
            iss: "kitstudio-auth".into(),
            aud: "kitstudio-api".into(),
        };
        assert!(auth_user_from_claims(claims).is_err());
    }

    #[tokio::test]
    async fn dev_tokens_are_refused_when_disabled() {
        let service = Arc::new(test_service(false));
        let result = dev_token_handler(
            State(service),
            Json(DevTokenRequest {
                sub: None,
                role: Role::Client,
                name: None,
                email: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(AuthError::IssuanceDisabled)));
    }
}
