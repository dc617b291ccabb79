//! Authentication Service
//!
//! Handles user registration, credential checks, JWT access tokens and
//! refresh-token sessions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::JwtSettings;
use crate::domain::{NewUser, SessionRepository, User, UserRepository};
use crate::shared::error::AppError;
use crate::shared::password::{hash_password, verify_password};

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new customer account
    async fn register(&self, registration: Registration) -> Result<(User, AuthTokens), AuthError>;

    /// Authenticate with username (or email) and password
    async fn authenticate(&self, login: &str, password: &str) -> Result<(User, AuthTokens), AuthError>;

    /// Exchange a refresh token for a new token pair
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError>;

    /// Revoke refresh token (logout)
    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Validate access token and extract user ID
    fn validate_token(&self, access_token: &str) -> Result<i64, AuthError>;

    /// Load the user an access token belongs to
    async fn get_user(&self, user_id: i64) -> Result<User, AuthError>;
}

/// Fields accepted at registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already exists")]
    EmailExists,

    #[error("Username already exists")]
    UsernameExists,

    #[error("Session not found or expired")]
    SessionNotFound,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailExists | AuthError::UsernameExists => AppError::Conflict(err.to_string()),
            AuthError::Store(e) => e,
            e => AppError::Unauthorized(e.to_string()),
        }
    }
}

/// AuthService implementation
pub struct AuthServiceImpl<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    jwt_settings: JwtSettings,
}

impl<U, S> AuthServiceImpl<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, jwt_settings: JwtSettings) -> Self {
        Self {
            user_repo,
            session_repo,
            jwt_settings,
        }
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: i64) -> Result<AuthTokens, AuthError> {
        let now = Utc::now();
        let access_expiry = now + Duration::minutes(self.jwt_settings.access_token_expiry_minutes);

        let access_claims = Claims {
            sub: user_id.to_string(),
            exp: access_expiry.timestamp(),
            iat: now.timestamp(),
            jti: Some(uuid::Uuid::new_v4().to_string()),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        // Opaque refresh token: random_uuid.random_uuid
        let refresh_token = format!("{}.{}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4());

        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.jwt_settings.access_token_expiry_minutes * 60,
            token_type: "Bearer".to_string(),
        })
    }

    /// Issue a token pair and open a session for its refresh token
    async fn start_session(&self, user_id: i64) -> Result<AuthTokens, AuthError> {
        let tokens = self.generate_tokens(user_id)?;
        self.session_repo
            .create_session(
                user_id,
                hash_refresh_token(&tokens.refresh_token),
                self.refresh_expiry(),
            )
            .await?;
        Ok(tokens)
    }

    fn refresh_expiry(&self) -> chrono::DateTime<Utc> {
        Utc::now() + Duration::days(self.jwt_settings.refresh_token_expiry_days)
    }

    /// Decode and validate access token
    fn decode_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        Ok(token_data.claims)
    }
}

/// Hash refresh token for storage
fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl<U, S> AuthService for AuthServiceImpl<U, S>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    async fn register(&self, registration: Registration) -> Result<(User, AuthTokens), AuthError> {
        if self.user_repo.email_exists(&registration.email).await? {
            return Err(AuthError::EmailExists);
        }
        if self.user_repo.username_exists(&registration.username).await? {
            return Err(AuthError::UsernameExists);
        }

        let password_hash = hash_password(&registration.password)?;

        let user = self
            .user_repo
            .create(NewUser {
                username: registration.username,
                email: registration.email,
                password_hash,
                display_name: registration.display_name.filter(|d| !d.trim().is_empty()),
                is_admin: false,
            })
            .await?;

        let tokens = self.start_session(user.id).await?;
        tracing::info!(user_id = user.id, username = %user.username, "User registered");

        Ok((user, tokens))
    }

    async fn authenticate(&self, login: &str, password: &str) -> Result<(User, AuthTokens), AuthError> {
        let user = if login.contains('@') {
            self.user_repo.find_by_email(login).await?
        } else {
            self.user_repo.find_by_username(login).await?
        }
        .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.start_session(user.id).await?;
        Ok((user, tokens))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let session = self
            .session_repo
            .find_by_token_hash(&hash_refresh_token(refresh_token))
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if !session.is_active() {
            return Err(AuthError::TokenExpired);
        }

        // Rotation: the old refresh token stops working
        let new_tokens = self.generate_tokens(session.user_id)?;
        self.session_repo
            .rotate(
                session.id,
                hash_refresh_token(&new_tokens.refresh_token),
                self.refresh_expiry(),
            )
            .await?;

        Ok(new_tokens)
    }

    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError> {
        let session = self
            .session_repo
            .find_by_token_hash(&hash_refresh_token(refresh_token))
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        self.session_repo.revoke(session.id).await?;
        Ok(())
    }

    fn validate_token(&self, access_token: &str) -> Result<i64, AuthError> {
        self.decode_access_token(access_token)?
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidToken)
    }

    async fn get_user(&self, user_id: i64) -> Result<User, AuthError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
