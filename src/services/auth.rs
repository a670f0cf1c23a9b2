use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::instrument;
use validator::Validate;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{Claims, LoginRequest, RegisterRequest, TokenResponse, UserDocument},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Account registration and bearer-token authentication
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String, token_ttl_minutes: i64) -> Self {
        Self {
            users,
            jwt_secret,
            token_ttl: Duration::minutes(token_ttl_minutes),
        }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> AppResult<()> {
        request
            .validate()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::InvalidInput(
                "Email already registered".to_string(),
            ));
        }

        let user = UserDocument {
            id: None,
            username: request.username,
            email: request.email,
            password_hash: hash_password(&request.password)?,
        };
        self.users.insert(user).await?;

        Ok(())
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse> {
        request
            .validate()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        let unauthorized = || AppError::Unauthorized(INVALID_CREDENTIALS.to_string());

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(unauthorized)?;

        if !verify_password(&request.password, &user.password_hash) {
            tracing::warn!("Login rejected");
            return Err(unauthorized());
        }

        let token = self.issue_token(&user.email)?;
        Ok(TokenResponse::bearer(token))
    }

    /// Signs an HS256 access token for `subject`
    pub fn issue_token(&self, subject: &str) -> AppResult<String> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (Utc::now() + self.token_ttl).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Checks signature and expiry of an access token
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::Unauthorized("Token has expired".to_string()),
            _ => {
                tracing::debug!(error = %e, "Token rejected");
                AppError::Unauthorized("Could not validate credentials".to_string())
            }
        })
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// False for a wrong password and for a stored hash that does not parse
fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
