//! Authentication, registration and request identity resolution

use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::rngs::OsRng;

use crate::{
    config::{AuthConfig, RoleResolution},
    error::{AppError, AppResult},
    models::user::{Identity, NewUser, RegisterUser, Role, User, UserClaims},
    repository::UserStore,
};

/// Username reported for requests made with the admin credential
pub const ADMIN_USERNAME: &str = "admin";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    config: AuthConfig,
}

fn parse_role_header(value: &str) -> AppResult<Role> {
    value.parse().map_err(|e: String| AppError::Authorization(e))
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, config: AuthConfig) -> Self {
        Self { users, config }
    }

    pub async fn register(&self, data: &RegisterUser) -> AppResult<User> {
        let username = data.username.trim();
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let new = NewUser {
            username: username.to_string(),
            password_hash: self.hash_password(&data.password)?,
            role: data.role.unwrap_or_default(),
        };

        match self.users.create(&new).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, role = %user.role, "User registered");
                Ok(user)
            }
            Err(e) if e.is_unique_violation() => {
                Err(AppError::Conflict("User already exists".to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Check credentials and issue a JWT
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    pub fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };
        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Resolve the caller of a request from its bearer token and the
    /// optional `X-User-Role` header.
    pub async fn resolve(&self, token: &str, role_header: Option<&str>) -> AppResult<Identity> {
        let role_header = role_header.map(str::trim).filter(|h| !h.is_empty());

        if self.config.admin_token.as_deref() == Some(token) {
            let role = role_header.map(parse_role_header).transpose()?.unwrap_or_default();
            return Ok(Identity {
                user_id: None,
                username: ADMIN_USERNAME.to_string(),
                role,
            });
        }

        let claims = UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Token is not valid".to_string()))?;

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let role = match (self.config.role_resolution, role_header) {
            (RoleResolution::HeaderOverride, Some(header)) => {
                let role = parse_role_header(header)?;
                if role != user.role {
                    tracing::debug!(user_id = user.id, stored = %user.role, requested = %role, "Role overridden by header");
                }
                role
            }
            _ => user.role,
        };

        Ok(Identity {
            user_id: Some(user.id),
            username: user.username,
            role,
        })
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
