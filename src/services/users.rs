//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        access::Viewer,
        user::{NewUser, RegisterUser, ResetPassword, Role, User, UserClaims},
    },
    repository::Repository,
    services::password_reset::PasswordResetService,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    password_reset: PasswordResetService,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig, password_reset: PasswordResetService) -> Self {
        Self {
            repository,
            config,
            password_reset,
        }
    }

    /// Create an account and return it with a session token
    pub async fn register(&self, data: RegisterUser) -> AppResult<(String, User)> {
        data.validate()?;

        if data.password != data.password_confirm {
            return Err(AppError::Validation("Passwords do not match.".to_string()));
        }

        let role = data.role.unwrap_or_default();
        if role == Role::SuperAdmin {
            return Err(AppError::Validation(
                "Role must be student or student_admin".to_string(),
            ));
        }

        if self
            .repository
            .users
            .username_or_email_exists(&data.username, &data.email)
            .await?
        {
            return Err(AppError::Conflict("Username or email already exists".to_string()));
        }

        let password_hash = self.hash_password(&data.password)?;
        let user = self
            .repository
            .users
            .create(&NewUser {
                username: data.username.trim(),
                email: data.email.trim(),
                password_hash: &password_hash,
                first_name: data.first_name.as_deref(),
                last_name: data.last_name.as_deref(),
                role,
            })
            .await?;

        tracing::info!("User {} registered as {}", user.username, user.role);

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Authenticate user by username and return a JWT token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            tracing::warn!("Failed login for {}", user.username);
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Create JWT token for a user
    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify user password
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

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Change a user's role (super admin only)
    pub async fn update_role(&self, viewer: &Viewer, user_id: i32, role: Role) -> AppResult<User> {
        viewer.require_super_admin()?;
        let user = self.repository.users.update_role(user_id, role).await?;
        tracing::info!("User {} role set to {} by {}", user.username, role, viewer.user_id);
        Ok(user)
    }

    /// Mail a password reset OTP to a registered address
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let user = self
            .repository
            .users
            .get_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("Email not registered.".to_string()))?;

        self.password_reset.issue_otp(&user.email).await
    }

    /// Exchange a correct OTP for a reset token
    pub async fn verify_password_reset_otp(&self, email: &str, otp: &str) -> AppResult<String> {
        self.password_reset.verify_otp(email, otp).await
    }

    /// Set a new password using a reset token
    pub async fn reset_password(&self, data: ResetPassword) -> AppResult<()> {
        if data.new_password != data.confirm_password {
            return Err(AppError::Validation("Passwords do not match.".to_string()));
        }
        data.validate()?;

        let email = self.password_reset.consume_reset_token(&data.reset_token).await?;
        let user = self
            .repository
            .users
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Validation("You must verify OTP first.".to_string()))?;

        let password_hash = self.hash_password(&data.new_password)?;
        self.repository
            .users
            .update_password(user.id, &password_hash)
            .await?;

        tracing::info!("Password reset for {}", user.username);
        Ok(())
    }
}
