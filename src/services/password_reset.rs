//! One-time-password password reset.
//!
//! Flow: an OTP is mailed to a registered address, a correct OTP is exchanged
//! for a reset token, and the reset token authorizes exactly one password
//! change. Codes and tokens are never stored in clear.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

use crate::{
    config::PasswordResetConfig,
    error::{AppError, AppResult},
    services::{email::Mailer, redis::VerificationStore},
};

const OTP_DIGITS: u32 = 6;

fn digest(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Store key for an email address
fn email_key(email: &str) -> String {
    digest(&email.trim().to_lowercase())
}

fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..10u32.pow(OTP_DIGITS));
    format!("{:0width$}", code, width = OTP_DIGITS as usize)
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Clone)]
pub struct PasswordResetService {
    store: Arc<dyn VerificationStore>,
    mailer: Arc<dyn Mailer>,
    config: PasswordResetConfig,
}

impl PasswordResetService {
    pub fn new(
        store: Arc<dyn VerificationStore>,
        mailer: Arc<dyn Mailer>,
        config: PasswordResetConfig,
    ) -> Self {
        Self {
            store,
            mailer,
            config,
        }
    }

    /// Generate, store and mail a fresh OTP for `email`.
    ///
    /// Any previous OTP for the address is replaced. Mail failures are logged
    /// and otherwise ignored.
    pub async fn issue_otp(&self, email: &str) -> AppResult<()> {
        let code = generate_otp();
        self.store
            .put_otp(&email_key(email), &digest(&code), self.config.otp_ttl_seconds)
            .await?;

        let ttl_minutes = self.config.otp_ttl_seconds.div_ceil(60);
        if let Err(e) = self
            .mailer
            .send_password_reset_code(email, &code, ttl_minutes)
            .await
        {
            tracing::warn!("Failed to send password reset OTP to {}: {}", email, e);
        }

        tracing::info!("Password reset OTP issued for {}", email);
        Ok(())
    }

    /// Check an OTP and exchange it for a single-use reset token.
    ///
    /// The attempt is counted before the code is compared, so concurrent
    /// guesses cannot exceed the attempt limit.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> AppResult<String> {
        let key = email_key(email);
        let claimed = self
            .store
            .claim_attempt(&key)
            .await?
            .ok_or_else(|| AppError::Validation("OTP expired or not requested.".to_string()))?;

        if claimed.attempts > self.config.max_attempts {
            self.store.delete_otp(&key).await?;
            return Err(AppError::Validation(
                "Too many attempts. Request a new OTP.".to_string(),
            ));
        }

        if digest(otp.trim()) != claimed.code_digest {
            tracing::warn!(
                "Wrong password reset OTP for {} (attempt {})",
                email,
                claimed.attempts
            );
            if claimed.attempts >= self.config.max_attempts {
                self.store.delete_otp(&key).await?;
            }
            return Err(AppError::Validation("Invalid OTP. Try again.".to_string()));
        }

        self.store.delete_otp(&key).await?;

        let token = generate_reset_token();
        self.store
            .put_reset_token(
                &digest(&token),
                &email.trim().to_lowercase(),
                self.config.reset_token_ttl_seconds,
            )
            .await?;

        Ok(token)
    }

    /// Consume a reset token, returning the email it was issued for
    pub async fn consume_reset_token(&self, token: &str) -> AppResult<String> {
        self.store
            .take_reset_token(&digest(token.trim()))
            .await?
            .ok_or_else(|| AppError::Validation("You must verify OTP first.".to_string()))
    }
}
