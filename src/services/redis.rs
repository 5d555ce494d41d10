//! Redis service for one-time passwords and password reset tokens

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

/// An emailed one-time password as kept server-side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOtp {
    /// SHA-256 hex digest of the code
    pub code_digest: String,
    /// Verification attempts so far
    pub attempts: u32,
}

/// Server-side storage for password reset verification.
///
/// Keys are opaque digests computed by the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Store (or replace) an OTP with a fresh attempt counter
    async fn put_otp(&self, key: &str, code_digest: &str, ttl_seconds: u64) -> AppResult<()>;

    /// Count one verification attempt against a live OTP.
    ///
    /// Returns the OTP with `attempts` including this one, or `None` once it
    /// has expired or been deleted. Never recreates a missing OTP.
    async fn claim_attempt(&self, key: &str) -> AppResult<Option<StoredOtp>>;

    async fn delete_otp(&self, key: &str) -> AppResult<()>;

    /// Store a reset token granting a password change for `email`
    async fn put_reset_token(&self, key: &str, email: &str, ttl_seconds: u64) -> AppResult<()>;

    /// Fetch and delete a reset token in one step
    async fn take_reset_token(&self, key: &str) -> AppResult<Option<String>>;
}

/// Increment the attempt counter of an existing OTP hash and return
/// `{code, attempts}`, or nil when the hash is gone
const CLAIM_ATTEMPT_SCRIPT: &str = r"
if redis.call('HEXISTS', KEYS[1], 'code') == 0 then
    return false
end
local attempts = redis.call('HINCRBY', KEYS[1], 'attempts', 1)
return {redis.call('HGET', KEYS[1], 'code'), attempts}
";

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a new Redis service and check the server answers
    pub async fn new(url: &str) -> AppResult<Self> {
        let service = Self::open(url)?;

        let mut conn = service.connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(service)
    }

    /// Create a Redis service without connecting; connections are made on use
    pub fn open(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }

    fn otp_key(key: &str) -> String {
        format!("otp:{}", key)
    }

    fn reset_key(key: &str) -> String {
        format!("reset:{}", key)
    }
}

#[async_trait]
impl VerificationStore for RedisService {
    async fn put_otp(&self, key: &str, code_digest: &str, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let key = Self::otp_key(key);

        redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, &[("code", code_digest), ("attempts", "0")])
            .ignore()
            .cmd("EXPIRE")
            .arg(&key)
            .arg(ttl_seconds)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store OTP in Redis: {}", e)))
    }

    async fn claim_attempt(&self, key: &str) -> AppResult<Option<StoredOtp>> {
        let mut conn = self.connection().await?;

        let claimed: Option<(String, i64)> = redis::Script::new(CLAIM_ATTEMPT_SCRIPT)
            .key(Self::otp_key(key))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to count OTP attempt in Redis: {}", e)))?;

        Ok(claimed.map(|(code_digest, attempts)| StoredOtp {
            code_digest,
            attempts: u32::try_from(attempts).unwrap_or(u32::MAX),
        }))
    }

    async fn delete_otp(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(Self::otp_key(key))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete OTP from Redis: {}", e)))
    }

    async fn put_reset_token(&self, key: &str, email: &str, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(Self::reset_key(key), email, ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store reset token in Redis: {}", e)))
    }

    async fn take_reset_token(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection().await?;
        let key = Self::reset_key(key);

        let (email,): (Option<String>,) = redis::pipe()
            .atomic()
            .get(&key)
            .del(&key)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read reset token from Redis: {}", e)))?;

        Ok(email)
    }
}
