//! Record store trait defining the persistence contract for OTP records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::OtpRecord;
use crate::errors::DomainResult;

/// Repository trait for OtpRecord persistence operations
///
/// Implementations must make every write atomic per identity key and must
/// discard a record once its `expires_at` has passed, independent of any
/// application call. The retention window runs from creation; updates never
/// extend it.
///
/// # Concurrency
/// - `create` is insert-if-absent
/// - `increment_attempts` is a compare-and-set on the attempt count
/// - `mark_used` checks and sets the flag in one step
#[async_trait]
pub trait OtpRecordStore: Send + Sync {
    /// Persist a new record
    ///
    /// # Returns
    /// * `Ok(())` - Record stored
    /// * `Err(DomainError::Conflict)` - A live record already exists for the key
    async fn create(&self, record: OtpRecord) -> DomainResult<()>;

    /// Fetch the live record for a key
    ///
    /// # Returns
    /// * `Ok(Some(OtpRecord))` - Record found
    /// * `Ok(None)` - Never created, or expired
    async fn get(&self, identity_key: &str) -> DomainResult<Option<OtpRecord>>;

    /// Whether a live record exists for the key
    async fn exists(&self, identity_key: &str) -> DomainResult<bool>;

    /// Whether the live record for the key has been consumed.
    /// Returns `false` when no record exists.
    async fn is_used(&self, identity_key: &str) -> DomainResult<bool>;

    /// Set the used flag
    ///
    /// # Returns
    /// * `Ok(())` - Flag set by this call
    /// * `Err(VerificationError::NotFound)` - No live record
    /// * `Err(VerificationError::AlreadyUsed)` - Flag was already set
    async fn mark_used(&self, identity_key: &str) -> DomainResult<()>;

    /// Record an accepted resend as a single write
    ///
    /// Increments the attempt count, stores `code` and sets
    /// `last_request_time` to `requested_at`, but only if the stored attempt
    /// count still equals `current_attempts`.
    ///
    /// # Returns
    /// * `Ok(u32)` - The new attempt count
    /// * `Err(DomainError::Conflict)` - Another writer changed the count first
    /// * `Err(VerificationError::NotFound)` - No live record
    async fn increment_attempts(
        &self,
        identity_key: &str,
        current_attempts: u32,
        code: &str,
        requested_at: DateTime<Utc>,
    ) -> DomainResult<u32>;

    /// Overwrite `last_request_time` without touching the attempt count
    ///
    /// # Returns
    /// * `Err(VerificationError::NotFound)` - No live record
    async fn update_last_request_time(
        &self,
        identity_key: &str,
        time: DateTime<Utc>,
    ) -> DomainResult<()>;
}
