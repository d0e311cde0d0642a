//! Verification service: single-use comparison of candidate codes

use std::sync::Arc;

use crate::errors::{DomainResult, VerificationError};
use crate::repositories::OtpRecordStore;

use super::types::VerifyOutcome;

/// Verification service comparing candidate codes against stored ones.
///
/// `verify` never mutates the record. Consuming a code is the caller's
/// decision, taken once its downstream work has succeeded, through
/// `mark_used` (or `verify_and_consume` when nothing needs to happen in
/// between).
pub struct VerificationService<S: OtpRecordStore + ?Sized> {
    store: Arc<S>,
}

impl<S: OtpRecordStore + ?Sized> VerificationService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Compare `candidate` against the code stored for `identity_key`
    ///
    /// Comparison is exact and constant time. Mismatches are not counted.
    ///
    /// # Returns
    ///
    /// * `Ok(VerifyOutcome { valid })` - Comparison result
    /// * `Err(VerificationError::NotFound)` - Never issued, or expired
    /// * `Err(VerificationError::AlreadyUsed)` - The code was consumed
    pub async fn verify(&self, identity_key: &str, candidate: &str) -> DomainResult<VerifyOutcome> {
        let record = self
            .store
            .get(identity_key)
            .await?
            .ok_or_else(|| VerificationError::NotFound {
                identity_key: identity_key.to_string(),
            })?;

        if record.used {
            tracing::warn!(
                identity_key = identity_key,
                event = "otp_reuse_attempt",
                "Verification attempted against a consumed code"
            );
            return Err(VerificationError::AlreadyUsed {
                identity_key: identity_key.to_string(),
            }
            .into());
        }

        let valid = record.matches(candidate);
        if valid {
            tracing::info!(
                identity_key = identity_key,
                event = "otp_verified",
                "Verification code matched"
            );
        } else {
            tracing::warn!(
                identity_key = identity_key,
                event = "otp_mismatch",
                "Verification code did not match"
            );
        }

        Ok(VerifyOutcome { valid })
    }

    /// Consume the code for `identity_key`. The flag is never unset.
    ///
    /// # Returns
    ///
    /// * `Err(VerificationError::NotFound)` - No live record
    /// * `Err(VerificationError::AlreadyUsed)` - Already consumed
    pub async fn mark_used(&self, identity_key: &str) -> DomainResult<()> {
        self.store.mark_used(identity_key).await?;

        tracing::info!(
            identity_key = identity_key,
            event = "otp_marked_used",
            "Verification code consumed"
        );
        Ok(())
    }

    /// Verify and, on a match, consume in the same call.
    ///
    /// If a concurrent caller consumes the code between the comparison and
    /// the write, this call fails with `AlreadyUsed`.
    pub async fn verify_and_consume(
        &self,
        identity_key: &str,
        candidate: &str,
    ) -> DomainResult<VerifyOutcome> {
        let outcome = self.verify(identity_key, candidate).await?;
        if outcome.valid {
            self.mark_used(identity_key).await?;
        }
        Ok(outcome)
    }
}
