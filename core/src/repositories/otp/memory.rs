//! In-process implementation of OtpRecordStore

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clock::{Clock, SystemClock};
use crate::domain::entities::OtpRecord;
use crate::errors::{DomainError, DomainResult, VerificationError};

use super::r#trait::OtpRecordStore;

/// Map-backed record store with lazy expiry.
///
/// Expired records are invisible to every operation and are dropped the
/// next time a write touches their key, or in bulk by `purge_expired`.
/// All writes hold the map's write lock for the whole check-and-set.
#[derive(Clone)]
pub struct InMemoryOtpStore {
    records: Arc<RwLock<HashMap<String, OtpRecord>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a store that judges expiry against `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Drop every expired record, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        before - records.len()
    }

    /// Number of records held, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn not_found(identity_key: &str) -> DomainError {
        VerificationError::NotFound {
            identity_key: identity_key.to_string(),
        }
        .into()
    }

    /// Live record for `identity_key`, evicting it first if expired
    fn live_mut<'a>(
        records: &'a mut HashMap<String, OtpRecord>,
        identity_key: &str,
        now: DateTime<Utc>,
    ) -> Option<&'a mut OtpRecord> {
        if records
            .get(identity_key)
            .is_some_and(|record| record.is_expired(now))
        {
            records.remove(identity_key);
        }
        records.get_mut(identity_key)
    }
}

impl Default for InMemoryOtpStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OtpRecordStore for InMemoryOtpStore {
    async fn create(&self, record: OtpRecord) -> DomainResult<()> {
        let now = self.clock.now();
        let mut records = self.records.write().await;

        if Self::live_mut(&mut records, &record.identity_key, now).is_some() {
            return Err(DomainError::Conflict {
                identity_key: record.identity_key,
            });
        }

        records.insert(record.identity_key.clone(), record);
        Ok(())
    }

    async fn get(&self, identity_key: &str) -> DomainResult<Option<OtpRecord>> {
        let now = self.clock.now();
        let records = self.records.read().await;
        Ok(records
            .get(identity_key)
            .filter(|record| !record.is_expired(now))
            .cloned())
    }

    async fn exists(&self, identity_key: &str) -> DomainResult<bool> {
        Ok(self.get(identity_key).await?.is_some())
    }

    async fn is_used(&self, identity_key: &str) -> DomainResult<bool> {
        Ok(self
            .get(identity_key)
            .await?
            .is_some_and(|record| record.used))
    }

    async fn mark_used(&self, identity_key: &str) -> DomainResult<()> {
        let now = self.clock.now();
        let mut records = self.records.write().await;

        let record = Self::live_mut(&mut records, identity_key, now)
            .ok_or_else(|| Self::not_found(identity_key))?;
        if record.used {
            return Err(VerificationError::AlreadyUsed {
                identity_key: identity_key.to_string(),
            }
            .into());
        }

        record.mark_used();
        Ok(())
    }

    async fn increment_attempts(
        &self,
        identity_key: &str,
        current_attempts: u32,
        code: &str,
        requested_at: DateTime<Utc>,
    ) -> DomainResult<u32> {
        let now = self.clock.now();
        let mut records = self.records.write().await;

        let record = Self::live_mut(&mut records, identity_key, now)
            .ok_or_else(|| Self::not_found(identity_key))?;
        if record.attempts != current_attempts {
            return Err(DomainError::Conflict {
                identity_key: identity_key.to_string(),
            });
        }

        record.record_resend(code, requested_at);
        Ok(record.attempts)
    }

    async fn update_last_request_time(
        &self,
        identity_key: &str,
        time: DateTime<Utc>,
    ) -> DomainResult<()> {
        let now = self.clock.now();
        let mut records = self.records.write().await;

        let record = Self::live_mut(&mut records, identity_key, now)
            .ok_or_else(|| Self::not_found(identity_key))?;
        record.last_request_time = time;
        Ok(())
    }
}
