//! Redis-backed OTP record store
//!
//! Each record is a hash at `{prefix}:{identity_key}` whose expiry is set
//! with `PEXPIREAT` when the record is created. Every write runs as a Lua
//! script so the check and the update are one atomic step, and no script
//! touches the expiry again, so retention is always measured from creation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use redis::Script;
use std::collections::HashMap;
use tracing::{debug, warn};

use otp_core::{DomainError, DomainResult, OtpRecord, OtpRecordStore, VerificationError};

use crate::cache::RedisClient;
use crate::InfrastructureError;

const FIELD_CODE: &str = "code";
const FIELD_USED: &str = "used";
const FIELD_ATTEMPTS: &str = "attempts";
const FIELD_LAST_REQUEST: &str = "last_request_ms";
const FIELD_CREATED: &str = "created_ms";
const FIELD_EXPIRES: &str = "expires_ms";

/// Insert-if-absent. Returns 1 when created, 0 when a record exists.
static CREATE_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r"
        if redis.call('EXISTS', KEYS[1]) == 1 then
            return 0
        end
        redis.call('HSET', KEYS[1],
            'code', ARGV[1],
            'used', '0',
            'attempts', '0',
            'last_request_ms', ARGV[2],
            'created_ms', ARGV[3],
            'expires_ms', ARGV[4])
        redis.call('PEXPIREAT', KEYS[1], ARGV[4])
        return 1
        ",
    )
});

/// Compare-and-set on the attempt count. Returns the new count, -1 when the
/// record is missing, -2 when the count no longer matches.
static INCREMENT_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r"
        local attempts = redis.call('HGET', KEYS[1], 'attempts')
        if not attempts then
            return -1
        end
        if tonumber(attempts) ~= tonumber(ARGV[1]) then
            return -2
        end
        local next = tonumber(attempts) + 1
        redis.call('HSET', KEYS[1],
            'attempts', tostring(next),
            'code', ARGV[2],
            'last_request_ms', ARGV[3])
        return next
        ",
    )
});

/// Returns 1 when the flag was set, 0 when already set, -1 when missing.
static MARK_USED_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r"
        local used = redis.call('HGET', KEYS[1], 'used')
        if not used then
            return -1
        end
        if used == '1' then
            return 0
        end
        redis.call('HSET', KEYS[1], 'used', '1')
        return 1
        ",
    )
});

/// Returns 1 when updated, 0 when the record is missing.
static TOUCH_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r"
        if redis.call('EXISTS', KEYS[1]) == 0 then
            return 0
        end
        redis.call('HSET', KEYS[1], 'last_request_ms', ARGV[1])
        return 1
        ",
    )
});

/// OTP record store backed by Redis hashes
#[derive(Clone)]
pub struct RedisOtpStore {
    client: RedisClient,
    key_prefix: String,
}

impl RedisOtpStore {
    /// Create a store that namespaces its keys under `key_prefix`, itself
    /// nested under the client's configured cache prefix
    pub fn new(client: RedisClient, key_prefix: &str) -> Self {
        let key_prefix = client.config().make_key(key_prefix);
        Self { client, key_prefix }
    }

    /// Redis key holding the record for `identity_key`
    pub fn record_key(&self, identity_key: &str) -> String {
        format!("{}:{}", self.key_prefix, identity_key)
    }

    /// Underlying client
    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    async fn run(
        &self,
        script: &Script,
        identity_key: &str,
        args: Vec<String>,
    ) -> DomainResult<i64> {
        let keys = [self.record_key(identity_key)];
        Ok(self.client.invoke_script::<i64>(script, &keys, &args).await?)
    }

    fn not_found(identity_key: &str) -> DomainError {
        VerificationError::NotFound {
            identity_key: identity_key.to_string(),
        }
        .into()
    }
}

#[async_trait]
impl OtpRecordStore for RedisOtpStore {
    async fn create(&self, record: OtpRecord) -> DomainResult<()> {
        let created = self
            .run(&CREATE_SCRIPT, &record.identity_key, creation_args(&record))
            .await?;

        if created == 1 {
            debug!(
                identity_key = %record.identity_key,
                expires_at = %record.expires_at,
                "Created OTP record"
            );
            Ok(())
        } else {
            Err(DomainError::Conflict {
                identity_key: record.identity_key,
            })
        }
    }

    async fn get(&self, identity_key: &str) -> DomainResult<Option<OtpRecord>> {
        let fields = self.client.hgetall(&self.record_key(identity_key)).await?;
        if fields.is_empty() {
            return Ok(None);
        }

        match record_from_hash(identity_key, &fields) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(identity_key = identity_key, error = %e, "Unreadable OTP record");
                Err(e.into())
            }
        }
    }

    async fn exists(&self, identity_key: &str) -> DomainResult<bool> {
        Ok(self.client.exists(&self.record_key(identity_key)).await?)
    }

    async fn is_used(&self, identity_key: &str) -> DomainResult<bool> {
        Ok(self
            .get(identity_key)
            .await?
            .is_some_and(|record| record.used))
    }

    async fn mark_used(&self, identity_key: &str) -> DomainResult<()> {
        match self.run(&MARK_USED_SCRIPT, identity_key, Vec::new()).await? {
            1 => Ok(()),
            0 => Err(VerificationError::AlreadyUsed {
                identity_key: identity_key.to_string(),
            }
            .into()),
            _ => Err(Self::not_found(identity_key)),
        }
    }

    async fn increment_attempts(
        &self,
        identity_key: &str,
        current_attempts: u32,
        code: &str,
        requested_at: DateTime<Utc>,
    ) -> DomainResult<u32> {
        let args = vec![
            current_attempts.to_string(),
            code.to_string(),
            requested_at.timestamp_millis().to_string(),
        ];

        match self.run(&INCREMENT_SCRIPT, identity_key, args).await? {
            -1 => Err(Self::not_found(identity_key)),
            -2 => Err(DomainError::Conflict {
                identity_key: identity_key.to_string(),
            }),
            attempts => u32::try_from(attempts).map_err(|_| {
                DomainError::from(InfrastructureError::Corrupt(format!(
                    "attempt count {} out of range",
                    attempts
                )))
            }),
        }
    }

    async fn update_last_request_time(
        &self,
        identity_key: &str,
        time: DateTime<Utc>,
    ) -> DomainResult<()> {
        let args = vec![time.timestamp_millis().to_string()];
        match self.run(&TOUCH_SCRIPT, identity_key, args).await? {
            1 => Ok(()),
            _ => Err(Self::not_found(identity_key)),
        }
    }
}

/// Script arguments for creating `record`
pub(crate) fn creation_args(record: &OtpRecord) -> Vec<String> {
    vec![
        record.code.clone(),
        record.last_request_time.timestamp_millis().to_string(),
        record.created_at.timestamp_millis().to_string(),
        record.expires_at.timestamp_millis().to_string(),
    ]
}

/// Decode a record hash read with HGETALL
pub(crate) fn record_from_hash(
    identity_key: &str,
    fields: &HashMap<String, String>,
) -> Result<OtpRecord, InfrastructureError> {
    let field = |name: &str| {
        fields
            .get(name)
            .ok_or_else(|| InfrastructureError::Corrupt(format!("missing field '{}'", name)))
    };
    let millis = |name: &str| -> Result<DateTime<Utc>, InfrastructureError> {
        field(name)?
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| InfrastructureError::Corrupt(format!("invalid timestamp in '{}'", name)))
    };

    let attempts = field(FIELD_ATTEMPTS)?
        .parse::<u32>()
        .map_err(|_| InfrastructureError::Corrupt("invalid attempt count".to_string()))?;
    let used = match field(FIELD_USED)?.as_str() {
        "1" => true,
        "0" => false,
        other => {
            return Err(InfrastructureError::Corrupt(format!(
                "invalid used flag '{}'",
                other
            )))
        }
    };

    Ok(OtpRecord {
        identity_key: identity_key.to_string(),
        code: field(FIELD_CODE)?.clone(),
        used,
        attempts,
        last_request_time: millis(FIELD_LAST_REQUEST)?,
        created_at: millis(FIELD_CREATED)?,
        expires_at: millis(FIELD_EXPIRES)?,
    })
}
