//! Races between concurrent senders and consumers

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use chrono::Duration;

use super::mocks::{start, Harness, RacingStore, RecordingChannel, PHONE};
use crate::clock::ManualClock;
use crate::domain::value_objects::Channel;
use crate::errors::{DomainError, ThrottleError, VerificationError};
use crate::repositories::{InMemoryOtpStore, OtpRecordStore};
use crate::services::otp::{DeliveryChannels, IssuanceService, OtpServiceConfig};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_sends_admit_one() {
    let h = Arc::new(Harness::new());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let h = h.clone();
            tokio::spawn(async move { h.issuance.send(PHONE, "session-1", Channel::Sms).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(DomainError::Throttle(ThrottleError::MustWait { .. })) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(h.sms.sent_count(), 1);
    assert_eq!(h.store.get("session-1").await.unwrap().unwrap().attempts, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resends_admit_one() {
    let h = Arc::new(Harness::new());
    h.issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();
    h.clock.advance(Duration::minutes(2));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let h = h.clone();
            tokio::spawn(async move { h.issuance.send(PHONE, "session-1", Channel::Sms).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(h.store.get("session-1").await.unwrap().unwrap().attempts, 1);
}

#[tokio::test]
async fn test_lost_resend_race_is_rethrottled() {
    let clock = ManualClock::new(start());
    let store = Arc::new(RacingStore {
        inner: InMemoryOtpStore::with_clock(Arc::new(clock.clone())),
        clock: clock.clone(),
        races_left: AtomicUsize::new(1),
    });
    let sms = Arc::new(RecordingChannel::new());
    let issuance = IssuanceService::new(
        store.clone(),
        DeliveryChannels::new().with(Channel::Sms, sms.clone()),
        OtpServiceConfig::default(),
    )
    .with_clock(Arc::new(clock.clone()));

    issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();
    store.clock.advance(Duration::minutes(1));

    let err = issuance
        .send(PHONE, "session-1", Channel::Sms)
        .await
        .unwrap_err();

    // The competing writer's resend opened a three minute window
    assert_eq!(
        err,
        DomainError::Throttle(ThrottleError::MustWait {
            wait_seconds: 180,
            next_allowed_at: start() + Duration::minutes(4),
        })
    );
    let record = store.get("session-1").await.unwrap().unwrap();
    assert_eq!(record.attempts, 1);
    assert_eq!(record.code, "000000");
    assert_eq!(sms.sent_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_consumers_single_winner() {
    let h = Arc::new(Harness::new());
    h.issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();
    let code = h.sms.last_code().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let h = h.clone();
            let code = code.clone();
            tokio::spawn(async move {
                h.verification.verify_and_consume("session-1", &code).await
            })
        })
        .collect();

    let mut consumed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(outcome) => {
                assert!(outcome.valid);
                consumed += 1;
            }
            Err(DomainError::Verification(VerificationError::AlreadyUsed { .. })) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(consumed, 1);
}
