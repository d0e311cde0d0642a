//! Tests for the issuance service

use std::sync::Arc;

use chrono::Duration;

use super::mocks::{start, Harness, RecordingChannel, EMAIL, PHONE};
use crate::domain::value_objects::{Channel, OtpStatus};
use crate::errors::{DomainError, ThrottleError, VerificationError};
use crate::repositories::{InMemoryOtpStore, OtpRecordStore};
use crate::services::otp::{
    DeliveryChannels, IssuanceService, MessageRenderer, OtpServiceConfig,
};

#[tokio::test]
async fn test_first_send_creates_record() {
    let h = Harness::new();

    let outcome = h.issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();

    assert_eq!(outcome.attempts, 0);
    assert_eq!(outcome.channel, Channel::Sms);
    assert_eq!(outcome.next_send_at, Some(start() + Duration::minutes(1)));
    assert_eq!(outcome.expires_at, start() + Duration::minutes(60));
    assert_eq!(outcome.message_id, "mock-msg-1");

    let record = h.store.get("session-1").await.unwrap().unwrap();
    assert_eq!(record.attempts, 0);
    assert!(!record.used);
    assert_eq!(record.last_request_time, start());
    assert_eq!(h.sms.last_code().as_deref(), Some(record.code.as_str()));
}

#[tokio::test]
async fn test_send_inside_window_is_throttled_without_mutation() {
    let h = Harness::new();
    h.issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();
    let before = h.store.get("session-1").await.unwrap().unwrap();

    h.clock.advance(Duration::seconds(30));
    let err = h
        .issuance
        .send(PHONE, "session-1", Channel::Sms)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DomainError::Throttle(ThrottleError::MustWait {
            wait_seconds: 30,
            next_allowed_at: start() + Duration::minutes(1),
        })
    );
    assert_eq!(h.store.get("session-1").await.unwrap().unwrap(), before);
    assert_eq!(h.sms.sent_count(), 1);
}

#[tokio::test]
async fn test_resend_after_window_replaces_code() {
    let h = Harness::new();
    h.issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();
    let first = h.store.get("session-1").await.unwrap().unwrap();

    h.clock.advance(Duration::seconds(61));
    let outcome = h.issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();

    let record = h.store.get("session-1").await.unwrap().unwrap();
    assert_eq!(outcome.attempts, 1);
    assert_eq!(record.attempts, 1);
    assert_eq!(record.last_request_time, start() + Duration::seconds(61));
    assert_eq!(record.expires_at, first.expires_at);
    assert_eq!(h.sms.last_code().as_deref(), Some(record.code.as_str()));
    assert_eq!(
        outcome.next_send_at,
        Some(start() + Duration::seconds(61) + Duration::minutes(3))
    );
}

#[tokio::test]
async fn test_schedule_exhaustion() {
    let h = Harness::new();
    h.issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();

    for (i, wait) in [1, 3, 5, 8, 10].into_iter().enumerate() {
        h.clock.advance(Duration::minutes(wait));
        let outcome = h.issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();
        assert_eq!(outcome.attempts, i as u32 + 1);
    }

    h.clock.advance(Duration::minutes(10));
    let err = h
        .issuance
        .send(PHONE, "session-1", Channel::Sms)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::Throttle(ThrottleError::AttemptsExhausted { attempts: 5 })
    );
    assert_eq!(h.sms.sent_count(), 6);
}

#[tokio::test]
async fn test_expiry_restarts_cycle() {
    let h = Harness::new();
    h.issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();
    h.clock.advance(Duration::minutes(1));
    h.issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();

    h.clock.set(start() + Duration::minutes(60));
    let outcome = h.issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();

    assert_eq!(outcome.attempts, 0);
    assert_eq!(outcome.expires_at, start() + Duration::minutes(120));
}

#[tokio::test]
async fn test_unknown_channel_fails_before_mutation() {
    let h = Harness::new();

    let err = h
        .issuance
        .send_via(PHONE, "session-1", "push")
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Channel(ref e) if e.channel == "push"));
    assert!(!h.store.exists("session-1").await.unwrap());
}

#[tokio::test]
async fn test_unconfigured_channel_fails_before_mutation() {
    let store = Arc::new(InMemoryOtpStore::new());
    let sms = Arc::new(RecordingChannel::new());
    let issuance = IssuanceService::new(
        store.clone(),
        DeliveryChannels::new().with(Channel::Sms, sms),
        OtpServiceConfig::default(),
    );

    let err = issuance
        .send(EMAIL, "session-1", Channel::Email)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Channel(_)));
    assert!(!store.exists("session-1").await.unwrap());
}

#[tokio::test]
async fn test_send_via_email() {
    let h = Harness::new();

    h.issuance.send_via(EMAIL, "session-1", "Email").await.unwrap();

    assert_eq!(h.email.sent_count(), 1);
    assert_eq!(h.sms.sent_count(), 0);
}

#[tokio::test]
async fn test_invalid_destination_rejected() {
    let h = Harness::new();

    let err = h
        .issuance
        .send(EMAIL, "session-1", Channel::Sms)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let err = h.issuance.send(PHONE, "  ", Channel::Sms).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn test_free_text_phone_destination_rejected() {
    let h = Harness::new();

    for destination in ["call me at +1 415 555 2671 please", "abc+14155552671"] {
        let err = h
            .issuance
            .send(destination, "session-1", Channel::Sms)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    assert!(h.store.is_empty().await);
    assert_eq!(h.sms.sent_count(), 0);
}

#[tokio::test]
async fn test_destination_delivered_normalized() {
    let h = Harness::new();

    h.issuance
        .send("+1 (415) 555-2671", "session-1", Channel::Sms)
        .await
        .unwrap();
    h.issuance
        .send("  jane@example.com ", "session-2", Channel::Email)
        .await
        .unwrap();

    assert_eq!(h.sms.sent.lock().unwrap()[0].0, PHONE);
    assert_eq!(h.email.sent.lock().unwrap()[0].0, EMAIL);
}

#[tokio::test]
async fn test_delivery_failure_keeps_state() {
    let h = Harness::with_channels(RecordingChannel::failing(), RecordingChannel::new());

    let err = h
        .issuance
        .send(PHONE, "session-1", Channel::Sms)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Delivery(ref e) if e.channel == "sms"));
    assert!(err.is_retriable());
    // The record stays, so a retry is throttled like any resend
    let record = h.store.get("session-1").await.unwrap().unwrap();
    assert_eq!(record.attempts, 0);
    assert!(matches!(
        h.issuance.send(PHONE, "session-1", Channel::Sms).await,
        Err(DomainError::Throttle(ThrottleError::MustWait { .. }))
    ));
}

#[tokio::test]
async fn test_send_on_consumed_record() {
    let h = Harness::new();
    h.issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();
    h.verification.mark_used("session-1").await.unwrap();

    h.clock.advance(Duration::minutes(5));
    let err = h
        .issuance
        .send(PHONE, "session-1", Channel::Sms)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Verification(VerificationError::AlreadyUsed { .. })
    ));
}

#[tokio::test]
async fn test_status_reports_lifecycle() {
    let h = Harness::new();
    assert_eq!(h.issuance.status("session-1").await.unwrap(), OtpStatus::Absent);

    h.issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();
    assert_eq!(
        h.issuance.status("session-1").await.unwrap(),
        OtpStatus::Active {
            attempts: 0,
            next_send_at: start() + Duration::minutes(1),
            expires_at: start() + Duration::minutes(60),
        }
    );

    h.verification.mark_used("session-1").await.unwrap();
    assert!(matches!(
        h.issuance.status("session-1").await.unwrap(),
        OtpStatus::Consumed { .. }
    ));

    h.clock.advance(Duration::minutes(60));
    assert_eq!(h.issuance.status("session-1").await.unwrap(), OtpStatus::Absent);
}

struct BrandedRenderer;

impl MessageRenderer for BrandedRenderer {
    fn render(&self, channel: Channel, code: &str) -> String {
        format!("[OtpGate/{}] code {}", channel, code)
    }
}

#[tokio::test]
async fn test_custom_renderer() {
    let store = Arc::new(InMemoryOtpStore::new());
    let sms = Arc::new(RecordingChannel::new());
    let issuance = IssuanceService::new(
        store,
        DeliveryChannels::new().with(Channel::Sms, sms.clone()),
        OtpServiceConfig::default(),
    )
    .with_renderer(Arc::new(BrandedRenderer));

    issuance.send(PHONE, "session-1", Channel::Sms).await.unwrap();

    let sent = sms.sent.lock().unwrap();
    assert!(sent[0].1.starts_with("[OtpGate/sms] code "));
}
