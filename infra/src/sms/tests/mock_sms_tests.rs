//! Unit tests for mock SMS service

use crate::sms::{MockSmsService, SmsService};
use crate::InfrastructureError;

#[tokio::test]
async fn test_mock_sms_send_success() {
    let service = MockSmsService::with_options(false, false);
    let result = service.send_sms("+14155552671", "Test message").await;

    assert!(result.is_ok());
    let message_id = result.unwrap();
    assert!(message_id.starts_with("mock_"));
    assert_eq!(service.get_message_count(), 1);

    let sent = service.last_message().unwrap();
    assert_eq!(sent.message_id, message_id);
    assert_eq!(sent.recipient, "+14155552671");
    assert_eq!(sent.body, "Test message");
}

#[tokio::test]
async fn test_mock_sms_invalid_phone() {
    let service = MockSmsService::with_options(false, false);
    let result = service.send_sms("4155552671", "Test message").await;

    if let Err(InfrastructureError::Sms(msg)) = result {
        assert!(msg.contains("Invalid phone number"));
        assert!(!msg.contains("4155552671"));
    } else {
        panic!("Expected Sms error");
    }
    assert_eq!(service.get_message_count(), 0);
}

#[tokio::test]
async fn test_mock_sms_simulate_failure() {
    let service = MockSmsService::with_options(false, false);
    service.set_simulate_failure(true);

    let result = service.send_sms("+14155552671", "Test message").await;
    assert!(result.is_err());
    assert!(!service.is_available().await);
    assert!(service.last_message().is_none());

    service.set_simulate_failure(false);
    assert!(service.send_sms("+14155552671", "Test message").await.is_ok());
}

#[tokio::test]
async fn test_mock_sms_counter_shared_between_clones() {
    let service = MockSmsService::with_options(false, false);
    let clone = service.clone();

    for i in 1..=3 {
        clone
            .send_sms("+14155552671", &format!("Message {}", i))
            .await
            .unwrap();
        assert_eq!(service.get_message_count(), i);
    }
    assert_eq!(service.last_message().unwrap().body, "Message 3");
}

#[test]
fn test_provider_name() {
    let service = MockSmsService::new();
    assert_eq!(service.provider_name(), "Mock");
}
