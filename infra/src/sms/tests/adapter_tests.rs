//! Unit tests for the SMS delivery channel adapter

use std::sync::Arc;

use otp_core::DeliveryChannel;

use crate::sms::{MockSmsService, SmsDeliveryChannel};

#[tokio::test]
async fn test_adapter_forwards_message() {
    let service = MockSmsService::with_options(false, false);
    let channel = SmsDeliveryChannel::new(Arc::new(service.clone()));

    let message_id = channel
        .deliver("+14155552671", "Your verification code is 123456")
        .await
        .unwrap();

    let sent = service.last_message().unwrap();
    assert_eq!(sent.message_id, message_id);
    assert_eq!(sent.body, "Your verification code is 123456");
    assert_eq!(channel.provider_name(), "Mock");
}

#[tokio::test]
async fn test_adapter_flattens_errors() {
    let service = MockSmsService::with_options(false, true);
    let channel = SmsDeliveryChannel::new(Arc::new(service));

    let err = channel.deliver("+14155552671", "code").await.unwrap_err();
    assert!(err.contains("Simulated SMS sending failure"));
}
