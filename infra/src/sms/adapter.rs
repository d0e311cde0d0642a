//! SMS delivery channel adapter
//!
//! Bridges an infrastructure `SmsService` to the core `DeliveryChannel` seam.

use std::sync::Arc;

use async_trait::async_trait;
use otp_core::DeliveryChannel;

use super::sms_service::SmsService;

/// Adapter that implements the core `DeliveryChannel` for any SMS service
pub struct SmsDeliveryChannel {
    inner: Arc<dyn SmsService>,
}

impl SmsDeliveryChannel {
    pub fn new(inner: Arc<dyn SmsService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl DeliveryChannel for SmsDeliveryChannel {
    async fn deliver(&self, destination: &str, message: &str) -> Result<String, String> {
        self.inner
            .send_sms(destination, message)
            .await
            .map_err(|e| e.to_string())
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}
