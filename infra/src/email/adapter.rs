//! E-mail delivery channel adapter

use std::sync::Arc;

use async_trait::async_trait;
use otp_core::DeliveryChannel;

use super::email_service::EmailService;

/// Adapter that implements the core `DeliveryChannel` for any e-mail
/// service, sending every message under a fixed subject
pub struct EmailDeliveryChannel {
    inner: Arc<dyn EmailService>,
    subject: String,
}

impl EmailDeliveryChannel {
    pub fn new(inner: Arc<dyn EmailService>, subject: impl Into<String>) -> Self {
        Self {
            inner,
            subject: subject.into(),
        }
    }
}

#[async_trait]
impl DeliveryChannel for EmailDeliveryChannel {
    async fn deliver(&self, destination: &str, message: &str) -> Result<String, String> {
        self.inner
            .send_email(destination, &self.subject, message)
            .await
            .map_err(|e| e.to_string())
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}
