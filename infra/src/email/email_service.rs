//! E-mail Service Interface

use async_trait::async_trait;

use crate::InfrastructureError;

/// E-mail service trait for sending plain-text messages
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Send a message to `to`
    ///
    /// # Returns
    ///
    /// * `Ok(message_id)` - Unique identifier for the sent message
    /// * `Err(InfrastructureError)` - If sending fails
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, InfrastructureError>;

    /// Get the service provider name
    fn provider_name(&self) -> &str;

    /// Check if the service is available
    async fn is_available(&self) -> bool {
        true
    }
}
