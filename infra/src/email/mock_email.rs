//! Mock E-mail Service Implementation
//!
//! Records messages instead of sending them, optionally echoing each one to
//! the console for local development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use otp_shared::email::{is_valid_email, mask_email};

use super::email_service::EmailService;
use crate::delivery::SentMessage;
use crate::InfrastructureError;

/// Mock e-mail service for development and testing
#[derive(Clone)]
pub struct MockEmailService {
    /// Sender address shown in console output
    from: String,
    message_count: Arc<AtomicU64>,
    outbox: Arc<Mutex<Vec<SentMessage>>>,
    simulate_failure: Arc<AtomicBool>,
    console_output: bool,
}

impl MockEmailService {
    /// Create a new mock e-mail service that prints to the console
    pub fn new(from: impl Into<String>) -> Self {
        Self::with_options(from, true, false)
    }

    /// Create a mock service with configurable options
    pub fn with_options(
        from: impl Into<String>,
        console_output: bool,
        simulate_failure: bool,
    ) -> Self {
        Self {
            from: from.into(),
            message_count: Arc::new(AtomicU64::new(0)),
            outbox: Arc::new(Mutex::new(Vec::new())),
            simulate_failure: Arc::new(AtomicBool::new(simulate_failure)),
            console_output,
        }
    }

    /// Sender address
    pub fn from_address(&self) -> &str {
        &self.from
    }

    /// Get the total number of messages sent
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Most recently accepted message
    pub fn last_message(&self) -> Option<SentMessage> {
        self.outbox.lock().ok().and_then(|outbox| outbox.last().cloned())
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, InfrastructureError> {
        let masked_to = mask_email(to);

        if !is_valid_email(to) {
            return Err(InfrastructureError::Email(format!(
                "Invalid e-mail address: {}",
                masked_to
            )));
        }

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!("Mock e-mail service simulating failure for: {}", masked_to);
            return Err(InfrastructureError::Email(
                "Simulated e-mail sending failure".to_string(),
            ));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.push(SentMessage {
                message_id: message_id.clone(),
                recipient: to.to_string(),
                body: body.to_string(),
            });
        }

        if self.console_output {
            println!("\n{}", "=".repeat(60));
            println!("MOCK EMAIL SERVICE - MESSAGE #{}", count);
            println!("{}", "=".repeat(60));
            println!("From: {}", self.from);
            println!("To: {}", masked_to);
            println!("Subject: {}", subject);
            println!("Message ID: {}", message_id);
            println!("Content: {}", body);
            println!("{}\n", "=".repeat(60));
        }

        info!(
            target: "email_service",
            provider = "mock",
            to = %masked_to,
            message_id = %message_id,
            message_length = body.len(),
            "E-mail sent successfully (mock)"
        );

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }

    async fn is_available(&self) -> bool {
        !self.simulate_failure.load(Ordering::SeqCst)
    }
}
