//! E-mail Service Module
//!
//! Provider interface, mock implementation and the adapter exposing a
//! provider as the core `email` delivery channel.

pub mod adapter;
pub mod email_service;
pub mod mock_email;

pub use adapter::EmailDeliveryChannel;
pub use email_service::EmailService;
pub use mock_email::MockEmailService;
