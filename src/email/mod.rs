//! Outbound email transports.
//!
//! [`EmailTransport`] is the capability the dispatch engine sends through.
//! Two backends exist and one is picked at startup from configuration:
//! [`ApiEmailClient`] talks to an HTTP email provider, [`SmtpEmailClient`]
//! relays through an SMTP server.

use async_trait::async_trait;

use crate::domain::newsletter::attachment::DecodedAttachment;
use crate::domain::subscriber::email::Email;

pub mod api;
pub mod smtp;

pub use api::ApiEmailClient;
pub use smtp::SmtpEmailClient;

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("an email needs at least one recipient")]
    NoRecipients,
    #[error("the email could not be built: {0}")]
    InvalidMessage(String),
    #[error("the email provider rejected the request")]
    Http(#[from] reqwest::Error),
    #[error("the SMTP server rejected the message")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Sends one message to `recipients`. Returns once the backend has
    /// accepted or refused it.
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipients: &[Email],
        attachments: &[DecodedAttachment],
    ) -> Result<(), TransportError>;
}
