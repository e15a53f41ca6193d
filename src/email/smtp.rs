use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, Secret};

use super::{EmailTransport, TransportError};
use crate::domain::newsletter::attachment::DecodedAttachment;
use crate::domain::subscriber::email::Email;

/// Relays through an SMTP server as a `multipart/mixed` message: an HTML
/// body followed by one part per attachment.
pub struct SmtpEmailClient {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpEmailClient {
    pub fn new(
        host: &str,
        port: u16,
        credentials: Option<(String, Secret<String>)>,
        sender: &Email,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .timeout(Some(timeout));

        if let Some((username, password)) = credentials {
            builder = builder.credentials(Credentials::new(
                username,
                password.expose_secret().to_owned(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            sender: mailbox(sender)?,
        })
    }

    fn build_message(
        &self,
        subject: &str,
        body: &str,
        recipients: &[Email],
        attachments: &[DecodedAttachment],
    ) -> Result<Message, TransportError> {
        let mut builder = Message::builder()
            .from(self.sender.clone())
            .subject(subject);
        for recipient in recipients {
            builder = builder.to(mailbox(recipient)?);
        }

        let mut parts = MultiPart::mixed().singlepart(SinglePart::html(body.to_owned()));
        for attachment in attachments {
            let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                TransportError::InvalidMessage(format!(
                    "attachment `{}` has an invalid type: {}",
                    attachment.name, e
                ))
            })?;
            parts = parts.singlepart(
                Attachment::new(attachment.name.clone())
                    .body(attachment.data.clone(), content_type),
            );
        }

        builder
            .multipart(parts)
            .map_err(|e| TransportError::InvalidMessage(e.to_string()))
    }
}

fn mailbox(email: &Email) -> Result<Mailbox, TransportError> {
    email
        .as_ref()
        .parse::<Mailbox>()
        .map_err(|e| TransportError::InvalidMessage(e.to_string()))
}

#[async_trait]
impl EmailTransport for SmtpEmailClient {
    #[tracing::instrument(
        name = "Send email through SMTP",
        skip_all,
        fields(recipients = recipients.len())
    )]
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipients: &[Email],
        attachments: &[DecodedAttachment],
    ) -> Result<(), TransportError> {
        if recipients.is_empty() {
            return Err(TransportError::NoRecipients);
        }

        let message = self.build_message(subject, body, recipients, attachments)?;
        self.transport.send(message).await?;

        Ok(())
    }
}
