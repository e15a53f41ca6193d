use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

use super::{EmailTransport, TransportError};
use crate::domain::newsletter::attachment::DecodedAttachment;
use crate::domain::subscriber::email::Email;

/// Sends through a Postmark-compatible HTTP API.
#[derive(Clone)]
pub struct ApiEmailClient {
    http_client: Client,
    base_url: String,
    sender: Email,
    authorization_token: Secret<String>,
}

impl ApiEmailClient {
    pub fn new(
        base_url: String,
        sender: Email,
        authorization_token: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        })
    }
}

#[async_trait]
impl EmailTransport for ApiEmailClient {
    #[tracing::instrument(
        name = "Send email through the HTTP API",
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

        let url = format!("{}/email", self.base_url);
        let to = recipients
            .iter()
            .map(|recipient| recipient.as_ref())
            .collect::<Vec<&str>>()
            .join(",");
        let request_body = SendEmailRequest {
            from: self.sender.as_ref(),
            to,
            subject,
            html_body: body,
            text_body: body,
            attachments: attachments
                .iter()
                .map(|a| SendEmailAttachment {
                    name: &a.name,
                    content: STANDARD.encode(&a.data),
                    content_type: &a.content_type,
                })
                .collect(),
        };

        self.http_client
            .post(&url)
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: String,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    attachments: Vec<SendEmailAttachment<'a>>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailAttachment<'a> {
    name: &'a str,
    content: String,
    content_type: &'a str,
}
