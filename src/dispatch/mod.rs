//! Delivery of one newsletter to every subscriber of its category.
//!
//! A dispatch runs a fixed sequence of gates (newsletter lookup, subscriber
//! lookup, attachment decoding, content check) and any gate failure aborts
//! before the first email leaves. Past the gates every subscriber gets its
//! own personalised send, and a failed send is recorded and skipped: earlier
//! deliveries are never undone and later ones are still attempted.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::newsletter::attachment::{self, DecodedAttachment, InvalidAttachment};
use crate::domain::newsletter::Newsletter;
use crate::domain::subscriber::email::Email;
use crate::domain::subscriber::Subscriber;
use crate::email::EmailTransport;
use crate::store::{NewsletterStore, StoreError, SubscriberStore};
use crate::utils::error_chain_fmt;

mod personalize;

pub use personalize::{personalize, EMAIL_PLACEHOLDER, HOST_DOMAIN_PLACEHOLDER};

#[derive(thiserror::Error)]
pub enum DispatchError {
    #[error("`{0}` is not a valid newsletter id")]
    InvalidArgument(String),
    #[error("newsletter {0} was not found")]
    NotFound(Uuid),
    #[error("failed to look up the newsletter or its subscribers")]
    LookupFailed(#[source] StoreError),
    #[error(transparent)]
    InvalidAttachment(#[from] InvalidAttachment),
    #[error("newsletter content is empty")]
    EmptyContent,
}

impl std::fmt::Debug for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    /// The transport refused the message, or the stored address is not a
    /// valid email. Never aborts the rest of the batch.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub email: String,
    pub outcome: DeliveryOutcome,
}

/// Outcome of a dispatch that passed every gate. One entry per subscriber,
/// in the order they were attempted.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub newsletter_id: Uuid,
    pub deliveries: Vec<Delivery>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.deliveries.len()
    }

    pub fn delivered(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| d.outcome == DeliveryOutcome::Sent)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.delivered()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries
            .iter()
            .filter(|d| d.outcome != DeliveryOutcome::Sent)
    }

    /// `true` when every attempted delivery went through, including the
    /// trivial case of a category with no subscribers.
    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }
}

pub struct Dispatcher {
    newsletters: Arc<dyn NewsletterStore>,
    subscribers: Arc<dyn SubscriberStore>,
    transport: Arc<dyn EmailTransport>,
    unsubscribe_base_url: String,
}

impl Dispatcher {
    pub fn new(
        newsletters: Arc<dyn NewsletterStore>,
        subscribers: Arc<dyn SubscriberStore>,
        transport: Arc<dyn EmailTransport>,
        unsubscribe_base_url: String,
    ) -> Self {
        Self {
            newsletters,
            subscribers,
            transport,
            unsubscribe_base_url,
        }
    }

    /// Dispatches the newsletter identified by a raw, caller-supplied id.
    pub async fn send_newsletter(
        &self,
        newsletter_id: &str,
    ) -> Result<DispatchReport, DispatchError> {
        let id = Uuid::parse_str(newsletter_id.trim())
            .map_err(|_| DispatchError::InvalidArgument(newsletter_id.to_owned()))?;

        self.dispatch(id).await
    }

    #[tracing::instrument(
        name = "Dispatch newsletter",
        skip(self),
        fields(category = tracing::field::Empty, subscribers = tracing::field::Empty)
    )]
    pub async fn dispatch(&self, newsletter_id: Uuid) -> Result<DispatchReport, DispatchError> {
        let newsletter = self
            .newsletters
            .get_by_id(newsletter_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => DispatchError::NotFound(newsletter_id),
                e => DispatchError::LookupFailed(e),
            })?;
        tracing::Span::current().record("category", newsletter.category.as_str());

        let subscribers = self
            .subscribers
            .get_by_category(&newsletter.category)
            .await
            .map_err(DispatchError::LookupFailed)?;
        tracing::Span::current().record("subscribers", subscribers.len());

        if subscribers.is_empty() {
            tracing::info!("No subscribers to send the newsletter to");
            return Ok(DispatchReport {
                newsletter_id,
                deliveries: Vec::new(),
            });
        }

        let attachments = attachment::decode_all(&newsletter.attachments)?;

        if newsletter.content.is_empty() {
            return Err(DispatchError::EmptyContent);
        }

        let mut deliveries = Vec::with_capacity(subscribers.len());
        for subscriber in &subscribers {
            let outcome = self.deliver(&newsletter, subscriber, &attachments).await;
            deliveries.push(Delivery {
                email: subscriber.email.clone(),
                outcome,
            });
        }

        let report = DispatchReport {
            newsletter_id,
            deliveries,
        };
        tracing::info!(
            attempted = report.attempted(),
            delivered = report.delivered(),
            failed = report.failed(),
            "Newsletter dispatch finished"
        );

        Ok(report)
    }

    #[tracing::instrument(
        name = "Deliver newsletter to subscriber",
        skip(self, newsletter, subscriber, attachments),
        fields(subscriber_email = %subscriber.email)
    )]
    async fn deliver(
        &self,
        newsletter: &Newsletter,
        subscriber: &Subscriber,
        attachments: &[DecodedAttachment],
    ) -> DeliveryOutcome {
        let recipient = match Email::try_from(subscriber.email.as_str()) {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(
                    error.message = %e,
                    "Skipping a subscriber. Their stored contact details are invalid",
                );
                return DeliveryOutcome::Failed { reason: e };
            }
        };

        let body = personalize(&newsletter.content, subscriber, &self.unsubscribe_base_url);

        match self
            .transport
            .send(
                &newsletter.subject,
                &body,
                std::slice::from_ref(&recipient),
                attachments,
            )
            .await
        {
            Ok(()) => {
                tracing::info!("Newsletter sent to {}", recipient);
                DeliveryOutcome::Sent
            }
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to deliver the newsletter to a subscriber. Skipping.",
                );
                DeliveryOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
