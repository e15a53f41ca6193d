use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewsletterStore, Page, StoreError, SubscriberStore};
use crate::domain::newsletter::{NewNewsletter, Newsletter};
use crate::domain::subscriber::{NewSubscriber, Subscriber};

/// Process-local backend. Records keep their insertion order.
#[derive(Default)]
pub struct InMemoryStore {
    newsletters: RwLock<Vec<Newsletter>>,
    subscribers: RwLock<Vec<Subscriber>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T>(items: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    items.skip(page.offset()).take(page.limit()).collect()
}

#[async_trait]
impl NewsletterStore for InMemoryStore {
    #[tracing::instrument(
        name = "Insert newsletter",
        skip(self, newsletter),
        fields(category = %newsletter.category)
    )]
    async fn insert(&self, newsletter: NewNewsletter) -> Result<Newsletter, StoreError> {
        let newsletter = newsletter.with_id(Uuid::new_v4());
        self.newsletters.write().await.push(newsletter.clone());
        Ok(newsletter)
    }

    #[tracing::instrument(name = "Get newsletter by id", skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Newsletter, StoreError> {
        self.newsletters
            .read()
            .await
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("newsletter {}", id)))
    }

    #[tracing::instrument(name = "Get newsletter by category", skip(self))]
    async fn get_by_category(&self, category: &str) -> Result<Option<Newsletter>, StoreError> {
        Ok(self
            .newsletters
            .read()
            .await
            .iter()
            .find(|n| n.category == category)
            .cloned())
    }

    #[tracing::instrument(name = "List newsletters", skip(self))]
    async fn list(&self, name: Option<&str>, page: Page) -> Result<Vec<Newsletter>, StoreError> {
        let needle = name.map(str::to_lowercase);
        let newsletters = self.newsletters.read().await;
        let matching = newsletters.iter().filter(|n| match &needle {
            Some(needle) => n.name.to_lowercase().contains(needle.as_str()),
            None => true,
        });

        Ok(paginate(matching.cloned(), page))
    }

    #[tracing::instrument(
        name = "Update newsletter",
        skip(self, newsletter),
        fields(id = %newsletter.id)
    )]
    async fn update(&self, newsletter: &Newsletter) -> Result<(), StoreError> {
        let mut newsletters = self.newsletters.write().await;
        let existing = newsletters
            .iter_mut()
            .find(|n| n.id == newsletter.id)
            .ok_or_else(|| StoreError::NotFound(format!("newsletter {}", newsletter.id)))?;
        *existing = newsletter.clone();
        Ok(())
    }

    #[tracing::instrument(name = "Delete newsletter", skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut newsletters = self.newsletters.write().await;
        let before = newsletters.len();
        newsletters.retain(|n| n.id != id);

        if newsletters.len() == before {
            return Err(StoreError::NotFound(format!("newsletter {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriberStore for InMemoryStore {
    #[tracing::instrument(
        name = "Insert subscriber",
        skip(self, subscriber),
        fields(email = %subscriber.email, category = %subscriber.category)
    )]
    async fn insert(&self, subscriber: NewSubscriber) -> Result<Subscriber, StoreError> {
        // Holding the write lock across the check and the push keeps the
        // (email, category) pair unique under concurrent subscriptions.
        let mut subscribers = self.subscribers.write().await;
        let email = String::from(subscriber.email);
        let category = String::from(subscriber.category);

        if subscribers
            .iter()
            .any(|s| s.email == email && s.category == category)
        {
            return Err(StoreError::AlreadyExists(format!(
                "subscription of {} to {}",
                email, category
            )));
        }

        let subscriber = Subscriber {
            id: Uuid::new_v4(),
            email,
            category,
            subscription_date: Utc::now(),
        };
        subscribers.push(subscriber.clone());
        Ok(subscriber)
    }

    #[tracing::instrument(name = "Get subscriber by email and category", skip(self))]
    async fn get_by_email_and_category(
        &self,
        email: &str,
        category: &str,
    ) -> Result<Subscriber, StoreError> {
        self.subscribers
            .read()
            .await
            .iter()
            .find(|s| s.email == email && s.category == category)
            .cloned()
            .ok_or_else(|| {
                StoreError::NotFound(format!("subscription of {} to {}", email, category))
            })
    }

    #[tracing::instrument(name = "Get subscribers by category", skip(self))]
    async fn get_by_category(&self, category: &str) -> Result<Vec<Subscriber>, StoreError> {
        Ok(self
            .subscribers
            .read()
            .await
            .iter()
            .filter(|s| s.category == category)
            .cloned()
            .collect())
    }

    #[tracing::instrument(name = "List subscribers", skip(self))]
    async fn list(
        &self,
        email: Option<&str>,
        category: Option<&str>,
        page: Page,
    ) -> Result<Vec<Subscriber>, StoreError> {
        let subscribers = self.subscribers.read().await;
        let matching = subscribers.iter().filter(|s| {
            email.map_or(true, |email| s.email == email)
                && category.map_or(true, |category| s.category == category)
        });

        Ok(paginate(matching.cloned(), page))
    }

    #[tracing::instrument(name = "Delete subscriber by email", skip(self))]
    async fn delete_by_email(
        &self,
        email: &str,
        category: Option<&str>,
    ) -> Result<u64, StoreError> {
        let mut subscribers = self.subscribers.write().await;
        let before = subscribers.len();
        subscribers.retain(|s| {
            !(s.email == email && category.map_or(true, |category| s.category == category))
        });

        Ok((before - subscribers.len()) as u64)
    }
}
