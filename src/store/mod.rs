//! Persistence ports for newsletters and subscribers.
//!
//! Every backend implements both [`NewsletterStore`] and [`SubscriberStore`];
//! the backend is picked once at startup and handed to the components that
//! need it.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::newsletter::{NewNewsletter, Newsletter};
use crate::domain::subscriber::{NewSubscriber, Subscriber};
use crate::utils::error_chain_fmt;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("{0} was not found")]
    NotFound(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Skip/limit window over a listing. Pages are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    pub fn new(number: Option<u32>, size: Option<u32>) -> Self {
        Self {
            number: number.unwrap_or(1).max(1),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> usize {
        (self.number as usize - 1) * self.size as usize
    }

    pub fn limit(&self) -> usize {
        self.size as usize
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[async_trait]
pub trait NewsletterStore: Send + Sync {
    async fn insert(&self, newsletter: NewNewsletter) -> Result<Newsletter, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Newsletter, StoreError>;

    /// `Ok(None)` when no newsletter uses the category.
    async fn get_by_category(&self, category: &str) -> Result<Option<Newsletter>, StoreError>;

    /// Case-insensitive substring search on the name when `name` is given.
    async fn list(&self, name: Option<&str>, page: Page) -> Result<Vec<Newsletter>, StoreError>;

    async fn update(&self, newsletter: &Newsletter) -> Result<(), StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Fails with [`StoreError::AlreadyExists`] when the (email, category)
    /// pair is already subscribed. The check is atomic with the insert.
    async fn insert(&self, subscriber: NewSubscriber) -> Result<Subscriber, StoreError>;

    async fn get_by_email_and_category(
        &self,
        email: &str,
        category: &str,
    ) -> Result<Subscriber, StoreError>;

    /// No ordering is guaranteed.
    async fn get_by_category(&self, category: &str) -> Result<Vec<Subscriber>, StoreError>;

    async fn list(
        &self,
        email: Option<&str>,
        category: Option<&str>,
        page: Page,
    ) -> Result<Vec<Subscriber>, StoreError>;

    /// Removes the subscriptions of `email`, limited to `category` when
    /// given. Returns the number of removed subscriptions.
    async fn delete_by_email(&self, email: &str, category: Option<&str>)
        -> Result<u64, StoreError>;
}
