use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{NewsletterStore, Page, StoreError, SubscriberStore};
use crate::domain::newsletter::attachment::Attachment;
use crate::domain::newsletter::{NewNewsletter, Newsletter};
use crate::domain::subscriber::{NewSubscriber, Subscriber};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct NewsletterRow {
    id: Uuid,
    name: String,
    category: String,
    subject: String,
    content: String,
    attachments: Json<Vec<Attachment>>,
}

impl From<NewsletterRow> for Newsletter {
    fn from(row: NewsletterRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            subject: row.subject,
            content: row.content,
            attachments: row.attachments.0,
        }
    }
}

#[derive(FromRow)]
struct SubscriberRow {
    id: Uuid,
    email: String,
    category: String,
    subscribed_at: DateTime<Utc>,
}

impl From<SubscriberRow> for Subscriber {
    fn from(row: SubscriberRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            category: row.category,
            subscription_date: row.subscribed_at,
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// `ILIKE` pattern matching `needle` literally anywhere in the value.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl NewsletterStore for PostgresStore {
    #[tracing::instrument(
        name = "Insert newsletter",
        skip(self, newsletter),
        fields(category = %newsletter.category)
    )]
    async fn insert(&self, newsletter: NewNewsletter) -> Result<Newsletter, StoreError> {
        let newsletter = newsletter.with_id(Uuid::new_v4());

        sqlx::query(
            r#"INSERT INTO newsletters (id, name, category, subject, content, attachments)
            VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(newsletter.id)
        .bind(&newsletter.name)
        .bind(&newsletter.category)
        .bind(&newsletter.subject)
        .bind(&newsletter.content)
        .bind(Json(&newsletter.attachments))
        .execute(&self.pool)
        .await
        .context("Failed to insert newsletter.")?;

        Ok(newsletter)
    }

    #[tracing::instrument(name = "Get newsletter by id", skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Newsletter, StoreError> {
        sqlx::query_as::<_, NewsletterRow>(
            r#"SELECT id, name, category, subject, content, attachments
            FROM newsletters WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch newsletter.")?
        .map(Newsletter::from)
        .ok_or_else(|| StoreError::NotFound(format!("newsletter {}", id)))
    }

    #[tracing::instrument(name = "Get newsletter by category", skip(self))]
    async fn get_by_category(&self, category: &str) -> Result<Option<Newsletter>, StoreError> {
        let row = sqlx::query_as::<_, NewsletterRow>(
            r#"SELECT id, name, category, subject, content, attachments
            FROM newsletters WHERE category = $1 LIMIT 1"#,
        )
        .bind(category)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch newsletter by category.")?;

        Ok(row.map(Newsletter::from))
    }

    #[tracing::instrument(name = "List newsletters", skip(self))]
    async fn list(&self, name: Option<&str>, page: Page) -> Result<Vec<Newsletter>, StoreError> {
        let rows = sqlx::query_as::<_, NewsletterRow>(
            r#"SELECT id, name, category, subject, content, attachments
            FROM newsletters
            WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\')
            ORDER BY name, id
            OFFSET $2 LIMIT $3"#,
        )
        .bind(name.map(contains_pattern))
        .bind(page.offset() as i64)
        .bind(page.limit() as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list newsletters.")?;

        Ok(rows.into_iter().map(Newsletter::from).collect())
    }

    #[tracing::instrument(
        name = "Update newsletter",
        skip(self, newsletter),
        fields(id = %newsletter.id)
    )]
    async fn update(&self, newsletter: &Newsletter) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"UPDATE newsletters
            SET name = $2, category = $3, subject = $4, content = $5, attachments = $6
            WHERE id = $1"#,
        )
        .bind(newsletter.id)
        .bind(&newsletter.name)
        .bind(&newsletter.category)
        .bind(&newsletter.subject)
        .bind(&newsletter.content)
        .bind(Json(&newsletter.attachments))
        .execute(&self.pool)
        .await
        .context("Failed to update newsletter.")?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("newsletter {}", newsletter.id)));
        }
        Ok(())
    }

    #[tracing::instrument(name = "Delete newsletter", skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM newsletters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete newsletter.")?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("newsletter {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriberStore for PostgresStore {
    #[tracing::instrument(
        name = "Insert subscriber",
        skip(self, subscriber),
        fields(email = %subscriber.email, category = %subscriber.category)
    )]
    async fn insert(&self, subscriber: NewSubscriber) -> Result<Subscriber, StoreError> {
        let row = sqlx::query_as::<_, SubscriberRow>(
            r#"INSERT INTO subscriptions (id, email, category, subscribed_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, category, subscribed_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(subscriber.email.as_ref())
        .bind(subscriber.category.as_ref())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::AlreadyExists(format!(
                    "subscription of {} to {}",
                    subscriber.email, subscriber.category
                ))
            } else {
                tracing::error!(detail = e.to_string(), "failed to save new subscriber");
                StoreError::Unexpected(
                    anyhow::Error::new(e).context("Failed to insert subscriber."),
                )
            }
        })?;

        Ok(row.into())
    }

    #[tracing::instrument(name = "Get subscriber by email and category", skip(self))]
    async fn get_by_email_and_category(
        &self,
        email: &str,
        category: &str,
    ) -> Result<Subscriber, StoreError> {
        sqlx::query_as::<_, SubscriberRow>(
            r#"SELECT id, email, category, subscribed_at
            FROM subscriptions WHERE email = $1 AND category = $2"#,
        )
        .bind(email)
        .bind(category)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch subscriber.")?
        .map(Subscriber::from)
        .ok_or_else(|| StoreError::NotFound(format!("subscription of {} to {}", email, category)))
    }

    #[tracing::instrument(name = "Get subscribers by category", skip(self))]
    async fn get_by_category(&self, category: &str) -> Result<Vec<Subscriber>, StoreError> {
        let rows = sqlx::query_as::<_, SubscriberRow>(
            r#"SELECT id, email, category, subscribed_at
            FROM subscriptions WHERE category = $1
            ORDER BY subscribed_at"#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch subscribers by category.")?;

        Ok(rows.into_iter().map(Subscriber::from).collect())
    }

    #[tracing::instrument(name = "List subscribers", skip(self))]
    async fn list(
        &self,
        email: Option<&str>,
        category: Option<&str>,
        page: Page,
    ) -> Result<Vec<Subscriber>, StoreError> {
        let rows = sqlx::query_as::<_, SubscriberRow>(
            r#"SELECT id, email, category, subscribed_at
            FROM subscriptions
            WHERE ($1::text IS NULL OR email = $1)
              AND ($2::text IS NULL OR category = $2)
            ORDER BY subscribed_at, id
            OFFSET $3 LIMIT $4"#,
        )
        .bind(email)
        .bind(category)
        .bind(page.offset() as i64)
        .bind(page.limit() as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list subscribers.")?;

        Ok(rows.into_iter().map(Subscriber::from).collect())
    }

    #[tracing::instrument(name = "Delete subscriber by email", skip(self))]
    async fn delete_by_email(
        &self,
        email: &str,
        category: Option<&str>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"DELETE FROM subscriptions
            WHERE email = $1 AND ($2::text IS NULL OR category = $2)"#,
        )
        .bind(email)
        .bind(category)
        .execute(&self.pool)
        .await
        .context("Failed to delete subscriber.")?;

        Ok(result.rows_affected())
    }
}
