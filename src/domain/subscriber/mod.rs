pub mod email;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use self::email::Email;
use super::category::Category;

/// A validated subscription request, before the store assigns an identity.
#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub email: Email,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscriber {
    pub id: Uuid,
    /// Kept as stored: rows written by older clients are not guaranteed to
    /// hold a valid address, so it is validated again before delivery.
    pub email: String,
    pub category: String,
    pub subscription_date: DateTime<Utc>,
}
