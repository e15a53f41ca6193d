use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::subscriber::{email::Email, NewSubscriber, Subscriber};

/// Path segments of `POST /subscribe/:email/:category`.
#[derive(Debug, Deserialize)]
pub struct SubscriptionPath {
    pub email: String,
    pub category: String,
}

impl TryFrom<SubscriptionPath> for NewSubscriber {
    type Error = String;

    fn try_from(value: SubscriptionPath) -> Result<Self, Self::Error> {
        let email = Email::try_from(value.email)?;
        let category = Category::try_from(value.category)?;
        Ok(Self { email, category })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub email: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u32>,
}

#[derive(Serialize)]
pub struct SubscribeResponse {
    pub status: &'static str,
    pub message: String,
    pub subscriber: Subscriber,
}

#[derive(Serialize)]
pub struct UnsubscribeResponse {
    pub status: &'static str,
    pub message: String,
    pub removed: u64,
}
