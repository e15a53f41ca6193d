pub mod attachment;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use self::attachment::Attachment;
use super::category::Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Newsletter {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub subject: String,
    /// May contain the `{email}` and `{hostDomain}` placeholders.
    pub content: String,
    pub attachments: Vec<Attachment>,
}

/// A validated newsletter, before the store assigns an identity.
#[derive(Debug, Clone)]
pub struct NewNewsletter {
    pub name: String,
    pub category: Category,
    pub subject: String,
    pub content: String,
    pub attachments: Vec<Attachment>,
}

impl NewNewsletter {
    pub fn with_id(self, id: Uuid) -> Newsletter {
        Newsletter {
            id,
            name: self.name,
            category: self.category.into(),
            subject: self.subject,
            content: self.content,
            attachments: self.attachments,
        }
    }
}
