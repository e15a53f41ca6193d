use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dispatch::DispatchReport;
use crate::domain::category::Category;
use crate::domain::newsletter::attachment::Attachment;
use crate::domain::newsletter::NewNewsletter;

#[derive(Deserialize)]
pub struct NewsletterBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub content: String,
    /// A missing list is treated as an empty one.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl TryFrom<NewsletterBody> for NewNewsletter {
    type Error = String;

    fn try_from(value: NewsletterBody) -> Result<Self, Self::Error> {
        let category = Category::try_from(value.category)?;
        if value.name.trim().is_empty() {
            return Err("Name is required".into());
        }

        Ok(Self {
            name: value.name,
            category,
            subject: value.subject,
            content: value.content,
            attachments: value.attachments,
        })
    }
}

#[derive(Deserialize)]
pub struct UpdateNewsletterBody {
    pub id: Uuid,
    #[serde(flatten)]
    pub newsletter: NewsletterBody,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub name: Option<String>,
    pub page: Option<u32>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u32>,
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub status: &'static str,
    pub message: String,
    pub id: Uuid,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: String,
}

/// A dispatch with failed deliveries still reports `success`; the counts
/// tell the caller how many subscribers were missed.
#[derive(Serialize)]
pub struct SendResponse {
    pub status: &'static str,
    pub message: String,
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl From<DispatchReport> for SendResponse {
    fn from(report: DispatchReport) -> Self {
        let message = if report.is_complete() {
            "Newsletter sent successfully".to_owned()
        } else {
            format!(
                "Newsletter sent to {} of {} subscribers",
                report.delivered(),
                report.attempted()
            )
        };

        Self {
            status: "success",
            message,
            attempted: report.attempted(),
            delivered: report.delivered(),
            failed: report.failed(),
        }
    }
}
