use derive_more::Display;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Grouping key linking a newsletter to the subscribers who receive it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl TryFrom<String> for Category {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim();

        if value.is_empty() {
            return Err("Category is required".into());
        }

        if value.graphemes(true).count() > 256 {
            return Err("category is too long".into());
        }

        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<&str> for Category {
    type Error = String;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_owned())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.0
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
