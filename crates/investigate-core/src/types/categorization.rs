use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Categorization results keyed by domain name
pub type CategorizationMap = HashMap<String, DomainCategorization>;

/// Status and categories of one domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCategorization {
    /// Raw status: -1 malicious, 0 unclassified, 1 benign
    #[serde(default)]
    pub status: i8,

    /// Content categories (ids, or labels when requested)
    #[serde(default, deserialize_with = "category_list")]
    pub content_categories: Vec<String>,

    /// Security categories (ids, or labels when requested)
    #[serde(default, deserialize_with = "category_list")]
    pub security_categories: Vec<String>,
}

impl DomainCategorization {
    /// Interpreted status
    #[must_use]
    pub const fn domain_status(&self) -> DomainStatus {
        match self.status {
            s if s < 0 => DomainStatus::Malicious,
            0 => DomainStatus::Unclassified,
            _ => DomainStatus::Benign,
        }
    }
}

/// Interpreted categorization status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    /// Known malicious
    Malicious,
    /// Not yet classified
    Unclassified,
    /// Known benign
    Benign,
}

impl std::fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malicious => write!(f, "malicious"),
            Self::Unclassified => write!(f, "unclassified"),
            Self::Benign => write!(f, "benign"),
        }
    }
}

// Without labels the API may send category ids as bare numbers.
fn category_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Category {
        Label(String),
        Id(i64),
    }

    let raw = Option::<Vec<Category>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|c| match c {
            Category::Label(label) => label,
            Category::Id(id) => id.to_string(),
        })
        .collect())
}
