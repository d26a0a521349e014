use serde::{Deserialize, Serialize};

/// One period during which a domain carried a security tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainTag {
    /// URL the tag applied to, if narrower than the domain
    #[serde(default)]
    pub url: Option<String>,

    /// Tag category (e.g. Malware, Phishing)
    #[serde(default)]
    pub category: String,

    /// When the tag applied
    pub period: TagPeriod,
}

impl DomainTag {
    /// Returns true if the tag has not ended
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.period.end.as_deref().map_or(true, |end| end.eq_ignore_ascii_case("current"))
    }
}

/// Begin and end of a tag period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPeriod {
    /// Start date
    pub begin: String,

    /// End date, `"Current"` or absent while the tag still applies
    #[serde(default)]
    pub end: Option<String>,
}
