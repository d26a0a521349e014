use super::{
    CategorizationMap, CooccurrenceList, DomainRrHistory, DomainTag, IpRrHistory,
    MaliciousDomain, RelatedDomainList, SecurityFeatures,
};
use serde::Serialize;
use serde_json::Value;

/// How response bodies are turned into records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecodeMode {
    /// Decode into the typed record registered for the resource
    #[default]
    Typed,
    /// Decode into a generic JSON value
    Generic,
}

/// A decoded lookup result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    /// Any resource decoded generically, or one without a typed shape
    Generic(Value),
    /// Domain categorization
    Categorization(CategorizationMap),
    /// Security features
    Security(Box<SecurityFeatures>),
    /// Domain resource-record history
    DomainHistory(Box<DomainRrHistory>),
    /// IP resource-record history
    IpHistory(IpRrHistory),
    /// Related domains
    Related(RelatedDomainList),
    /// Co-occurring domains
    Cooccurrences(CooccurrenceList),
    /// Domain tags
    Tags(Vec<DomainTag>),
    /// Latest malicious domains on an IP
    LatestDomains(Vec<MaliciousDomain>),
}

impl Record {
    /// Generic value, if this record was decoded generically
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Generic(value) => Some(value),
            _ => None,
        }
    }

    /// Related domains, if this is a related-domain record
    #[must_use]
    pub const fn as_related(&self) -> Option<&RelatedDomainList> {
        match self {
            Self::Related(list) => Some(list),
            _ => None,
        }
    }

    /// Security features, if this is a security record
    #[must_use]
    pub fn as_security(&self) -> Option<&SecurityFeatures> {
        match self {
            Self::Security(features) => Some(features),
            _ => None,
        }
    }

    /// Domain history, if this is a domain history record
    #[must_use]
    pub fn as_domain_history(&self) -> Option<&DomainRrHistory> {
        match self {
            Self::DomainHistory(history) => Some(history),
            _ => None,
        }
    }

    /// IP history, if this is an IP history record
    #[must_use]
    pub const fn as_ip_history(&self) -> Option<&IpRrHistory> {
        match self {
            Self::IpHistory(history) => Some(history),
            _ => None,
        }
    }

    /// Convert the record into a generic JSON value
    pub fn into_value(self) -> serde_json::Result<Value> {
        match self {
            Self::Generic(value) => Ok(value),
            other => serde_json::to_value(other),
        }
    }
}
