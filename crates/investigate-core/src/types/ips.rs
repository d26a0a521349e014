use serde::{Deserialize, Serialize};

/// A malicious domain recently hosted on an IP
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaliciousDomain {
    /// Domain name
    #[serde(rename = "name")]
    pub domain: String,

    /// Internal domain id
    #[serde(default)]
    pub id: u64,
}
