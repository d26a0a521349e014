use super::common::{null_as_default, string_number_pair};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Security scores and features of a domain
///
/// Scores the API could not compute come back as `null` and are left as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityFeatures {
    /// Domain generation algorithm score (-100 suspicious .. 0 benign)
    #[serde(default)]
    pub dga_score: Option<f64>,

    /// Perplexity of the domain name
    #[serde(default)]
    pub perplexity: Option<f64>,

    /// Shannon entropy of the domain name
    #[serde(default)]
    pub entropy: Option<f64>,

    /// Popularity-based rank (-100 .. 100)
    #[serde(default, rename = "securerank2")]
    pub secure_rank2: Option<f64>,

    /// Page rank in the resolver graph
    #[serde(default, rename = "pagerank")]
    pub page_rank: Option<f64>,

    /// Reputation of the hosting ASNs
    #[serde(default)]
    pub asn_score: Option<f64>,

    /// Reputation of the hosting prefixes
    #[serde(default)]
    pub prefix_score: Option<f64>,

    /// Reputation of the resolved IPs
    #[serde(default)]
    pub rip_score: Option<f64>,

    /// Whether the domain looks fast-flux
    #[serde(default, deserialize_with = "null_as_default")]
    pub fastflux: bool,

    /// Number of unique client IPs visiting the domain
    #[serde(default)]
    pub popularity: Option<f64>,

    /// Visit ratio per requester country
    #[serde(default, deserialize_with = "null_as_default")]
    pub geodiversity: Vec<GeoFeatures>,

    /// Visit ratio per requester country, normalized by country traffic
    #[serde(default, deserialize_with = "null_as_default")]
    pub geodiversity_normalized: Vec<GeoFeatures>,

    /// Visit ratio per country for the domain's TLD
    #[serde(default, deserialize_with = "null_as_default")]
    pub tld_geodiversity: Vec<GeoFeatures>,

    /// How far the requesters are from each other
    #[serde(default)]
    pub geoscore: Option<f64>,

    /// Kolmogorov-Smirnov test on geodiversity
    #[serde(default)]
    pub ks_test: Option<f64>,

    /// Handling counts, shape varies by account
    #[serde(default)]
    pub handlings: Value,

    /// Attack name, if any
    #[serde(default)]
    pub attack: Option<String>,

    /// Threat type, if any
    #[serde(default)]
    pub threat_type: Option<String>,
}

impl SecurityFeatures {
    /// Returns true if the API attributes an attack or threat type to the domain
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        let present = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.attack) || present(&self.threat_type)
    }
}

/// Share of visits from one country, encoded on the wire as `[code, ratio]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoFeatures {
    /// Two-letter country code
    pub country_code: String,
    /// Fraction of visits from that country
    pub visit_ratio: f64,
}

impl<'de> Deserialize<'de> for GeoFeatures {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let (code, ratio) = string_number_pair(&raw).map_err(D::Error::custom)?;
        Ok(Self {
            country_code: code.to_string(),
            visit_ratio: ratio,
        })
    }
}
