use super::common::{null_as_default, Location};
use serde::{Deserialize, Serialize};

/// Individual DNS resource record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Owner name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Time to live in seconds
    #[serde(default, deserialize_with = "null_as_default")]
    pub ttl: u32,

    /// Record class (usually IN)
    #[serde(default, deserialize_with = "null_as_default")]
    pub class: String,

    /// Record type (A, NS, MX, TXT, CNAME)
    #[serde(default, deserialize_with = "null_as_default", rename = "type")]
    pub record_type: String,

    /// Record data
    #[serde(default, deserialize_with = "null_as_default")]
    pub rr: String,
}

/// Records observed together over one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecordPeriod {
    /// First day the records were seen
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_seen: String,

    /// Last day the records were seen
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_seen: String,

    /// Records seen during the period
    #[serde(default, deserialize_with = "null_as_default")]
    pub rrs: Vec<ResourceRecord>,
}

/// Features computed over a domain's record history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainRrFeatures {
    /// Days since the domain was first seen
    #[serde(default, deserialize_with = "null_as_default")]
    pub age: u32,

    /// Smallest TTL seen
    #[serde(default, deserialize_with = "null_as_default")]
    pub ttls_min: u32,

    /// Largest TTL seen
    #[serde(default, deserialize_with = "null_as_default")]
    pub ttls_max: u32,

    /// Mean TTL
    #[serde(default, deserialize_with = "null_as_default")]
    pub ttls_mean: f64,

    /// Median TTL
    #[serde(default, deserialize_with = "null_as_default")]
    pub ttls_median: f64,

    /// TTL standard deviation
    #[serde(default, deserialize_with = "null_as_default", rename = "ttls_stddev")]
    pub ttls_std_dev: f64,

    /// Countries of the resolved IPs
    #[serde(default, deserialize_with = "null_as_default")]
    pub country_codes: Vec<String>,

    /// ASNs of the resolved IPs
    #[serde(default, deserialize_with = "null_as_default")]
    pub asns: Vec<u32>,

    /// Prefixes of the resolved IPs
    #[serde(default, deserialize_with = "null_as_default")]
    pub prefixes: Vec<String>,

    /// Number of resolved IPs
    #[serde(default, deserialize_with = "null_as_default", rename = "rips")]
    pub rips_count: u32,

    /// Diversity of resolved IPs
    #[serde(default, deserialize_with = "null_as_default", rename = "div_rips")]
    pub rips_diversity: f64,

    /// Locations of the resolved IPs
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<Location>,

    /// Sum of distances between locations
    #[serde(default, deserialize_with = "null_as_default")]
    pub geo_distance_sum: f64,

    /// Mean distance between locations
    #[serde(default, deserialize_with = "null_as_default")]
    pub geo_distance_mean: f64,

    /// Resolves to non-routable addresses
    #[serde(default, deserialize_with = "null_as_default")]
    pub non_routable: bool,

    /// Has MX records
    #[serde(default, deserialize_with = "null_as_default")]
    pub mail_exchanger: bool,

    /// Is a CNAME
    #[serde(default, deserialize_with = "null_as_default")]
    pub cname: bool,

    /// Fast-flux candidate
    #[serde(default, deserialize_with = "null_as_default")]
    pub ff_candidate: bool,

    /// Stability of the resolved IP set
    #[serde(default, deserialize_with = "null_as_default")]
    pub rips_stability: f64,

    /// Registered base domain
    #[serde(default, deserialize_with = "null_as_default")]
    pub base_domain: Option<String>,

    /// Whether the name is a subdomain of `base_domain`
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_subdomain: bool,
}

/// Resource-record history of a domain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainRrHistory {
    /// Record periods, oldest first
    #[serde(default, deserialize_with = "null_as_default", rename = "rrs_tf")]
    pub periods: Vec<ResourceRecordPeriod>,

    /// Computed features
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: DomainRrFeatures,
}

impl DomainRrHistory {
    /// Every record across all periods
    pub fn records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.periods.iter().flat_map(|p| p.rrs.iter())
    }

    /// Records of the given type across all periods
    pub fn records_by_type<'a>(&'a self, record_type: &'a str) -> impl Iterator<Item = &'a ResourceRecord> {
        self.records()
            .filter(move |r| r.record_type.eq_ignore_ascii_case(record_type))
    }
}

/// Features computed over the names pointing at an IP
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpRrFeatures {
    /// Number of records
    #[serde(default, deserialize_with = "null_as_default")]
    pub rr_count: u32,

    /// Number of distinct second-level domains
    #[serde(default, deserialize_with = "null_as_default")]
    pub ld2_count: u32,

    /// Number of distinct third-level domains
    #[serde(default, deserialize_with = "null_as_default")]
    pub ld3_count: u32,

    /// Second-level domains with one label below
    #[serde(default, deserialize_with = "null_as_default", rename = "ld2_1_count")]
    pub ld21_count: u32,

    /// Second-level domains with two labels below
    #[serde(default, deserialize_with = "null_as_default", rename = "ld2_2_count")]
    pub ld22_count: u32,

    /// Second-level domain diversity
    #[serde(default, deserialize_with = "null_as_default")]
    pub div_ld2: f64,

    /// Third-level domain diversity
    #[serde(default, deserialize_with = "null_as_default")]
    pub div_ld3: f64,

    /// Diversity of second-level domains with one label below
    #[serde(default, deserialize_with = "null_as_default", rename = "div_ld2_1")]
    pub div_ld21: f64,

    /// Diversity of second-level domains with two labels below
    #[serde(default, deserialize_with = "null_as_default", rename = "div_ld2_2")]
    pub div_ld22: f64,
}

/// Resource-record history of an IP
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpRrHistory {
    /// Records pointing at the IP
    #[serde(default, deserialize_with = "null_as_default")]
    pub rrs: Vec<ResourceRecord>,

    /// Computed features
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: IpRrFeatures,
}

impl IpRrHistory {
    /// Names that resolved to the IP
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rrs.iter().map(|r| r.rr.as_str())
    }
}
