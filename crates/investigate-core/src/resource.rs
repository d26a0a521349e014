//! Resource types and their URI templates.

use crate::error::{InvestigateError, Result};
use crate::query::QueryType;
use chrono::{DateTime, Utc};
use siphasher::sip::SipHasher24;
use std::hash::Hasher;

/// Path for bulk categorization (POST with a JSON array of domains)
pub const BULK_CATEGORIZATION_PATH: &str = "/domains/categorization/";

/// SipHash-2-4 key the infected-URL endpoint expects its path hash under
const INFECTED_HASH_KEY: &[u8; 16] = b"Umbrella/OpenDNS";

/// Hour-granular layout the traffic endpoint expects for `start`/`stop`
const TRAFFIC_TIME_LAYOUT: &str = "%Y/%m/%d/%H";

/// A lookup the API offers for a single domain or IP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// DNS resource-record history of an IP
    IpHistory(QueryType),
    /// DNS resource-record history of a domain
    DomainHistory(QueryType),
    /// Status and content/security categories of a domain
    Categorization {
        /// Return human-readable category labels instead of ids
        show_labels: bool,
    },
    /// Domains frequently requested around the same time
    Related,
    /// Domains co-occurring with the given domain
    Cooccurrences,
    /// Security scores and features of a domain
    Security,
    /// Tagging periods of a domain
    Tags,
    /// Latest malicious domains hosted on an IP
    LatestDomains,
    /// WHOIS data of a domain
    Whois,
    /// Classifier score of a domain
    Score,
    /// Request volume of a domain over a time window
    Traffic(TrafficWindow),
}

impl Resource {
    /// Short name, used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::IpHistory(_) => "ip_history",
            Self::DomainHistory(_) => "domain_history",
            Self::Categorization { .. } => "categorization",
            Self::Related => "related",
            Self::Cooccurrences => "cooccurrences",
            Self::Security => "security",
            Self::Tags => "tags",
            Self::LatestDomains => "latest_domains",
            Self::Whois => "whois",
            Self::Score => "score",
            Self::Traffic(_) => "traffic",
        }
    }

    /// Unescaped path segments for the given domain or IP
    ///
    /// The key always stays inside its own segment; URL builders must
    /// percent-encode each segment.
    #[must_use]
    pub fn segments(&self, key: &str) -> Vec<String> {
        let named = |prefix: &[&str]| -> Vec<String> {
            prefix
                .iter()
                .map(ToString::to_string)
                .chain(std::iter::once(format!("{key}.json")))
                .collect()
        };

        match self {
            Self::IpHistory(t) => named(&["dnsdb", "ip", t.path_segment()]),
            Self::DomainHistory(t) => named(&["dnsdb", "name", t.path_segment()]),
            Self::Related => named(&["links", "name"]),
            Self::Cooccurrences => named(&["recommendations", "name"]),
            Self::Security => named(&["security", "name"]),
            Self::Whois => named(&["whois", "name"]),
            Self::Score => named(&["label", "rface-gbt", "name"]),
            Self::Categorization { .. } => {
                vec!["domains".into(), "categorization".into(), key.to_string()]
            }
            Self::Tags => vec!["domains".into(), key.to_string(), "latest_tags".into()],
            Self::LatestDomains => vec!["ips".into(), key.to_string(), "latest_domains".into()],
            Self::Traffic(_) => vec!["appserver".into(), String::new()],
        }
    }

    /// Request path for the given domain or IP, key unescaped
    #[must_use]
    pub fn path(&self, key: &str) -> String {
        format!("/{}", self.segments(key).join("/"))
    }

    /// Query string parameters, in the order they must be sent
    #[must_use]
    pub fn query(&self, key: &str) -> Vec<(&'static str, String)> {
        match self {
            Self::Categorization { show_labels: true } => {
                vec![("showLabels", String::from("true"))]
            }
            // The traffic endpoint rejects requests whose parameters are reordered.
            Self::Traffic(window) => vec![
                ("v", String::from("1")),
                ("function", String::from("domain2-system")),
                ("domains", key.to_string()),
                ("locations", String::new()),
                ("start", window.start_param()),
                ("stop", window.stop_param()),
            ],
            _ => Vec::new(),
        }
    }
}

/// Path of the infected-URL lookup for an encoded request body
///
/// The endpoint is keyed by the hex SipHash-2-4 of the exact bytes posted.
#[must_use]
pub fn infected_path(body: &[u8]) -> String {
    format!("/infected/names/{}.json", sip_hex(INFECTED_HASH_KEY, body))
}

fn sip_hex(key: &[u8; 16], data: &[u8]) -> String {
    let mut hasher = SipHasher24::new_with_key(key);
    hasher.write(data);
    format!("{:x}", hasher.finish())
}

/// Time window for traffic lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrafficWindow {
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
}

impl TrafficWindow {
    /// Create a window; `stop` must not precede `start`
    pub fn new(start: DateTime<Utc>, stop: DateTime<Utc>) -> Result<Self> {
        if stop < start {
            return Err(InvestigateError::Config(format!(
                "traffic window ends ({stop}) before it starts ({start})"
            )));
        }
        Ok(Self { start, stop })
    }

    /// Window start
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Window end
    #[must_use]
    pub const fn stop(&self) -> DateTime<Utc> {
        self.stop
    }

    fn start_param(&self) -> String {
        self.start.format(TRAFFIC_TIME_LAYOUT).to_string()
    }

    fn stop_param(&self) -> String {
        self.stop.format(TRAFFIC_TIME_LAYOUT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_history_paths_use_lowercase_type() {
        assert_eq!(
            Resource::IpHistory(QueryType::A).path("8.8.8.8"),
            "/dnsdb/ip/a/8.8.8.8.json"
        );
        assert_eq!(
            Resource::DomainHistory(QueryType::Cname).path("www.test.com"),
            "/dnsdb/name/cname/www.test.com.json"
        );
    }

    #[test]
    fn test_domain_paths() {
        assert_eq!(Resource::Related.path("a.com"), "/links/name/a.com.json");
        assert_eq!(
            Resource::Cooccurrences.path("a.com"),
            "/recommendations/name/a.com.json"
        );
        assert_eq!(Resource::Security.path("a.com"), "/security/name/a.com.json");
        assert_eq!(Resource::Tags.path("a.com"), "/domains/a.com/latest_tags");
        assert_eq!(Resource::Whois.path("a.com"), "/whois/name/a.com.json");
        assert_eq!(
            Resource::Score.path("a.com"),
            "/label/rface-gbt/name/a.com.json"
        );
        assert_eq!(
            Resource::LatestDomains.path("1.2.3.4"),
            "/ips/1.2.3.4/latest_domains"
        );
    }

    #[test]
    fn test_show_labels_only_when_requested() {
        let with = Resource::Categorization { show_labels: true };
        let without = Resource::Categorization { show_labels: false };
        assert_eq!(with.query("a.com"), vec![("showLabels", "true".to_string())]);
        assert!(without.query("a.com").is_empty());
        assert_eq!(with.path("a.com"), "/domains/categorization/a.com");
    }

    #[test]
    fn test_traffic_query_order_and_layout() {
        let start = Utc.with_ymd_and_hms(2014, 2, 18, 15, 30, 0).unwrap();
        let stop = Utc.with_ymd_and_hms(2014, 2, 19, 3, 0, 0).unwrap();
        let window = TrafficWindow::new(start, stop).unwrap();
        let query = Resource::Traffic(window).query("a.com");
        let keys: Vec<&str> = query.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["v", "function", "domains", "locations", "start", "stop"]);
        assert_eq!(query[4].1, "2014/02/18/15");
        assert_eq!(query[5].1, "2014/02/19/03");
    }

    #[test]
    fn test_traffic_window_rejects_inverted_range() {
        let start = Utc.with_ymd_and_hms(2014, 2, 19, 0, 0, 0).unwrap();
        let stop = Utc.with_ymd_and_hms(2014, 2, 18, 0, 0, 0).unwrap();
        assert!(matches!(
            TrafficWindow::new(start, stop),
            Err(InvestigateError::Config(_))
        ));
    }

    #[test]
    fn test_key_stays_in_one_segment() {
        let segments = Resource::Related.segments("a.com/x?y#z");
        assert_eq!(segments, ["links", "name", "a.com/x?y#z.json"]);

        let now = Utc::now();
        let traffic = Resource::Traffic(TrafficWindow::new(now, now).unwrap());
        assert_eq!(traffic.path("a.com"), "/appserver/");
    }

    #[test]
    fn test_siphash_reference_vectors() {
        let key: [u8; 16] = std::array::from_fn(|i| i as u8);
        assert_eq!(sip_hex(&key, b""), "726fdb47dd0e0e31");
        let message: Vec<u8> = (0..15).collect();
        assert_eq!(sip_hex(&key, &message), "a129ca6149be45e5");
    }

    #[test]
    fn test_infected_path_is_hex_hash() {
        let path = infected_path(br#"["http://a.com/x"]"#);
        let hash = path
            .strip_prefix("/infected/names/")
            .and_then(|rest| rest.strip_suffix(".json"))
            .unwrap();
        assert!(!hash.is_empty() && hash.len() <= 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(path, infected_path(br#"["http://b.com/x"]"#));
    }
}
