//! Related-domain and co-occurrence lists.
//!
//! The API encodes both as `{"<key>": [[domain, score], ...]}`. Each list
//! reads the outer object generically and validates every pair, so any
//! structural mismatch is reported as a single data error. Both lists
//! serialize back to that same wire shape.

use super::common::scored_pairs;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

const RELATED_KEY: &str = "tb1";
const COOCCURRENCE_KEY: &str = "pfs2";

/// A domain related to the queried one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RelatedDomain {
    /// Related domain name
    pub domain: String,
    /// Number of co-requests, truncated to an integer
    pub score: i64,
}

/// Related domains, in the order the API ranked them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelatedDomainList {
    /// Related domains
    pub related: Vec<RelatedDomain>,
}

impl RelatedDomainList {
    /// Iterate over related domains
    pub fn iter(&self) -> std::slice::Iter<'_, RelatedDomain> {
        self.related.iter()
    }

    /// Number of related domains
    #[must_use]
    pub fn len(&self) -> usize {
        self.related.len()
    }

    /// Returns true if the API found no related domains
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.related.is_empty()
    }
}

impl<'de> Deserialize<'de> for RelatedDomainList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let pairs = scored_pairs(&raw, RELATED_KEY).map_err(D::Error::custom)?;

        #[allow(clippy::cast_possible_truncation)]
        let related = pairs
            .into_iter()
            .map(|(domain, score)| RelatedDomain {
                domain,
                score: score as i64,
            })
            .collect();

        Ok(Self { related })
    }
}

impl Serialize for RelatedDomainList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let pairs: Vec<(&str, i64)> = self
            .related
            .iter()
            .map(|r| (r.domain.as_str(), r.score))
            .collect();
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(RELATED_KEY, &pairs)?;
        map.end()
    }
}

impl IntoIterator for RelatedDomainList {
    type Item = RelatedDomain;
    type IntoIter = std::vec::IntoIter<RelatedDomain>;

    fn into_iter(self) -> Self::IntoIter {
        self.related.into_iter()
    }
}

/// A domain co-occurring with the queried one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cooccurrence {
    /// Co-occurring domain name
    pub domain: String,
    /// Co-occurrence score
    pub score: f64,
}

/// Co-occurring domains, in the order the API ranked them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CooccurrenceList {
    /// Co-occurring domains
    pub cooccurrences: Vec<Cooccurrence>,
}

impl CooccurrenceList {
    /// Iterate over co-occurrences
    pub fn iter(&self) -> std::slice::Iter<'_, Cooccurrence> {
        self.cooccurrences.iter()
    }

    /// Number of co-occurrences
    #[must_use]
    pub fn len(&self) -> usize {
        self.cooccurrences.len()
    }

    /// Returns true if there are no co-occurrences
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cooccurrences.is_empty()
    }
}

impl<'de> Deserialize<'de> for CooccurrenceList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let cooccurrences = scored_pairs(&raw, COOCCURRENCE_KEY)
            .map_err(D::Error::custom)?
            .into_iter()
            .map(|(domain, score)| Cooccurrence { domain, score })
            .collect();

        Ok(Self { cooccurrences })
    }
}

impl Serialize for CooccurrenceList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let pairs: Vec<(&str, f64)> = self
            .cooccurrences
            .iter()
            .map(|c| (c.domain.as_str(), c.score))
            .collect();
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(COOCCURRENCE_KEY, &pairs)?;
        map.end()
    }
}

impl IntoIterator for CooccurrenceList {
    type Item = Cooccurrence;
    type IntoIter = std::vec::IntoIter<Cooccurrence>;

    fn into_iter(self) -> Self::IntoIter {
        self.cooccurrences.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_related_preserves_order_and_truncates() {
        let list: RelatedDomainList =
            serde_json::from_str(r#"{"tb1": [["a.com", 5], ["b.com", 3.9]], "found": true}"#)
                .unwrap();
        assert_eq!(
            list.related,
            vec![
                RelatedDomain { domain: "a.com".into(), score: 5 },
                RelatedDomain { domain: "b.com".into(), score: 3 },
            ]
        );
    }

    #[test]
    fn test_related_empty_array() {
        let list: RelatedDomainList = serde_json::from_str(r#"{"tb1": []}"#).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_related_rejects_bad_shapes() {
        let bad = [
            r#"{"found": false}"#,
            r#"{"tb1": {"a.com": 5}}"#,
            r#"{"tb1": [["a.com", "5"]]}"#,
            r#"{"tb1": [[5, "a.com"]]}"#,
            r#"{"tb1": [["a.com"]]}"#,
            r#"{"tb1": ["a.com", 5]}"#,
            r#"[["a.com", 5]]"#,
        ];
        for body in bad {
            let err = serde_json::from_str::<RelatedDomainList>(body).unwrap_err();
            assert!(err.is_data(), "{body}: {err}");
        }
    }

    #[test]
    fn test_cooccurrences_keep_float_scores() {
        let list: CooccurrenceList = serde_json::from_str(
            r#"{"pfs2": [["x.net", 0.25], ["y.net", 0.125]], "found": true}"#,
        )
        .unwrap();
        let domains: Vec<&str> = list.iter().map(|c| c.domain.as_str()).collect();
        assert_eq!(domains, ["x.net", "y.net"]);
        assert!((list.cooccurrences[0].score - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cooccurrences_reject_related_key() {
        let err = serde_json::from_str::<CooccurrenceList>(r#"{"tb1": [["a.com", 5]]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("pfs2"));
    }

    #[test]
    fn test_lists_serialize_to_wire_shape() {
        let related: RelatedDomainList =
            serde_json::from_str(r#"{"tb1": [["a.com", 5], ["b.com", 3]], "found": true}"#).unwrap();
        assert_eq!(
            serde_json::to_value(&related).unwrap(),
            serde_json::json!({"tb1": [["a.com", 5], ["b.com", 3]]})
        );

        let cooccurrences: CooccurrenceList =
            serde_json::from_str(r#"{"pfs2": [["x.net", 0.5]]}"#).unwrap();
        let value = serde_json::to_value(&cooccurrences).unwrap();
        assert_eq!(value, serde_json::json!({"pfs2": [["x.net", 0.5]]}));
        assert_eq!(serde_json::from_value::<CooccurrenceList>(value).unwrap(), cooccurrences);
    }
}
