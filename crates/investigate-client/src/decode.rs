//! Response decoding.

use crate::transport::RawResponse;
use investigate_core::{
    CategorizationMap, CooccurrenceList, DecodeMode, DomainRrHistory, DomainTag, InvestigateError,
    IpRrHistory, MaliciousDomain, Record, RelatedDomainList, Resource, Result, SecurityFeatures,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a response body into `T`, consuming the response.
///
/// Bodies that are not JSON fail with [`InvestigateError::Decode`] and keep
/// the raw bytes; JSON of the wrong structure fails with
/// [`InvestigateError::MalformedResponse`].
pub fn decode<T: DeserializeOwned>(response: RawResponse) -> Result<T> {
    let RawResponse { body, .. } = response;
    let decoded = serde_json::from_slice(&body);
    decoded.map_err(|source| classify(source, body))
}

/// Decode a response body into a generic JSON value
pub fn decode_value(response: RawResponse) -> Result<Value> {
    decode(response)
}

/// Decode a response into the record registered for `resource`
pub fn decode_record(resource: &Resource, mode: DecodeMode, response: RawResponse) -> Result<Record> {
    if mode == DecodeMode::Generic {
        return decode_value(response).map(Record::Generic);
    }

    Ok(match resource {
        Resource::IpHistory(_) => Record::IpHistory(decode::<IpRrHistory>(response)?),
        Resource::DomainHistory(_) => {
            Record::DomainHistory(Box::new(decode::<DomainRrHistory>(response)?))
        }
        Resource::Categorization { .. } => {
            Record::Categorization(decode::<CategorizationMap>(response)?)
        }
        Resource::Related => Record::Related(decode::<RelatedDomainList>(response)?),
        Resource::Cooccurrences => Record::Cooccurrences(decode::<CooccurrenceList>(response)?),
        Resource::Security => Record::Security(Box::new(decode::<SecurityFeatures>(response)?)),
        Resource::Tags => Record::Tags(decode::<Vec<DomainTag>>(response)?),
        Resource::LatestDomains => Record::LatestDomains(decode::<Vec<MaliciousDomain>>(response)?),
        Resource::Whois | Resource::Score | Resource::Traffic(_) => Record::Generic(decode_value(response)?),
    })
}

fn classify(source: serde_json::Error, body: Vec<u8>) -> InvestigateError {
    if source.is_data() {
        InvestigateError::MalformedResponse(source.to_string())
    } else {
        InvestigateError::Decode { source, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use investigate_core::{GeoFeatures, QueryType, RelatedDomain};

    fn ok(body: &str) -> RawResponse {
        RawResponse::new(200, body)
    }

    #[test]
    fn test_related_domains_in_order() {
        let list: RelatedDomainList = decode(ok(r#"{"tb1": [["a.com", 5], ["b.com", 3]]}"#)).unwrap();
        assert_eq!(
            list.related,
            vec![
                RelatedDomain { domain: "a.com".into(), score: 5 },
                RelatedDomain { domain: "b.com".into(), score: 3 },
            ]
        );
    }

    #[test]
    fn test_geo_features() {
        let geo: GeoFeatures = decode(ok(r#"["US", 0.42]"#)).unwrap();
        assert_eq!(geo.country_code, "US");
        assert!((geo.visit_ratio - 0.42).abs() < f64::EPSILON);

        let err = decode::<GeoFeatures>(ok(r#"[42, "US"]"#)).unwrap_err();
        assert!(matches!(err, InvestigateError::MalformedResponse(_)), "{err:?}");
    }

    #[test]
    fn test_invalid_json_keeps_raw_body() {
        let err = decode::<Value>(ok("<html>502 Bad Gateway</html>")).unwrap_err();
        match err {
            InvestigateError::Decode { body, .. } => {
                assert_eq!(body, b"<html>502 Bad Gateway</html>");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_json_is_decode_error() {
        let err = decode::<RelatedDomainList>(ok(r#"{"tb1": [["a.com", 5]"#)).unwrap_err();
        assert!(matches!(err, InvestigateError::Decode { .. }), "{err:?}");
    }

    #[test]
    fn test_wrong_pair_shape_is_malformed() {
        let err = decode::<RelatedDomainList>(ok(r#"{"tb1": [["a.com", "five"]]}"#)).unwrap_err();
        assert!(matches!(err, InvestigateError::MalformedResponse(_)), "{err:?}");
    }

    #[test]
    fn test_record_typed_and_generic() {
        let body = r#"{"pfs2": [["x.net", 0.5]], "found": true}"#;
        let typed = decode_record(&Resource::Cooccurrences, DecodeMode::Typed, ok(body)).unwrap();
        assert!(matches!(typed, Record::Cooccurrences(ref list) if list.len() == 1));

        let generic = decode_record(&Resource::Cooccurrences, DecodeMode::Generic, ok(body)).unwrap();
        assert_eq!(generic.as_value().unwrap()["found"], Value::Bool(true));
    }

    #[test]
    fn test_generic_mode_accepts_any_shape() {
        let record = decode_record(
            &Resource::IpHistory(QueryType::A),
            DecodeMode::Generic,
            ok(r#"{"rrs": "unexpected"}"#),
        )
        .unwrap();
        assert!(record.as_value().is_some());
    }

    #[test]
    fn test_whois_is_always_generic() {
        let record =
            decode_record(&Resource::Whois, DecodeMode::Typed, ok(r#"{"registrantName": "x"}"#))
                .unwrap();
        assert!(matches!(record, Record::Generic(_)));
    }

    #[test]
    fn test_typed_record_serializes_like_the_response() {
        let body = r#"{"tb1": [["a.com", 5], ["b.com", 3]]}"#;
        let typed = decode_record(&Resource::Related, DecodeMode::Typed, ok(body)).unwrap();
        let generic = decode_record(&Resource::Related, DecodeMode::Generic, ok(body)).unwrap();
        assert_eq!(typed.into_value().unwrap(), generic.into_value().unwrap());
    }
}
