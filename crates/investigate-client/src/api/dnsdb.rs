//! DNS resource-record history endpoints.

use crate::InvestigateClient;
use investigate_core::{DomainRrHistory, IpRrHistory, QueryType, Record, Resource, Result};
use std::net::IpAddr;

/// DNS database API endpoints
pub struct DnsDbApi<'a> {
    client: &'a InvestigateClient,
}

impl<'a> DnsDbApi<'a> {
    pub(crate) const fn new(client: &'a InvestigateClient) -> Self {
        Self { client }
    }

    /// Record history of a domain or IP
    ///
    /// `query_type` must be one of A, NS, MX, TXT or CNAME (any case); other
    /// types fail with `UnsupportedQueryType` before any request is made.
    /// Queries that parse as an IP address use the IP history, anything
    /// else the domain history.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let record = client.dnsdb().rr_history("www.test.com", "CNAME").await?;
    /// if let Some(history) = record.as_domain_history() {
    ///     println!("first seen {:?}", history.periods.first().map(|p| &p.first_seen));
    /// }
    /// ```
    pub async fn rr_history(&self, query: &str, query_type: &str) -> Result<Record> {
        let query_type: QueryType = query_type.parse()?;

        if query.parse::<IpAddr>().is_ok() {
            self.ip_history(query, query_type).await.map(Record::IpHistory)
        } else {
            self.domain_history(query, query_type)
                .await
                .map(|history| Record::DomainHistory(Box::new(history)))
        }
    }

    /// Record history of a domain
    pub async fn domain_history(&self, domain: &str, query_type: QueryType) -> Result<DomainRrHistory> {
        self.client
            .get_resource(&Resource::DomainHistory(query_type), domain)
            .await
    }

    /// Record history of an IP
    pub async fn ip_history(&self, ip: &str, query_type: QueryType) -> Result<IpRrHistory> {
        self.client
            .get_resource(&Resource::IpHistory(query_type), ip)
            .await
    }
}
