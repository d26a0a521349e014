//! Domain API endpoints.

use crate::InvestigateClient;
use chrono::{DateTime, Utc};
use investigate_core::{
    infected_path, CategorizationMap, CooccurrenceList, DomainTag, InvestigateError,
    RelatedDomainList, Resource, Result, SecurityFeatures, TrafficWindow,
    BULK_CATEGORIZATION_PATH,
};
use serde_json::Value;

/// Domain API endpoints
pub struct DomainsApi<'a> {
    client: &'a InvestigateClient,
}

impl<'a> DomainsApi<'a> {
    pub(crate) const fn new(client: &'a InvestigateClient) -> Self {
        Self { client }
    }

    /// Status and categories of one domain
    ///
    /// With `labels` set, categories come back as human-readable names.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let map = client.domains().categorization("www.google.com", true).await?;
    /// println!("{:?}", map["www.google.com"].content_categories);
    /// ```
    pub async fn categorization(&self, domain: &str, labels: bool) -> Result<CategorizationMap> {
        let resource = Resource::Categorization { show_labels: labels };
        self.client.get_resource(&resource, domain).await
    }

    /// Status and categories of many domains in a single POST
    pub async fn categorizations<S: AsRef<str>>(
        &self,
        domains: &[S],
        labels: bool,
    ) -> Result<CategorizationMap> {
        if domains.is_empty() {
            return Ok(CategorizationMap::new());
        }

        let body: Vec<&str> = domains.iter().map(AsRef::as_ref).collect();
        let query = Resource::Categorization { show_labels: labels }.query("");
        self.client
            .post_with_query(BULK_CATEGORIZATION_PATH, &query, &body)
            .await
    }

    /// Security scores and features
    pub async fn security(&self, domain: &str) -> Result<SecurityFeatures> {
        self.client.get_resource(&Resource::Security, domain).await
    }

    /// Domains requested shortly before or after this one
    pub async fn related(&self, domain: &str) -> Result<RelatedDomainList> {
        self.client.get_resource(&Resource::Related, domain).await
    }

    /// Domains co-occurring with this one
    pub async fn cooccurrences(&self, domain: &str) -> Result<CooccurrenceList> {
        self.client.get_resource(&Resource::Cooccurrences, domain).await
    }

    /// Periods during which the domain was tagged
    pub async fn tags(&self, domain: &str) -> Result<Vec<DomainTag>> {
        self.client.get_resource(&Resource::Tags, domain).await
    }

    /// WHOIS data, decoded generically
    pub async fn whois(&self, domain: &str) -> Result<Value> {
        self.client.get_resource(&Resource::Whois, domain).await
    }

    /// Classifier score, decoded generically
    pub async fn score(&self, domain: &str) -> Result<Value> {
        self.client.get_resource(&Resource::Score, domain).await
    }

    /// Infection status of a list of URLs, decoded generically
    ///
    /// The URLs are posted as a JSON array; the request path carries the
    /// SipHash of exactly those bytes.
    pub async fn infected<S: AsRef<str>>(&self, urls: &[S]) -> Result<Value> {
        let urls: Vec<&str> = urls.iter().map(AsRef::as_ref).collect();
        let body = serde_json::to_vec(&urls).map_err(InvestigateError::Encode)?;
        self.client.post_encoded(&infected_path(&body), body).await
    }

    /// Hourly request volume between `start` and `stop`, decoded generically
    pub async fn traffic(
        &self,
        domain: &str,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
    ) -> Result<Value> {
        let resource = Resource::Traffic(TrafficWindow::new(start, stop)?);
        self.client.get_resource(&resource, domain).await
    }
}
