//! IP API endpoints.

use crate::InvestigateClient;
use investigate_core::{MaliciousDomain, Resource, Result};

/// IP API endpoints
pub struct IpsApi<'a> {
    client: &'a InvestigateClient,
}

impl<'a> IpsApi<'a> {
    pub(crate) const fn new(client: &'a InvestigateClient) -> Self {
        Self { client }
    }

    /// Latest malicious domains that resolved to `ip`
    pub async fn latest_domains(&self, ip: &str) -> Result<Vec<MaliciousDomain>> {
        self.client.get_resource(&Resource::LatestDomains, ip).await
    }
}
