//! API endpoint modules.

mod dnsdb;
mod domains;
mod ips;

pub use dnsdb::DnsDbApi;
pub use domains::DomainsApi;
pub use ips::IpsApi;
