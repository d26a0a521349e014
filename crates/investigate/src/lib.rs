//! Rust client for the Investigate threat-intelligence API.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use investigate::{InvestigateClient, QueryType};
//!
//! #[tokio::main]
//! async fn main() -> investigate::Result<()> {
//!     let client = InvestigateClient::new("your-api-key")?;
//!
//!     // Single lookups
//!     let security = client.domains().security("www.test.com").await?;
//!     println!("DGA score: {:?}", security.dga_score);
//!
//!     let record = client.dnsdb().rr_history("208.64.121.161", "A").await?;
//!     println!("{record:?}");
//!
//!     // Many lookups over a bounded worker pool, results unordered
//!     let mut results = client
//!         .batch()
//!         .concurrency(8)
//!         .related(["www.test.com", "www.example.com"]);
//!
//!     while let Some(item) = results.recv().await {
//!         println!("{}: ok = {}", item.item, item.is_ok());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/investigate/0.3.0")]

// Re-export core types
pub use investigate_core::*;

// Re-export client
pub use investigate_client::{
    api, ApiRequest, BatchApi, BatchItem, BatchStream, Credential, HttpTransport,
    InvestigateClient, InvestigateClientBuilder, RateLimitConfig, RawResponse, RetryConfig,
    Transport, DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS,
};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
