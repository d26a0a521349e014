//! HTTP client for the Investigate threat-intelligence API.
//!
//! [`InvestigateClient`] handles authentication, retries and decoding for
//! single lookups, and [`BatchApi`] fans many lookups out over a bounded
//! pool of workers.

#![doc(html_root_url = "https://docs.rs/investigate-client/0.3.0")]

pub mod api;
mod batch;
mod client;
mod config;
mod decode;
mod transport;

pub use batch::{BatchApi, BatchItem, BatchStream};
pub use client::{InvestigateClient, InvestigateClientBuilder};
pub use config::*;
pub use decode::{decode, decode_record, decode_value};
pub use investigate_core::{InvestigateError, Result};
pub use transport::{ApiRequest, HttpTransport, RawResponse, Transport};
