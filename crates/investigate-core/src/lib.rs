//! Core types and errors for the Investigate API client.
//!
//! This crate provides the foundational pieces used across the workspace:
//!
//! - **Types**: Strongly-typed representations of Investigate API responses
//! - **Resources**: URI templates for every lookup the API offers
//! - **Errors**: The error taxonomy with [`InvestigateError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use investigate_core::{RelatedDomainList, Result};
//!
//! fn strongest(list: &RelatedDomainList) -> Result<()> {
//!     for related in list.iter().filter(|r| r.score > 10) {
//!         println!("{} ({})", related.domain, related.score);
//!     }
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/investigate-core/0.3.0")]

mod error;
mod query;
mod resource;
pub mod types;

pub use error::{AttemptError, InvestigateError, Result};
pub use query::QueryType;
pub use resource::{infected_path, Resource, TrafficWindow, BULK_CATEGORIZATION_PATH};
pub use types::*;
