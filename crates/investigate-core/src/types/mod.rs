mod categorization;
mod common;
mod dns;
mod ips;
mod links;
mod record;
mod security;
mod tags;

pub use categorization::*;
pub use common::Location;
pub use dns::*;
pub use ips::*;
pub use links::*;
pub use record::*;
pub use security::*;
pub use tags::*;
