//! DNS record types accepted by the RR history endpoints.

use crate::error::InvestigateError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Record type for a DNS resource-record history lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryType {
    /// IPv4 address records
    #[default]
    A,
    /// Name server records
    Ns,
    /// Mail exchanger records
    Mx,
    /// Text records
    Txt,
    /// Canonical name records
    Cname,
}

impl QueryType {
    /// Every supported record type
    pub const ALL: [Self; 5] = [Self::A, Self::Ns, Self::Mx, Self::Txt, Self::Cname];

    /// Upper-case record type name, as callers usually write it
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Ns => "NS",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Cname => "CNAME",
        }
    }

    /// Lower-case form used inside request paths
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::Ns => "ns",
            Self::Mx => "mx",
            Self::Txt => "txt",
            Self::Cname => "cname",
        }
    }
}

impl FromStr for QueryType {
    type Err = InvestigateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| InvestigateError::UnsupportedQueryType(s.to_string()))
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
