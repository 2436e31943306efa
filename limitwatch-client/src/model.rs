//! Wire shapes of the Limits API. Only the fields limitwatch reads are modelled; unknown fields are ignored.

use {
    serde::Deserialize,
    std::fmt::{Display, Formatter, Result as FmtResult},
};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// How a limit is scoped, which decides the shape of its usage lookup.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(from = "String")]
pub enum ScopeType {
    Global,
    Region,
    Ad,
    Other(String),
}

impl ScopeType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Global => "GLOBAL",
            Self::Region => "REGION",
            Self::Ad => "AD",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ScopeType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "GLOBAL" => Self::Global,
            "REGION" => Self::Region,
            "AD" => Self::Ad,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for ScopeType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl Display for ScopeType {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LimitValueSummary {
    pub name: String,
    pub scope_type: ScopeType,

    #[serde(default)]
    pub availability_domain: Option<String>,

    #[serde(default)]
    pub value: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAvailability {
    #[serde(default)]
    pub used: Option<i64>,

    #[serde(default)]
    pub available: Option<i64>,

    #[serde(default)]
    pub fractional_usage: Option<f64>,

    #[serde(default)]
    pub fractional_availability: Option<f64>,

    #[serde(default)]
    pub effective_quota_value: Option<f64>,
}

/// One page of a list call and the token for the next, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page: None,
        }
    }
}
