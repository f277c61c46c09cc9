//! The invocation payload handed to the job by whatever schedules it.
//!
//! The payload is a flat JSON object with kebab-case keys:
//!
//! ```json
//! {
//!   "tag-key": "Team",
//!   "tag-value": "",
//!   "tag-value-default": "Shared",
//!   "days": 60,
//!   "show-chart": 1,
//!   "email-from": "reports@example.com",
//!   "email-to": "finance@example.com"
//! }
//! ```
//!
//! Nothing is validated here. `Config::from_event` does that once the event file and any
//! command line overrides have been merged.

use crate::report::Format;
use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::Path;

/// A raw invocation event. Every field is optional so that the event file and command line flags
/// can each supply part of it.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_key: Option<String>,

    /// An empty string means every value of `tag_key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_value_default: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_chart: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_from: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Event {
    /// Loads an event from a JSON file.
    pub async fn load(path: &Path) -> Result<Self> {
        utils::deserialize(path)
            .await
            .with_context(|| format!("Unable to load the event file '{}'", path.display()))
    }

    /// Returns a new event holding every field of `overrides` that is set, and the field from
    /// `self` otherwise.
    pub fn merge(self, overrides: Event) -> Event {
        Event {
            tag_key: overrides.tag_key.or(self.tag_key),
            tag_value: overrides.tag_value.or(self.tag_value),
            tag_value_default: overrides.tag_value_default.or(self.tag_value_default),
            days: overrides.days.or(self.days),
            show_chart: overrides.show_chart.or(self.show_chart),
            email_from: overrides.email_from.or(self.email_from),
            email_to: overrides.email_to.or(self.email_to),
            format: overrides.format.or(self.format),
            region: overrides.region.or(self.region),
        }
    }
}

/// A loosely typed scalar. Schedulers send `"days": 30` and `"days": "30"` interchangeably, and
/// `show-chart` shows up as `1`, `"1"` or `true`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl Scalar {
    /// Interprets the scalar as a whole number, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::Bool(_) => None,
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Only `1` and `true` (in any of their forms) switch a flag on.
    pub fn is_on(&self) -> bool {
        match self {
            Scalar::Int(i) => *i == 1,
            Scalar::Bool(b) => *b,
            Scalar::Text(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true"),
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}
