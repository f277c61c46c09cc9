//! Typed forms of the billing provider's request and response shapes.

use crate::model::ReportWindow;
use serde::{Deserialize, Serialize};

/// The cost metric requested from, and read back out of, the provider.
pub const COST_METRIC: &str = "UnblendedCost";

/// The provider dimension that identifies which service incurred a cost.
pub const SERVICE_DIMENSION: &str = "SERVICE";

/// A request for monthly costs grouped by tag value and then by service, filtered to exact
/// matches on `tag_values`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CostQuery {
    pub window: ReportWindow,
    pub tag_key: String,
    pub tag_values: Vec<String>,
}

/// The grouped results of a `CostQuery`, in the order the provider returned them.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CostAndUsage {
    pub periods: Vec<PeriodCosts>,
}

impl CostAndUsage {
    /// The number of (time period, group) pairs in the response.
    pub fn group_count(&self) -> usize {
        self.periods.iter().map(|p| p.groups.len()).sum()
    }
}

/// One time period (a month, since the granularity is monthly) of grouped results.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PeriodCosts {
    /// The first day of the period, formatted `YYYY-MM-DD`.
    pub start: String,
    pub groups: Vec<GroupCost>,
}

/// A single group within a period.
///
/// `keys` holds one entry per group-by definition: first the tag, as `"<key>$<value>"`, then the
/// service name. `amount` is the provider's decimal string for `COST_METRIC`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupCost {
    pub keys: Vec<String>,
    pub amount: Option<String>,
}

impl GroupCost {
    pub fn new(tag: impl Into<String>, service: impl Into<String>, amount: &str) -> Self {
        Self {
            keys: vec![tag.into(), service.into()],
            amount: Some(amount.to_string()),
        }
    }
}
