use crate::model::{Amount, CostAndUsage, GroupCost};
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The label used for resources whose tag value is empty when no default label is configured.
pub const NO_TAG: &str = "[no tag]";

/// The column headers, in the order every output format writes them.
pub const HEADERS: [&str; 5] = ["Account", "Tag", "Service", "Month", "Amount"];

/// One line of the report: the cost of one service, for one tag value, in one month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    pub account: String,
    pub tag_value: String,
    pub service: String,
    /// `YYYY-MM`
    pub month: String,
    pub amount: Amount,
}

/// How empty tag values are labelled in the report. Only affects display, never the query.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct UntaggedLabel(Option<String>);

impl UntaggedLabel {
    /// A missing or empty `default` falls back to `NO_TAG`.
    pub fn new(default: Option<&str>) -> Self {
        Self(default.filter(|d| !d.is_empty()).map(str::to_string))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or(NO_TAG)
    }
}

/// The ordered rows of a report. Order is the provider's: by month, then by group.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CostRows(Vec<CostRow>);

impl CostRows {
    pub fn new(rows: Vec<CostRow>) -> Self {
        Self(rows)
    }

    /// Flattens a grouped provider response into one row per (period, group) pair.
    ///
    /// # Errors
    /// - A period start that is not a `YYYY-MM-DD` date
    /// - A group with fewer than two keys (tag, service)
    /// - A group without a parseable amount
    pub fn from_response(
        response: &CostAndUsage,
        account: &str,
        tag_key: &str,
        untagged: &UntaggedLabel,
    ) -> Result<Self> {
        let tag_prefix = format!("{tag_key}$");
        let mut rows = Vec::with_capacity(response.group_count());
        for period in &response.periods {
            let month = month_of(&period.start)?;
            for group in &period.groups {
                let (tag, service) = tag_and_service(group, &period.start)?;
                let tag_value = tag.strip_prefix(&tag_prefix).unwrap_or(tag);
                let tag_value = if tag_value.is_empty() {
                    untagged.as_str()
                } else {
                    tag_value
                };
                let raw = group.amount.as_deref().with_context(|| {
                    format!("The cost group {:?} in {} has no amount", group.keys, period.start)
                })?;
                let amount = Amount::from_str(raw).with_context(|| {
                    format!("The cost group {:?} in {} has a bad amount", group.keys, period.start)
                })?;
                rows.push(CostRow {
                    account: account.to_string(),
                    tag_value: tag_value.to_string(),
                    service: service.to_string(),
                    month: month.clone(),
                    amount,
                });
            }
        }
        Ok(Self::new(rows))
    }

    /// The sum of every row's amount, unrounded.
    pub fn subtotal(&self) -> Amount {
        self.0.iter().map(|row| &row.amount).sum()
    }

    pub fn rows(&self) -> &[CostRow] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CostRow> {
        self.0.iter()
    }
}

fn month_of(period_start: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(period_start, crate::model::DATE_FORMAT)
        .with_context(|| format!("Unexpected time period start '{period_start}'"))?;
    Ok(date.format("%Y-%m").to_string())
}

fn tag_and_service<'a>(group: &'a GroupCost, period_start: &str) -> Result<(&'a str, &'a str)> {
    match group.keys.as_slice() {
        [tag, service, ..] => Ok((tag.as_str(), service.as_str())),
        keys => bail!(
            "Expected a tag key and a service key for a cost group in {period_start}, got {keys:?}"
        ),
    }
}
