//! Implements the `Billing` trait with AWS Cost Explorer.

use crate::api::Billing;
use crate::model::{
    CostAndUsage, CostQuery, GroupCost, PeriodCosts, ReportWindow, COST_METRIC,
    SERVICE_DIMENSION,
};
use crate::Result;
use anyhow::Context;
use aws_sdk_costexplorer::error::DisplayErrorContext;
use aws_sdk_costexplorer::types::{
    DateInterval, Expression, Granularity, Group, GroupDefinition, GroupDefinitionType,
    MatchOption, ResultByTime, TagValues,
};
use aws_sdk_costexplorer::Client;
use tracing::{debug, trace};

pub(super) struct CostExplorer {
    client: Client,
}

impl CostExplorer {
    pub(super) fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait::async_trait]
impl Billing for CostExplorer {
    async fn tag_values(&self, window: &ReportWindow, tag_key: &str) -> Result<Vec<String>> {
        let mut values = Vec::new();
        let mut next_page_token: Option<String> = None;
        loop {
            let response = self
                .client
                .get_tags()
                .time_period(date_interval(window)?)
                .tag_key(tag_key)
                .set_next_page_token(next_page_token.take())
                .send()
                .await
                .map_err(|e| anyhow::anyhow!("{}", DisplayErrorContext(&e)))
                .with_context(|| format!("Failed to list the values of the tag '{tag_key}'"))?;
            values.extend(response.tags().iter().cloned());
            match response.next_page_token() {
                Some(token) if !token.is_empty() => next_page_token = Some(token.to_string()),
                _ => break,
            }
        }
        debug!("Found {} values for tag '{tag_key}' {window}", values.len());
        Ok(values)
    }

    async fn cost_and_usage(&self, query: &CostQuery) -> Result<CostAndUsage> {
        let filter = Expression::builder()
            .tags(
                TagValues::builder()
                    .key(&query.tag_key)
                    .set_values(Some(query.tag_values.clone()))
                    .match_options(MatchOption::Equals)
                    .build(),
            )
            .build();
        let by_tag = GroupDefinition::builder()
            .r#type(GroupDefinitionType::Tag)
            .key(&query.tag_key)
            .build();
        let by_service = GroupDefinition::builder()
            .r#type(GroupDefinitionType::Dimension)
            .key(SERVICE_DIMENSION)
            .build();

        let mut periods = Vec::new();
        let mut next_page_token: Option<String> = None;
        loop {
            let response = self
                .client
                .get_cost_and_usage()
                .time_period(date_interval(&query.window)?)
                .granularity(Granularity::Monthly)
                .filter(filter.clone())
                .metrics(COST_METRIC)
                .group_by(by_tag.clone())
                .group_by(by_service.clone())
                .set_next_page_token(next_page_token.take())
                .send()
                .await
                .map_err(|e| anyhow::anyhow!("{}", DisplayErrorContext(&e)))
                .with_context(|| {
                    format!(
                        "Failed to query costs for tag '{}' {}",
                        query.tag_key, query.window
                    )
                })?;
            trace!("{response:?}");
            periods.extend(response.results_by_time().iter().map(period_costs));
            match response.next_page_token() {
                Some(token) if !token.is_empty() => next_page_token = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(CostAndUsage { periods })
    }
}

fn date_interval(window: &ReportWindow) -> Result<DateInterval> {
    DateInterval::builder()
        .start(window.start_str())
        .end(window.end_str())
        .build()
        .context("Failed to build date interval")
}

fn period_costs(result: &ResultByTime) -> PeriodCosts {
    PeriodCosts {
        start: result
            .time_period()
            .map(|tp| tp.start().to_string())
            .unwrap_or_default(),
        groups: result.groups().iter().map(group_cost).collect(),
    }
}

fn group_cost(group: &Group) -> GroupCost {
    GroupCost {
        keys: group.keys().to_vec(),
        amount: group
            .metrics()
            .and_then(|metrics| metrics.get(COST_METRIC))
            .and_then(|metric| metric.amount())
            .map(str::to_string),
    }
}
