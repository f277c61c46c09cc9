//! The report pipeline: window, tag values, costs, rows, document, email.

use crate::api::{Billing, Providers};
use crate::commands::Out;
use crate::email::{self, Delivery};
use crate::model::{Amount, CostAndUsage, CostQuery, CostRows, ReportWindow, TagSelector};
use crate::report::{Document, Report};
use crate::{utils, Config, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a run produced, logged as JSON at debug level.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub account: String,
    pub tag: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rows: usize,
    pub subtotal: Amount,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub delivery: Delivery,
}

impl ReportSummary {
    fn new(
        report: &Report,
        document: &Document,
        path: Option<PathBuf>,
        delivery: Delivery,
    ) -> Self {
        Self {
            account: report.account.clone(),
            tag: report.tag_display(),
            start: report.window.start(),
            end: report.window.end(),
            rows: report.rows.len(),
            subtotal: report.subtotal(),
            file_name: document.file_name().to_string(),
            path,
            delivery,
        }
    }
}

/// Builds the report and emails it. Failing to send is logged and reflected in the summary, it
/// does not make this function return an error. Everything before the send does.
pub async fn send(
    config: Config,
    providers: &Providers,
    today: NaiveDate,
) -> Result<Out<ReportSummary>> {
    let addresses = config.addresses()?;
    let report = build_report(&config, providers, today).await?;
    let document = report.render(config.format(), config.show_chart())?;
    let raw = email::compose(&report, &document, addresses)?;
    debug!("Composed a {} byte email", raw.len());

    let delivery = email::dispatch(providers.mailer(), &raw).await;
    let message = match &delivery {
        Delivery::Sent { .. } => format!(
            "Sent {} ({} rows, total {}) to {}",
            document.file_name(),
            report.rows.len(),
            report.subtotal(),
            addresses.to()
        ),
        Delivery::Failed { error } => format!(
            "Built {} but the email was not sent: {error}",
            document.file_name()
        ),
        Delivery::NotSent => format!("Built {}", document.file_name()),
    };
    Ok(Out::new(
        message,
        ReportSummary::new(&report, &document, None, delivery),
    ))
}

/// Builds the report and writes the document into `output_dir` instead of emailing it.
pub async fn render(
    config: Config,
    providers: &Providers,
    today: NaiveDate,
    output_dir: &Path,
) -> Result<Out<ReportSummary>> {
    let report = build_report(&config, providers, today).await?;
    let document = report.render(config.format(), config.show_chart())?;
    utils::make_dir(output_dir).await?;
    let path = output_dir.join(document.file_name());
    utils::write(&path, document.bytes()).await?;
    Ok(Out::new(
        format!(
            "Wrote {} ({} rows, total {})",
            path.display(),
            report.rows.len(),
            report.subtotal()
        ),
        ReportSummary::new(&report, &document, Some(path), Delivery::NotSent),
    ))
}

/// Queries the providers and assembles the rows of the report for the window ending at the start
/// of `today`'s month.
pub async fn build_report(
    config: &Config,
    providers: &Providers,
    today: NaiveDate,
) -> Result<Report> {
    let window = ReportWindow::trailing(today, config.days());
    let selector = config.selector();
    info!("Building the cost report for {} {window}", selector.display());

    let tag_values = resolve_tag_values(providers.billing(), selector, &window).await?;
    let response = if window.is_empty() || tag_values.is_empty() {
        debug!("Nothing to query for {} {window}", selector.display());
        CostAndUsage::default()
    } else {
        let query = CostQuery {
            window,
            tag_key: selector.key().to_string(),
            tag_values,
        };
        providers.billing().cost_and_usage(&query).await?
    };

    let account = providers.identity().account_id().await?;
    let rows = CostRows::from_response(&response, &account, selector.key(), config.untagged())?;
    debug!(
        "{} rows from {} time periods",
        rows.len(),
        response.periods.len()
    );

    Ok(Report {
        account,
        selector: selector.clone(),
        window,
        rows,
    })
}

async fn resolve_tag_values(
    billing: &(dyn Billing + Send + Sync),
    selector: &TagSelector,
    window: &ReportWindow,
) -> Result<Vec<String>> {
    match selector {
        TagSelector::SpecificValue { value, .. } => Ok(vec![value.clone()]),
        TagSelector::AllValuesOf { .. } if window.is_empty() => Ok(Vec::new()),
        TagSelector::AllValuesOf { key } => billing.tag_values(window, key).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MonthlyCharge, TestBilling, TestIdentity, TestMailer};
    use crate::event::{Event, Scalar};
    use crate::report::Format;
    use crate::test::{dec, scenario_billing, scenario_event, today};

    fn providers(billing: &TestBilling, mailer: &TestMailer) -> Providers {
        Providers::from_parts(billing.clone(), TestIdentity::default(), mailer.clone())
    }

    #[tokio::test]
    async fn test_scenario_all_values_with_default_label() {
        let billing = scenario_billing();
        let mailer = TestMailer::default();
        let config = Config::from_event(scenario_event()).unwrap();

        let report = build_report(&config, &providers(&billing, &mailer), today())
            .await
            .unwrap();

        let actual: Vec<(&str, &str, &str, String)> = report
            .rows
            .iter()
            .map(|r| {
                (
                    r.tag_value.as_str(),
                    r.service.as_str(),
                    r.month.as_str(),
                    r.amount.to_string(),
                )
            })
            .collect();
        assert_eq!(
            actual,
            vec![
                ("Alpha", "EC2", "2026-08", "$10.00".to_string()),
                ("Shared", "S3", "2026-08", "$5.00".to_string()),
                ("Alpha", "EC2", "2026-09", "$10.00".to_string()),
                ("Shared", "S3", "2026-09", "$5.00".to_string()),
            ]
        );
        assert_eq!(report.subtotal().value(), dec("30"));
        assert_eq!(report.account, "123456789012");

        // The default label is for display only, the filter holds the discovered values.
        let queries = billing.queries().await;
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].tag_key, "Team");
        assert_eq!(queries[0].tag_values, vec!["Alpha".to_string(), "".to_string()]);
    }

    #[tokio::test]
    async fn test_send_scenario() {
        let billing = scenario_billing();
        let mailer = TestMailer::default();
        let config = Config::from_event(scenario_event()).unwrap();

        let out = send(config, &providers(&billing, &mailer), today())
            .await
            .unwrap();

        let summary = out.structure();
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.subtotal.to_string(), "$30.00");
        assert_eq!(summary.file_name, "AWS-MonthlyCostByTag-All_Team.xlsx");
        assert!(matches!(summary.delivery, Delivery::Sent { .. }));
        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        let text = String::from_utf8_lossy(&sent[0].raw);
        assert!(text.contains("AWS Cost Breakdown: All Team"));
    }

    #[tokio::test]
    async fn test_specific_value_with_no_costs_still_sends() {
        let billing = TestBilling::new(
            vec!["Alpha".into()],
            vec![MonthlyCharge::new("Alpha", "EC2", "10.00")],
        );
        let mailer = TestMailer::default();
        let config = Config::from_event(Event {
            tag_value: Some("Gamma".into()),
            ..scenario_event()
        })
        .unwrap();

        let out = send(config, &providers(&billing, &mailer), today())
            .await
            .unwrap();

        let summary = out.structure();
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.subtotal.to_string(), "$0.00");
        assert_eq!(summary.file_name, "AWS-MonthlyCostByTag-Gamma.xlsx");
        assert_eq!(mailer.sent().await.len(), 1);
        assert_eq!(billing.queries().await[0].tag_values, vec!["Gamma".to_string()]);
    }

    #[tokio::test]
    async fn test_rejected_email_returns_normally() {
        let billing = scenario_billing();
        let mailer = TestMailer::rejecting("Email address is not verified.");
        let config = Config::from_event(scenario_event()).unwrap();

        let out = send(config, &providers(&billing, &mailer), today())
            .await
            .unwrap();

        assert!(out.message().contains("Email address is not verified."));
        assert_eq!(
            out.structure().delivery,
            Delivery::Failed {
                error: "Email address is not verified.".into()
            }
        );
    }

    #[tokio::test]
    async fn test_query_errors_are_fatal() {
        let billing = TestBilling::failing("ThrottlingException: Rate exceeded");
        let mailer = TestMailer::default();
        let config = Config::from_event(scenario_event()).unwrap();

        let err = send(config, &providers(&billing, &mailer), today())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Rate exceeded"));
        assert!(mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_no_discovered_values_skips_cost_query() {
        let billing = TestBilling::new(Vec::new(), vec![MonthlyCharge::new("", "S3", "5")]);
        let mailer = TestMailer::default();
        let config = Config::from_event(scenario_event()).unwrap();

        let report = build_report(&config, &providers(&billing, &mailer), today())
            .await
            .unwrap();

        assert!(report.rows.is_empty());
        assert!(billing.queries().await.is_empty());
    }

    #[tokio::test]
    async fn test_zero_days_queries_nothing() {
        let billing = scenario_billing();
        let mailer = TestMailer::default();
        let config = Config::from_event(Event {
            days: Some(Scalar::Int(0)),
            ..scenario_event()
        })
        .unwrap();

        let report = build_report(&config, &providers(&billing, &mailer), today())
            .await
            .unwrap();

        assert!(report.window.is_empty());
        assert!(report.rows.is_empty());
        assert!(billing.queries().await.is_empty());
    }

    #[tokio::test]
    async fn test_send_requires_addresses_before_querying() {
        let billing = scenario_billing();
        let mailer = TestMailer::default();
        let config = Config::from_event(Event {
            email_from: None,
            email_to: None,
            ..scenario_event()
        })
        .unwrap();

        assert!(send(config, &providers(&billing, &mailer), today())
            .await
            .is_err());
        assert!(billing.queries().await.is_empty());
    }

    #[tokio::test]
    async fn test_render_writes_tsv() {
        let dir = tempfile::TempDir::new().unwrap();
        let billing = scenario_billing();
        let mailer = TestMailer::default();
        let config = Config::from_event(Event {
            format: Some(Format::Tsv),
            ..scenario_event()
        })
        .unwrap();

        let out = render(
            config,
            &providers(&billing, &mailer),
            today(),
            &dir.path().join("out"),
        )
        .await
        .unwrap();

        let path = dir.path().join("out").join("AWS-MonthlyCostByTag-All_Team.tsv");
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert_eq!(out.structure().path.as_deref(), Some(path.as_path()));
        assert_eq!(out.structure().delivery, Delivery::NotSent);
        assert!(mailer.sent().await.is_empty());
    }
}
