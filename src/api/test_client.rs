//! In-memory implementations of the provider traits.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without touching AWS. See `Mode::Test`.

use crate::api::{Billing, Identity, Mailer, Receipt};
use crate::model::{CostAndUsage, CostQuery, GroupCost, PeriodCosts, ReportWindow};
use crate::Result;
use anyhow::bail;
use chrono::Months;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One seeded monthly charge. It is repeated for every month of whatever window is queried.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MonthlyCharge {
    pub tag_value: String,
    pub service: String,
    pub amount: String,
}

impl MonthlyCharge {
    pub fn new(tag_value: &str, service: &str, amount: &str) -> Self {
        Self {
            tag_value: tag_value.to_string(),
            service: service.to_string(),
            amount: amount.to_string(),
        }
    }
}

/// An implementation of `Billing` that answers from seeded data. Every month in the queried window
/// gets the same charges, filtered to the requested tag values, in seed order.
#[derive(Debug, Clone)]
pub struct TestBilling {
    tag_values: Vec<String>,
    charges: Vec<MonthlyCharge>,
    error: Option<String>,
    queries: Arc<Mutex<Vec<CostQuery>>>,
}

impl TestBilling {
    pub fn new(tag_values: Vec<String>, charges: Vec<MonthlyCharge>) -> Self {
        Self {
            tag_values,
            charges,
            error: None,
            queries: Arc::default(),
        }
    }

    /// A provider that fails every request with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::new(Vec::new(), Vec::new())
        }
    }

    /// The cost queries received so far.
    pub async fn queries(&self) -> Vec<CostQuery> {
        self.queries.lock().await.clone()
    }

    fn check(&self) -> Result<()> {
        match &self.error {
            Some(message) => bail!("{message}"),
            None => Ok(()),
        }
    }
}

impl Default for TestBilling {
    fn default() -> Self {
        Self::new(
            vec!["".into(), "Alpha".into(), "Beta".into()],
            vec![
                MonthlyCharge::new("Alpha", "Amazon Elastic Compute Cloud - Compute", "812.4410"),
                MonthlyCharge::new("Alpha", "Amazon Simple Storage Service", "23.0071"),
                MonthlyCharge::new("Beta", "Amazon Relational Database Service", "1204.5"),
                MonthlyCharge::new("", "AWS Lambda", "0.000021"),
                MonthlyCharge::new("", "Amazon CloudWatch", "3.2"),
            ],
        )
    }
}

#[async_trait::async_trait]
impl Billing for TestBilling {
    async fn tag_values(&self, _window: &ReportWindow, _tag_key: &str) -> Result<Vec<String>> {
        self.check()?;
        Ok(self.tag_values.clone())
    }

    async fn cost_and_usage(&self, query: &CostQuery) -> Result<CostAndUsage> {
        self.check()?;
        self.queries.lock().await.push(query.clone());

        let groups: Vec<GroupCost> = self
            .charges
            .iter()
            .filter(|c| query.tag_values.contains(&c.tag_value))
            .map(|c| {
                GroupCost::new(
                    format!("{}${}", query.tag_key, c.tag_value),
                    c.service.as_str(),
                    &c.amount,
                )
            })
            .collect();

        let mut periods = Vec::new();
        let mut month = query.window.start();
        while month < query.window.end() {
            periods.push(PeriodCosts {
                start: month.format(crate::model::DATE_FORMAT).to_string(),
                groups: groups.clone(),
            });
            month = match month.checked_add_months(Months::new(1)) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(CostAndUsage { periods })
    }
}

/// An implementation of `Identity` that returns a fixed account id.
#[derive(Debug, Clone)]
pub struct TestIdentity(String);

impl TestIdentity {
    pub fn new(account: &str) -> Self {
        Self(account.to_string())
    }
}

impl Default for TestIdentity {
    fn default() -> Self {
        Self::new("123456789012")
    }
}

#[async_trait::async_trait]
impl Identity for TestIdentity {
    async fn account_id(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// A message accepted by `TestMailer`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SentMessage {
    pub message_id: String,
    pub raw: Vec<u8>,
}

/// An implementation of `Mailer` that keeps what it is sent. Clones share the same outbox.
#[derive(Debug, Clone, Default)]
pub struct TestMailer {
    rejection: Option<String>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl TestMailer {
    /// A mailer that refuses every message with `message`, the way SES refuses unverified
    /// addresses.
    pub fn rejecting(message: &str) -> Self {
        Self {
            rejection: Some(message.to_string()),
            sent: Arc::default(),
        }
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Mailer for TestMailer {
    async fn send_raw(&self, message: &[u8]) -> Result<Receipt> {
        if let Some(rejection) = &self.rejection {
            bail!("{rejection}");
        }
        let mut sent = self.sent.lock().await;
        let n = sent.len() + 1;
        let message_id = format!("test-message-{n}");
        sent.push(SentMessage {
            message_id: message_id.clone(),
            raw: message.to_vec(),
        });
        Ok(Receipt {
            message_id,
            request_id: Some(format!("test-request-{n}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_every_month_repeats_the_filtered_charges() {
        let billing = TestBilling::default();
        let query = CostQuery {
            window: ReportWindow::trailing(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), 90),
            tag_key: "Team".into(),
            tag_values: vec!["Beta".into(), "".into()],
        };

        let response = billing.cost_and_usage(&query).await.unwrap();

        let starts: Vec<&str> = response.periods.iter().map(|p| p.start.as_str()).collect();
        assert_eq!(starts, vec!["2026-07-01", "2026-08-01", "2026-09-01"]);
        assert_eq!(response.group_count(), 9);
        assert_eq!(
            response.periods[0].groups[0].keys,
            vec!["Team$Beta".to_string(), "Amazon Relational Database Service".to_string()]
        );
        assert_eq!(billing.queries().await, vec![query]);
    }

    #[tokio::test]
    async fn test_failing_billing() {
        let billing = TestBilling::failing("boom");
        let window = ReportWindow::trailing(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), 30);
        let err = billing.tag_values(&window, "Team").await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
