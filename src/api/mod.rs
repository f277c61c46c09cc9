//! The external services the report depends on, each behind a trait so the whole program can run
//! against in-memory implementations.

mod cost_explorer;
mod ses;
mod sts;
mod test_client;

use crate::model::{CostAndUsage, CostQuery, ReportWindow};
use crate::Result;
use std::fmt::{Debug, Formatter};
use tracing::debug;

pub use test_client::{MonthlyCharge, SentMessage, TestBilling, TestIdentity, TestMailer};

/// When this environment variable is set and non-empty, `Mode::from_env` returns `Mode::Test`.
pub const TEST_MODE_ENV: &str = "COST_REPORT_IN_TEST_MODE";

/// The billing data provider.
#[async_trait::async_trait]
pub trait Billing {
    /// Every value of `tag_key` seen in `window`, in the provider's order.
    async fn tag_values(&self, window: &ReportWindow, tag_key: &str) -> Result<Vec<String>>;

    /// Monthly costs grouped by tag value and then by service.
    async fn cost_and_usage(&self, query: &CostQuery) -> Result<CostAndUsage>;
}

/// Tells us which account the credentials belong to.
#[async_trait::async_trait]
pub trait Identity {
    async fn account_id(&self) -> Result<String>;
}

/// Sends a fully formatted MIME message.
#[async_trait::async_trait]
pub trait Mailer {
    async fn send_raw(&self, message: &[u8]) -> Result<Receipt>;
}

/// The provider's identifiers for an accepted message.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Receipt {
    pub message_id: String,
    /// The id of the API request, which is what support asks for.
    pub request_id: Option<String>,
}

/// Whether to talk to AWS or to the in-memory providers.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Mode {
    #[default]
    Aws,
    Test,
}

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Aws,
        }
    }
}

/// The set of providers one run uses.
pub struct Providers {
    billing: Box<dyn Billing + Send + Sync>,
    identity: Box<dyn Identity + Send + Sync>,
    mailer: Box<dyn Mailer + Send + Sync>,
}

impl Debug for Providers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Providers")
    }
}

impl Providers {
    /// Creates the providers for `mode`. In `Mode::Aws` the SDK configuration is loaded from the
    /// environment (credentials chain, profile, region), with `region` taking precedence.
    pub async fn new(mode: Mode, region: Option<&str>) -> Result<Self> {
        match mode {
            Mode::Test => {
                debug!("Using in-memory providers");
                Ok(Self::from_parts(
                    TestBilling::default(),
                    TestIdentity::default(),
                    TestMailer::default(),
                ))
            }
            Mode::Aws => {
                let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
                if let Some(region) = region {
                    loader = loader.region(aws_config::Region::new(region.to_string()));
                }
                let sdk_config = loader.load().await;
                debug!("Using AWS providers, region {:?}", sdk_config.region());
                Ok(Self::from_parts(
                    cost_explorer::CostExplorer::new(&sdk_config),
                    sts::CallerIdentity::new(&sdk_config),
                    ses::SesMailer::new(&sdk_config),
                ))
            }
        }
    }

    pub fn from_parts(
        billing: impl Billing + Send + Sync + 'static,
        identity: impl Identity + Send + Sync + 'static,
        mailer: impl Mailer + Send + Sync + 'static,
    ) -> Self {
        Self {
            billing: Box::new(billing),
            identity: Box::new(identity),
            mailer: Box::new(mailer),
        }
    }

    pub fn billing(&self) -> &(dyn Billing + Send + Sync) {
        self.billing.as_ref()
    }

    pub fn identity(&self) -> &(dyn Identity + Send + Sync) {
        self.identity.as_ref()
    }

    pub fn mailer(&self) -> &(dyn Mailer + Send + Sync) {
        self.mailer.as_ref()
    }
}
