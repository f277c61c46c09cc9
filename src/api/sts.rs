//! Implements the `Identity` trait with AWS STS.

use crate::api::Identity;
use crate::Result;
use anyhow::Context;
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::Client;

pub(super) struct CallerIdentity {
    client: Client,
}

impl CallerIdentity {
    pub(super) fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait::async_trait]
impl Identity for CallerIdentity {
    async fn account_id(&self) -> Result<String> {
        let response = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("{}", DisplayErrorContext(&e)))
            .context("Failed to look up the caller identity")?;
        response
            .account()
            .map(str::to_string)
            .context("The caller identity has no account")
    }
}
