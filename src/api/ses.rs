//! Implements the `Mailer` trait with AWS SES.

use crate::api::{Mailer, Receipt};
use crate::Result;
use anyhow::Context;
use aws_sdk_ses::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_ses::operation::RequestId;
use aws_sdk_ses::primitives::Blob;
use aws_sdk_ses::types::RawMessage;
use aws_sdk_ses::Client;

pub(super) struct SesMailer {
    client: Client,
}

impl SesMailer {
    pub(super) fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait::async_trait]
impl Mailer for SesMailer {
    async fn send_raw(&self, message: &[u8]) -> Result<Receipt> {
        let raw = RawMessage::builder()
            .data(Blob::new(message))
            .build()
            .context("Failed to build the raw email message")?;
        let response = self
            .client
            .send_raw_email()
            .raw_message(raw)
            .send()
            .await
            .map_err(|e| {
                // SES puts the useful part ("Email address is not verified...") in the message.
                let message = e
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| DisplayErrorContext(&e).to_string());
                anyhow::anyhow!(message)
            })?;
        Ok(Receipt {
            message_id: response.message_id().to_string(),
            request_id: response.request_id().map(str::to_string),
        })
    }
}
