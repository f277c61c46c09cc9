//! Builds the report email and hands it to the `Mailer`.

use crate::api::{Mailer, Receipt};
use crate::config::Addresses;
use crate::report::{Document, Report};
use crate::Result;
use anyhow::Context;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::Message;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// What happened to the report email.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Delivery {
    Sent {
        message_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    /// The provider refused the message. The report was still produced.
    Failed { error: String },
    /// The report was written to a file instead of being emailed.
    NotSent,
}

pub fn subject(report: &Report) -> String {
    format!("AWS Cost Breakdown: {}", report.tag_display())
}

/// Lines are kept short so that mail clients get the body as plain 7bit text.
pub fn body(report: &Report) -> String {
    format!(
        "Here is the AWS billing data {}\n\
        for the Tag {}.\n\n\
        Account: {}\n\
        Rows: {}\n\
        Total: {}\n",
        report.window,
        report.tag_display(),
        report.account,
        report.rows.len(),
        report.subtotal(),
    )
}

/// Composes a multipart message with a plain text body and `document` attached, returning the
/// raw RFC 5322 bytes.
pub fn compose(report: &Report, document: &Document, addresses: &Addresses) -> Result<Vec<u8>> {
    let content_type = ContentType::parse(document.format().content_type())
        .with_context(|| format!("Bad content type for {}", document.format()))?;
    let attachment = Attachment::new(document.file_name().to_string())
        .body(document.bytes().to_vec(), content_type);

    let message = Message::builder()
        .from(addresses.from().clone())
        .to(addresses.to().clone())
        .subject(subject(report))
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body(report)))
                .singlepart(attachment),
        )
        .context("Unable to build the report email")?;
    Ok(message.formatted())
}

/// Sends `raw` once. A refusal is logged and reported in the returned `Delivery`, not returned as
/// an error.
pub async fn dispatch(mailer: &(dyn Mailer + Send + Sync), raw: &[u8]) -> Delivery {
    match mailer.send_raw(raw).await {
        Ok(Receipt {
            message_id,
            request_id,
        }) => {
            info!(
                "Email sent! Message ID: {message_id}, request ID: {}",
                request_id.as_deref().unwrap_or("none")
            );
            Delivery::Sent {
                message_id,
                request_id,
            }
        }
        Err(e) => {
            let error = format!("{e:#}");
            error!("The report email was not sent: {error}");
            Delivery::Failed { error }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestMailer;
    use crate::report::Format;
    use crate::test::{addresses, sample_report};

    #[test]
    fn test_subject_and_body() {
        let report = sample_report();
        assert_eq!(subject(&report), "AWS Cost Breakdown: All Team");
        let body = body(&report);
        assert!(body.starts_with(
            "Here is the AWS billing data from 2026-08-01 to 2026-10-01\nfor the Tag All Team.\n"
        ));
        assert!(body.contains("Account: 123456789012"));
        assert!(body.contains("Total: $30.00"));
    }

    #[test]
    fn test_compose() {
        let report = sample_report();
        let document = report.render(Format::Tsv, false).unwrap();
        let raw = compose(&report, &document, &addresses()).unwrap();
        let text = String::from_utf8_lossy(&raw);
        assert!(text.contains("Subject: AWS Cost Breakdown: All Team"), "{text}");
        assert!(text.contains("reports@example.com"));
        assert!(text.contains("finance@example.com"));
        assert!(text.contains("multipart/mixed"));
        assert!(text.contains("AWS-MonthlyCostByTag-All_Team.tsv"));
        assert!(text.contains("Total: $30.00"));
    }

    #[tokio::test]
    async fn test_dispatch_sent() {
        let mailer = TestMailer::default();
        let delivery = dispatch(&mailer, b"raw").await;
        assert_eq!(
            delivery,
            Delivery::Sent {
                message_id: "test-message-1".into(),
                request_id: Some("test-request-1".into()),
            }
        );
        assert_eq!(mailer.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_rejected_is_not_an_error() {
        let mailer = TestMailer::rejecting("Email address is not verified.");
        let delivery = dispatch(&mailer, b"raw").await;
        assert_eq!(
            delivery,
            Delivery::Failed {
                error: "Email address is not verified.".into()
            }
        );
        assert!(mailer.sent().await.is_empty());
    }

    #[test]
    fn test_sent_delivery_carries_both_ids() {
        let delivery = Delivery::Sent {
            message_id: "0100018f-abc".into(),
            request_id: Some("5bd1c2d4-req".into()),
        };
        let json = serde_json::to_value(&delivery).unwrap();
        assert_eq!(json["status"], "sent");
        assert_eq!(json["message_id"], "0100018f-abc");
        assert_eq!(json["request_id"], "5bd1c2d4-req");
    }
}
