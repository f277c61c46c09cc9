//! Validated configuration for one run of the report.
//!
//! An `Event` is whatever the scheduler (or the command line) handed us. `Config::from_event`
//! checks it once so that the rest of the program can rely on the typed values.

use crate::event::Event;
use crate::model::{TagSelector, UntaggedLabel};
use crate::report::Format;
use crate::Result;
use anyhow::{bail, Context};
use lettre::message::Mailbox;
use std::path::Path;
use tracing::debug;

/// The sender and recipient of the report email.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Addresses {
    from: Mailbox,
    to: Mailbox,
}

impl Addresses {
    pub fn new(from: Mailbox, to: Mailbox) -> Self {
        Self { from, to }
    }

    pub fn from(&self) -> &Mailbox {
        &self.from
    }

    pub fn to(&self) -> &Mailbox {
        &self.to
    }
}

/// The `Config` object holds everything a run needs, already validated.
#[derive(Debug, Clone)]
pub struct Config {
    selector: TagSelector,
    untagged: UntaggedLabel,
    days: u32,
    show_chart: bool,
    addresses: Option<Addresses>,
    format: Format,
    region: Option<String>,
}

impl Config {
    /// Loads the event file, if there is one, lays `overrides` over it and validates the result.
    pub async fn load(event_file: Option<&Path>, overrides: Event) -> Result<Self> {
        let event = match event_file {
            Some(path) => Event::load(path).await?.merge(overrides),
            None => overrides,
        };
        debug!("Loaded event {event:?}");
        Self::from_event(event)
    }

    /// Validates `event`.
    ///
    /// # Errors
    /// - `tag-key` is missing or blank
    /// - `days` is missing, not a whole number, or negative
    /// - only one of `email-from` and `email-to` is given, or either is not a valid address
    pub fn from_event(event: Event) -> Result<Self> {
        let tag_key = match event.tag_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => bail!("The tag-key is required and must not be blank"),
        };

        let days = match &event.days {
            None => bail!("The number of days to report on is required"),
            Some(raw) => {
                let days = raw
                    .as_i64()
                    .with_context(|| format!("The days value '{raw}' is not a whole number"))?;
                u32::try_from(days).with_context(|| {
                    format!("The days value '{days}' must be zero or a positive number")
                })?
            }
        };

        let addresses = match (event.email_from.as_deref(), event.email_to.as_deref()) {
            (None, None) => None,
            (Some(from), Some(to)) => Some(Addresses::new(
                parse_mailbox("email-from", from)?,
                parse_mailbox("email-to", to)?,
            )),
            (Some(_), None) => bail!("The email-from address was given without an email-to"),
            (None, Some(_)) => bail!("The email-to address was given without an email-from"),
        };

        Ok(Self {
            selector: TagSelector::new(tag_key, event.tag_value.as_deref()),
            untagged: UntaggedLabel::new(event.tag_value_default.as_deref()),
            days,
            show_chart: event.show_chart.as_ref().is_some_and(|s| s.is_on()),
            addresses,
            format: event.format.unwrap_or_default(),
            region: event
                .region
                .filter(|r| !r.trim().is_empty())
                .map(|r| r.trim().to_string()),
        })
    }

    pub fn selector(&self) -> &TagSelector {
        &self.selector
    }

    pub fn untagged(&self) -> &UntaggedLabel {
        &self.untagged
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn show_chart(&self) -> bool {
        self.show_chart
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// The email addresses. Sending requires them, rendering to a file does not.
    pub fn addresses(&self) -> Result<&Addresses> {
        self.addresses
            .as_ref()
            .context("Both email-from and email-to are required to send the report")
    }
}

fn parse_mailbox(field: &str, value: &str) -> Result<Mailbox> {
    value
        .trim()
        .parse::<Mailbox>()
        .with_context(|| format!("The {field} value '{value}' is not a valid email address"))
}
