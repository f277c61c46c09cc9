//! These structs provide the CLI interface for the cost-report CLI.

use crate::event::{Event, Scalar};
use crate::report::Format;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// cost-report: A monthly AWS cost breakdown by tag and service.
///
/// The report covers every whole month from the start of the month `--days` ago up to the start
/// of the current month. Costs are grouped by the values of one cost allocation tag and then by
/// service, written to a spreadsheet (or a TSV file) and emailed through SES.
///
/// AWS credentials and the region are taken from the usual places (environment, profile,
/// instance role). Settings can come from an event file, from flags, or from `COST_REPORT_*`
/// environment variables. Flags win over the event file.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the report and email it. This is what the scheduled job runs.
    Send(ReportArgs),
    /// Build the report and write the attachment to a directory instead of emailing it.
    Render(RenderArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}

/// (Not shown): Args that describe which report to build.
#[derive(Debug, Parser, Clone, Default)]
pub struct ReportArgs {
    /// A JSON event file, for example the payload the scheduler would send:
    /// {"tag-key": "Team", "tag-value": "", "days": 60, "show-chart": 1, ...}
    #[arg(long, env = "COST_REPORT_EVENT")]
    event: Option<PathBuf>,

    /// The cost allocation tag to group by.
    #[arg(long, env = "COST_REPORT_TAG_KEY")]
    tag_key: Option<String>,

    /// A single value of the tag to report on. Leave empty to report on every value.
    #[arg(long, env = "COST_REPORT_TAG_VALUE")]
    tag_value: Option<String>,

    /// The label used for resources that do not carry the tag.
    #[arg(long, env = "COST_REPORT_TAG_VALUE_DEFAULT")]
    tag_value_default: Option<String>,

    /// How many days back the report window reaches. It is widened to whole months.
    #[arg(long, env = "COST_REPORT_DAYS")]
    days: Option<String>,

    /// Pass 1 or true to add a column chart to the spreadsheet.
    #[arg(long, env = "COST_REPORT_SHOW_CHART")]
    show_chart: Option<String>,

    /// The verified SES sender address.
    #[arg(long, env = "COST_REPORT_EMAIL_FROM")]
    email_from: Option<String>,

    /// The address the report is sent to.
    #[arg(long, env = "COST_REPORT_EMAIL_TO")]
    email_to: Option<String>,

    /// The attachment format.
    #[arg(long, value_enum, env = "COST_REPORT_FORMAT")]
    format: Option<Format>,

    /// The AWS region for SES and STS. Cost Explorer ignores it.
    #[arg(long, env = "COST_REPORT_REGION")]
    region: Option<String>,
}

impl ReportArgs {
    pub fn event_file(&self) -> Option<&Path> {
        self.event.as_deref()
    }

    /// The flags that were given, as an `Event` to be laid over the event file.
    pub fn overrides(&self) -> Event {
        Event {
            tag_key: self.tag_key.clone(),
            tag_value: self.tag_value.clone(),
            tag_value_default: self.tag_value_default.clone(),
            days: self.days.as_deref().map(Scalar::from),
            show_chart: self.show_chart.as_deref().map(Scalar::from),
            email_from: self.email_from.clone(),
            email_to: self.email_to.clone(),
            format: self.format,
            region: self.region.clone(),
        }
    }
}

/// (Not shown): Args for the `cost-report render` command.
#[derive(Debug, Parser, Clone)]
pub struct RenderArgs {
    #[clap(flatten)]
    report: ReportArgs,

    /// The directory the report file is written to. It is created if it does not exist.
    #[arg(long)]
    output: PathBuf,
}

impl RenderArgs {
    pub fn report(&self) -> &ReportArgs {
        &self.report
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}
