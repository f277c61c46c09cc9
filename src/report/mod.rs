//! Rendering cost rows into the document that gets attached to the report email.

mod tsv;
mod xlsx;

use crate::model::{Amount, CostRows, ReportWindow, TagSelector};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Attachment names start with this.
pub const FILE_PREFIX: &str = "AWS-MonthlyCostByTag";

/// The output formats a report can be rendered in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// A spreadsheet with a styled table, a subtotal formula and, optionally, a chart.
    #[default]
    Xlsx,
    /// Tab separated text.
    Tsv,
}

serde_plain::derive_display_from_serialize!(Format);
serde_plain::derive_fromstr_from_deserialize!(Format);

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Xlsx => "xlsx",
            Format::Tsv => "tsv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Format::Tsv => "text/tab-separated-values; charset=utf-8",
        }
    }
}

/// Everything needed to render a report.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub account: String,
    pub selector: TagSelector,
    pub window: ReportWindow,
    pub rows: CostRows,
}

impl Report {
    pub fn subtotal(&self) -> Amount {
        self.rows.subtotal()
    }

    /// The name used in the subject line and the attachment name.
    pub fn tag_display(&self) -> String {
        self.selector.display()
    }

    /// `AWS-MonthlyCostByTag-<tag display>.<ext>` with spaces replaced by underscores.
    pub fn file_name(&self, format: Format) -> String {
        format!("{FILE_PREFIX}-{}.{}", self.tag_display(), format.extension()).replace(' ', "_")
    }

    /// Renders the report. `show_chart` is ignored by formats that cannot hold a chart.
    pub fn render(&self, format: Format, show_chart: bool) -> Result<Document> {
        let bytes = match format {
            Format::Tsv => tsv::render(&self.rows)?,
            Format::Xlsx => xlsx::render(&self.rows, show_chart)?,
        };
        Ok(Document {
            file_name: self.file_name(format),
            format,
            bytes,
        })
    }
}

/// A rendered report, ready to be attached or written to disk.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Document {
    file_name: String,
    format: Format,
    bytes: Vec<u8>,
}

impl Document {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::sample_report;

    #[test]
    fn test_file_name_replaces_spaces() {
        let report = sample_report();
        assert_eq!(report.tag_display(), "All Team");
        assert_eq!(
            report.file_name(Format::Xlsx),
            "AWS-MonthlyCostByTag-All_Team.xlsx"
        );
        assert_eq!(
            report.file_name(Format::Tsv),
            "AWS-MonthlyCostByTag-All_Team.tsv"
        );
    }

    #[test]
    fn test_format_strings() {
        assert_eq!(Format::Tsv.to_string(), "tsv");
        assert_eq!("xlsx".parse::<Format>().unwrap(), Format::Xlsx);
        assert_eq!(Format::default(), Format::Xlsx);
    }

    #[test]
    fn test_render_names_document() {
        let document = sample_report().render(Format::Tsv, true).unwrap();
        assert_eq!(document.format(), Format::Tsv);
        assert_eq!(document.file_name(), "AWS-MonthlyCostByTag-All_Team.tsv");
        assert!(!document.bytes().is_empty());
    }
}
