//! Tab separated rendering: a header line and one line per row. Amounts are written the way
//! `Amount` displays them, e.g. `$1,234.56`.

use crate::model::{CostRows, HEADERS};
use crate::Result;
use anyhow::Context;

pub(super) fn render(rows: &CostRows) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(HEADERS)
        .context("Unable to write the TSV header")?;
    for row in rows.iter() {
        let amount = row.amount.to_string();
        writer
            .write_record([
                row.account.as_str(),
                row.tag_value.as_str(),
                row.service.as_str(),
                row.month.as_str(),
                amount.as_str(),
            ])
            .with_context(|| format!("Unable to write the TSV line for {row:?}"))?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish writing the TSV document: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, CostRow};
    use crate::test::{dec, sample_rows};
    use std::str::FromStr;

    /// Splits on tabs and skips the header, the same way a person would read the file back.
    fn parse(bytes: &[u8]) -> Vec<(String, String, String, Amount)> {
        let text = std::str::from_utf8(bytes).unwrap();
        text.lines()
            .skip(1)
            .map(|line| {
                let fields: Vec<&str> = line.split('\t').collect();
                assert_eq!(fields.len(), HEADERS.len(), "{line}");
                (
                    fields[1].to_string(),
                    fields[2].to_string(),
                    fields[3].to_string(),
                    Amount::from_str(fields[4]).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_header_and_lines() {
        let bytes = render(&sample_rows()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Account\tTag\tService\tMonth\tAmount"));
        assert_eq!(
            lines.next(),
            Some("123456789012\tAlpha\tAmazon EC2\t2026-08\t$10.00")
        );
        assert_eq!(lines.count(), 3);
    }

    #[test]
    fn test_read_back_matches_rows() {
        let rows = sample_rows();
        let parsed = parse(&render(&rows).unwrap());
        let expected: Vec<(String, String, String, Amount)> = rows
            .iter()
            .map(|r| {
                (
                    r.tag_value.clone(),
                    r.service.clone(),
                    r.month.clone(),
                    Amount::new(r.amount.rounded()),
                )
            })
            .collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_thousands_and_negative() {
        let rows = CostRows::new(vec![
            CostRow {
                account: "1".into(),
                tag_value: "Alpha".into(),
                service: "Amazon EC2".into(),
                month: "2026-09".into(),
                amount: Amount::new(dec("1234567.891")),
            },
            CostRow {
                account: "1".into(),
                tag_value: "Alpha".into(),
                service: "Refund".into(),
                month: "2026-09".into(),
                amount: Amount::new(dec("-12.5")),
            },
        ]);
        let text = String::from_utf8(render(&rows).unwrap()).unwrap();
        assert!(text.contains("\t$1,234,567.89\n"), "{text}");
        assert!(text.contains("\t-$12.50\n"), "{text}");
        let parsed = parse(text.as_bytes());
        assert_eq!(parsed[0].3.value(), dec("1234567.89"));
        assert_eq!(parsed[1].3.value(), dec("-12.50"));
    }

    #[test]
    fn test_empty_rows_is_header_only() {
        let text = String::from_utf8(render(&CostRows::default()).unwrap()).unwrap();
        assert_eq!(text, "Account\tTag\tService\tMonth\tAmount\n");
        assert!(parse(text.as_bytes()).is_empty());
    }
}
