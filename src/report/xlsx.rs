//! Spreadsheet rendering.
//!
//! Layout of `Sheet1`:
//! - Row 1: the headers, row 2 onward: one row per cost row. Both are covered by a table named
//!   `CostReport` with banded rows.
//! - The row after the table: a `SUBTOTAL` formula over exactly the data rows of the Amount
//!   column.
//! - Optionally a column chart at H2 with Month as categories and Amount as values, again over
//!   exactly the data rows.
//!
//! With no rows there is nothing to put in a table or chart, so only the headers and a zero
//! subtotal are written.

use crate::model::{CostRows, HEADERS};
use crate::Result;
use anyhow::Context;
use rust_xlsxwriter::{
    Chart, ChartType, ColNum, Format, Formula, RowNum, Table, TableColumn, TableStyle, Workbook,
    XlsxError,
};

const SHEET_NAME: &str = "Sheet1";
const TABLE_NAME: &str = "CostReport";
const AMOUNT_FORMAT: &str = "#,##0.00";
const CHART_TITLE: &str = "AWS Charges by Month";

const ACCOUNT_COL: ColNum = 0;
const TAG_COL: ColNum = 1;
const SERVICE_COL: ColNum = 2;
const MONTH_COL: ColNum = 3;
const AMOUNT_COL: ColNum = 4;
const AMOUNT_COL_LETTER: &str = "E";

// H2
const CHART_ROW: RowNum = 1;
const CHART_COL: ColNum = 7;

pub(super) fn render(rows: &CostRows, show_chart: bool) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    write_sheet(&mut workbook, rows, show_chart).context("Unable to build the spreadsheet")?;
    workbook
        .save_to_buffer()
        .context("Unable to save the spreadsheet")
}

fn write_sheet(
    workbook: &mut Workbook,
    rows: &CostRows,
    show_chart: bool,
) -> std::result::Result<(), XlsxError> {
    let amount_format = Format::new().set_num_format(AMOUNT_FORMAT);
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let data = data_rows(rows.len());
    match data {
        Some((_, last)) => {
            let columns: Vec<TableColumn> = HEADERS
                .iter()
                .map(|header| TableColumn::new().set_header(*header))
                .collect();
            let table = Table::new()
                .set_name(TABLE_NAME)
                .set_style(TableStyle::Medium9)
                .set_banded_rows(true)
                .set_columns(&columns);
            worksheet.add_table(0, ACCOUNT_COL, last, AMOUNT_COL, &table)?;
        }
        None => {
            let bold = Format::new().set_bold();
            for (col, header) in (0..).zip(HEADERS) {
                worksheet.write_string_with_format(0, col, header, &bold)?;
            }
        }
    }

    for (row_num, row) in (1..).zip(rows.iter()) {
        worksheet.write_string(row_num, ACCOUNT_COL, &row.account)?;
        worksheet.write_string(row_num, TAG_COL, &row.tag_value)?;
        worksheet.write_string(row_num, SERVICE_COL, &row.service)?;
        worksheet.write_string(row_num, MONTH_COL, &row.month)?;
        worksheet.write_number_with_format(
            row_num,
            AMOUNT_COL,
            row.amount.to_f64(),
            &amount_format,
        )?;
    }

    let subtotal_row = subtotal_row(rows.len());
    match data {
        Some((first, last)) => {
            let formula = Formula::new(subtotal_formula(first, last))
                .set_result(rows.subtotal().rounded().to_string());
            worksheet.write_formula_with_format(
                subtotal_row,
                AMOUNT_COL,
                formula,
                &amount_format,
            )?;
        }
        None => {
            worksheet.write_number_with_format(subtotal_row, AMOUNT_COL, 0.0, &amount_format)?;
        }
    }

    if let (true, Some((first, last))) = (show_chart, data) {
        let mut chart = Chart::new(ChartType::Column);
        chart.set_style(10);
        chart.title().set_name(CHART_TITLE);
        chart.x_axis().set_name("Month");
        chart.y_axis().set_name("AWS Charges");
        chart
            .add_series()
            .set_name((SHEET_NAME, 0, AMOUNT_COL))
            .set_categories((SHEET_NAME, first, MONTH_COL, last, MONTH_COL))
            .set_values((SHEET_NAME, first, AMOUNT_COL, last, AMOUNT_COL));
        worksheet.insert_chart(CHART_ROW, CHART_COL, &chart)?;
    }

    worksheet.autofit();
    Ok(())
}

/// The zero-based first and last sheet rows holding data, if there are any.
fn data_rows(count: usize) -> Option<(RowNum, RowNum)> {
    match RowNum::try_from(count) {
        Ok(0) | Err(_) => None,
        Ok(n) => Some((1, n)),
    }
}

/// The zero-based row the subtotal goes in: right after the header and the data.
fn subtotal_row(count: usize) -> RowNum {
    RowNum::try_from(count).map_or(RowNum::MAX, |n| n.saturating_add(1))
}

/// `SUBTOTAL(109, ...)` sums the visible cells so that filtering the table updates it.
fn subtotal_formula(first: RowNum, last: RowNum) -> String {
    format!(
        "=SUBTOTAL(109,{col}{}:{col}{})",
        first + 1,
        last + 1,
        col = AMOUNT_COL_LETTER
    )
}
