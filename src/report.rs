//! Report output: timestamped spreadsheet plus a console table

use crate::error::{ReportError, Result};
use crate::types::PriceRecord;
use chrono::{Datelike, NaiveDateTime};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Column headers, in output order
pub const COLUMNS: [&str; 6] = [
    "Ticker",
    "Closing Price (Original Currency)",
    "Original Currency",
    "Exchange Rate (to USD)",
    "Closing Price (USD)",
    "Date",
];

const FILE_PREFIX: &str = "stock_prices";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "xlsx" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(ReportError::ParseError(format!(
                "Unknown output format: {}",
                other
            ))),
        }
    }
}

/// `stock_prices_YYYY-MM-DD_HH-MM-SS.<ext>`
pub fn report_filename(timestamp: NaiveDateTime, format: OutputFormat) -> String {
    format!(
        "{}_{}.{}",
        FILE_PREFIX,
        timestamp.format("%Y-%m-%d_%H-%M-%S"),
        format.extension()
    )
}

/// CSV row with the spreadsheet's column names
#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Ticker")]
    ticker: &'a str,
    #[serde(rename = "Closing Price (Original Currency)")]
    close_local: Option<f64>,
    #[serde(rename = "Original Currency")]
    currency: Option<&'static str>,
    #[serde(rename = "Exchange Rate (to USD)")]
    fx_rate: Option<f64>,
    #[serde(rename = "Closing Price (USD)")]
    close_usd: Option<f64>,
    #[serde(rename = "Date")]
    date: Option<String>,
}

impl<'a> From<&'a PriceRecord> for CsvRow<'a> {
    fn from(record: &'a PriceRecord) -> Self {
        Self {
            ticker: &record.ticker,
            close_local: record.close_local,
            currency: record.currency.map(|c| c.code()),
            fx_rate: record.fx_rate,
            close_usd: record.close_usd,
            date: record.date.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Writes batch results to the output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    format: OutputFormat,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write `records` to a new timestamped file and return its path
    pub fn write(&self, records: &[PriceRecord], timestamp: NaiveDateTime) -> Result<PathBuf> {
        let path = self
            .output_dir
            .join(report_filename(timestamp, self.format));

        match self.format {
            OutputFormat::Xlsx => write_xlsx(&path, records)?,
            OutputFormat::Csv => write_csv(&path, records)?,
            OutputFormat::Json => write_json(&path, records)?,
        }

        log::info!("Wrote {} rows to {}", records.len(), path.display());
        Ok(path)
    }

    /// Write the file, then echo its name and the table to stdout
    pub fn publish(&self, records: &[PriceRecord], timestamp: NaiveDateTime) -> Result<PathBuf> {
        let path = self.write(records, timestamp)?;
        println!("Stock prices saved to {}", path.display());
        println!();
        print!("{}", render_table(records));
        Ok(path)
    }
}

fn write_xlsx(path: &Path, records: &[PriceRecord]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let sheet = workbook.add_worksheet();
    sheet.set_name("Stock Prices")?;

    for (col, name) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *name, &header)?;
        sheet.set_column_width(col, if col == 0 { 12 } else { 22 })?;
    }

    // Missing values stay as blank cells
    for (idx, record) in records.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, &record.ticker)?;
        if let Some(close) = record.close_local {
            sheet.write_number(row, 1, close)?;
        }
        if let Some(currency) = record.currency {
            sheet.write_string(row, 2, currency.code())?;
        }
        if let Some(rate) = record.fx_rate {
            sheet.write_number(row, 3, rate)?;
        }
        if let Some(usd) = record.close_usd {
            sheet.write_number(row, 4, usd)?;
        }
        if let Some(date) = record.date {
            let excel_date =
                ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)?;
            sheet.write_datetime_with_format(row, 5, &excel_date, &date_format)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_csv(path: &Path, records: &[PriceRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(path: &Path, records: &[PriceRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    Ok(())
}

fn cell(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "None".to_string(),
    }
}

/// Plain-text table of the records, one line per row
pub fn render_table(records: &[PriceRecord]) -> String {
    let rows: Vec<[String; 6]> = records
        .iter()
        .map(|r| {
            [
                r.ticker.clone(),
                cell(r.close_local, 4),
                r.currency
                    .map(|c| c.code().to_string())
                    .unwrap_or_else(|| "None".to_string()),
                cell(r.fx_rate, 4),
                cell(r.close_usd, 4),
                r.date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "None".to_string()),
            ]
        })
        .collect();

    let mut widths: [usize; 6] = COLUMNS.map(str::len);
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(value.len());
        }
    }
    let index_width = records.len().saturating_sub(1).to_string().len();

    let mut out = String::new();
    let _ = write!(out, "{:>w$}", "", w = index_width);
    for (name, width) in COLUMNS.iter().zip(widths.iter()) {
        let _ = write!(out, "  {:>w$}", name, w = width);
    }
    out.push('\n');

    for (idx, row) in rows.iter().enumerate() {
        let _ = write!(out, "{:>w$}", idx, w = index_width);
        for (value, width) in row.iter().zip(widths.iter()) {
            let _ = write!(out, "  {:>w$}", value, w = width);
        }
        out.push('\n');
    }
    out
}
