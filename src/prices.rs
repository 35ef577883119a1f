use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};

use crate::{prelude::*, quantity::rate::KilowattHourRate};

/// Hourly prices of a sample day with a morning trough and an evening peak.
pub const REFERENCE_DAY: [f64; 24] = [
    20.0, 18.0, 15.0, 14.0, 13.0, 12.0, 14.0, 18.0, 25.0, 30.0, 35.0, 40.0, 38.0, 36.0, 34.0, 32.0,
    30.0, 28.0, 26.0, 24.0, 22.0, 21.0, 20.0, 19.0,
];

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Where the price series comes from.
pub enum PriceSource {
    Inline(Vec<f64>),

    /// Workbook or delimited text file: every cell that reads as a number is the next price.
    File { path: PathBuf, delimiter: u8 },
}

impl PriceSource {
    pub fn read(&self) -> Result<Vec<KilowattHourRate>> {
        let prices = match self {
            Self::Inline(prices) => prices.clone(),
            Self::File { path, delimiter } => {
                if is_workbook(path) {
                    read_workbook(path)?
                } else {
                    read_delimited(path, *delimiter)?
                }
            }
        };
        if let Some((index, price)) = prices.iter().enumerate().find(|(_, price)| !price.is_finite())
        {
            bail!("price #{index} is not a finite number: {price}");
        }
        info!(n_prices = prices.len(), "Read the prices");
        Ok(prices.into_iter().map(KilowattHourRate).collect())
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension().and_then(|extension| extension.to_str()).is_some_and(|extension| {
        WORKBOOK_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(extension))
    })
}

/// Scan the first worksheet row by row.
#[instrument(skip_all, fields(path = %path.display()))]
fn read_workbook(path: &Path) -> Result<Vec<f64>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open the workbook `{}`", path.display()))?;
    let Some(range) = workbook.worksheet_range_at(0) else {
        warn!("The workbook has no worksheets");
        return Ok(Vec::new());
    };
    let range = range.context("failed to read the first worksheet")?;
    let prices: Vec<f64> = range.rows().flatten().filter_map(parse_cell).collect();
    debug!(n_prices = prices.len(), "Scanned the worksheet");
    Ok(prices)
}

#[instrument(skip_all, fields(path = %path.display()))]
fn read_delimited(path: &Path, delimiter: u8) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("failed to open `{}`", path.display()))?;
    let mut prices = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to read a record")?;
        prices.extend(record.iter().filter_map(parse_text));
    }
    debug!(n_prices = prices.len(), "Scanned the file");
    Ok(prices)
}

#[expect(clippy::cast_precision_loss)]
fn parse_cell(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(value) => Some(*value),
        Data::Int(value) => Some(*value as f64),
        Data::String(text) => parse_text(text),
        _ => None,
    }
}

/// Parse a number that may be written with a decimal comma.
fn parse_text(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.replace(',', ".").parse().ok()
}
