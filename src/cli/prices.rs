use std::path::PathBuf;

use clap::Parser;

use crate::{prelude::*, prices::PriceSource};

#[must_use]
#[derive(Parser)]
#[group(required = true, multiple = false)]
pub struct PriceSourceArgs {
    /// Comma-separated prices, one per step.
    #[clap(
        long,
        env = "PRICES",
        value_delimiter = ',',
        num_args = 1..,
        allow_negative_numbers = true
    )]
    pub prices: Option<Vec<f64>>,

    /// Workbook (XLSX, XLS, ODS…) or delimited text file with the prices.
    #[clap(long = "prices-file", env = "PRICES_FILE")]
    pub prices_file: Option<PathBuf>,
}

#[must_use]
#[derive(Parser)]
pub struct PriceArgs {
    #[clap(flatten)]
    pub source: PriceSourceArgs,

    /// Field delimiter of a text price file.
    #[clap(long, default_value = ",", env = "PRICES_DELIMITER")]
    pub delimiter: char,
}

impl PriceArgs {
    pub fn source(self) -> Result<PriceSource> {
        let delimiter =
            u8::try_from(self.delimiter).ok().filter(u8::is_ascii).with_context(|| {
                format!("the delimiter must be an ASCII character: `{}`", self.delimiter)
            })?;
        match (self.source.prices, self.source.prices_file) {
            (Some(prices), None) => Ok(PriceSource::Inline(prices)),
            (None, Some(path)) => Ok(PriceSource::File { path, delimiter }),
            _ => bail!("either the prices or the price file must be specified"),
        }
    }
}
