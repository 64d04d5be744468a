//! Ticker universe: the list of symbols a screening run covers.
//!
//! Two file shapes are accepted. TOML carries a flat `tickers` list and/or
//! named groups:
//!
//! ```toml
//! tickers = ["SPY", "QQQ"]
//!
//! [groups]
//! tech = ["AAPL", "MSFT"]
//! ```
//!
//! CSV carries one ticker per row under a `ticker` or `symbol` header (the
//! first column is used when neither is present).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use super::DataError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    #[serde(default)]
    pub tickers: Vec<String>,
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
}

impl Universe {
    pub fn from_tickers<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tickers: tickers.into_iter().map(Into::into).collect(),
            groups: BTreeMap::new(),
        }
    }

    /// Load by extension: `.toml` is parsed as TOML, anything else as CSV.
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            let content = std::fs::read_to_string(path).map_err(|source| DataError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml(&content)
        } else {
            Self::from_csv_path(path)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, DataError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, DataError> {
        let csv_err = |source: csv::Error| DataError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;

        let col = rdr
            .headers()
            .map_err(csv_err)?
            .iter()
            .position(|h| h.eq_ignore_ascii_case("ticker") || h.eq_ignore_ascii_case("symbol"))
            .unwrap_or(0);

        let mut tickers = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(csv_err)?;
            if let Some(t) = record.get(col).filter(|t| !t.is_empty()) {
                tickers.push(t.to_string());
            }
        }
        Ok(Self::from_tickers(tickers))
    }

    /// All tickers, upper-cased, first occurrence order, duplicates removed.
    /// The flat list comes first, then groups in name order.
    pub fn all_tickers(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tickers
            .iter()
            .chain(self.groups.values().flatten())
            .map(|t| t.trim().to_ascii_uppercase())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect()
    }

    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.all_tickers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
