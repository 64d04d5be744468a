//! Bar granularity of a series.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timeframe of a series. Unknown names are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
    Intraday,
    Other(String),
}

impl Timeframe {
    /// Minimum number of bars a series needs before it is worth screening.
    pub fn min_bars(&self) -> usize {
        match self {
            Timeframe::Daily => 252,
            Timeframe::Weekly => 52,
            Timeframe::Monthly => 12,
            Timeframe::Intraday => 100,
            Timeframe::Other(_) => 50,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
            Timeframe::Monthly => "monthly",
            Timeframe::Intraday => "intraday",
            Timeframe::Other(name) => name,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Timeframe {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Timeframe::Daily,
            "weekly" => Timeframe::Weekly,
            "monthly" => Timeframe::Monthly,
            "intraday" => Timeframe::Intraday,
            _ => Timeframe::Other(s),
        }
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.as_str().to_string()
    }
}

impl FromStr for Timeframe {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Timeframe::from(s.to_string()))
    }
}
