//! CSV price file reader.
//!
//! Expected layout is `Date,Open,High,Low,Close,Volume` with a header row.
//! Header names match case-insensitively and extra columns (`Adj Close`,
//! dividends, ...) are ignored. Dates may carry a time-of-day suffix
//! (`2024-01-02 00:00:00-05:00`), which is dropped. Rows with unparseable
//! dates and weekend rows are discarded. Empty or malformed price cells become
//! NaN; volume is read as an integer, truncating any decimal text.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::DataError;
use crate::domain::{is_weekday, Bar, ColumnSet, TimeSeries};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse the date part of a timestamp cell.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let date_part = cell
        .trim()
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or("");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn parse_price(cell: Option<&str>) -> f64 {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn parse_volume(cell: Option<&str>) -> u64 {
    let Some(text) = cell.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };
    text.parse::<u64>().unwrap_or_else(|_| match text.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v.trunc() as u64,
        _ => 0,
    })
}

/// Column positions resolved from the header row.
#[derive(Debug, Default)]
struct Layout {
    date: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut layout = Layout::default();
        for (i, name) in headers.iter().enumerate() {
            let slot = match name.trim().to_ascii_lowercase().as_str() {
                "date" | "datetime" | "timestamp" => &mut layout.date,
                "open" => &mut layout.open,
                "high" => &mut layout.high,
                "low" => &mut layout.low,
                "close" => &mut layout.close,
                "volume" => &mut layout.volume,
                _ => continue,
            };
            slot.get_or_insert(i);
        }
        layout
    }

    fn columns(&self) -> ColumnSet {
        ColumnSet {
            open: self.open.is_some(),
            high: self.high.is_some(),
            low: self.low.is_some(),
            close: self.close.is_some(),
            volume: self.volume.is_some(),
        }
    }
}

/// Read one ticker's price file.
pub fn read_series_csv(path: &Path, symbol: &str) -> Result<TimeSeries, DataError> {
    if !path.exists() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_series_from(file, path, symbol)
}

/// Read a price table from any reader; `origin` is only used in errors.
pub fn read_series_from<R: Read>(
    reader: R,
    origin: &Path,
    symbol: &str,
) -> Result<TimeSeries, DataError> {
    let csv_err = |source: csv::Error| DataError::Csv {
        path: PathBuf::from(origin),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let layout = Layout::from_headers(rdr.headers().map_err(csv_err)?);
    let date_col = layout.date.ok_or_else(|| DataError::MissingColumn {
        path: origin.to_path_buf(),
        column: "Date",
    })?;

    let mut bars = Vec::new();
    let mut dropped = 0usize;
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let Some(date) = record.get(date_col).and_then(parse_date) else {
            dropped += 1;
            continue;
        };
        if !is_weekday(date) {
            dropped += 1;
            continue;
        }
        let cell = |col: Option<usize>| col.and_then(|i| record.get(i));
        bars.push(Bar {
            date,
            open: parse_price(cell(layout.open)),
            high: parse_price(cell(layout.high)),
            low: parse_price(cell(layout.low)),
            close: parse_price(cell(layout.close)),
            volume: parse_volume(cell(layout.volume)),
        });
    }

    tracing::debug!(
        symbol,
        rows = bars.len(),
        dropped,
        path = %origin.display(),
        "read price file"
    );
    Ok(TimeSeries::new(symbol, bars, layout.columns()))
}

/// Write a series as `Date,Open,High,Low,Close,Volume`. Missing prices are
/// written as empty cells. Parent directories are created.
pub fn write_series_csv(path: &Path, series: &TimeSeries) -> Result<(), DataError> {
    let io_err = |source: std::io::Error| DataError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source: csv::Error| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let price = |v: f64| if v.is_nan() { String::new() } else { format!("{v:.4}") };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    wtr.write_record(["Date", "Open", "High", "Low", "Close", "Volume"])
        .map_err(csv_err)?;
    for bar in series.bars() {
        wtr.write_record([
            bar.date.format("%Y-%m-%d").to_string(),
            price(bar.open),
            price(bar.high),
            price(bar.low),
            price(bar.close),
            bar.volume.to_string(),
        ])
        .map_err(csv_err)?;
    }
    wtr.flush().map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> TimeSeries {
        read_series_from(text.as_bytes(), Path::new("mem.csv"), "TEST").unwrap()
    }

    #[test]
    fn strips_time_suffix() {
        assert_eq!(
            parse_date("2024-03-05 00:00:00-05:00"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(
            parse_date("2024-03-05T16:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn volume_parsing() {
        assert_eq!(parse_volume(Some("1200")), 1200);
        assert_eq!(parse_volume(Some("1200.9")), 1200);
        assert_eq!(parse_volume(Some("")), 0);
        assert_eq!(parse_volume(Some("-5")), 0);
        assert_eq!(parse_volume(None), 0);
    }

    #[test]
    fn headers_match_case_insensitively() {
        let series = read(
            "date,OPEN,High,low,Adj Close,CLOSE,volume\n\
             2024-01-02,1,2,0.5,9,1.5,100\n",
        );
        assert_eq!(series.len(), 1);
        let bar = &series.bars()[0];
        assert_eq!(bar.close, 1.5);
        assert_eq!(bar.volume, 100);
        assert_eq!(series.columns(), ColumnSet::full());
    }

    #[test]
    fn weekend_and_bad_rows_are_dropped() {
        // 2024-01-06 is a Saturday.
        let series = read(
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-05,1,1,1,1,10\n\
             2024-01-06,1,1,1,1,20\n\
             garbage,1,1,1,1,30\n\
             2024-01-08,1,1,1,1,40\n",
        );
        let vols: Vec<u64> = series.bars().iter().map(|b| b.volume).collect();
        assert_eq!(vols, vec![10, 40]);
    }

    #[test]
    fn empty_price_cells_become_nan() {
        let series = read("Date,Open,High,Low,Close,Volume\n2024-01-02,1,1,1,,10\n");
        assert!(series.bars()[0].close_missing());
    }

    #[test]
    fn missing_columns_are_recorded() {
        let series = read("Date,Close\n2024-01-02,5\n2024-01-03,6\n");
        let cols = series.columns();
        assert!(cols.close);
        assert!(!cols.volume);
        assert!(!cols.open);
        assert_eq!(series.bars()[0].volume, 0);
    }

    #[test]
    fn missing_date_column_is_an_error() {
        let err = read_series_from("Close,Volume\n1,2\n".as_bytes(), Path::new("x.csv"), "X")
            .unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { column: "Date", .. }));
    }

    #[test]
    fn unsorted_rows_are_sorted() {
        let series = read(
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-04,1,1,1,1,3\n\
             2024-01-02,1,1,1,1,1\n\
             2024-01-03,1,1,1,1,2\n",
        );
        let vols: Vec<u64> = series.bars().iter().map(|b| b.volume).collect();
        assert_eq!(vols, vec![1, 2, 3]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_series_csv(Path::new("/nonexistent/hvescan/AAPL.csv"), "AAPL").unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
    }

    #[test]
    fn written_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily").join("OUT.csv");
        let mut bars = crate::domain::series::make_series(&[10, 20, 30]).bars().to_vec();
        bars[1].close = f64::NAN;
        let series = TimeSeries::from_bars("OUT", bars);

        write_series_csv(&path, &series).unwrap();
        let back = read_series_csv(&path, "OUT").unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.bars()[2].volume, 30);
        assert_eq!(back.bars()[0].close, 101.0);
        assert!(back.bars()[1].close.is_nan());
    }
}
