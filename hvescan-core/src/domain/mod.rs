//! Domain types for HVEScan

pub mod bar;
pub mod series;
pub mod timeframe;

pub use bar::Bar;
pub use series::{ColumnSet, TimeSeries};
pub use timeframe::Timeframe;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Ticker symbol.
pub type Symbol = String;

/// True for Monday through Friday.
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first `count` weekdays on or after `start`.
pub fn weekdays_from(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut current = start;
    while dates.len() < count {
        if is_weekday(current) {
            dates.push(current);
        }
        current += Duration::days(1);
    }
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekdays_skip_weekends() {
        // 2024-01-05 is a Friday.
        let start = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let dates = weekdays_from(start, 3);
        assert_eq!(dates[0], start);
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
    }
}
