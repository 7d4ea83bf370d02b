//! Daily bar files: one headerless CSV per symbol.
//!
//! Column layout is fixed:
//! `datetime, open, high, low, close, adj_close, volume`
//! with datetimes like `2023-01-03 00:00:00-0500`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate};

use super::DataError;
use crate::domain::Bar;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";
const DATETIME_COLON_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";
const DATE_FORMAT: &str = "%Y-%m-%d";
const COLUMN_COUNT: usize = 7;

/// Inclusive calendar-date bounds for a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Load `<data_dir>/<symbol>.csv`, keeping bars inside `range`.
pub fn load_symbol_feed(
    data_dir: &Path,
    symbol: &str,
    range: DateRange,
) -> Result<Vec<Bar>, DataError> {
    let path = data_dir.join(format!("{symbol}.csv"));
    let file = File::open(&path).map_err(|source| DataError::Open {
        path: path.clone(),
        source,
    })?;
    parse_bars(file, symbol, range, &path.display().to_string())
}

/// Parse headerless bar rows from any reader.
///
/// Rows outside `range` are dropped; the result is sorted by date.
pub fn parse_bars<R: Read>(
    reader: R,
    symbol: &str,
    range: DateRange,
    source_name: &str,
) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (index, record) in rdr.records().enumerate() {
        let record = record.map_err(|source| DataError::Csv {
            source_name: source_name.to_string(),
            source,
        })?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);
        let malformed = |reason: String| DataError::Malformed {
            source_name: source_name.to_string(),
            line,
            reason,
        };

        if record.len() < COLUMN_COUNT {
            return Err(malformed(format!(
                "expected {COLUMN_COUNT} columns, found {}",
                record.len()
            )));
        }

        let date = parse_date(&record[0])
            .ok_or_else(|| malformed(format!("unparseable datetime '{}'", &record[0])))?;
        if !range.contains(date) {
            continue;
        }

        let field = |idx: usize, name: &str| -> Result<f64, DataError> {
            record[idx]
                .parse::<f64>()
                .map_err(|_| malformed(format!("invalid {name} '{}'", &record[idx])))
        };

        bars.push(Bar {
            symbol: symbol.to_string(),
            date,
            open: field(1, "open")?,
            high: field(2, "high")?,
            low: field(3, "low")?,
            close: field(4, "close")?,
            adj_close: field(5, "adj_close")?,
            volume: field(6, "volume")?,
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Calendar date of a bar timestamp, in the timestamp's own offset.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_str(raw, DATETIME_FORMAT)
        .or_else(|_| DateTime::parse_from_str(raw, DATETIME_COLON_FORMAT))
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn full_range() -> DateRange {
        DateRange::new(d("2000-01-01"), d("2100-01-01"))
    }

    #[test]
    fn parses_offset_timestamps() {
        let csv = "2023-01-03 00:00:00-0500,130.28,130.90,124.17,125.07,124.2,112117500\n";
        let bars = parse_bars(csv.as_bytes(), "AAPL", full_range(), "test").unwrap();
        assert_eq!(bars.len(), 1);
        let bar = &bars[0];
        assert_eq!(bar.symbol, "AAPL");
        assert_eq!(bar.date, d("2023-01-03"));
        assert_eq!(bar.open, 130.28);
        assert_eq!(bar.close, 125.07);
        assert_eq!(bar.adj_close, 124.2);
        assert_eq!(bar.volume, 112_117_500.0);
    }

    #[test]
    fn accepts_colon_offsets_and_plain_dates() {
        let csv = "2023-01-03 00:00:00-05:00,1,2,0.5,1.5,1.5,10\n2023-01-04,1,2,0.5,1.6,1.6,10\n";
        let bars = parse_bars(csv.as_bytes(), "X", full_range(), "test").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].date, d("2023-01-04"));
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let csv = "\
2023-01-02 00:00:00+0000,1,1,1,1,1,1
2023-01-03 00:00:00+0000,1,1,1,2,2,1
2023-01-04 00:00:00+0000,1,1,1,3,3,1
2023-01-05 00:00:00+0000,1,1,1,4,4,1
";
        let range = DateRange::new(d("2023-01-03"), d("2023-01-04"));
        let bars = parse_bars(csv.as_bytes(), "X", range, "test").unwrap();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![2.0, 3.0]);
    }

    #[test]
    fn rows_are_sorted_by_date() {
        let csv = "2023-01-04,1,1,1,3,3,1\n2023-01-03,1,1,1,2,2,1\n";
        let bars = parse_bars(csv.as_bytes(), "X", full_range(), "test").unwrap();
        assert_eq!(bars[0].date, d("2023-01-03"));
        assert_eq!(bars[1].date, d("2023-01-04"));
    }

    #[test]
    fn short_row_reports_line() {
        let csv = "2023-01-03,1,1,1,2,2,1\n2023-01-04,1,1\n";
        let err = parse_bars(csv.as_bytes(), "X", full_range(), "X.csv").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("X.csv"), "{msg}");
        assert!(msg.contains("line 2"), "{msg}");
    }

    #[test]
    fn bad_number_is_malformed() {
        let csv = "2023-01-03,1,1,1,abc,2,1\n";
        let err = parse_bars(csv.as_bytes(), "X", full_range(), "test").unwrap_err();
        assert!(matches!(err, DataError::Malformed { .. }));
        assert!(err.to_string().contains("close"));
    }

    #[test]
    fn bad_datetime_is_malformed() {
        let csv = "yesterday,1,1,1,1,1,1\n";
        let err = parse_bars(csv.as_bytes(), "X", full_range(), "test").unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_symbol_feed(dir.path(), "NOPE", full_range()).unwrap_err();
        assert!(matches!(err, DataError::Open { .. }));
        assert!(err.to_string().contains("NOPE.csv"));
    }

    #[test]
    fn loads_symbol_file_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("SPY.csv"),
            "2024-01-02 00:00:00-0500,470,475,468,472,472,1000\n",
        )
        .unwrap();
        let bars = load_symbol_feed(dir.path(), "SPY", full_range()).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].symbol, "SPY");
    }
}
