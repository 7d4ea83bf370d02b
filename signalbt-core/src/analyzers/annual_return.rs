//! Calendar-year returns, value to value.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value};

use super::{number, Analyzer};

/// Each year's return is measured from the previous year's last value
/// (the starting value for the first year) to the year's last value.
#[derive(Debug, Clone, Default)]
pub struct AnnualReturn {
    start: f64,
    year_end: BTreeMap<i32, f64>,
}

impl AnnualReturn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returns(&self) -> BTreeMap<i32, f64> {
        let mut prev = self.start;
        self.year_end
            .iter()
            .map(|(&year, &value)| {
                let r = if prev != 0.0 { value / prev - 1.0 } else { 0.0 };
                prev = value;
                (year, r)
            })
            .collect()
    }
}

impl Analyzer for AnnualReturn {
    fn start(&mut self, starting_value: f64) {
        self.start = starting_value;
    }

    fn on_bar(&mut self, date: NaiveDate, value: f64) {
        self.year_end.insert(date.year(), value);
    }

    fn analysis(&self) -> Value {
        let map: Map<String, Value> = self
            .returns()
            .into_iter()
            .map(|(year, r)| (year.to_string(), number(r)))
            .collect();
        Value::Object(map)
    }
}
