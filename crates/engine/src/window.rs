//! Date windows and bucket granularity.
//!
//! A [`Window`] bounds the records that enter an aggregation. Filtering is
//! always applied before aggregating: the aggregator never looks at dates to
//! decide what to include.

use std::{fmt, str::FromStr};

use api_types::{Record, RecordFilter};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Inclusive calendar date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    from: NaiveDate,
    to: NaiveDate,
}

impl Window {
    pub fn new(from: NaiveDate, to: NaiveDate) -> ResultEngine<Self> {
        if from > to {
            return Err(EngineError::InvalidRange(format!(
                "window start {from} is after its end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// The `days` days ending on `today`, both ends included.
    ///
    /// A zero-day request yields the single day `today`.
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        let back = u64::from(days.max(1) - 1);
        let from = today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }

    pub fn start(&self) -> NaiveDate {
        self.from
    }

    pub fn end(&self) -> NaiveDate {
        self.to
    }

    /// Number of calendar days covered. Used as the averaging divisor.
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// The store-side filter matching this window.
    pub fn filter(&self) -> RecordFilter {
        RecordFilter {
            date_from: Some(self.from),
            date_to: Some(self.to),
        }
    }

    /// Keeps only the records dated inside the window.
    pub fn select<R: Record>(&self, records: &[R]) -> Vec<R> {
        records
            .iter()
            .filter(|record| self.contains(record.date()))
            .cloned()
            .collect()
    }
}

/// Report periods offered to the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl Period {
    pub fn days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Week => "Semana",
            Self::Month => "Mês",
            Self::Quarter => "Trimestre",
            Self::Year => "Ano",
        }
    }

    pub fn window(self, today: NaiveDate) -> Window {
        Window::trailing(today, self.days())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        };
        f.write_str(name)
    }
}

/// Time bucket size for series.
///
/// Keys are ISO strings (`YYYY-MM-DD`, `YYYY-MM`), so their lexicographic
/// order is also their chronological order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Month,
}

impl Granularity {
    pub fn key(self, date: NaiveDate) -> String {
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Month => date.format("%Y-%m").to_string(),
        }
    }
}
