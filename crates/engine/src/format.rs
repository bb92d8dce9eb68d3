//! Presentation helpers shared by every view.
//!
//! Record dates are calendar dates without a time component, so they are
//! formatted by slicing their components. They never go through a
//! timezone-aware type, which could move them to the previous or next day.

use chrono::NaiveDate;

use crate::{EngineError, Money, ResultEngine};

/// `R$ 250.00`
pub fn format_currency(amount: Money) -> String {
    amount.to_string()
}

/// `120.5 L`
pub fn format_liters(liters: f64) -> String {
    format!("{liters:.1} L")
}

/// Turns an ISO `YYYY-MM-DD` string into `DD/MM/YYYY`.
pub fn format_date(iso_date: &str) -> ResultEngine<String> {
    let invalid = || EngineError::InvalidDate(iso_date.to_string());

    let mut parts = iso_date.trim().split('-');
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return Err(invalid());
    }
    if !(all_digits(year) && all_digits(month) && all_digits(day)) {
        return Err(invalid());
    }

    // Calendar check only, the output is built from the original slices.
    let y: i32 = year.parse().map_err(|_| invalid())?;
    let m: u32 = month.parse().map_err(|_| invalid())?;
    let d: u32 = day.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid)?;

    Ok(format!("{day}/{month}/{year}"))
}

/// `DD/MM/YYYY` for an already parsed record date.
pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `DD/MM` axis label for a single day.
pub fn format_day_label(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

/// Short chart axis label: `DD/MM` for a day key, `MM/YYYY` for a month key.
///
/// Labels that are neither are returned unchanged.
pub fn format_bucket_label(key: &str) -> String {
    let parts: Vec<&str> = key.split('-').collect();
    match parts.as_slice() {
        [_, month, day] => format!("{day}/{month}"),
        [year, month] => format!("{month}/{year}"),
        _ => key.to_string(),
    }
}
