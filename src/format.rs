//! Locale-aware presentation of prices and dates
//!
//! Mirrors what a browser's `toLocaleString` / `toLocaleDateString` produce
//! for the two locales the UI supports.

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

/// Fraction digits kept when rendering a price
const MAX_FRACTION_DIGITS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// Indian grouping (12,34,567) and day/month/year dates
    #[default]
    EnIn,
    /// Thousands grouping (1,234,567) and month/day/year dates
    EnUs,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "en-in" => Ok(Locale::EnIn),
            "en-us" => Ok(Locale::EnUs),
            other => Err(format!("Unsupported locale: {} (expected en-IN or en-US)", other)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::EnIn => write!(f, "en-IN"),
            Locale::EnUs => write!(f, "en-US"),
        }
    }
}

/// How prices are rendered: currency symbol plus locale grouping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFormat {
    pub locale: Locale,
    pub currency_symbol: String,
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self {
            locale: Locale::EnIn,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl PriceFormat {
    pub fn format(&self, price: f64) -> String {
        format!("{}{}", self.currency_symbol, group_number(price, self.locale))
    }
}

/// Group the integer part of `value` per locale, keeping up to three
/// fraction digits with trailing zeros dropped.
pub fn group_number(value: f64, locale: Locale) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // Integer digits come from the float itself, not a fixed-width integer
    let scale = 10u32.pow(MAX_FRACTION_DIGITS) as f64;
    let abs = value.abs();
    let mut integer = abs.trunc();
    let mut fraction = ((abs - integer) * scale).round();
    if fraction >= scale {
        integer += 1.0;
        fraction = 0.0;
    }
    let fraction = fraction as u32;

    let digits = format!("{:.0}", integer);
    let grouped = match locale {
        Locale::EnIn => group_indian(&digits),
        Locale::EnUs => group_by(&digits, 3),
    };

    let mut out = String::new();
    if value < 0.0 && (integer > 0.0 || fraction > 0) {
        out.push('-');
    }
    out.push_str(&grouped);
    if fraction > 0 {
        let frac = format!("{:0width$}", fraction, width = MAX_FRACTION_DIGITS as usize);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}

fn group_by(digits: &str, size: usize) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / size);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % size == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    format!("{},{}", group_by(head, 2), tail)
}

/// Short numeric date for the locale
pub fn format_short_date(date: NaiveDate, locale: Locale) -> String {
    match locale {
        Locale::EnIn => format!("{}/{}/{}", date.day(), date.month(), date.year()),
        Locale::EnUs => format!("{}/{}/{}", date.month(), date.day(), date.year()),
    }
}

/// Short date of a backend timestamp in the local time zone
pub fn format_timestamp(timestamp: &DateTime<Utc>, locale: Locale) -> String {
    format_short_date(timestamp.with_timezone(&Local).date_naive(), locale)
}
