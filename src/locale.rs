// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Fixed-locale formatting of numbers, amounts and dates.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Formatting conventions used for all numbers and dates in a report.
///
/// The defaults follow the Spanish-speaking convention of the reports: `$1.234,50` and
/// `31/12/2024`.
///
/// # Example
///
/// ```
/// let locale = rxreport::locale::LocaleFormat::default();
/// assert_eq!(locale.format_currency(1234.5), "$1.234,50");
/// assert_eq!(locale.format_number(0.26, 1), "0,3");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleFormat {
    /// The currency symbol that is prepended to amounts.
    pub currency_symbol: String,
    /// The decimal separator.
    pub decimal_separator: char,
    /// The separator between groups of thousands.
    pub thousands_separator: char,
    /// The `chrono` format string for dates.
    pub date_format: String,
    /// The `chrono` format string for timestamps.
    pub datetime_format: String,
}

impl Default for LocaleFormat {
    fn default() -> LocaleFormat {
        LocaleFormat {
            currency_symbol: "$".to_owned(),
            decimal_separator: ',',
            thousands_separator: '.',
            date_format: "%d/%m/%Y".to_owned(),
            datetime_format: "%d/%m/%Y %H:%M".to_owned(),
        }
    }
}

impl LocaleFormat {
    /// Formats the given number with the given number of decimals and grouped thousands.
    pub fn format_number(&self, value: f64, decimals: usize) -> String {
        let value = if value.is_finite() { value } else { 0.0 };
        let formatted = format!("{:.*}", decimals, value.abs());
        let (int_part, frac_part) = match formatted.find('.') {
            Some(idx) => (&formatted[..idx], Some(&formatted[idx + 1..])),
            None => (formatted.as_str(), None),
        };

        let mut grouped = String::with_capacity(formatted.len() + formatted.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(c);
        }
        if let Some(frac_part) = frac_part {
            grouped.push(self.decimal_separator);
            grouped.push_str(frac_part);
        }

        let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
        if value < 0.0 && !is_zero {
            format!("-{}", grouped)
        } else {
            grouped
        }
    }

    /// Formats the given integer with grouped thousands.
    pub fn format_integer(&self, value: u64) -> String {
        self.format_number(value as f64, 0)
    }

    /// Formats the given amount with two decimals and the currency symbol.
    pub fn format_currency(&self, value: f64) -> String {
        let number = self.format_number(value.abs(), 2);
        if value < 0.0 && number.chars().any(|c| c.is_ascii_digit() && c != '0') {
            format!("-{}{}", self.currency_symbol, number)
        } else {
            format!("{}{}", self.currency_symbol, number)
        }
    }

    /// Formats the given percentage (`12.5` → `12,5%`) with the given number of decimals.
    pub fn format_percent(&self, value: f64, decimals: usize) -> String {
        format!("{}%", self.format_number(value, decimals))
    }

    /// Formats a signed percentage (`+12,5%`, `-3,0%`) as used by trend markers.
    pub fn format_signed_percent(&self, value: f64) -> String {
        let sign = if value < 0.0 { "-" } else { "+" };
        format!("{}{}%", sign, self.format_number(value.abs(), 1))
    }

    /// Formats a value for a chart axis, using decimals only for small values.
    pub fn format_axis_value(&self, value: f64) -> String {
        if value.abs() >= 10.0 || value.fract() == 0.0 {
            self.format_number(value, 0)
        } else {
            self.format_number(value, 1)
        }
    }

    /// Formats the given date.
    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }

    /// Formats the given timestamp.
    pub fn format_datetime(&self, datetime: NaiveDateTime) -> String {
        datetime.format(&self.datetime_format).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_are_grouped() {
        let locale = LocaleFormat::default();
        assert_eq!(locale.format_number(0.0, 0), "0");
        assert_eq!(locale.format_number(999.0, 0), "999");
        assert_eq!(locale.format_number(1000.0, 0), "1.000");
        assert_eq!(locale.format_number(1234567.891, 2), "1.234.567,89");
        assert_eq!(locale.format_number(-1500.0, 1), "-1.500,0");
        assert_eq!(locale.format_number(-0.001, 1), "0,0");
    }

    #[test]
    fn currency_and_percentages() {
        let locale = LocaleFormat::default();
        assert_eq!(locale.format_currency(1234.5), "$1.234,50");
        assert_eq!(locale.format_currency(-20.0), "-$20,00");
        assert_eq!(locale.format_percent(33.333, 1), "33,3%");
        assert_eq!(locale.format_signed_percent(12.5), "+12,5%");
        assert_eq!(locale.format_signed_percent(-3.0), "-3,0%");
        assert_eq!(locale.format_axis_value(2.5), "2,5");
        assert_eq!(locale.format_axis_value(1250.0), "1.250");
    }

    #[test]
    fn dates_use_the_configured_format() {
        let locale = LocaleFormat {
            date_format: "%Y-%m-%d".to_owned(),
            ..Default::default()
        };
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(locale.format_date(date), "2024-03-09");
        assert_eq!(
            LocaleFormat::default().format_datetime(date.and_hms_opt(14, 5, 0).unwrap()),
            "09/03/2024 14:05"
        );
    }
}
