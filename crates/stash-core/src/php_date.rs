//! PHP-style date format strings.
//!
//! Date pickers store their value together with the format it was entered in
//! (`Y-m-d`, `d.m.Y H:i`, ...), and the configured export format uses the same
//! notation. This module translates those tokens into `chrono` strftime
//! specifiers. A backslash escapes the following character; characters that
//! are not tokens are copied literally.

use std::fmt::Write as _;

use chrono::format::{Parsed, StrftimeItems, parse};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Translate a PHP date format into a strftime format string.
#[must_use]
pub fn to_strftime(php: &str) -> String {
    let mut out = String::with_capacity(php.len() * 2);
    let mut chars = php.chars();
    while let Some(ch) = chars.next() {
        let spec = match ch {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    push_literal(&mut out, escaped);
                }
                continue;
            }
            'd' => "%d",
            'D' => "%a",
            'j' => "%-d",
            'l' => "%A",
            'N' => "%u",
            'w' => "%w",
            'W' => "%V",
            'F' => "%B",
            'm' => "%m",
            'M' => "%b",
            'n' => "%-m",
            'o' => "%G",
            'Y' => "%Y",
            'y' => "%y",
            'a' => "%P",
            'A' => "%p",
            'g' => "%-I",
            'G' => "%-H",
            'h' => "%I",
            'H' => "%H",
            'i' => "%M",
            's' => "%S",
            'u' => "%6f",
            'v' => "%3f",
            'e' | 'T' => "%Z",
            'O' => "%z",
            'P' | 'p' => "%:z",
            'U' => "%s",
            'c' => "%Y-%m-%dT%H:%M:%S%:z",
            'r' => "%a, %d %b %Y %H:%M:%S %z",
            other => {
                push_literal(&mut out, other);
                continue;
            }
        };
        out.push_str(spec);
    }
    out
}

fn push_literal(out: &mut String, ch: char) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}

/// Parse `value` written in PHP format `format`, interpreted in `tz`.
///
/// Fields the format does not mention default to midnight. Returns `None`
/// when the value does not match the format or names a nonexistent local time.
#[must_use]
pub fn parse_in(value: &str, format: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let strftime = to_strftime(format);
    let mut parsed = Parsed::new();
    parse(&mut parsed, value, StrftimeItems::new(&strftime)).ok()?;

    if parsed.timestamp().is_some() {
        return parsed.to_datetime_with_timezone(&tz).ok();
    }

    let date: NaiveDate = parsed.to_naive_date().ok()?;
    let time = if parsed.hour_div_12().is_some() || parsed.hour_mod_12().is_some() {
        parsed.to_naive_time().ok()?
    } else {
        NaiveTime::MIN
    };
    tz.from_local_datetime(&date.and_time(time)).earliest()
}

/// Render `at` using a PHP format. Returns an empty string if rendering fails.
#[must_use]
pub fn format<T: TimeZone>(at: &DateTime<T>, php_format: &str) -> String
where
    T::Offset: std::fmt::Display,
{
    let strftime = to_strftime(php_format);
    let mut out = String::new();
    if write!(out, "{}", at.format(&strftime)).is_err() {
        return String::new();
    }
    out
}
