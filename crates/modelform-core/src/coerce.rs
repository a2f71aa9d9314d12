// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Built-in string coercion.
//!
//! | Kind | Accepted input |
//! |------|----------------|
//! | `Number` | anything `f64` parses; integer targets must be integral |
//! | `Date` | `2024-01-15` |
//! | `DateTime` | `2024-01-15 08:30:00`, `2024-01-15T08:30:00`, `2024-01-15 08:30` |
//! | `Duration` | `1h30m`, `90s`, `1.5h`, `250ms`, `PT1H30M`, `P1DT2H` |
//! | text kinds | the raw string (`Uuid` shapes are parsed) |

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use uuid::Uuid;

use crate::{
    error::FieldError,
    kind::{FieldKind, TypeShape},
    value::{DATE_FORMAT, DATETIME_FORMAT, Value}
};

const DATETIME_FORMATS: &[&str] = &[
    DATETIME_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M"
];

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Coerce one posted string into a value of `kind`.
///
/// `shape` is the element shape of the target slot; collections pass their
/// element shape once per posted value.
///
/// # Errors
///
/// Returns [`FieldError::Parse`] when `raw` is not a valid value of the
/// kind.
///
/// # Example
///
/// ```rust
/// use modelform_core::{FieldKind, TypeShape, Value, coerce::parse_scalar};
///
/// let value = parse_scalar(FieldKind::Number, &TypeShape::Float, "42.0").unwrap();
/// assert_eq!(value, Value::Float(42.0));
/// ```
pub fn parse_scalar(kind: FieldKind, shape: &TypeShape, raw: &str) -> Result<Value, FieldError> {
    let shape = shape.unwrap_optional();
    let fail = |reason: String| FieldError::parse(kind, raw, reason);

    match kind {
        FieldKind::Date => parse_date(raw.trim()).map(Value::Date).map_err(fail),
        FieldKind::DateTime => parse_datetime(raw.trim()).map(Value::DateTime).map_err(fail),
        FieldKind::Duration => parse_duration(raw).map(Value::Duration).map_err(fail),
        FieldKind::Checkbox => Ok(Value::Bool(parse_bool(raw))),
        _ => match shape {
            TypeShape::Integer => parse_integer(raw.trim()).map_err(fail),
            TypeShape::Unsigned => parse_unsigned(raw.trim()).map_err(fail),
            TypeShape::Float => parse_finite(raw.trim()).map(Value::Float).map_err(fail),
            TypeShape::Bool => Ok(Value::Bool(parse_bool(raw))),
            TypeShape::Uuid => Uuid::parse_str(raw.trim())
                .map(Value::Uuid)
                .map_err(|e| fail(e.to_string())),
            TypeShape::Date => parse_date(raw.trim()).map(Value::Date).map_err(fail),
            TypeShape::DateTime => parse_datetime(raw.trim())
                .map(Value::DateTime)
                .map_err(fail),
            TypeShape::Duration => parse_duration(raw).map(Value::Duration).map_err(fail),
            TypeShape::Text => Ok(Value::Text(raw.to_string())),
            other => Err(fail(format!("{other} has no string form")))
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "off" | "no"
    )
}

fn parse_integer(raw: &str) -> Result<Value, String> {
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(Value::Int(v));
    }
    parse_finite(raw).map(Value::Float)
}

fn parse_unsigned(raw: &str) -> Result<Value, String> {
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(Value::UInt(v));
    }
    parse_finite(raw).map(Value::Float)
}

fn parse_finite(raw: &str) -> Result<f64, String> {
    let v = raw.parse::<f64>().map_err(|e| e.to_string())?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("`{raw}` is not a finite number"))
    }
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns the chrono parser message.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| e.to_string())
}

/// Parse a date-time in any accepted layout.
///
/// # Errors
///
/// Returns the chrono parser message of the canonical layout.
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| match NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT) {
            Err(e) => e.to_string(),
            Ok(_) => "unrecognized date-time".to_string()
        })
}

/// Parse a duration.
///
/// Accepts unit sequences (`1h30m`, `1.5h`, `-90s`, units `h m s ms us µs
/// ns`), a bare `0`, and ISO-8601 durations (`PT1H30M`, `P1DT2H`, days and
/// weeks only in the date part).
///
/// # Errors
///
/// Returns a message naming the offending part.
///
/// # Example
///
/// ```rust
/// use chrono::TimeDelta;
/// use modelform_core::coerce::parse_duration;
///
/// assert_eq!(parse_duration("1h30m"), Ok(TimeDelta::minutes(90)));
/// assert_eq!(parse_duration("PT1H30M"), Ok(TimeDelta::minutes(90)));
/// ```
pub fn parse_duration(raw: &str) -> Result<TimeDelta, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty duration".to_string());
    }
    let (negative, body) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw))
    };

    let nanos = match body.strip_prefix(['P', 'p']) {
        Some(iso) => parse_iso_duration(iso)?,
        None if body == "0" => 0.0,
        None => parse_unit_duration(body)?
    };

    if !nanos.is_finite() || nanos >= i64::MAX as f64 {
        return Err(format!("duration `{raw}` out of range"));
    }
    let delta = TimeDelta::nanoseconds(nanos.round() as i64);
    Ok(if negative { -delta } else { delta })
}

fn unit_nanos(unit: &str) -> Option<f64> {
    Some(match unit {
        "ns" => 1.0,
        "us" | "µs" | "μs" => 1_000.0,
        "ms" => 1_000_000.0,
        "s" => NANOS_PER_SECOND,
        "m" => 60.0 * NANOS_PER_SECOND,
        "h" => 3_600.0 * NANOS_PER_SECOND,
        _ => return None
    })
}

fn parse_unit_duration(body: &str) -> Result<f64, String> {
    let mut total = 0.0;
    let mut rest = body;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        if number.is_empty() {
            return Err(format!("expected a number before `{tail}`"));
        }
        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        if unit.is_empty() {
            return Err(format!("missing unit after `{number}`"));
        }
        let factor = unit_nanos(unit).ok_or_else(|| format!("unknown unit `{unit}`"))?;
        let amount: f64 = number.parse().map_err(|_| format!("invalid number `{number}`"))?;
        total += amount * factor;
        rest = tail;
    }
    Ok(total)
}

fn parse_iso_duration(body: &str) -> Result<f64, String> {
    let upper = body.to_ascii_uppercase();
    let (date_part, time_part) = match upper.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (upper.as_str(), None)
    };
    if date_part.is_empty() && time_part.is_none_or(str::is_empty) {
        return Err("empty ISO-8601 duration".to_string());
    }

    let mut total = 0.0;
    total += parse_iso_part(date_part, |designator| match designator {
        'W' => Some(7.0 * 86_400.0 * NANOS_PER_SECOND),
        'D' => Some(86_400.0 * NANOS_PER_SECOND),
        _ => None
    })?;
    if let Some(time) = time_part {
        total += parse_iso_part(time, |designator| match designator {
            'H' => Some(3_600.0 * NANOS_PER_SECOND),
            'M' => Some(60.0 * NANOS_PER_SECOND),
            'S' => Some(NANOS_PER_SECOND),
            _ => None
        })?;
    }
    Ok(total)
}

fn parse_iso_part(part: &str, factor: impl Fn(char) -> Option<f64>) -> Result<f64, String> {
    let mut total = 0.0;
    let mut number = String::new();
    for c in part.chars() {
        if c.is_ascii_digit() || c == '.' || c == ',' {
            number.push(if c == ',' { '.' } else { c });
            continue;
        }
        let unit = factor(c).ok_or_else(|| format!("unknown designator `{c}`"))?;
        let amount: f64 = number
            .parse()
            .map_err(|_| format!("invalid number before `{c}`"))?;
        total += amount * unit;
        number.clear();
    }
    if number.is_empty() {
        Ok(total)
    } else {
        Err(format!("missing designator after `{number}`"))
    }
}

/// Render a duration in the compact unit form accepted by
/// [`parse_duration`].
///
/// Zero components are omitted; the zero duration renders as `0s`.
pub fn format_duration(delta: TimeDelta) -> String {
    if delta.is_zero() {
        return "0s".to_string();
    }
    let negative = delta < TimeDelta::zero();
    let delta = delta.abs();
    let seconds = delta.num_seconds();
    let nanos = delta.subsec_nanos();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    let hours = seconds / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        out.push_str(&format!("{secs}.{}s", fraction.trim_end_matches('0')));
    } else if secs > 0 {
        out.push_str(&format!("{secs}s"));
    }
    out
}
