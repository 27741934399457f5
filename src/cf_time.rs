//! CF-convention time coordinate decoding.
//!
//! Aggregated radial datasets store time as offsets from a reference
//! instant, described by a `units` attribute such as
//! `days since 1950-01-01T00:00:00Z`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Parsed `<unit> since <reference>` attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CfTimeUnits {
    millis_per_unit: f64,
    reference: DateTime<Utc>,
}

impl CfTimeUnits {
    /// Parse a CF time `units` attribute
    pub fn parse(units: &str) -> Result<Self, String> {
        let (unit, reference) = units
            .trim()
            .split_once(" since ")
            .ok_or_else(|| format!("unsupported time units '{units}'"))?;

        let millis_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
            "days" | "day" | "d" => 86_400_000.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3_600_000.0,
            "minutes" | "minute" | "mins" | "min" => 60_000.0,
            "seconds" | "second" | "secs" | "sec" | "s" => 1_000.0,
            "milliseconds" | "millisecond" | "msec" | "ms" => 1.0,
            other => return Err(format!("unsupported time unit '{other}'")),
        };

        let reference = parse_reference(reference.trim())
            .ok_or_else(|| format!("unparsable reference time '{}'", reference.trim()))?;

        Ok(Self {
            millis_per_unit,
            reference,
        })
    }

    /// Convert a raw coordinate value to an absolute instant
    pub fn decode(&self, value: f64) -> Option<DateTime<Utc>> {
        if !value.is_finite() {
            return None;
        }
        let millis = (value * self.millis_per_unit).round();
        if millis.abs() > i64::MAX as f64 {
            return None;
        }
        self.reference
            .checked_add_signed(Duration::try_milliseconds(millis as i64)?)
    }
}

fn parse_reference(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    let trimmed = text
        .trim_end_matches(" UTC")
        .trim_end_matches('Z')
        .trim();

    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
