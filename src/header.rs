//! LLUV radial file header parsing.
//!
//! Radial `.ruv` files carry their metadata in `%`-prefixed header lines.
//! The only header needed here is the file timestamp, written as six
//! space-separated integers after a label:
//!
//! ```text
//! %TimeStamp: 2021 04 14 11 00 00
//! ```

use crate::error::{AvrbError, Result, SkipReason};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

/// Matcher for the labelled timestamp header line
#[derive(Debug, Clone)]
pub struct TimestampHeader {
    label: String,
    pattern: Regex,
}

impl TimestampHeader {
    /// Build a matcher for the given label, e.g. `%TimeStamp:`
    pub fn new(label: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(
            r"^\s*{}\s*(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s*$",
            regex::escape(label)
        ))
        .map_err(|e| AvrbError::configuration(format!("invalid timestamp label '{label}': {e}")))?;
        Ok(Self {
            label: label.to_string(),
            pattern,
        })
    }

    /// Parse a header line.
    ///
    /// Returns `None` when the line is not a timestamp header, and an
    /// `InvalidTimestamp` reason when it is labelled but unusable.
    pub fn parse_line(&self, line: &str) -> Option<std::result::Result<DateTime<Utc>, SkipReason>> {
        if !line.trim_start().starts_with(&self.label) {
            return None;
        }

        let invalid = || SkipReason::InvalidTimestamp {
            text: line.trim().to_string(),
        };

        let Some(caps) = self.pattern.captures(line) else {
            return Some(Err(invalid()));
        };

        let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        let parsed = (|| {
            let year = i32::try_from(field(1)?).ok()?;
            NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)?
                .and_hms_opt(field(4)?, field(5)?, field(6)?)
        })();

        Some(parsed.map(|naive| naive.and_utc()).ok_or_else(invalid))
    }
}
