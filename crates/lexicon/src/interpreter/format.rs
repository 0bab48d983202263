//! Number and date formatting collaborators.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::LocaleId;

/// Formats numbers and dates for display in a rendered message.
///
/// Locale-aware formatting (digit grouping, calendars) lives outside this
/// crate; implement this trait to plug it in. The renderer uses
/// `format_number` for `#` inside plural clauses and `format_date` for date
/// arguments.
pub trait ValueFormatter: Send + Sync {
    fn format_number(&self, locale: &LocaleId, n: f64) -> String;

    fn format_date(&self, locale: &LocaleId, date: SystemTime) -> String;
}

/// Locale-independent formatting.
///
/// Integral numbers print without a fraction (`5`, not `5.0`), others use
/// Rust's shortest round-trip form. Dates print as Unix seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl ValueFormatter for PlainFormatter {
    fn format_number(&self, _locale: &LocaleId, n: f64) -> String {
        if n.fract() == 0.0 && n.abs() < 1e15 {
            format!("{}", n as i64)
        } else {
            format!("{n}")
        }
    }

    fn format_date(&self, _locale: &LocaleId, date: SystemTime) -> String {
        match date.duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_secs().to_string(),
            Err(before) => format!("-{}", before.duration().as_secs()),
        }
    }
}
