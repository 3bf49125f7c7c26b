//! Time expression parsing for the `from`/`to` range parameters.
//!
//! The API accepts three wire formats: a relative offset (`-1h`, `-3d`), the
//! literal `now`, and an ISO calendar date (`2022-09-01`). The parser only
//! validates the wire format and produces a typed value; it performs no date
//! arithmetic — resolution of the expression is delegated to the remote API,
//! which receives the string verbatim.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Maximum digits in a relative offset amount.
const MAX_RELATIVE_DIGITS: usize = 3;

/// Error produced when a time expression does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time expression '{input}': {reason}")]
pub struct ParseTimeExprError {
    /// The rejected input
    pub input: String,
    /// Why it was rejected
    pub reason: &'static str,
}

impl ParseTimeExprError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// A validated time range expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeExpr {
    /// The literal `now`
    Now,
    /// Relative offset from now, e.g. `-1h` or `-30d`
    Relative {
        /// Offset amount, 1 to 3 digits as written
        amount: u16,
        /// Digit count as written. Preserved so the string substituted into
        /// the request matches the validated input byte-for-byte, leading
        /// zeros included.
        width: u8,
        /// Single lowercase unit letter (`m`, `h`, `d`, ...)
        unit: char,
    },
    /// Absolute calendar date, e.g. `2022-09-01`
    Date(NaiveDate),
}

impl FromStr for TimeExpr {
    type Err = ParseTimeExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "now" {
            return Ok(TimeExpr::Now);
        }

        if let Some(rest) = s.strip_prefix('-') {
            return parse_relative(s, rest);
        }

        parse_date(s)
    }
}

/// Parse the `-{1,3 digits}{unit letter}` form.
fn parse_relative(input: &str, rest: &str) -> Result<TimeExpr, ParseTimeExprError> {
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let tail = &rest[digits.len()..];

    if digits.is_empty() || digits.len() > MAX_RELATIVE_DIGITS {
        return Err(ParseTimeExprError::new(
            input,
            "expected 1 to 3 digits after '-'",
        ));
    }

    let mut tail_chars = tail.chars();
    let unit = match (tail_chars.next(), tail_chars.next()) {
        (Some(c), None) if c.is_ascii_lowercase() && c.is_ascii_alphabetic() => c,
        _ => {
            return Err(ParseTimeExprError::new(
                input,
                "expected a single lowercase unit letter",
            ))
        }
    };

    // 1-3 digits always fit in u16.
    let amount = digits
        .parse::<u16>()
        .map_err(|_| ParseTimeExprError::new(input, "offset amount out of range"))?;

    Ok(TimeExpr::Relative {
        amount,
        width: digits.len() as u8,
        unit,
    })
}

/// Parse the strict `YYYY-MM-DD` form.
fn parse_date(input: &str) -> Result<TimeExpr, ParseTimeExprError> {
    let bytes = input.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !shape_ok {
        return Err(ParseTimeExprError::new(
            input,
            "expected a relative offset (-1h), 'now', or a date (2022-09-01)",
        ));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| ParseTimeExprError::new(input, "not a valid calendar date"))?;

    Ok(TimeExpr::Date(date))
}

impl fmt::Display for TimeExpr {
    /// Renders the exact wire-format string substituted into the request.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeExpr::Now => write!(f, "now"),
            TimeExpr::Relative {
                amount,
                width,
                unit,
            } => write!(f, "-{amount:0w$}{unit}", w = *width as usize),
            TimeExpr::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Start/end expressions for one download run. Immutable for the life of
/// the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Range start expression
    pub from: TimeExpr,
    /// Range end expression
    pub to: TimeExpr,
}

impl TimeRange {
    /// Create a range from two validated expressions.
    pub fn new(from: TimeExpr, to: TimeExpr) -> Self {
        Self { from, to }
    }
}
