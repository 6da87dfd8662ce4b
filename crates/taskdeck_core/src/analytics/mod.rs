//! Read-only analytics over task and project state.
//!
//! # Responsibility
//! - Expose counting/summing projections for dashboards.
//! - Keep result shaping inside core.
//!
//! # Invariants
//! - No function in this module writes.

pub mod projector;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Result type for analytics APIs.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Analytics-layer error for range parsing, DB interaction and row decoding.
#[derive(Debug)]
pub enum AnalyticsError {
    /// Range name is not one of `week`, `month`, `all`.
    InvalidRange(String),
    Db(DbError),
    InvalidData(String),
}

impl Display for AnalyticsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRange(value) => {
                write!(f, "invalid range `{value}`; expected week, month or all")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid analytics row: {message}"),
        }
    }
}

impl Error for AnalyticsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidRange(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for AnalyticsError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for AnalyticsError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Lookback window for completion trends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionRange {
    /// Last 7 × 24 hours.
    Week,
    /// One calendar month back from now.
    Month,
    /// No lower bound.
    #[default]
    All,
}

impl CompletionRange {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::All => "all",
        }
    }
}

impl FromStr for CompletionRange {
    type Err = AnalyticsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "all" => Ok(Self::All),
            _ => Err(AnalyticsError::InvalidRange(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalyticsError, CompletionRange};

    #[test]
    fn range_parses_case_insensitively() {
        assert_eq!("Week".parse::<CompletionRange>().unwrap(), CompletionRange::Week);
        assert_eq!(" month ".parse::<CompletionRange>().unwrap(), CompletionRange::Month);
        assert_eq!("all".parse::<CompletionRange>().unwrap(), CompletionRange::All);
    }

    #[test]
    fn unknown_range_is_rejected() {
        let err = "year".parse::<CompletionRange>().unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidRange(value) if value == "year"));
    }
}
