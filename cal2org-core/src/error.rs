//! Error types for the cal2org conversion pipeline.

use thiserror::Error;

/// Errors that can occur while converting calendar events.
#[derive(Error, Debug)]
pub enum Cal2OrgError {
    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("invalid temporal value: {0}")]
    InvalidTemporalValue(String),

    #[error("invalid recurrence rule '{rule}': {message}")]
    RuleSyntax { rule: String, message: String },

    #[error("recurrence rule '{rule}' exceeded the expansion cap of {cap} occurrences")]
    UnboundedRecurrence { rule: String, cap: u16 },

    #[error("unknown timezone: {0}")]
    TimezoneResolution(String),
}

/// Result type alias for cal2org operations.
pub type Cal2OrgResult<T> = Result<T, Cal2OrgError>;
