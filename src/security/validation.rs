//! Request Validation Module
//!
//! Field-level validation and input sanitization for request payloads.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Validation error types
#[derive(Debug, Error, Clone, Serialize, Deserialize, PartialEq)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing")]
    MissingField { field: String },

    #[error("Field '{field}' is too long (max: {max}, got: {got})")]
    TooLong {
        field: String,
        max: usize,
        got: usize,
    },

    #[error("Field '{field}' is too short (min: {min}, got: {got})")]
    TooShort {
        field: String,
        min: usize,
        got: usize,
    },

    #[error("Field '{field}' is not a valid email: {value}")]
    InvalidEmail { field: String, value: String },

    #[error("Field '{field}' must be a positive number")]
    NotPositive { field: String },

    #[error("Field '{field}' exceeds maximum value: max={max}, got={got}")]
    ExceedsMax { field: String, max: i64, got: i64 },

    #[error("Field '{field}' is below minimum value: min={min}, got={got}")]
    BelowMin { field: String, min: i64, got: i64 },

    #[error("Field '{field}' is out of range [{min}, {max}]: {got}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        got: f64,
    },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } => field.as_str(),
            Self::TooLong { field, .. } => field.as_str(),
            Self::TooShort { field, .. } => field.as_str(),
            Self::InvalidEmail { field, .. } => field.as_str(),
            Self::NotPositive { field } => field.as_str(),
            Self::ExceedsMax { field, .. } => field.as_str(),
            Self::BelowMin { field, .. } => field.as_str(),
            Self::OutOfRange { field, .. } => field.as_str(),
        }
    }
}

/// Validation result type
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Request validation trait
pub trait Validatable {
    /// Validate the request data
    fn validate(&self) -> ValidationResult<()>;
}

/// Request validator implementation
#[derive(Debug, Clone, Default)]
pub struct RequestValidator;

impl RequestValidator {
    /// Validate field length
    pub fn validate_length(
        field: &str,
        value: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> ValidationResult<()> {
        let length = value.chars().count();

        if let Some(min_len) = min {
            if length < min_len {
                return Err(ValidationError::TooShort {
                    field: field.to_string(),
                    min: min_len,
                    got: length,
                });
            }
        }

        if let Some(max_len) = max {
            if length > max_len {
                return Err(ValidationError::TooLong {
                    field: field.to_string(),
                    max: max_len,
                    got: length,
                });
            }
        }

        Ok(())
    }

    /// Validate email format
    pub fn validate_email(field: &str, value: &str) -> ValidationResult<()> {
        if EMAIL_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(ValidationError::InvalidEmail {
                field: field.to_string(),
                value: value.to_string(),
            })
        }
    }

    /// Validate that a real number lies in a closed range (NaN is rejected)
    pub fn validate_range(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
        if value.is_nan() || value < min || value > max {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                min,
                max,
                got: value,
            });
        }
        Ok(())
    }

    /// Sanitize string input
    pub fn sanitize_string(input: &str) -> String {
        // Remove null bytes and control characters
        input
            .trim()
            .chars()
            .filter(|c| !c.is_ascii_control() || c.is_whitespace())
            .collect()
    }
}

/// Common validation helpers
pub mod validators {
    use super::*;

    /// Maximum hours a check-in may report
    pub const MAX_SLEEP_HOURS: f64 = 24.0;

    /// Validate reported sleep hours
    pub fn validate_sleep_hours(hours: f64) -> ValidationResult<()> {
        RequestValidator::validate_range("sleep_hours", hours, 0.0, MAX_SLEEP_HOURS)
    }

    /// Validate a 1-5 self-report scale
    pub fn validate_scale(field: &str, value: u8) -> ValidationResult<()> {
        if value < 1 {
            return Err(ValidationError::BelowMin {
                field: field.to_string(),
                min: 1,
                got: value as i64,
            });
        }
        if value > 5 {
            return Err(ValidationError::ExceedsMax {
                field: field.to_string(),
                max: 5,
                got: value as i64,
            });
        }
        Ok(())
    }

    /// Validate a free-text answer or chat message
    pub fn validate_message(field: &str, message: &str) -> ValidationResult<()> {
        RequestValidator::validate_length(field, message.trim(), Some(1), Some(2_000))
    }

    /// Validate an account email
    pub fn validate_account_email(email: &str) -> ValidationResult<()> {
        RequestValidator::validate_length("email", email, Some(3), Some(254))?;
        RequestValidator::validate_email("email", email)
    }
}
