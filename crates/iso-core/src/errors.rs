//! Structured error types shared across the isotopologue crates.

use std::collections::BTreeMap;
use std::collections::TryReserveError;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`IsoError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (element indices, sizes, limits).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for isotopologue queries.
///
/// A failed query never carries a partial result: callers either get the
/// full answer for the requested stop condition or one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum IsoError {
    /// Negative atom count, empty or mismatched isotope lists, bad numbers.
    #[error("invalid composition: {0}")]
    InvalidComposition(ErrorInfo),
    /// Unrecognised strategy name.
    #[error("invalid strategy: {0}")]
    InvalidStrategy(ErrorInfo),
    /// Stop condition outside the range accepted by the chosen strategy.
    #[error("invalid stop condition: {0}")]
    InvalidStopCondition(ErrorInfo),
    /// A configured cap on tables, states or rows was exceeded.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(ErrorInfo),
    /// Memory for a table, queue or result could not be reserved.
    #[error("allocation failure: {0}")]
    AllocationFailure(ErrorInfo),
    /// The query was cancelled or ran past its deadline.
    #[error("cancelled: {0}")]
    Cancelled(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl IsoError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            IsoError::InvalidComposition(info)
            | IsoError::InvalidStrategy(info)
            | IsoError::InvalidStopCondition(info)
            | IsoError::ResourceExhausted(info)
            | IsoError::AllocationFailure(info)
            | IsoError::Cancelled(info)
            | IsoError::Serde(info) => info,
        }
    }

    /// Stable machine readable code of the underlying payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Wraps a failed `try_reserve` for the named buffer.
    pub fn allocation(buffer: &str, requested: usize, err: TryReserveError) -> Self {
        IsoError::AllocationFailure(
            ErrorInfo::new("reserve-failed", err.to_string())
                .with_context("buffer", buffer)
                .with_context("requested", requested),
        )
    }
}
