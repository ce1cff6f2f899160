//! Error type definitions for the Spot Saver job
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that keeps the failing stage,
//! endpoint and HTTP status available to whoever logs the error.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all possible errors that can occur during a run.
/// It uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Upstream schedule API errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Report generation errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Email delivery errors
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised while talking to the airport operations API
#[derive(Error, Debug)]
pub enum SourceError {
    /// Token endpoint rejected the credentials or could not be reached
    #[error("Authentication failed{}: {message}", status_suffix(.status))]
    Authentication { status: Option<u16>, message: String },

    /// Schedule endpoint returned a non-success status or could not be reached
    #[error("Schedule fetch failed{} for {endpoint} (airport: {airport}): {message}", status_suffix(.status))]
    ScheduleFetch {
        status: Option<u16>,
        endpoint: String,
        airport: String,
        message: String,
    },

    /// Response body was not the JSON we expected
    #[error("Could not parse response from {endpoint}: {message}")]
    ResponseParse { endpoint: String, message: String },
}

/// Report generation errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// CSV writer failures
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the in-memory writer failed
    #[error("Could not finalize report buffer: {message}")]
    Buffer { message: String },
}

/// Email delivery errors
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Nothing to send to
    #[error("No recipients configured")]
    NoRecipients,

    /// Provider answered with a non-success status
    #[error("Email provider rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Request never got an answer
    #[error("Email provider request failed: {message}")]
    Transport { message: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create an authentication error
    pub fn authentication<M: Into<String>>(status: Option<u16>, message: M) -> Self {
        Self::Authentication {
            status,
            message: message.into(),
        }
    }

    /// Create a schedule fetch error
    pub fn schedule_fetch<E: Into<String>, A: Into<String>, M: Into<String>>(
        status: Option<u16>,
        endpoint: E,
        airport: A,
        message: M,
    ) -> Self {
        Self::ScheduleFetch {
            status,
            endpoint: endpoint.into(),
            airport: airport.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn response_parse<E: Into<String>, M: Into<String>>(endpoint: E, message: M) -> Self {
        Self::ResponseParse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// HTTP status attached to the failure, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::ScheduleFetch { status, .. } => *status,
            Self::ResponseParse { .. } => None,
        }
    }
}

impl DeliveryError {
    /// Create a transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}
