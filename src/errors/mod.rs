//! Centralized error handling for the Spot Saver job
//!
//! # Error Categories
//!
//! - **Configuration Errors**: missing credentials, bad cron or time zone
//! - **Source Errors**: authentication, schedule fetch and response parsing
//! - **Report Errors**: CSV serialization
//! - **Delivery Errors**: email provider rejections and transport failures
//!
//! # Usage
//!
//! ```rust
//! use spot_saver::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("api.user must be set"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for Delivery Results
pub type DeliveryResult<T> = Result<T, DeliveryError>;
