//! Source trait definitions
//!
//! The job talks to the schedule API through two narrow capabilities so the
//! runner can be exercised against test doubles instead of live HTTP.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::SourceResult;
use crate::models::{Credential, Flight, Token};
use crate::utils::iso_date;

/// Which schedule to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub date: NaiveDate,
    /// Airport code scoping the request, `None` for the account default
    pub airport: Option<String>,
}

impl ScheduleRequest {
    pub fn new(date: NaiveDate, airport: Option<String>) -> Self {
        Self { date, airport }
    }

    /// Label for logs and errors
    pub fn scope(&self) -> &str {
        self.airport.as_deref().unwrap_or("default")
    }

    pub fn iso_date(&self) -> String {
        iso_date(self.date)
    }
}

/// Exchanges an API credential for a short-lived bearer token
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credential: &Credential) -> SourceResult<Token>;
}

/// Retrieves the full flight schedule for one calendar date
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleFetcher: Send + Sync {
    async fn fetch_schedule(&self, token: &Token, request: &ScheduleRequest) -> SourceResult<Vec<Flight>>;
}
