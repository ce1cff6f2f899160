//! Schedule sources
//!
//! Provides the `Authenticator` and `ScheduleFetcher` capabilities and the
//! BetterAirport HTTP client implementing both.

pub mod better_airport;
pub mod traits;

pub use better_airport::BetterAirportClient;
pub use traits::{Authenticator, ScheduleFetcher, ScheduleRequest};
