//! Virtual-queue eligibility filtering
//!
//! A flight is eligible when any of its extended fields carries the
//! configured name and one of the configured marker values. Fields are
//! looked up by name; their position in the list is not meaningful.

use tracing::debug;

use crate::config::EligibilityConfig;
use crate::models::{Airport, Flight};

#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    field_name: String,
    markers: Vec<String>,
}

impl EligibilityFilter {
    pub fn new<N: Into<String>>(field_name: N, markers: Vec<String>) -> Self {
        Self {
            field_name: field_name.into(),
            markers,
        }
    }

    pub fn from_config(config: &EligibilityConfig) -> Self {
        Self::new(config.field_name.clone(), config.markers.clone())
    }

    pub fn is_eligible(&self, flight: &Flight) -> bool {
        flight
            .field_values(&self.field_name)
            .any(|value| self.markers.iter().any(|marker| marker == value.trim()))
    }

    /// Keep eligible flights, preserving their order
    pub fn filter_eligible(&self, flights: Vec<Flight>) -> Vec<Flight> {
        flights
            .into_iter()
            .filter(|flight| {
                let eligible = self.is_eligible(flight);
                if !eligible {
                    debug!("Excluding {} (not eligible)", flight.display_name());
                }
                eligible
            })
            .collect()
    }
}

/// Keep flights whose local schedule hour is inside the airport's window
pub fn filter_hour_window(flights: Vec<Flight>, airport: &Airport) -> Vec<Flight> {
    use chrono::Timelike;

    flights
        .into_iter()
        .filter(|flight| airport.accepts_hour(flight.schedule_time.hour()))
        .collect()
}
