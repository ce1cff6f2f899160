//! Flight schedule records as returned by the schedule endpoint
//!
//! The upstream serializer is lenient (case-insensitive names, nulls for
//! absent values), so every scalar here defaults instead of failing. Name
//! matching covers the aliases listed on each field; other casings are
//! ignored as unknown keys and leave the default in place.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Extended attribute attached to a flight, e.g. `{"name": "VQ", "value": "VQ-5"}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Field {
    #[serde(alias = "Name", deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(alias = "Value", deserialize_with = "null_as_default")]
    pub value: String,
}

impl Field {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One scheduled departure for the requested date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flight {
    /// Local scheduled time at the airport
    #[serde(
        rename = "scheduleTime",
        alias = "ScheduleTime",
        alias = "scheduletime",
        deserialize_with = "deserialize_schedule_time"
    )]
    pub schedule_time: NaiveDateTime,

    #[serde(
        rename = "airlineIATA",
        alias = "airlineIata",
        alias = "AirlineIata",
        alias = "AirlineIATA",
        deserialize_with = "null_as_default"
    )]
    pub airline_iata: String,

    #[serde(
        rename = "airlineIcao",
        alias = "airlineICAO",
        alias = "AirlineIcao",
        alias = "AirlineICAO",
        deserialize_with = "null_as_default"
    )]
    pub airline_icao: String,

    #[serde(
        rename = "flightNumber",
        alias = "FlightNumber",
        deserialize_with = "null_as_default"
    )]
    pub flight_number: String,

    #[serde(
        rename = "destinationIATA",
        alias = "destinationIata",
        alias = "DestinationIata",
        alias = "DestinationIATA",
        deserialize_with = "null_as_default"
    )]
    pub destination_iata: String,

    #[serde(
        rename = "destinationICAO",
        alias = "destinationIcao",
        alias = "DestinationIcao",
        alias = "DestinationICAO",
        deserialize_with = "null_as_default"
    )]
    pub destination_icao: String,

    #[serde(
        rename = "aircraftTypeIATA",
        alias = "aircraftTypeIata",
        alias = "AircraftTypeIata",
        alias = "AircraftTypeIATA",
        deserialize_with = "null_as_default"
    )]
    pub aircraft_type_iata: String,

    #[serde(
        rename = "aircraftTypeICAO",
        alias = "aircraftTypeIcao",
        alias = "AircraftTypeIcao",
        alias = "AircraftTypeICAO",
        deserialize_with = "null_as_default"
    )]
    pub aircraft_type_icao: String,

    #[serde(
        rename = "flightNature",
        alias = "FlightNature",
        deserialize_with = "null_as_default"
    )]
    pub flight_nature: String,

    #[serde(
        rename = "flightTypeIATA",
        alias = "flightTypeIata",
        alias = "FlightTypeIata",
        alias = "FlightTypeIATA",
        deserialize_with = "null_as_default"
    )]
    pub flight_type_iata: String,

    #[serde(
        rename = "flightTypeICAO",
        alias = "flightTypeIcao",
        alias = "FlightTypeIcao",
        alias = "FlightTypeICAO",
        deserialize_with = "null_as_default"
    )]
    pub flight_type_icao: String,

    #[serde(
        rename = "seatCapacity",
        alias = "SeatCapacity",
        deserialize_with = "null_as_default"
    )]
    pub seat_capacity: i32,

    #[serde(rename = "sector", alias = "Sector", deserialize_with = "null_as_default")]
    pub sector: String,

    #[serde(
        rename = "terminal",
        alias = "Terminal",
        deserialize_with = "null_as_default"
    )]
    pub terminal: String,

    #[serde(rename = "pax", alias = "Pax", deserialize_with = "null_as_default")]
    pub pax: f64,

    #[serde(
        rename = "loadFactor",
        alias = "LoadFactor",
        deserialize_with = "null_as_default"
    )]
    pub load_factor: f64,

    /// Opaque upstream warnings, carried through untouched
    #[serde(
        rename = "warnings",
        alias = "Warnings",
        deserialize_with = "null_as_default"
    )]
    pub warnings: Vec<serde_json::Value>,

    /// Extended attributes in upstream order
    #[serde(rename = "fields", alias = "Fields", deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
}

impl Flight {
    /// Iterate over the values of every field carrying `name`
    pub fn field_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |field| field.name == name)
            .map(|field| field.value.as_str())
    }

    /// Short label used in log lines, e.g. `AS 123`
    pub fn display_name(&self) -> String {
        format!("{} {}", self.airline_iata, self.flight_number)
    }
}

/// Treat an explicit JSON `null` like a missing value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept either an offset-carrying RFC 3339 timestamp (converted to its
/// local wall-clock time) or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` timestamp
fn deserialize_schedule_time<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(NaiveDateTime::default()),
        Some(value) => parse_schedule_time(value).map_err(serde::de::Error::custom),
    }
}

pub(crate) fn parse_schedule_time(value: &str) -> Result<NaiveDateTime, String> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.naive_local());
    }

    const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| format!("unrecognised scheduleTime '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use serde_json::json;

    #[test]
    fn test_deserialize_upstream_flight() {
        let payload = json!({
            "scheduleTime": "2024-06-01T08:35:00",
            "airlineIATA": "AS",
            "airlineIcao": "ASA",
            "flightNumber": "1234",
            "destinationIATA": "ANC",
            "destinationICAO": "PANC",
            "aircraftTypeIATA": "73H",
            "aircraftTypeICAO": "B738",
            "flightNature": "Passenger",
            "flightTypeIATA": "J",
            "flightTypeICAO": "S",
            "seatCapacity": 178,
            "sector": "D",
            "terminal": "Main",
            "warnings": [],
            "pax": 150.5,
            "loadFactor": 0.85,
            "fields": [{"name": "VQ", "value": "VQ-5"}]
        });

        let flight: Flight = serde_json::from_value(payload).unwrap();
        assert_eq!(
            flight.schedule_time,
            NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(8, 35, 0)
                .unwrap()
        );
        assert_eq!(flight.airline_iata, "AS");
        assert_eq!(flight.destination_icao, "PANC");
        assert_eq!(flight.seat_capacity, 178);
        assert_eq!(flight.load_factor, 0.85);
        assert_eq!(flight.fields, vec![Field::new("VQ", "VQ-5")]);
        assert_eq!(flight.display_name(), "AS 1234");
    }

    #[test]
    fn test_nulls_and_missing_fields_default() {
        let payload = json!({
            "ScheduleTime": "2024-06-01T23:10:00-07:00",
            "AirlineIata": null,
            "FlightNumber": "9",
            "pax": null,
            "fields": null
        });

        let flight: Flight = serde_json::from_value(payload).unwrap();
        assert_eq!(flight.schedule_time.hour(), 23);
        assert_eq!(flight.airline_iata, "");
        assert_eq!(flight.flight_number, "9");
        assert_eq!(flight.pax, 0.0);
        assert!(flight.fields.is_empty());
        assert!(flight.warnings.is_empty());
    }

    #[test]
    fn test_unlisted_casing_is_ignored() {
        let payload = json!({ "AIRLINEIATA": "AS", "flightNumber": "9" });
        let flight: Flight = serde_json::from_value(payload).unwrap();
        assert_eq!(flight.airline_iata, "");
        assert_eq!(flight.flight_number, "9");
    }

    #[test]
    fn test_rejects_garbage_schedule_time() {
        let payload = json!({ "scheduleTime": "tomorrow-ish" });
        let err = serde_json::from_value::<Flight>(payload).unwrap_err();
        assert!(err.to_string().contains("unrecognised scheduleTime"));
    }

    #[test]
    fn test_field_values_returns_every_match_in_order() {
        let flight = Flight {
            fields: vec![
                Field::new("VQ", "VQ-1"),
                Field::new("Gate", "N4"),
                Field::new("VQ", "VQ-5"),
            ],
            ..Flight::default()
        };
        let values: Vec<&str> = flight.field_values("VQ").collect();
        assert_eq!(values, vec!["VQ-1", "VQ-5"]);
    }
}
