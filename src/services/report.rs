//! CSV report generation
//!
//! Column order is fixed by [`FlightRow`]. Times are written as ISO-8601
//! local timestamps and numbers with `.` decimals, so the output does not
//! depend on the host locale. The nested `fields` list is flattened to
//! `name=value` pairs joined by `;`, with `\`, `;` and `=` inside names and
//! values escaped by a leading `\`. `warnings` are not exported.

use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};

use crate::errors::ReportError;
use crate::models::{Flight, Report};
use crate::utils::iso_date;

const SCHEDULE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One CSV row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRow {
    pub schedule_time: String,
    pub airline_iata: String,
    pub airline_icao: String,
    pub flight_number: String,
    pub destination_iata: String,
    pub destination_icao: String,
    pub aircraft_type_iata: String,
    pub aircraft_type_icao: String,
    pub flight_nature: String,
    pub flight_type_iata: String,
    pub flight_type_icao: String,
    pub seat_capacity: i32,
    pub sector: String,
    pub terminal: String,
    pub pax: f64,
    pub load_factor: f64,
    pub fields: String,
}

impl FlightRow {
    pub const HEADERS: [&'static str; 17] = [
        "scheduleTime",
        "airlineIata",
        "airlineIcao",
        "flightNumber",
        "destinationIata",
        "destinationIcao",
        "aircraftTypeIata",
        "aircraftTypeIcao",
        "flightNature",
        "flightTypeIata",
        "flightTypeIcao",
        "seatCapacity",
        "sector",
        "terminal",
        "pax",
        "loadFactor",
        "fields",
    ];
}

impl From<&Flight> for FlightRow {
    fn from(flight: &Flight) -> Self {
        Self {
            schedule_time: flight.schedule_time.format(SCHEDULE_TIME_FORMAT).to_string(),
            airline_iata: flight.airline_iata.clone(),
            airline_icao: flight.airline_icao.clone(),
            flight_number: flight.flight_number.clone(),
            destination_iata: flight.destination_iata.clone(),
            destination_icao: flight.destination_icao.clone(),
            aircraft_type_iata: flight.aircraft_type_iata.clone(),
            aircraft_type_icao: flight.aircraft_type_icao.clone(),
            flight_nature: flight.flight_nature.clone(),
            flight_type_iata: flight.flight_type_iata.clone(),
            flight_type_icao: flight.flight_type_icao.clone(),
            seat_capacity: flight.seat_capacity,
            sector: flight.sector.clone(),
            terminal: flight.terminal.clone(),
            pax: flight.pax,
            load_factor: flight.load_factor,
            fields: flight
                .fields
                .iter()
                .map(|field| {
                    format!("{}={}", escape_field(&field.name), escape_field(&field.value))
                })
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

fn escape_field(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | ';' | '=') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Serialize flights to CSV bytes; an empty list yields only the header row
pub fn format_csv(flights: &[Flight]) -> Result<Vec<u8>, ReportError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(FlightRow::HEADERS)?;
    for flight in flights {
        writer.serialize(FlightRow::from(flight))?;
    }

    writer.into_inner().map_err(|e| ReportError::Buffer {
        message: e.error().to_string(),
    })
}

/// Attachment name, e.g. `2024-06-01SEASpotSaverFlights.csv`
pub fn report_filename(date: NaiveDate, label: &str) -> String {
    format!("{}{}SpotSaverFlights.csv", iso_date(date), label)
}

/// Format flights into a named attachment
pub fn build_report(flights: &[Flight], date: NaiveDate, label: &str) -> Result<Report, ReportError> {
    Ok(Report {
        filename: report_filename(date, label),
        content: format_csv(flights)?,
        rows: flights.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use chrono::NaiveDate;

    fn sample_flight(number: &str, fields: Vec<Field>) -> Flight {
        Flight {
            schedule_time: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(6, 5, 0)
                .unwrap(),
            airline_iata: "AS".to_string(),
            airline_icao: "ASA".to_string(),
            flight_number: number.to_string(),
            destination_iata: "ANC".to_string(),
            destination_icao: "PANC".to_string(),
            aircraft_type_iata: "73H".to_string(),
            aircraft_type_icao: "B738".to_string(),
            flight_nature: "Passenger, scheduled".to_string(),
            flight_type_iata: "J".to_string(),
            flight_type_icao: "S".to_string(),
            seat_capacity: 178,
            sector: "D".to_string(),
            terminal: "Main".to_string(),
            pax: 150.5,
            load_factor: 0.845,
            warnings: vec![serde_json::json!({"code": "late"})],
            fields,
        }
    }

    fn parse_rows(bytes: &[u8]) -> (Vec<String>, Vec<FlightRow>) {
        let mut reader = csv::Reader::from_reader(bytes);
        let headers = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        let rows = reader.deserialize().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn test_empty_input_is_header_only() {
        let bytes = format_csv(&[]).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert_eq!(text.lines().count(), 1);

        let (headers, rows) = parse_rows(&bytes);
        assert_eq!(headers, FlightRow::HEADERS);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_round_trip_scalar_values() {
        let flights = vec![
            sample_flight("1234", vec![Field::new("VQ", "VQ-5"), Field::new("Gate", "N4")]),
            sample_flight("77", vec![]),
        ];

        let bytes = format_csv(&flights).unwrap();
        let (headers, rows) = parse_rows(&bytes);

        assert_eq!(headers, FlightRow::HEADERS);
        assert_eq!(rows.len(), 2);
        for (row, flight) in rows.iter().zip(&flights) {
            assert_eq!(row, &FlightRow::from(flight));
        }
        assert_eq!(rows[0].schedule_time, "2024-06-01T06:05:00");
        assert_eq!(rows[0].fields, "VQ=VQ-5;Gate=N4");
        assert_eq!(rows[0].flight_nature, "Passenger, scheduled");
        assert_eq!(rows[1].fields, "");
    }

    #[test]
    fn test_field_separators_are_escaped() {
        let flight = sample_flight(
            "1",
            vec![
                Field::new("Note", "gate=N4;stand 2"),
                Field::new("a=b", r"C:\ops"),
            ],
        );
        assert_eq!(
            FlightRow::from(&flight).fields,
            r"Note=gate\=N4\;stand 2;a\=b=C:\\ops"
        );
    }

    #[test]
    fn test_numbers_use_invariant_formatting() {
        let bytes = format_csv(&[sample_flight("1", vec![])]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let data_line = text.lines().nth(1).unwrap();
        assert!(data_line.contains(",150.5,0.845,"), "got {data_line}");
    }

    #[test]
    fn test_build_report_names_attachment() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let report = build_report(&[sample_flight("1", vec![])], date, "SEA").unwrap();
        assert_eq!(report.filename, "2024-06-01SEASpotSaverFlights.csv");
        assert_eq!(report.rows, 1);
        assert!(!report.content.is_empty());
    }
}
