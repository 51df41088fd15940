use std::path::Path;

use crate::error::{Error, Result};
use crate::model::Flight;
use crate::schedule::time;

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

/// Normalize a header string to a canonical column key.
fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_', '.'], "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    FlightNo,
    Registration,
    Date,
    Std,
    Sta,
    Week,
    Month,
    Day,
    Adep,
    Ades,
    Status,
    FlightType,
    Positioning,
    Operator,
    Client,
    Contract,
    Revenue,
    TotalCapacity,
    CapacityUsed,
}

const REQUIRED: [Column; 5] = [
    Column::FlightNo,
    Column::Registration,
    Column::Date,
    Column::Std,
    Column::Sta,
];

fn header_to_column(normalized: &str) -> Option<Column> {
    let column = match normalized {
        "flightno" | "flightnumber" | "flight" | "callsign" => Column::FlightNo,
        "registration" | "reg" | "aircraft" | "tail" | "tailnumber" => Column::Registration,
        "date" | "flightdate" => Column::Date,
        "std" | "departure" | "dep" | "departuretime" | "etd" => Column::Std,
        "sta" | "arrival" | "arr" | "arrivaltime" | "eta" => Column::Sta,
        "week" | "weeknumber" | "wk" => Column::Week,
        "month" | "monthnumber" => Column::Month,
        "day" | "weekday" => Column::Day,
        "adep" | "from" | "origin" => Column::Adep,
        "ades" | "to" | "destination" | "dest" => Column::Ades,
        "status" | "state" => Column::Status,
        "type" | "flighttype" => Column::FlightType,
        "positioning" | "flightpositioning" => Column::Positioning,
        "operator" | "airline" => Column::Operator,
        "client" | "clientname" | "customer" => Column::Client,
        "contract" | "contractid" => Column::Contract,
        "revenue" | "price" => Column::Revenue,
        "capacity" | "totalcapacity" => Column::TotalCapacity,
        "used" | "capacityused" => Column::CapacityUsed,
        _ => return None,
    };
    Some(column)
}

/// Month from a `dd/mm` style date label.
fn month_of(date: &str) -> Option<u32> {
    let month = date.split(['/', '.', '-']).nth(1)?.trim().parse().ok()?;
    (1..=12).contains(&month).then_some(month)
}

/// Import flights from a CSV file.
///
/// Auto-detects delimiter (comma, semicolon, tab) and matches headers
/// flexibly. Rows with missing identifiers or malformed `HH:MM` times are
/// skipped. Returns `(flights, skipped_count)`.
pub fn import_csv(path: &Path) -> Result<(Vec<Flight>, usize)> {
    let content = std::fs::read_to_string(path)?;
    import_csv_str(&content)
}

pub fn import_csv_str(content: &str) -> Result<(Vec<Flight>, usize)> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let columns: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_column(&normalize_header(h)))
        .collect();

    if REQUIRED.iter().any(|req| !columns.contains(&Some(*req))) {
        let found: Vec<&str> = headers.iter().collect();
        return Err(Error::Import(format!(
            "missing required columns. Found headers: {:?}. \
             Need: flight no, registration, date, STD, STA.",
            found
        )));
    }

    let mut flights = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(line, error = %e, "skipping unreadable CSV row");
                skipped += 1;
                continue;
            }
        };

        let get = |column: Column| -> &str {
            columns
                .iter()
                .position(|c| *c == Some(column))
                .and_then(|idx| record.get(idx))
                .unwrap_or("")
        };

        match build_flight(&get) {
            Ok(flight) => flights.push(flight),
            Err(e) => {
                tracing::warn!(line, error = %e, "skipping CSV row");
                skipped += 1;
            }
        }
    }

    if flights.is_empty() && skipped > 0 {
        return Err(Error::Import(format!(
            "no valid flights found ({} rows skipped)",
            skipped
        )));
    }
    if flights.is_empty() {
        return Err(Error::Import("file is empty or has no data rows".into()));
    }

    tracing::info!(imported = flights.len(), skipped, "CSV import finished");
    Ok((flights, skipped))
}

fn build_flight<'a>(get: &dyn Fn(Column) -> &'a str) -> Result<Flight> {
    let flight_no = get(Column::FlightNo);
    if flight_no.is_empty() {
        return Err(Error::InvalidValue {
            field: "flight no",
            value: String::new(),
        });
    }
    let registration = get(Column::Registration);
    if registration.is_empty() {
        return Err(Error::InvalidValue {
            field: "registration",
            value: String::new(),
        });
    }
    let date = get(Column::Date);

    // ingestion boundary: malformed times never reach the timeline
    time::parse_time(get(Column::Std))?;
    time::parse_time(get(Column::Sta))?;
    let mut flight = Flight::new(flight_no, registration, date, get(Column::Std), get(Column::Sta))?;

    let number = |column: Column, field: &'static str| -> Result<Option<f64>> {
        let raw = get(column);
        if raw.is_empty() {
            return Ok(None);
        }
        raw.replace(',', ".")
            .parse::<f64>()
            .map(Some)
            .map_err(|_| Error::InvalidValue {
                field,
                value: raw.to_string(),
            })
    };

    if let Some(week) = number(Column::Week, "week")? {
        flight.week_number = week as u32;
    }
    flight.month_number = match number(Column::Month, "month")? {
        Some(month) => month as u32,
        None => month_of(date).unwrap_or(1),
    };
    flight.day = get(Column::Day).to_string();
    flight.adep = get(Column::Adep).to_string();
    flight.ades = get(Column::Ades).to_string();
    if !get(Column::Status).is_empty() {
        flight.status = get(Column::Status).parse()?;
    }
    if !get(Column::FlightType).is_empty() {
        flight.flight_type = get(Column::FlightType).parse()?;
    }
    if !get(Column::Positioning).is_empty() {
        flight.flight_positioning = get(Column::Positioning).parse()?;
    }
    flight.operator = get(Column::Operator).to_string();
    flight.client_name = get(Column::Client).to_string();
    flight.contract_id = get(Column::Contract).to_string();
    flight.revenue = number(Column::Revenue, "revenue")?.unwrap_or(0.0);
    flight.total_capacity = number(Column::TotalCapacity, "capacity")?.unwrap_or(0.0) as u32;
    flight.capacity_used = number(Column::CapacityUsed, "capacity used")?.unwrap_or(0.0) as u32;
    flight.capacity_available = flight.total_capacity.saturating_sub(flight.capacity_used);
    Ok(flight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FlightPositioning, FlightStatus};

    #[test_log::test]
    fn test_semicolon_file_with_loose_headers() {
        let csv = "Flight No;Registration;Date;STD;STA;Status;Positioning;Revenue;Capacity;Used\n\
                   ROM101;YR-ABC;15/01;06:00;09:15;AOG;ferry flight;42000,50;100;75\n";
        let (flights, skipped) = import_csv_str(csv).unwrap();
        assert_eq!(skipped, 0);
        let f = &flights[0];
        assert_eq!(f.flight_no, "ROM101");
        assert_eq!((f.std.as_str(), f.sta.as_str()), ("06:00", "09:15"));
        assert_eq!(f.status, FlightStatus::Aog);
        assert_eq!(f.flight_positioning, FlightPositioning::FerryFlight);
        assert_eq!(f.revenue, 42000.5);
        assert_eq!(f.capacity_available, 25);
        assert_eq!(f.month_number, 1);
    }

    #[test_log::test]
    fn test_malformed_times_are_skipped() {
        let csv = "flight,reg,date,std,sta\n\
                   A1,YR-ABC,15/01,6:00,09:00\n\
                   A2,YR-ABC,15/01,24:00,09:00\n\
                   A3,YR-ABC,15/01,22:00,02:00\n";
        let (flights, skipped) = import_csv_str(csv).unwrap();
        assert_eq!(skipped, 2);
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].flight_no, "A3");
    }

    #[test]
    fn test_missing_required_column() {
        let err = import_csv_str("flight,reg,date,std\nA1,YR,15/01,06:00\n").unwrap_err();
        assert!(matches!(err, Error::Import(_)));
    }

    #[test]
    fn test_all_rows_invalid() {
        let err = import_csv_str("flight\treg\tdate\tstd\tsta\n\tYR\t15/01\t06:00\t07:00\n")
            .unwrap_err();
        assert!(err.to_string().contains("1 rows skipped"));
    }

    #[test]
    fn test_month_from_date_label() {
        assert_eq!(month_of("03/02"), Some(2));
        assert_eq!(month_of("03.11.2025"), Some(11));
        assert_eq!(month_of("next week"), None);
    }
}
