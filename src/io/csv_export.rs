use std::path::Path;

use crate::error::Result;
use crate::model::Flight;

const HEADER: [&str; 19] = [
    "Flight No",
    "Registration",
    "Date",
    "Day",
    "Week",
    "Month",
    "STD",
    "STA",
    "ADEP",
    "ADES",
    "Status",
    "Flight Type",
    "Positioning",
    "Operator",
    "Client",
    "Contract",
    "Revenue",
    "Capacity",
    "Used",
];

/// Export flights to a semicolon-delimited CSV file matching the import format.
/// Returns the number of flights written.
pub fn export_csv(flights: &[Flight], path: &Path) -> Result<usize> {
    let wtr = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
    write_flights(wtr, flights)
}

pub fn export_csv_string(flights: &[Flight]) -> Result<String> {
    let mut buf = Vec::new();
    let wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(&mut buf);
    write_flights(wtr, flights)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_flights<W: std::io::Write>(mut wtr: csv::Writer<W>, flights: &[Flight]) -> Result<usize> {
    wtr.write_record(HEADER)?;
    for f in flights {
        wtr.write_record([
            f.flight_no.clone(),
            f.registration.clone(),
            f.date.clone(),
            f.day.clone(),
            f.week_number.to_string(),
            f.month_number.to_string(),
            f.std.clone(),
            f.sta.clone(),
            f.adep.clone(),
            f.ades.clone(),
            f.status.as_str().to_string(),
            f.flight_type.as_str().to_string(),
            f.flight_positioning.as_str().to_string(),
            f.operator.clone(),
            f.client_name.clone(),
            f.contract_id.clone(),
            f.revenue.to_string(),
            f.total_capacity.to_string(),
            f.capacity_used.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(flights.len())
}
