//! CSV input and output for place tables.
//!
//! Input is the scraping layer's export: every column is text and any
//! column may be absent. Output is one flat row per place; the whole file
//! is rewritten on every run.

use std::path::Path;

use livability_crime_models::{CrimeField, CrimeVector};
use livability_place_models::{PlaceRecord, RawPlaceRecord};
use serde::Serialize;

/// Errors raised while reading or writing a place table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Opening or creating the file failed.
    #[error("Failed to open {path}: {source}")]
    Io {
        /// File that could not be opened.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A row could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One output row: identity, wealth and the seven crime rates.
///
/// Crime columns are empty only in `normalize` output; after reconciliation
/// every one of them is populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceRow {
    pub unique_name: String,
    pub name: String,
    pub state: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub median_household_income: Option<u64>,
    pub median_home_value: Option<f64>,
    pub median_rent: Option<f64>,
    pub assault: Option<f64>,
    pub murder: Option<f64>,
    pub rape: Option<f64>,
    pub robbery: Option<f64>,
    pub burglary: Option<f64>,
    pub theft: Option<f64>,
    pub motor_vehicle_theft: Option<f64>,
}

impl From<&PlaceRecord> for PlaceRow {
    fn from(record: &PlaceRecord) -> Self {
        let crimes: &CrimeVector = &record.crimes;
        Self {
            unique_name: record.place.unique_name.clone(),
            name: record.place.name.clone(),
            state: record.place.state.clone(),
            latitude: record.place.latitude,
            longitude: record.place.longitude,
            median_household_income: record.place.median_household_income,
            median_home_value: record.wealth.median_home_value,
            median_rent: record.wealth.median_rent,
            assault: crimes.get(CrimeField::Assault),
            murder: crimes.get(CrimeField::Murder),
            rape: crimes.get(CrimeField::Rape),
            robbery: crimes.get(CrimeField::Robbery),
            burglary: crimes.get(CrimeField::Burglary),
            theft: crimes.get(CrimeField::Theft),
            motor_vehicle_theft: crimes.get(CrimeField::MotorVehicleTheft),
        }
    }
}

fn open_error(path: &Path, source: std::io::Error) -> TableError {
    TableError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Reads raw rows from any reader producing CSV with a header row.
///
/// Columns are matched by header name; unknown columns are ignored and
/// absent ones read as missing.
///
/// # Errors
///
/// Returns [`TableError::Csv`] if a row is malformed.
pub fn read_raw_from<R: std::io::Read>(reader: R) -> Result<Vec<RawPlaceRecord>, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Reads raw rows from a CSV file.
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be opened or a row is
/// malformed.
pub fn read_raw(path: &Path) -> Result<Vec<RawPlaceRecord>, TableError> {
    let file = std::fs::File::open(path).map_err(|e| open_error(path, e))?;
    let rows = read_raw_from(file)?;
    log::info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Writes records as CSV to any writer.
///
/// # Errors
///
/// Returns [`TableError::Csv`] if a row cannot be written.
pub fn write_records_to<W: std::io::Write>(
    writer: W,
    records: &[PlaceRecord],
) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(PlaceRow::from(record))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Replaces the file at `path` with `records`.
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be created or written.
pub fn write_records(path: &Path, records: &[PlaceRecord]) -> Result<(), TableError> {
    let file = std::fs::File::create(path).map_err(|e| open_error(path, e))?;
    write_records_to(file, records)?;
    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use livability_place_models::{Place, Wealth};

    #[test]
    fn reads_rows_by_header_with_missing_columns() {
        let csv_text = "name,link,assault,theft,extra\n\
                        Austin,https://www.niche.com/places-to-live/austin-travis-tx/,210.4,no data,x\n\
                        Waco,,,,\n";
        let rows = read_raw_from(csv_text.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name.as_deref(), Some("Austin"));
        assert_eq!(rows[0].assault.as_deref(), Some("210.4"));
        assert_eq!(rows[0].theft.as_deref(), Some("no data"));
        assert_eq!(rows[0].murder, None);
        assert_eq!(rows[1].link, None);
    }

    #[test]
    fn writes_missing_values_as_empty_cells() {
        let mut crimes = CrimeVector::empty();
        crimes.set(CrimeField::Murder, Some(0.0));
        let record = PlaceRecord {
            place: Place {
                unique_name: "austin-travis-tx".to_string(),
                name: "Austin, Travis, TX".to_string(),
                state: "Texas".to_string(),
                latitude: Some(30.27),
                longitude: Some(-97.74),
                median_household_income: Some(85_000),
            },
            wealth: Wealth::default(),
            crimes,
        };

        let mut out = Vec::new();
        write_records_to(&mut out, &[record]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some(
                "unique_name,name,state,latitude,longitude,median_household_income,\
                 median_home_value,median_rent,assault,murder,rape,robbery,burglary,\
                 theft,motor_vehicle_theft"
            )
        );
        assert_eq!(
            lines.next(),
            Some("austin-travis-tx,\"Austin, Travis, TX\",Texas,30.27,-97.74,85000,,,,0.0,,,,,")
        );
    }
}
