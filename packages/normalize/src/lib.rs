#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coercion of raw scraped place rows into typed records.
//!
//! Field values never fail: anything that cannot be read as a number
//! becomes missing (see [`parsing::Parsed`]). Only a row whose identity
//! cannot be established is rejected with a [`NormalizeError`].

pub mod housing;
pub mod parsing;
pub mod slug;
pub mod states;

use livability_crime_models::{CrimeField, CrimeVector};
use livability_place_models::{Place, PlaceRecord, RawPlaceRecord, Wealth};

use crate::parsing::{
    MissingReason, Parsed, parse_amount, parse_dollars, parse_lat_lng_str, parse_rate,
};

/// Errors that reject a whole raw row.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// Neither a link nor a unique name yielded a slug.
    #[error("Row has no usable link or unique name (name: {name:?})")]
    MissingIdentity {
        /// Display name of the row, if any.
        name: Option<String>,
    },
}

/// Counts collected while normalizing a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    /// Rows turned into typed records.
    pub accepted: usize,
    /// Rows rejected for lack of identity.
    pub rejected: usize,
    /// Accepted rows whose state is not one of the 50 states + DC and was
    /// kept as scraped.
    pub unresolved_states: usize,
    /// Crime fields that were blank or held a "no data" marker.
    pub crime_fields_absent: usize,
    /// Crime fields whose text could not be read as a rate.
    pub crime_fields_unparseable: usize,
}

/// Builds the crime vector from a raw row, tallying why fields are missing.
fn crime_vector(raw: &RawPlaceRecord, summary: &mut NormalizeSummary) -> CrimeVector {
    let mut crimes = CrimeVector::empty();
    for field in CrimeField::all() {
        match parse_rate(raw.crime(*field)) {
            Parsed::Present(value) => crimes.set(*field, Some(value)),
            Parsed::Missing(MissingReason::Unparseable) => summary.crime_fields_unparseable += 1,
            Parsed::Missing(_) => summary.crime_fields_absent += 1,
        }
    }
    crimes
}

fn normalize_with_summary(
    raw: &RawPlaceRecord,
    summary: &mut NormalizeSummary,
) -> Result<PlaceRecord, NormalizeError> {
    let unique_name = raw
        .link
        .as_deref()
        .and_then(slug::unique_name_from_link)
        .or_else(|| {
            raw.unique_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_ascii_lowercase)
        })
        .ok_or_else(|| NormalizeError::MissingIdentity {
            name: raw.name.clone(),
        })?;

    let state_text = raw
        .state
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .or_else(|| slug::state_from_slug(&unique_name))
        .unwrap_or_default();
    let state = if let Some(name) = states::canonical_state(&state_text) {
        name.to_string()
    } else {
        summary.unresolved_states += 1;
        log::warn!("{unique_name}: unrecognised state {state_text:?}, keeping it as scraped");
        state_text
    };

    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| slug::name_with_state(&unique_name), ToString::to_string);

    let coordinates = parse_lat_lng_str(raw.latitude.as_deref(), raw.longitude.as_deref());
    if coordinates.is_none() {
        log::debug!("{unique_name}: no usable coordinates");
    }

    let crimes = crime_vector(raw, summary);

    Ok(PlaceRecord {
        place: Place {
            unique_name,
            name,
            state,
            latitude: coordinates.map(|(lat, _)| lat),
            longitude: coordinates.map(|(_, lng)| lng),
            median_household_income: parse_dollars(raw.median_household_income.as_deref())
                .present(),
        },
        wealth: Wealth {
            median_home_value: parse_amount(raw.median_home_value.as_deref()).present(),
            median_rent: parse_amount(raw.median_rent.as_deref()).present(),
        },
        crimes,
    })
}

/// Normalizes a single raw row.
///
/// # Errors
///
/// Returns [`NormalizeError`] if the row has no usable identity. A state
/// outside the 50 states + DC is kept as scraped, not rejected.
pub fn normalize_record(raw: &RawPlaceRecord) -> Result<PlaceRecord, NormalizeError> {
    normalize_with_summary(raw, &mut NormalizeSummary::default())
}

/// Normalizes a whole raw table, dropping (and logging) rejected rows.
#[must_use]
pub fn normalize_table(raw: &[RawPlaceRecord]) -> (Vec<PlaceRecord>, NormalizeSummary) {
    let mut summary = NormalizeSummary::default();
    let mut records = Vec::with_capacity(raw.len());

    for row in raw {
        match normalize_with_summary(row, &mut summary) {
            Ok(record) => {
                summary.accepted += 1;
                records.push(record);
            }
            Err(e) => {
                summary.rejected += 1;
                log::warn!("Skipping row: {e}");
            }
        }
    }

    log::info!(
        "Normalized {} rows ({} rejected, {} unrecognised states, {} crime fields absent, \
         {} unparseable)",
        summary.accepted,
        summary.rejected,
        summary.unresolved_states,
        summary.crime_fields_absent,
        summary.crime_fields_unparseable,
    );

    (records, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_row() -> RawPlaceRecord {
        RawPlaceRecord {
            name: Some("North Bethesda".to_string()),
            link: Some(
                "https://www.niche.com/places-to-live/north-bethesda-montgomery-md/".to_string(),
            ),
            latitude: Some("39.0446".to_string()),
            longitude: Some("-77.1189".to_string()),
            median_household_income: Some("$131,081".to_string()),
            median_home_value: Some("$602,500".to_string()),
            median_rent: Some("$2,152".to_string()),
            assault: Some("96.4".to_string()),
            murder: Some("0".to_string()),
            rape: Some("no data".to_string()),
            robbery: Some("52.3".to_string()),
            burglary: Some("n/a".to_string()),
            theft: Some("1,204.0".to_string()),
            motor_vehicle_theft: Some("??".to_string()),
            ..RawPlaceRecord::default()
        }
    }

    #[test]
    fn normalizes_full_row() {
        let record = normalize_record(&raw_row()).unwrap();
        assert_eq!(record.unique_name(), "north-bethesda-montgomery-md");
        assert_eq!(record.state(), "Maryland");
        assert_eq!(record.place.name, "North Bethesda");
        assert_eq!(record.place.median_household_income, Some(131_081));
        assert_eq!(record.wealth.median_rent, Some(2152.0));
        assert!(record.place.coordinates().is_some());

        assert_eq!(record.crimes.get(CrimeField::Murder), Some(0.0));
        assert_eq!(record.crimes.get(CrimeField::Theft), Some(1204.0));
        assert_eq!(record.crimes.get(CrimeField::Rape), None);
        assert_eq!(record.crimes.get(CrimeField::MotorVehicleTheft), None);
    }

    #[test]
    fn falls_back_to_unique_name_and_explicit_state() {
        let raw = RawPlaceRecord {
            unique_name: Some("Austin-TX".to_string()),
            state: Some("Texas".to_string()),
            ..RawPlaceRecord::default()
        };
        let record = normalize_record(&raw).unwrap();
        assert_eq!(record.unique_name(), "austin-tx");
        assert_eq!(record.state(), "Texas");
        assert_eq!(record.place.name, "Austin, TX");
        assert!(record.place.coordinates().is_none());
    }

    #[test]
    fn rejects_row_without_identity() {
        let err = normalize_record(&RawPlaceRecord::default()).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingIdentity { .. }));
    }

    #[test]
    fn unknown_state_keeps_row_and_its_data() {
        let raw = RawPlaceRecord {
            link: Some("https://www.niche.com/places-to-live/san-juan-pr/".to_string()),
            assault: Some("300.0".to_string()),
            ..RawPlaceRecord::default()
        };
        let austin = RawPlaceRecord {
            link: Some("https://www.niche.com/places-to-live/austin-travis-tx/".to_string()),
            ..RawPlaceRecord::default()
        };

        let (records, summary) = normalize_table(&[raw, austin]);

        assert_eq!(records.len(), 2);
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.unresolved_states, 1);
        assert_eq!(records[0].unique_name(), "san-juan-pr");
        assert_eq!(records[0].state(), "PR");
        assert_eq!(records[0].crimes.get(CrimeField::Assault), Some(300.0));
        assert_eq!(records[1].state(), "Texas");
    }

    #[test]
    fn unknown_explicit_state_is_kept_trimmed() {
        let raw = RawPlaceRecord {
            unique_name: Some("somewhere".to_string()),
            state: Some("  Guam ".to_string()),
            ..RawPlaceRecord::default()
        };
        let record = normalize_record(&raw).unwrap();
        assert_eq!(record.state(), "Guam");
    }

    #[test]
    fn table_summary_counts_missing_reasons() {
        let (records, summary) = normalize_table(&[raw_row(), RawPlaceRecord::default()]);
        assert_eq!(records.len(), 1);
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.crime_fields_absent, 2);
        assert_eq!(summary.crime_fields_unparseable, 1);
    }
}
