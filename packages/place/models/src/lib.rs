#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place identity and record types.
//!
//! A [`RawPlaceRecord`] is what the scraping layer hands over: every field
//! is the untouched text pulled off the page. The normalizer turns it into
//! a typed [`PlaceRecord`], which is what reconciliation mutates and what
//! persistence finally receives.

use livability_crime_models::{CrimeField, CrimeVector};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Identity and location of a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Stable key derived from the source URL slug
    /// (e.g. `"north-bethesda-montgomery-md"`).
    pub unique_name: String,
    /// Human-readable label (e.g. `"North Bethesda, Montgomery, MD"`).
    pub name: String,
    /// Full state name (e.g. `"Maryland"`).
    pub state: String,
    /// Latitude, `None` until geocoded.
    pub latitude: Option<f64>,
    /// Longitude, `None` until geocoded.
    pub longitude: Option<f64>,
    /// Median household income in whole dollars.
    pub median_household_income: Option<u64>,
}

impl Place {
    /// Returns the coordinates if both latitude and longitude are known.
    #[must_use]
    pub const fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// Housing cost figures for a place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wealth {
    /// Median home value in dollars.
    pub median_home_value: Option<f64>,
    /// Median monthly rent in dollars.
    pub median_rent: Option<f64>,
}

/// A fully typed place row: identity, wealth and crime rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    /// Identity and location.
    pub place: Place,
    /// Housing cost figures.
    pub wealth: Wealth,
    /// Crime rates per 100k, possibly partially missing.
    pub crimes: CrimeVector,
}

impl PlaceRecord {
    /// Shorthand for `self.place.unique_name`.
    #[must_use]
    pub fn unique_name(&self) -> &str {
        &self.place.unique_name
    }

    /// Shorthand for `self.place.state`.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.place.state
    }
}

/// One untouched row from the scraping layer.
///
/// Every field is optional text; nothing here has been validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPlaceRecord {
    /// Display name as scraped.
    pub name: Option<String>,
    /// Source listing URL the row was scraped from.
    pub link: Option<String>,
    /// Pre-computed slug key, used when `link` is unavailable.
    pub unique_name: Option<String>,
    /// State, either a two-letter abbreviation or a full name.
    pub state: Option<String>,
    /// Latitude as text.
    pub latitude: Option<String>,
    /// Longitude as text.
    pub longitude: Option<String>,
    /// Median household income (e.g. `"$85,000"`).
    pub median_household_income: Option<String>,
    /// Median home value (e.g. `"$412,300"`).
    pub median_home_value: Option<String>,
    /// Median monthly rent (e.g. `"$1,870"`).
    pub median_rent: Option<String>,
    /// Assault rate per 100k.
    pub assault: Option<String>,
    /// Murder rate per 100k.
    pub murder: Option<String>,
    /// Rape rate per 100k.
    pub rape: Option<String>,
    /// Robbery rate per 100k.
    pub robbery: Option<String>,
    /// Burglary rate per 100k.
    pub burglary: Option<String>,
    /// Theft rate per 100k.
    pub theft: Option<String>,
    /// Motor vehicle theft rate per 100k.
    pub motor_vehicle_theft: Option<String>,
}

impl RawPlaceRecord {
    /// Returns the raw text for a crime field.
    #[must_use]
    pub fn crime(&self, field: CrimeField) -> Option<&str> {
        match field {
            CrimeField::Assault => self.assault.as_deref(),
            CrimeField::Murder => self.murder.as_deref(),
            CrimeField::Rape => self.rape.as_deref(),
            CrimeField::Robbery => self.robbery.as_deref(),
            CrimeField::Burglary => self.burglary.as_deref(),
            CrimeField::Theft => self.theft.as_deref(),
            CrimeField::MotorVehicleTheft => self.motor_vehicle_theft.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(latitude: Option<f64>, longitude: Option<f64>) -> Place {
        Place {
            unique_name: "bethesda-montgomery-md".to_string(),
            name: "Bethesda, Montgomery, MD".to_string(),
            state: "Maryland".to_string(),
            latitude,
            longitude,
            median_household_income: Some(150_000),
        }
    }

    #[test]
    fn coordinates_require_both_axes() {
        assert!(place(Some(38.98), None).coordinates().is_none());
        assert!(place(None, Some(-77.1)).coordinates().is_none());

        let coords = place(Some(38.98), Some(-77.1)).coordinates().unwrap();
        assert!((coords.latitude - 38.98).abs() < f64::EPSILON);
        assert!((coords.longitude - -77.1).abs() < f64::EPSILON);
    }

    #[test]
    fn raw_crime_lookup_maps_every_field() {
        let raw = RawPlaceRecord {
            motor_vehicle_theft: Some("no data".to_string()),
            assault: Some("210.4".to_string()),
            ..RawPlaceRecord::default()
        };
        assert_eq!(raw.crime(CrimeField::Assault), Some("210.4"));
        assert_eq!(raw.crime(CrimeField::MotorVehicleTheft), Some("no data"));
        assert_eq!(raw.crime(CrimeField::Theft), None);
    }
}
