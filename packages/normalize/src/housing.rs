//! Table-level completion of housing cost figures.
//!
//! A place missing exactly one of median rent / median home value gets it
//! estimated from the other through the table-wide mean rent-to-value ratio.

use livability_place_models::PlaceRecord;

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean of `rent / home_value` over rows where both are present and the
/// home value is positive.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_rent_to_value_ratio(records: &[PlaceRecord]) -> Option<f64> {
    let ratios: Vec<f64> = records
        .iter()
        .filter_map(|r| match (r.wealth.median_rent, r.wealth.median_home_value) {
            (Some(rent), Some(value)) if value > 0.0 => Some(rent / value),
            _ => None,
        })
        .collect();

    if ratios.is_empty() {
        return None;
    }
    Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
}

/// Fills whichever of rent / home value is missing when the other one is
/// present. Rows missing both are left untouched.
///
/// Returns the number of values filled.
pub fn fill_missing_housing_values(records: &mut [PlaceRecord]) -> usize {
    let Some(ratio) = mean_rent_to_value_ratio(records) else {
        log::debug!("No rows with both rent and home value; skipping housing fill");
        return 0;
    };
    if ratio <= 0.0 {
        return 0;
    }

    let mut filled = 0;
    for record in records.iter_mut() {
        let wealth = &mut record.wealth;
        match (wealth.median_rent, wealth.median_home_value) {
            (Some(rent), None) => {
                wealth.median_home_value = Some(round_cents(rent / ratio));
                filled += 1;
            }
            (None, Some(value)) => {
                wealth.median_rent = Some(round_cents(value * ratio));
                filled += 1;
            }
            _ => {}
        }
    }

    log::info!("Filled {filled} housing values (mean rent/value ratio {ratio:.5})");
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use livability_crime_models::CrimeVector;
    use livability_place_models::{Place, Wealth};

    fn record(rent: Option<f64>, value: Option<f64>) -> PlaceRecord {
        PlaceRecord {
            place: Place {
                unique_name: "x-md".to_string(),
                name: "X, MD".to_string(),
                state: "Maryland".to_string(),
                latitude: None,
                longitude: None,
                median_household_income: None,
            },
            wealth: Wealth {
                median_home_value: value,
                median_rent: rent,
            },
            crimes: CrimeVector::empty(),
        }
    }

    #[test]
    fn fills_one_sided_rows_from_mean_ratio() {
        let mut records = vec![
            record(Some(1000.0), Some(200_000.0)),
            record(Some(3000.0), Some(200_000.0)),
            record(Some(1500.0), None),
            record(None, Some(100_000.0)),
            record(None, None),
        ];

        let filled = fill_missing_housing_values(&mut records);
        assert_eq!(filled, 2);

        // mean ratio = (0.005 + 0.015) / 2 = 0.01
        assert_eq!(records[2].wealth.median_home_value, Some(150_000.0));
        assert_eq!(records[3].wealth.median_rent, Some(1000.0));
        assert_eq!(records[4].wealth, Wealth::default());
    }

    #[test]
    fn no_complete_rows_means_no_fill() {
        let mut records = vec![record(Some(1500.0), None), record(None, Some(1.0))];
        assert_eq!(fill_missing_housing_values(&mut records), 0);
        assert!(records[0].wealth.median_home_value.is_none());
    }
}
