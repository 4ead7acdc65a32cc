//! Merge of an alternate source's crime rates into the primary table.
//!
//! The alternate scraper is run by the driver; this only folds its
//! normalized rows into the fields the primary source left missing.

use std::collections::BTreeMap;

use livability_crime_models::CrimeVector;
use livability_place_models::PlaceRecord;

/// Fills missing crime fields in `table` from the `secondary` row with the
/// same `unique_name`. Present fields are never overwritten.
///
/// If `secondary` contains a key more than once, the first row wins.
/// Returns the number of fields filled.
pub fn merge_secondary(table: &mut [PlaceRecord], secondary: &[PlaceRecord]) -> usize {
    let mut by_name: BTreeMap<&str, &CrimeVector> = BTreeMap::new();
    for record in secondary {
        by_name.entry(record.unique_name()).or_insert(&record.crimes);
    }

    let mut filled = 0;
    let mut places = 0;
    for record in table.iter_mut() {
        if record.crimes.is_complete() {
            continue;
        }
        let Some(crimes) = by_name.get(record.unique_name()) else {
            continue;
        };
        let n = record.crimes.fill_from(crimes);
        if n > 0 {
            places += 1;
            filled += n;
        }
    }

    log::info!("Secondary source filled {filled} crime fields across {places} places");
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use livability_crime_models::CrimeField;
    use livability_place_models::{Place, Wealth};

    fn record(name: &str, crimes: CrimeVector) -> PlaceRecord {
        PlaceRecord {
            place: Place {
                unique_name: name.to_string(),
                name: name.to_string(),
                state: "Texas".to_string(),
                latitude: None,
                longitude: None,
                median_household_income: None,
            },
            wealth: Wealth::default(),
            crimes,
        }
    }

    #[test]
    fn fills_only_missing_fields_of_matching_rows() {
        let mut primary = CrimeVector::empty();
        primary.set(CrimeField::Assault, Some(100.0));
        let mut table = vec![record("austin-tx", primary), record("waco-tx", CrimeVector::empty())];

        let mut alt = CrimeVector::empty();
        alt.set(CrimeField::Assault, Some(999.0));
        alt.set(CrimeField::Murder, Some(4.0));
        let secondary = vec![record("austin-tx", alt), record("dallas-tx", alt)];

        assert_eq!(merge_secondary(&mut table, &secondary), 1);
        assert_eq!(table[0].crimes.get(CrimeField::Assault), Some(100.0));
        assert_eq!(table[0].crimes.get(CrimeField::Murder), Some(4.0));
        assert!(table[1].crimes.is_subset_empty(livability_crime_models::CrimeSubset::Violent));
    }
}
