//! Geo-neighbor resolver.
//!
//! Finds nearby places in the same state and picks at most one of them to
//! donate its observed crime rates to a place that is missing some.

use geo::{Distance, Haversine, Point};
use livability_crime_models::CrimeVector;
use livability_place_models::{Coordinates, PlaceRecord};

/// Why tier-3 donation could not be attempted for a place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NeighborError {
    /// The target has no coordinates, so no distance can be computed.
    #[error("{unique_name} has no coordinates")]
    MissingCoordinates {
        /// Slug of the target place.
        unique_name: String,
    },

    /// The target has no income, so no donor can pass the wealth gate.
    #[error("{unique_name} has no median household income")]
    MissingIncome {
        /// Slug of the target place.
        unique_name: String,
    },

    /// The target index is outside the table.
    #[error("No place at index {index}")]
    UnknownPlace {
        /// Requested index.
        index: usize,
    },
}

/// A nearby place, identified by its index in the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Index of the candidate in the table passed to [`find_candidates`].
    pub index: usize,
    /// Great-circle distance from the target in kilometres.
    pub distance_km: f64,
}

/// A chosen donor together with the vector it donates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Donation {
    /// Index of the donor in the table.
    pub donor: usize,
    /// Distance from the recipient in kilometres.
    pub distance_km: f64,
    /// The donor's complete crime vector.
    pub crimes: CrimeVector,
}

/// Result of a donation attempt that was able to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DonationOutcome {
    /// A donor was found and `fields_filled` missing fields were copied.
    Donated {
        /// Index of the donor in the table.
        donor: usize,
        /// Distance from the recipient in kilometres.
        distance_km: f64,
        /// Number of recipient fields that were filled.
        fields_filled: usize,
    },
    /// No candidate had a complete vector and enough income.
    NoQualifyingDonor,
    /// The recipient had no missing fields to begin with.
    AlreadyComplete,
}

/// Great-circle distance between two coordinates in kilometres.
#[must_use]
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let a = Point::new(a.longitude, a.latitude);
    let b = Point::new(b.longitude, b.latitude);
    Haversine.distance(a, b) / 1000.0
}

/// Lists places in the same state as `places[target]` lying strictly
/// within `radius_km`, closest first.
///
/// Candidates without coordinates are skipped. Equal distances keep their
/// table order.
///
/// # Errors
///
/// Returns [`NeighborError`] if `target` is out of range or has no
/// coordinates.
pub fn find_candidates(
    places: &[PlaceRecord],
    target: usize,
    radius_km: f64,
) -> Result<Vec<Candidate>, NeighborError> {
    let record = places
        .get(target)
        .ok_or(NeighborError::UnknownPlace { index: target })?;
    let origin = record
        .place
        .coordinates()
        .ok_or_else(|| NeighborError::MissingCoordinates {
            unique_name: record.unique_name().to_string(),
        })?;

    let mut candidates: Vec<Candidate> = places
        .iter()
        .enumerate()
        .filter(|(index, other)| *index != target && other.state() == record.state())
        .filter_map(|(index, other)| {
            let coords = other.place.coordinates()?;
            let distance_km = haversine_km(origin, coords);
            (distance_km < radius_km).then_some(Candidate { index, distance_km })
        })
        .collect();

    candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    Ok(candidates)
}

/// Picks the first candidate whose crime vector is complete and whose
/// income exceeds `target income * wealth_threshold`.
///
/// Candidates that fail either check, or have no income, are skipped.
///
/// # Errors
///
/// Returns [`NeighborError::MissingIncome`] if the target has no income.
#[allow(clippy::cast_precision_loss)]
pub fn select_donor(
    target: &PlaceRecord,
    candidates: &[Candidate],
    places: &[PlaceRecord],
    wealth_threshold: f64,
) -> Result<Option<Donation>, NeighborError> {
    let income = target
        .place
        .median_household_income
        .ok_or_else(|| NeighborError::MissingIncome {
            unique_name: target.unique_name().to_string(),
        })?;
    let min_income = income as f64 * wealth_threshold;

    for candidate in candidates {
        let Some(donor) = places.get(candidate.index) else {
            continue;
        };
        if !donor.crimes.is_complete() {
            continue;
        }
        let Some(donor_income) = donor.place.median_household_income else {
            continue;
        };
        if donor_income as f64 > min_income {
            return Ok(Some(Donation {
                donor: candidate.index,
                distance_km: candidate.distance_km,
                crimes: donor.crimes,
            }));
        }
    }

    Ok(None)
}

/// Copies a donation into the missing fields of `target`.
///
/// Returns the number of fields filled.
pub fn apply_donation(target: &mut CrimeVector, donation: &Donation) -> usize {
    target.fill_from(&donation.crimes)
}

/// Selects a donor for `target` from `candidates` and copies its vector
/// into every field `target` is still missing.
///
/// # Errors
///
/// Returns [`NeighborError::MissingIncome`] if the target has no income.
pub fn donate_crime_data(
    target: &mut PlaceRecord,
    candidates: &[Candidate],
    places: &[PlaceRecord],
    wealth_threshold: f64,
) -> Result<DonationOutcome, NeighborError> {
    if target.crimes.is_complete() {
        return Ok(DonationOutcome::AlreadyComplete);
    }

    Ok(
        match select_donor(target, candidates, places, wealth_threshold)? {
            Some(donation) => DonationOutcome::Donated {
                donor: donation.donor,
                distance_km: donation.distance_km,
                fields_filled: apply_donation(&mut target.crimes, &donation),
            },
            None => DonationOutcome::NoQualifyingDonor,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use livability_crime_models::CrimeField;
    use livability_place_models::{Place, Wealth};

    /// Roughly 1 km of latitude.
    const KM_LAT: f64 = 1.0 / 111.195;

    fn record(
        name: &str,
        state: &str,
        lat: Option<f64>,
        income: Option<u64>,
        crimes: CrimeVector,
    ) -> PlaceRecord {
        PlaceRecord {
            place: Place {
                unique_name: name.to_string(),
                name: name.to_string(),
                state: state.to_string(),
                latitude: lat,
                longitude: lat.map(|_| -77.0),
                median_household_income: income,
            },
            wealth: Wealth::default(),
            crimes,
        }
    }

    fn complete(value: f64) -> CrimeVector {
        CrimeVector::from_values([Some(value); CrimeField::COUNT])
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = Coordinates {
            latitude: 38.9072,
            longitude: -77.0369,
        };
        let b = Coordinates {
            latitude: 39.2904,
            longitude: -76.6122,
        };
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
        assert!(haversine_km(a, a).abs() < 1e-9);
        // Washington DC to Baltimore is ~56 km.
        assert!((haversine_km(a, b) - 56.0).abs() < 2.0);
    }

    #[test]
    fn candidates_are_filtered_by_state_and_radius() {
        let places = vec![
            record("target", "Maryland", Some(39.0), Some(100_000), CrimeVector::empty()),
            record("near", "Maryland", Some(39.0 + 2.0 * KM_LAT), None, complete(1.0)),
            record("far", "Maryland", Some(39.0 + 6.0 * KM_LAT), None, complete(1.0)),
            record("other-state", "Virginia", Some(39.0 + KM_LAT), None, complete(1.0)),
            record("no-coords", "Maryland", None, None, complete(1.0)),
        ];

        let candidates = find_candidates(&places, 0, 5.0).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].index, 1);
        assert!((candidates[0].distance_km - 2.0).abs() < 0.01);
        assert!(candidates.iter().all(|c| c.distance_km < 5.0));
    }

    #[test]
    fn candidate_exactly_at_radius_is_excluded() {
        let places = vec![
            record("target", "Maryland", Some(39.0), Some(100_000), CrimeVector::empty()),
            record("edge", "Maryland", Some(39.0 + 3.0 * KM_LAT), None, complete(1.0)),
        ];
        let (a, b) = (
            places[0].place.coordinates().unwrap(),
            places[1].place.coordinates().unwrap(),
        );
        let d = haversine_km(a, b);

        assert!(find_candidates(&places, 0, d).unwrap().is_empty());
        let inside = find_candidates(&places, 0, d + 1e-6).unwrap();
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].index, 1);
    }

    #[test]
    fn candidates_are_sorted_closest_first() {
        let places = vec![
            record("target", "Maryland", Some(39.0), Some(100_000), CrimeVector::empty()),
            record("three", "Maryland", Some(39.0 + 3.0 * KM_LAT), None, complete(3.0)),
            record("one", "Maryland", Some(39.0 - KM_LAT), None, complete(1.0)),
        ];
        let indices: Vec<usize> = find_candidates(&places, 0, 5.0)
            .unwrap()
            .iter()
            .map(|c| c.index)
            .collect();
        assert_eq!(indices, vec![2, 1]);
    }

    #[test]
    fn missing_target_coordinates_is_an_error() {
        let places = vec![record("target", "Maryland", None, Some(1), CrimeVector::empty())];
        assert!(matches!(
            find_candidates(&places, 0, 5.0),
            Err(NeighborError::MissingCoordinates { .. })
        ));
        assert!(matches!(
            find_candidates(&places, 3, 5.0),
            Err(NeighborError::UnknownPlace { index: 3 })
        ));
    }

    #[test]
    fn donation_passes_income_gate() {
        let places = vec![
            record("target", "Maryland", Some(39.0), Some(100_000), CrimeVector::empty()),
            record("donor", "Maryland", Some(39.0 + 2.0 * KM_LAT), Some(90_000), complete(7.0)),
        ];
        let candidates = find_candidates(&places, 0, 5.0).unwrap();
        let mut target = places[0].clone();

        let outcome = donate_crime_data(&mut target, &candidates, &places, 0.8).unwrap();
        assert!(matches!(
            outcome,
            DonationOutcome::Donated {
                donor: 1,
                fields_filled: 7,
                ..
            }
        ));
        assert!(target.crimes.is_complete());
        assert_eq!(target.crimes.get(CrimeField::Theft), Some(7.0));
    }

    #[test]
    fn donation_skips_poorer_donor() {
        let places = vec![
            record("target", "Maryland", Some(39.0), Some(100_000), CrimeVector::empty()),
            record("donor", "Maryland", Some(39.0 + 2.0 * KM_LAT), Some(79_000), complete(7.0)),
        ];
        let candidates = find_candidates(&places, 0, 5.0).unwrap();
        let donation = select_donor(&places[0], &candidates, &places, 0.8).unwrap();
        assert!(donation.is_none());
    }

    #[test]
    fn income_exactly_at_threshold_is_skipped() {
        let places = vec![
            record("target", "Maryland", Some(39.0), Some(100_000), CrimeVector::empty()),
            record("donor", "Maryland", Some(39.0 + KM_LAT), Some(80_000), complete(7.0)),
        ];
        let candidates = find_candidates(&places, 0, 5.0).unwrap();
        assert!(
            select_donor(&places[0], &candidates, &places, 0.8)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn partial_donor_is_skipped_for_next_complete_one() {
        let mut partial = complete(1.0);
        partial.set(CrimeField::Rape, None);
        let places = vec![
            record("target", "Maryland", Some(39.0), Some(100_000), CrimeVector::empty()),
            record("partial", "Maryland", Some(39.0 + KM_LAT), Some(120_000), partial),
            record("full", "Maryland", Some(39.0 + 3.0 * KM_LAT), Some(120_000), complete(3.0)),
        ];
        let candidates = find_candidates(&places, 0, 5.0).unwrap();
        let donation = select_donor(&places[0], &candidates, &places, 0.8)
            .unwrap()
            .unwrap();
        assert_eq!(donation.donor, 2);
    }

    #[test]
    fn closest_qualifying_donor_wins() {
        let places = vec![
            record("target", "Maryland", Some(39.0), Some(100_000), CrimeVector::empty()),
            record("three", "Maryland", Some(39.0 + 3.0 * KM_LAT), Some(100_000), complete(3.0)),
            record("one", "Maryland", Some(39.0 + KM_LAT), Some(100_000), complete(1.0)),
        ];
        let candidates = find_candidates(&places, 0, 5.0).unwrap();
        let donation = select_donor(&places[0], &candidates, &places, 0.8)
            .unwrap()
            .unwrap();
        assert_eq!(donation.donor, 2);
        assert!((donation.distance_km - 1.0).abs() < 0.01);
    }

    #[test]
    fn donation_never_overwrites_present_fields() {
        let mut partial = CrimeVector::empty();
        partial.set(CrimeField::Murder, Some(0.0));
        let places = vec![
            record("target", "Maryland", Some(39.0), Some(100_000), partial),
            record("donor", "Maryland", Some(39.0 + KM_LAT), Some(100_000), complete(9.0)),
        ];
        let candidates = find_candidates(&places, 0, 5.0).unwrap();
        let mut target = places[0].clone();

        let outcome = donate_crime_data(&mut target, &candidates, &places, 0.8).unwrap();
        assert!(matches!(
            outcome,
            DonationOutcome::Donated {
                fields_filled: 6,
                ..
            }
        ));
        assert_eq!(target.crimes.get(CrimeField::Murder), Some(0.0));
    }

    #[test]
    fn target_without_income_cannot_receive() {
        let places = vec![
            record("target", "Maryland", Some(39.0), None, CrimeVector::empty()),
            record("donor", "Maryland", Some(39.0 + KM_LAT), Some(100_000), complete(9.0)),
        ];
        let candidates = find_candidates(&places, 0, 5.0).unwrap();
        assert!(matches!(
            select_donor(&places[0], &candidates, &places, 0.8),
            Err(NeighborError::MissingIncome { .. })
        ));
    }
}
