//! Baseline ratio model.
//!
//! Expresses a partially-observed crime vector as a multiple of the
//! national baseline and uses that multiple to estimate missing fields.

use livability_crime_models::{
    CrimeField, CrimeSubset, CrimeVector, NationalBaseline, SeverityRatio,
};

/// Mean of `observed / baseline` over the present fields of `subset`.
///
/// A present `0.0` counts towards the denominator but adds nothing to the
/// sum. If every field of `subset` is missing the denominator is floored to
/// 1, so the result is `0.0` rather than a division by zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_ratio(
    vector: &CrimeVector,
    subset: &[CrimeField],
    baseline: &NationalBaseline,
) -> f64 {
    let mut present = 0_usize;
    let mut sum = 0.0;

    for field in subset {
        let Some(value) = vector.get(*field) else {
            continue;
        };
        present += 1;
        if value != 0.0 {
            sum += value / baseline.rate(*field);
        }
    }

    sum / present.max(1) as f64
}

/// Computes both subset ratios from the fields present right now.
#[must_use]
pub fn severity_ratio(vector: &CrimeVector, baseline: &NationalBaseline) -> SeverityRatio {
    SeverityRatio {
        violent_ratio: compute_ratio(vector, CrimeSubset::Violent.fields(), baseline),
        non_violent_ratio: compute_ratio(vector, CrimeSubset::NonViolent.fields(), baseline),
    }
}

/// Returns a copy of `vector` with every missing field of `subset` set to
/// `ratio * baseline[field]`. Present fields are untouched.
#[must_use]
pub fn fill_from_ratio(
    vector: &CrimeVector,
    subset: &[CrimeField],
    ratio: f64,
    baseline: &NationalBaseline,
) -> CrimeVector {
    let mut filled = *vector;
    for field in subset {
        filled.fill(*field, ratio * baseline.rate(*field));
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> NationalBaseline {
        NationalBaseline {
            assault: 282.7,
            murder: 6.1,
            rape: 40.7,
            robbery: 135.5,
            burglary: 500.1,
            theft: 2042.8,
            motor_vehicle_theft: 284.0,
        }
    }

    #[test]
    fn doubled_assault_gives_ratio_two_and_fills_murder() {
        let subset = [CrimeField::Assault, CrimeField::Murder];
        let mut vector = CrimeVector::empty();
        vector.set(CrimeField::Assault, Some(565.4));

        let ratio = compute_ratio(&vector, &subset, &baseline());
        assert!((ratio - 2.0).abs() < 1e-9);

        let filled = fill_from_ratio(&vector, &subset, ratio, &baseline());
        assert!((filled.get(CrimeField::Murder).unwrap() - 12.2).abs() < 1e-9);
        assert_eq!(filled.get(CrimeField::Assault), Some(565.4));
    }

    #[test]
    fn all_missing_subset_gives_zero() {
        let ratio = compute_ratio(
            &CrimeVector::empty(),
            CrimeSubset::Violent.fields(),
            &baseline(),
        );
        assert!(ratio.abs() < f64::EPSILON);
    }

    #[test]
    fn zero_counts_as_present() {
        let mut vector = CrimeVector::empty();
        vector.set(CrimeField::Burglary, Some(1000.2));
        vector.set(CrimeField::Theft, Some(0.0));

        // (1000.2 / 500.1 + 0) / 2 = 1.0
        let ratio = compute_ratio(&vector, CrimeSubset::NonViolent.fields(), &baseline());
        assert!((ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fill_is_idempotent() {
        let mut vector = CrimeVector::empty();
        vector.set(CrimeField::Rape, Some(81.4));
        let subset = CrimeSubset::Violent.fields();

        let once = fill_from_ratio(&vector, subset, 1.5, &baseline());
        let twice = fill_from_ratio(&once, subset, 1.5, &baseline());
        assert_eq!(once, twice);
    }

    #[test]
    fn fill_leaves_other_subset_alone() {
        let filled = fill_from_ratio(
            &CrimeVector::empty(),
            CrimeSubset::Violent.fields(),
            1.0,
            &baseline(),
        );
        assert!(filled.is_subset_empty(CrimeSubset::NonViolent));
        assert!(!filled.is_subset_empty(CrimeSubset::Violent));
    }

    #[test]
    fn severity_ratio_reports_both_subsets() {
        let mut vector = CrimeVector::empty();
        vector.set(CrimeField::Murder, Some(12.2));
        vector.set(CrimeField::Theft, Some(1021.4));

        let ratio = severity_ratio(&vector, &baseline());
        assert!((ratio.violent_ratio - 2.0).abs() < 1e-9);
        assert!((ratio.non_violent_ratio - 0.5).abs() < 1e-9);
    }
}
