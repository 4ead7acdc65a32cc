#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime rate field taxonomy and national baseline types.
//!
//! This crate defines the seven per-100k crime rate fields tracked for every
//! place, the fixed violent / non-violent groupings, the partially-observed
//! [`CrimeVector`] that flows through reconciliation, and the
//! [`NationalBaseline`] that every rate is normalized against.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the seven crime rate fields tracked per place.
///
/// Each rate is expressed per 100k population.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CrimeField {
    /// Aggravated assault
    Assault,
    /// Murder and non-negligent manslaughter
    Murder,
    /// Rape
    Rape,
    /// Robbery
    Robbery,
    /// Burglary
    Burglary,
    /// Larceny-theft
    Theft,
    /// Motor vehicle theft
    MotorVehicleTheft,
}

impl CrimeField {
    /// Number of tracked crime fields.
    pub const COUNT: usize = 7;

    /// Returns the position of this field inside a [`CrimeVector`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the subset this field belongs to.
    #[must_use]
    pub const fn subset(self) -> CrimeSubset {
        match self {
            Self::Assault | Self::Murder | Self::Rape | Self::Robbery => CrimeSubset::Violent,
            Self::Burglary | Self::Theft | Self::MotorVehicleTheft => CrimeSubset::NonViolent,
        }
    }

    /// Returns all variants of this enum, in vector order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Assault,
            Self::Murder,
            Self::Rape,
            Self::Robbery,
            Self::Burglary,
            Self::Theft,
            Self::MotorVehicleTheft,
        ]
    }
}

/// The two fixed groupings of crime fields used for severity ratios.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CrimeSubset {
    /// Assault, murder, rape, robbery
    Violent,
    /// Burglary, theft, motor vehicle theft
    NonViolent,
}

impl CrimeSubset {
    /// Returns the fields that make up this subset.
    #[must_use]
    pub const fn fields(self) -> &'static [CrimeField] {
        match self {
            Self::Violent => &[
                CrimeField::Assault,
                CrimeField::Murder,
                CrimeField::Rape,
                CrimeField::Robbery,
            ],
            Self::NonViolent => &[
                CrimeField::Burglary,
                CrimeField::Theft,
                CrimeField::MotorVehicleTheft,
            ],
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Violent, Self::NonViolent]
    }
}

/// A partially-observed set of the seven crime rates for one place.
///
/// `None` means the field is missing. A present `0.0` is a legitimate
/// observation and is never treated as missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CrimeVector {
    values: [Option<f64>; CrimeField::COUNT],
}

impl CrimeVector {
    /// Creates a vector with every field missing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            values: [None; CrimeField::COUNT],
        }
    }

    /// Creates a vector from a value per field, in [`CrimeField::all`] order.
    #[must_use]
    pub const fn from_values(values: [Option<f64>; CrimeField::COUNT]) -> Self {
        Self { values }
    }

    /// Returns the value for `field`, or `None` if it is missing.
    #[must_use]
    pub const fn get(&self, field: CrimeField) -> Option<f64> {
        self.values[field.index()]
    }

    /// Overwrites `field` unconditionally.
    pub const fn set(&mut self, field: CrimeField, value: Option<f64>) {
        self.values[field.index()] = value;
    }

    /// Sets `field` only if it is currently missing.
    ///
    /// Returns `true` if the field was filled.
    pub const fn fill(&mut self, field: CrimeField, value: f64) -> bool {
        if self.values[field.index()].is_some() {
            return false;
        }
        self.values[field.index()] = Some(value);
        true
    }

    /// Returns `true` if `field` has a value.
    #[must_use]
    pub const fn is_present(&self, field: CrimeField) -> bool {
        self.values[field.index()].is_some()
    }

    /// Returns `true` if every one of the seven fields has a value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// Returns `true` if every field of `subset` is missing.
    #[must_use]
    pub fn is_subset_empty(&self, subset: CrimeSubset) -> bool {
        subset.fields().iter().all(|f| !self.is_present(*f))
    }

    /// Returns the fields that are currently missing.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<CrimeField> {
        CrimeField::all()
            .iter()
            .copied()
            .filter(|f| !self.is_present(*f))
            .collect()
    }

    /// Copies every field of `other` into this vector where this vector is
    /// missing a value. Present fields are never overwritten.
    ///
    /// Returns the number of fields filled.
    pub fn fill_from(&mut self, other: &Self) -> usize {
        let mut filled = 0;
        for field in CrimeField::all() {
            if let Some(value) = other.get(*field) {
                if self.fill(*field, value) {
                    filled += 1;
                }
            }
        }
        filled
    }
}

/// US national average rate (per 100k) for each crime field.
///
/// Every severity ratio is expressed as a multiple of these values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NationalBaseline {
    /// Aggravated assault
    pub assault: f64,
    /// Murder
    pub murder: f64,
    /// Rape
    pub rape: f64,
    /// Robbery
    pub robbery: f64,
    /// Burglary
    pub burglary: f64,
    /// Larceny-theft
    pub theft: f64,
    /// Motor vehicle theft
    pub motor_vehicle_theft: f64,
}

impl NationalBaseline {
    /// Returns the national average for `field`.
    #[must_use]
    pub const fn rate(&self, field: CrimeField) -> f64 {
        match field {
            CrimeField::Assault => self.assault,
            CrimeField::Murder => self.murder,
            CrimeField::Rape => self.rape,
            CrimeField::Robbery => self.robbery,
            CrimeField::Burglary => self.burglary,
            CrimeField::Theft => self.theft,
            CrimeField::MotorVehicleTheft => self.motor_vehicle_theft,
        }
    }

    /// Returns the first field whose rate is not a finite, positive number.
    #[must_use]
    pub fn first_invalid(&self) -> Option<(CrimeField, f64)> {
        CrimeField::all()
            .iter()
            .map(|f| (*f, self.rate(*f)))
            .find(|(_, rate)| !rate.is_finite() || *rate <= 0.0)
    }
}

/// A place's crime rates expressed as multiples of the national baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityRatio {
    /// Mean observed/baseline ratio over present violent fields.
    pub violent_ratio: f64,
    /// Mean observed/baseline ratio over present non-violent fields.
    pub non_violent_ratio: f64,
}

impl SeverityRatio {
    /// Returns the ratio for `subset`.
    #[must_use]
    pub const fn for_subset(&self, subset: CrimeSubset) -> f64 {
        match subset {
            CrimeSubset::Violent => self.violent_ratio,
            CrimeSubset::NonViolent => self.non_violent_ratio,
        }
    }
}
