#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Missing-value reconciliation for per-place crime rates.
//!
//! Scraped sources routinely fail to report some of the seven crime rate
//! fields. This crate fills every gap so each place ends up with a complete
//! [`CrimeVector`](livability_crime_models::CrimeVector):
//!
//! - [`secondary`] folds an alternate source into the primary table,
//! - [`neighbors`] copies rates from a nearby, comparably wealthy place in
//!   the same state,
//! - [`ratio`] estimates whatever is left from the place's severity ratios
//!   against the [`NationalBaseline`](livability_crime_models::NationalBaseline).
//!
//! [`Reconciler`] orchestrates the in-engine tiers over a whole table.

pub mod config;
pub mod engine;
pub mod neighbors;
pub mod progress;
pub mod ratio;
pub mod secondary;

pub use config::{ConfigError, EmptySubsetPolicy, EngineConfig};
pub use engine::{PlaceOutcome, ReconciliationReport, Reconciler, partition_by_state};
pub use neighbors::{DonationOutcome, NeighborError};
pub use progress::{ProgressCallback, null_progress};
pub use secondary::merge_secondary;
