//! Subcommand implementations.
//!
//! Each command reads the scraped table, runs the library stages in order
//! and replaces the output file in one go.

use std::path::{Path, PathBuf};

use livability_cli_utils::{IndicatifProgress, MultiProgress};
use livability_crime_models::CrimeField;
use livability_normalize::housing::fill_missing_housing_values;
use livability_place_models::PlaceRecord;
use livability_reconcile::{EngineConfig, Reconciler, merge_secondary};

use crate::table;

/// Options for the `reconcile` command.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub secondary: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub by_state: bool,
}

/// Loads the engine config from `path`, or the embedded defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::embedded(),
    })
}

/// Reads and normalizes a raw table, then completes housing values.
fn load_places(path: &Path) -> Result<Vec<PlaceRecord>, Box<dyn std::error::Error>> {
    let raw = table::read_raw(path)?;
    let (mut records, summary) = livability_normalize::normalize_table(&raw);
    if summary.rejected > 0 {
        log::warn!(
            "{} of {} rows in {} were rejected",
            summary.rejected,
            raw.len(),
            path.display()
        );
    }
    fill_missing_housing_values(&mut records);
    Ok(records)
}

/// Runs the full pipeline: normalize, merge the secondary source,
/// reconcile, and write the complete table.
///
/// # Errors
///
/// Returns an error if the config is invalid or a table cannot be read or
/// written.
pub fn reconcile(
    options: &ReconcileOptions,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(options.config.as_deref())?;
    let mut records = load_places(&options.input)?;

    if let Some(secondary) = &options.secondary {
        let alternate = load_places(secondary)?;
        merge_secondary(&mut records, &alternate);
    }

    let reconciler = Reconciler::new(config)
        .with_progress(IndicatifProgress::places_bar(multi, "Reconciling places"));

    let records = if options.by_state {
        reconciler.reconcile_partitioned(records).0
    } else {
        reconciler.reconcile(&mut records);
        records
    };

    table::write_records(&options.output, &records)?;
    Ok(())
}

/// Normalizes a raw table and writes it without reconciling crime fields.
///
/// # Errors
///
/// Returns an error if a table cannot be read or written.
pub fn normalize(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_places(input)?;
    table::write_records(output, &records)?;
    Ok(())
}

/// Prints the effective engine parameters.
///
/// # Errors
///
/// Returns an error if the config file is invalid.
pub fn baseline(config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;

    println!("{:<22} {:>10}", "FIELD", "PER 100K");
    println!("{}", "-".repeat(33));
    for field in CrimeField::all() {
        println!(
            "{:<22} {:>10.1}  ({})",
            field.to_string(),
            config.baseline.rate(*field),
            field.subset()
        );
    }
    println!();
    println!("neighbor_radius_km    {}", config.neighbor_radius_km);
    println!("wealth_threshold      {}", config.wealth_threshold);
    println!("empty_subset_policy   {}", config.empty_subset_policy);

    Ok(())
}
