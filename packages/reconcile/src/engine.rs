//! Reconciliation orchestrator.
//!
//! Tiers 1 and 2 (primary scrape, secondary source) run before the engine
//! sees the table. The engine then drives every place through:
//!
//! * Tier 3, geo-neighbor donation. Donors are chosen from a read-only
//!   snapshot of the table taken at the start of the tier, then all
//!   donations are applied in a second pass. A place filled in this tier
//!   never acts as a donor in the same tier.
//! * Tier 4, ratio estimate. Whatever is still missing is estimated from
//!   the place's severity ratios against the national baseline.
//!
//! Each tier only writes fields that are still missing.

use std::collections::BTreeMap;
use std::ops::AddAssign;
use std::sync::Arc;

use livability_crime_models::{CrimeSubset, CrimeVector};
use livability_place_models::PlaceRecord;

use crate::config::EngineConfig;
use crate::neighbors::{self, Donation, NeighborError};
use crate::progress::{ProgressCallback, null_progress};
use crate::ratio;

/// Terminal state of a place after reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// Every field was observed or donated; no estimate was needed.
    FullyReconciled,
    /// At least one field was estimated from the national baseline.
    EstimatedFromBaseline,
}

/// Counts collected over one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// Places processed.
    pub places: usize,
    /// Places with no missing fields on entry.
    pub already_complete: usize,
    /// Places that received a geo-neighbor donation.
    pub donations: usize,
    /// Fields filled by geo-neighbor donation.
    pub fields_donated: usize,
    /// Places that attempted donation but found no qualifying donor.
    pub no_donor: usize,
    /// Places that skipped donation for lack of coordinates.
    pub skipped_missing_coordinates: usize,
    /// Places that skipped donation for lack of income.
    pub skipped_missing_income: usize,
    /// Fields filled by the ratio estimate.
    pub fields_estimated: usize,
    /// Subsets estimated with every field missing.
    pub empty_subsets: usize,
    /// Places whose final vector needed no estimate.
    pub fully_reconciled: usize,
    /// Places whose final vector contains estimates.
    pub estimated_from_baseline: usize,
}

impl AddAssign for ReconciliationReport {
    fn add_assign(&mut self, rhs: Self) {
        self.places += rhs.places;
        self.already_complete += rhs.already_complete;
        self.donations += rhs.donations;
        self.fields_donated += rhs.fields_donated;
        self.no_donor += rhs.no_donor;
        self.skipped_missing_coordinates += rhs.skipped_missing_coordinates;
        self.skipped_missing_income += rhs.skipped_missing_income;
        self.fields_estimated += rhs.fields_estimated;
        self.empty_subsets += rhs.empty_subsets;
        self.fully_reconciled += rhs.fully_reconciled;
        self.estimated_from_baseline += rhs.estimated_from_baseline;
    }
}

/// Groups records by state, remembering each record's original position.
#[must_use]
pub fn partition_by_state(
    records: Vec<PlaceRecord>,
) -> BTreeMap<String, Vec<(usize, PlaceRecord)>> {
    let mut partitions: BTreeMap<String, Vec<(usize, PlaceRecord)>> = BTreeMap::new();
    for (index, record) in records.into_iter().enumerate() {
        partitions
            .entry(record.place.state.clone())
            .or_default()
            .push((index, record));
    }
    partitions
}

/// The missing-value reconciliation engine.
pub struct Reconciler {
    config: EngineConfig,
    progress: Arc<dyn ProgressCallback>,
}

impl Reconciler {
    /// Creates an engine with the given configuration and no progress
    /// reporting.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            progress: null_progress(),
        }
    }

    /// Reports one unit of progress per reconciled place to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reconciles `records` in place so every crime field is populated.
    pub fn reconcile(&self, records: &mut [PlaceRecord]) -> ReconciliationReport {
        self.progress.set_total(records.len() as u64);
        self.progress
            .set_message(format!("Reconciling {} places", records.len()));
        let report = self.run_pass(records);
        self.progress
            .finish(format!("Reconciled {} places", report.places));
        log_report(&report);
        report
    }

    /// Reconciles each state independently on its own thread and returns
    /// the records in their original order.
    ///
    /// Neighbor search never crosses a state boundary, so the result is
    /// identical to [`Reconciler::reconcile`] over the whole table.
    pub fn reconcile_partitioned(
        &self,
        records: Vec<PlaceRecord>,
    ) -> (Vec<PlaceRecord>, ReconciliationReport) {
        let total = records.len();
        self.progress.set_total(total as u64);

        let partitions = partition_by_state(records);
        log::info!("Reconciling {total} places across {} states", partitions.len());

        let results: Vec<(Vec<(usize, PlaceRecord)>, ReconciliationReport)> =
            std::thread::scope(|scope| {
                let handles: Vec<_> = partitions
                    .into_iter()
                    .map(|(state, partition)| {
                        scope.spawn(move || {
                            self.progress.set_message(format!(
                                "Reconciling {state} ({} places)",
                                partition.len()
                            ));
                            let (indices, mut rows): (Vec<usize>, Vec<PlaceRecord>) =
                                partition.into_iter().unzip();
                            let report = self.run_pass(&mut rows);
                            log::debug!("{state}: reconciled {} places", report.places);
                            (indices.into_iter().zip(rows).collect(), report)
                        })
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|e| std::panic::resume_unwind(e))
                    })
                    .collect()
            });

        let mut report = ReconciliationReport::default();
        let mut slots: Vec<Option<PlaceRecord>> = vec![None; total];
        for (rows, partition_report) in results {
            report += partition_report;
            for (index, record) in rows {
                slots[index] = Some(record);
            }
        }

        self.progress
            .finish(format!("Reconciled {} places", report.places));
        log_report(&report);

        (slots.into_iter().flatten().collect(), report)
    }

    fn run_pass(&self, records: &mut [PlaceRecord]) -> ReconciliationReport {
        let mut report = ReconciliationReport {
            places: records.len(),
            ..ReconciliationReport::default()
        };

        let donations = self.plan_donations(records, &mut report);
        for (record, donation) in records.iter_mut().zip(&donations) {
            if let Some(donation) = donation {
                let filled = neighbors::apply_donation(&mut record.crimes, donation);
                report.donations += 1;
                report.fields_donated += filled;
                log::debug!(
                    "{}: {filled} fields donated by place #{} ({:.2} km)",
                    record.unique_name(),
                    donation.donor,
                    donation.distance_km
                );
            }
        }

        for record in records.iter_mut() {
            match self.estimate_remaining(&mut record.crimes, &mut report) {
                PlaceOutcome::FullyReconciled => report.fully_reconciled += 1,
                PlaceOutcome::EstimatedFromBaseline => report.estimated_from_baseline += 1,
            }
            self.progress.inc(1);
        }

        report
    }

    /// Chooses at most one donor per place from an unmodified view of
    /// `records`. Nothing is written here.
    fn plan_donations(
        &self,
        records: &[PlaceRecord],
        report: &mut ReconciliationReport,
    ) -> Vec<Option<Donation>> {
        (0..records.len())
            .map(|index| {
                let target = &records[index];
                if target.crimes.is_complete() {
                    report.already_complete += 1;
                    return None;
                }

                let planned = neighbors::find_candidates(
                    records,
                    index,
                    self.config.neighbor_radius_km,
                )
                .and_then(|candidates| {
                    neighbors::select_donor(
                        target,
                        &candidates,
                        records,
                        self.config.wealth_threshold,
                    )
                });

                match planned {
                    Ok(Some(donation)) => Some(donation),
                    Ok(None) => {
                        report.no_donor += 1;
                        None
                    }
                    Err(e) => {
                        match e {
                            NeighborError::MissingCoordinates { .. } => {
                                report.skipped_missing_coordinates += 1;
                            }
                            NeighborError::MissingIncome { .. } => {
                                report.skipped_missing_income += 1;
                            }
                            NeighborError::UnknownPlace { .. } => {}
                        }
                        log::debug!("Skipping geo-neighbor donation: {e}");
                        None
                    }
                }
            })
            .collect()
    }

    /// Fills every remaining missing field from the severity ratios.
    ///
    /// Both ratios are computed before either subset is filled.
    fn estimate_remaining(
        &self,
        crimes: &mut CrimeVector,
        report: &mut ReconciliationReport,
    ) -> PlaceOutcome {
        if crimes.is_complete() {
            return PlaceOutcome::FullyReconciled;
        }

        let baseline = &self.config.baseline;
        let severity = ratio::severity_ratio(crimes, baseline);
        let before = crimes.missing_fields().len();

        for subset in CrimeSubset::all() {
            if crimes.is_subset_empty(*subset) {
                report.empty_subsets += 1;
            }
            let ratio = self.config.empty_subset_policy.resolve(
                crimes,
                *subset,
                severity.for_subset(*subset),
            );
            *crimes = ratio::fill_from_ratio(crimes, subset.fields(), ratio, baseline);
        }

        report.fields_estimated += before - crimes.missing_fields().len();
        PlaceOutcome::EstimatedFromBaseline
    }
}

fn log_report(report: &ReconciliationReport) {
    log::info!(
        "Reconciled {} places: {} already complete, {} donations ({} fields), \
         {} without donor, {} skipped (no coordinates), {} skipped (no income)",
        report.places,
        report.already_complete,
        report.donations,
        report.fields_donated,
        report.no_donor,
        report.skipped_missing_coordinates,
        report.skipped_missing_income,
    );
    log::info!(
        "Estimated {} fields from the national baseline ({} empty subsets); \
         {} places fully observed/donated, {} with estimates",
        report.fields_estimated,
        report.empty_subsets,
        report.fully_reconciled,
        report.estimated_from_baseline,
    );
}
