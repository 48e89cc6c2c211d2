//! Terminal results: the flat mapping produced at the end of a run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::history::{History, Metric, ValidationIdentities};

/// Flat `name -> value` mapping plus the metadata fields the contract
/// requires (`version`, `timestamp`, block counts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Results {
    pub version: String,
    pub timestamp: String,
    pub blocks_simulated: u64,
    pub blocks_analyzed: u64,
    pub metrics: BTreeMap<&'static str, f64>,
    pub p1_fraction: f64,
    pub p2_fraction: f64,
    pub p3_fraction: f64,
    pub phase_fraction_residual: f64,
    pub littles_law_p3_residual: f64,
    pub littles_law_p2_residual: f64,
    pub convergence_max_rms_residual: Option<f64>,
}

impl Results {
    /// Average over the trailing `results_window` blocks recorded in
    /// `history`. `blocks_simulated` is the clock's current block index;
    /// `blocks_analyzed` is however many rows actually fed the average
    /// (it saturates below `results_window` for short runs).
    pub fn from_history(history: &History, blocks_simulated: u64) -> Self {
        let metrics: BTreeMap<&'static str, f64> = Metric::ALL
            .iter()
            .map(|&metric| (metric.name(), history.results_average(metric)))
            .collect();

        let ValidationIdentities {
            p1_fraction,
            p2_fraction,
            p3_fraction,
            phase_fraction_residual,
            littles_law_p3_residual,
            littles_law_p2_residual,
        } = history.validation_identities();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            blocks_simulated,
            blocks_analyzed: history.blocks_recorded() as u64,
            metrics,
            p1_fraction,
            p2_fraction,
            p3_fraction,
            phase_fraction_residual,
            littles_law_p3_residual,
            littles_law_p2_residual,
            convergence_max_rms_residual: history.convergence_residual(),
        }
    }
}
