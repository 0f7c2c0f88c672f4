use crate::chi_square::chi_square_from_rates;
use crate::error::AnalysisError;
use crate::input::Observation;
use crate::sdt::{StratumTally, d_prime, edge_correct, rate};
use crate::significance::SignificanceScheme;
use primelab_core::StratumKey;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Per-stratum sensitivity and significance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StratumResult {
    pub stratum: StratumKey,
    pub n_trials: usize,
    /// Uncorrected hit rate
    pub hit_rate: f64,
    /// Uncorrected false-alarm rate
    pub false_alarm_rate: f64,
    pub d_prime: f64,
    pub chi_square: f64,
    pub p_value: f64,
    pub marker: &'static str,
}

impl StratumResult {
    /// d′ to two decimals with its significance marker
    pub fn d_prime_label(&self) -> String {
        format!("{:.2}{}", self.d_prime, self.marker)
    }
}

/// Aggregates detection outcomes into one [`StratumResult`] per stratum.
///
/// Holds no state between runs; analysing the same observations twice yields identical rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalDetectionAnalyzer {
    scheme: SignificanceScheme,
}

impl SignalDetectionAnalyzer {
    pub fn new(scheme: SignificanceScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> SignificanceScheme {
        self.scheme
    }

    pub fn tally(observations: &[Observation]) -> BTreeMap<StratumKey, StratumTally> {
        let mut tallies: BTreeMap<StratumKey, StratumTally> = BTreeMap::new();
        let mut ignored = 0usize;
        for obs in observations {
            // a stratum only exists once it has a detection outcome
            if obs.outcome.signal().is_none() {
                ignored += 1;
                continue;
            }
            tallies.entry(obs.stratum.clone()).or_default().record(obs.outcome);
        }
        if ignored > 0 {
            debug!(ignored, "non-detection outcomes ignored");
        }
        tallies
    }

    /// Results sorted ascending by stratum key.
    ///
    /// Fails with [`AnalysisError::EmptyStratum`] when a stratum lacks either trial type.
    pub fn analyze(
        &self,
        observations: &[Observation],
    ) -> Result<Vec<StratumResult>, AnalysisError> {
        let results = Self::tally(observations)
            .into_iter()
            .map(|(stratum, tally)| self.analyze_stratum(stratum, &tally))
            .collect::<Result<Vec<_>, _>>()?;
        info!(strata = results.len(), "signal detection analysis complete");
        Ok(results)
    }

    pub fn analyze_stratum(
        &self,
        stratum: StratumKey,
        tally: &StratumTally,
    ) -> Result<StratumResult, AnalysisError> {
        let n_signal = tally.signal_trials();
        let n_noise = tally.noise_trials();
        let (Some(hit_rate), Some(false_alarm_rate)) =
            (rate(tally.hits, n_signal), rate(tally.false_alarms, n_noise))
        else {
            return Err(AnalysisError::EmptyStratum {
                stratum: stratum.to_string(),
                present: n_signal,
                absent: n_noise,
            });
        };

        let d_prime = d_prime(
            edge_correct(hit_rate, n_signal),
            edge_correct(false_alarm_rate, n_noise),
        )?;
        let n_trials = tally.total();
        let chi = chi_square_from_rates(hit_rate, false_alarm_rate, n_trials)?;
        let marker = self.scheme.marker(chi.p_value);

        debug!(
            %stratum,
            n_trials, hit_rate, false_alarm_rate, d_prime,
            chi2 = chi.statistic, p = chi.p_value,
            "stratum analysed"
        );
        Ok(StratumResult {
            stratum,
            n_trials,
            hit_rate,
            false_alarm_rate,
            d_prime,
            chi_square: chi.statistic,
            p_value: chi.p_value,
            marker,
        })
    }
}
