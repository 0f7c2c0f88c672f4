use crate::error::AnalysisError;
use primelab_core::Outcome;
use statrs::distribution::{ContinuousCDF, Normal};

/// Outcome counts for one stratum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StratumTally {
    pub hits: usize,
    pub misses: usize,
    pub false_alarms: usize,
    pub correct_rejections: usize,
}

impl StratumTally {
    /// Counts a detection outcome; other outcome kinds are ignored and reported as `false`.
    pub fn record(&mut self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Hit => self.hits += 1,
            Outcome::Miss => self.misses += 1,
            Outcome::FalseAlarm => self.false_alarms += 1,
            Outcome::CorrectRejection => self.correct_rejections += 1,
            _ => return false,
        }
        true
    }

    pub fn signal_trials(&self) -> usize {
        self.hits + self.misses
    }

    pub fn noise_trials(&self) -> usize {
        self.false_alarms + self.correct_rejections
    }

    pub fn total(&self) -> usize {
        self.signal_trials() + self.noise_trials()
    }
}

/// Proportion `count / n`, or `None` for an empty denominator
pub fn rate(count: usize, n: usize) -> Option<f64> {
    (n > 0).then(|| count as f64 / n as f64)
}

/// Log-linear correction of a rate that sits exactly on 0 or 1.
///
/// `n` is the rate's own denominator. Rates strictly inside (0, 1) pass through unchanged.
pub fn edge_correct(rate: f64, n: usize) -> f64 {
    let half = 1.0 / (2.0 * n.max(1) as f64);
    if rate <= 0.0 {
        half
    } else if rate >= 1.0 {
        1.0 - half
    } else {
        rate
    }
}

/// Standard-normal quantile
pub fn probit(p: f64) -> Result<f64, AnalysisError> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| AnalysisError::Distribution(e.to_string()))?;
    Ok(normal.inverse_cdf(p))
}

/// Sensitivity index from already-corrected rates
pub fn d_prime(hit_rate: f64, false_alarm_rate: f64) -> Result<f64, AnalysisError> {
    Ok(probit(hit_rate)? - probit(false_alarm_rate)?)
}
