//! Pacing controller - computes the delay between two releases
//!
//! Three dampening factors (backlog, observed TPS, network latency) each
//! shorten the base delay, and each is floored so none of them alone can
//! drive the delay to zero. The product is clamped to `[MIN, MAX]`.

use serde::Serialize;

/// Delay for an idle, quiet network
pub const BASE_DELAY_MS: u64 = 300;
/// Lower bound, keeps the drain loop from spinning
pub const MIN_DELAY_MS: u64 = 50;
/// Upper bound, keeps playback visibly moving
pub const MAX_DELAY_MS: u64 = 2000;

const QUEUE_STEP: f64 = 0.1;
const QUEUE_FLOOR: f64 = 0.2;
const TPS_STEP: f64 = 0.05;
const TPS_FLOOR: f64 = 0.3;
const LATENCY_SCALE_MS: f64 = 1000.0;
const LATENCY_FLOOR: f64 = 0.5;

/// Named pacing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    pub base_delay_ms: u64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: BASE_DELAY_MS,
            min_delay_ms: MIN_DELAY_MS,
            max_delay_ms: MAX_DELAY_MS,
        }
    }
}

/// Rejected pacing bounds
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacingConfigError {
    #[error("min delay {min_ms}ms exceeds max delay {max_ms}ms")]
    InvertedBounds { min_ms: u64, max_ms: u64 },
}

impl PacingConfig {
    pub fn new(base_delay_ms: u64, min_delay_ms: u64, max_delay_ms: u64) -> Result<Self, PacingConfigError> {
        if min_delay_ms > max_delay_ms {
            return Err(PacingConfigError::InvertedBounds {
                min_ms: min_delay_ms,
                max_ms: max_delay_ms,
            });
        }
        Ok(Self {
            base_delay_ms,
            min_delay_ms,
            max_delay_ms,
        })
    }

    /// Same parameters with `min <= max`, swapping inverted bounds
    pub fn normalized(self) -> Self {
        if self.min_delay_ms <= self.max_delay_ms {
            return self;
        }
        log::warn!(
            "Pacing bounds inverted (min {}ms > max {}ms), swapping",
            self.min_delay_ms,
            self.max_delay_ms
        );
        Self {
            min_delay_ms: self.max_delay_ms,
            max_delay_ms: self.min_delay_ms,
            ..self
        }
    }

    /// Delay in milliseconds before the next release
    ///
    /// Non-finite or negative signals are read as zero. Never panics, even
    /// with inverted bounds; the max bound wins then.
    pub fn compute_delay(&self, queue_length: usize, network_latency_ms: f64, tps: f64) -> u64 {
        let tps = sanitize(tps);
        let latency = sanitize(network_latency_ms);

        let queue_factor = (1.0 - queue_length as f64 * QUEUE_STEP).max(QUEUE_FLOOR);
        let tps_factor = (1.0 - tps * TPS_STEP).max(TPS_FLOOR);
        let latency_factor = (1.0 - latency / LATENCY_SCALE_MS).max(LATENCY_FLOOR);

        let delay = self.base_delay_ms as f64 * queue_factor * tps_factor * latency_factor;
        let delay = delay
            .max(self.min_delay_ms as f64)
            .min(self.max_delay_ms as f64);

        delay.round() as u64
    }
}

/// `compute_delay` with the default constants
pub fn compute_delay(queue_length: usize, network_latency_ms: f64, tps: f64) -> u64 {
    PacingConfig::default().compute_delay(queue_length, network_latency_ms, tps)
}

fn sanitize(signal: f64) -> f64 {
    if signal.is_finite() && signal > 0.0 {
        signal
    } else {
        0.0
    }
}

/// Snapshot of the drain loop's pacing, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PacingState {
    pub queue_length: usize,
    pub last_delay_ms: u64,
    pub is_processing: bool,
}

impl PacingState {
    /// Release rate implied by the last delay
    pub fn items_per_sec(&self) -> f64 {
        if self.last_delay_ms == 0 {
            0.0
        } else {
            1000.0 / self.last_delay_ms as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_queue_uses_base_delay() {
        assert_eq!(compute_delay(0, 0.0, 0.0), 300);
    }

    #[test]
    fn test_single_item_queue() {
        // 300 * 0.9 * 1 * 1
        assert_eq!(compute_delay(1, 0.0, 0.0), 270);
    }

    #[test]
    fn test_heavy_load_clamps_to_min() {
        // 300 * 0.2 * 0.3 * 1 = 18 -> clamped
        assert_eq!(compute_delay(20, 0.0, 50.0), MIN_DELAY_MS);
    }

    #[test]
    fn test_latency_factor() {
        // 300 * 1 * 1 * 0.75
        assert_eq!(compute_delay(0, 250.0, 0.0), 225);
        // floors at 0.5
        assert_eq!(compute_delay(0, 5000.0, 0.0), 150);
    }

    #[test]
    fn test_factor_floors_compose() {
        // 300 * 0.2 * 0.3 * 0.5 = 9 -> clamped
        assert_eq!(compute_delay(usize::MAX, f64::MAX, f64::MAX), MIN_DELAY_MS);
        // 300 * 0.5 * 1 * 1
        assert_eq!(compute_delay(5, 0.0, 0.0), 150);
    }

    #[test]
    fn test_bad_signals_are_zeroed() {
        assert_eq!(compute_delay(0, f64::NAN, f64::NAN), 300);
        assert_eq!(compute_delay(0, -400.0, -10.0), 300);
        assert_eq!(compute_delay(0, f64::INFINITY, 0.0), 300);
    }

    #[test]
    fn test_delay_bounds_hold() {
        let latencies = [0.0, 10.0, 120.5, 999.0, 1000.0, 4000.0];
        let tps_values = [0.0, 0.4, 3.0, 14.0, 20.0, 1000.0];
        for queue in 0..40 {
            for &latency in &latencies {
                for &tps in &tps_values {
                    let delay = compute_delay(queue, latency, tps);
                    assert!((MIN_DELAY_MS..=MAX_DELAY_MS).contains(&delay));
                }
            }
        }
    }

    #[test]
    fn test_custom_config_clamps_to_max() {
        let config = PacingConfig {
            base_delay_ms: 10_000,
            ..Default::default()
        };
        assert_eq!(config.compute_delay(0, 0.0, 0.0), MAX_DELAY_MS);
    }

    #[test]
    fn test_new_rejects_inverted_bounds() {
        assert_eq!(
            PacingConfig::new(300, 500, 100),
            Err(PacingConfigError::InvertedBounds { min_ms: 500, max_ms: 100 })
        );
        assert_eq!(PacingConfig::new(300, 50, 2000), Ok(PacingConfig::default()));
        assert!(PacingConfig::new(300, 120, 120).is_ok());
    }

    #[test]
    fn test_inverted_bounds_do_not_panic() {
        let config = PacingConfig {
            base_delay_ms: 300,
            min_delay_ms: 500,
            max_delay_ms: 100,
        };
        assert_eq!(config.compute_delay(0, 0.0, 0.0), 100);

        let fixed = config.normalized();
        assert_eq!((fixed.min_delay_ms, fixed.max_delay_ms), (100, 500));
        assert_eq!(fixed.compute_delay(0, 0.0, 0.0), 300);
        assert_eq!(fixed.compute_delay(20, 0.0, 50.0), 100);
        assert_eq!(PacingConfig::default().normalized(), PacingConfig::default());
    }

    #[test]
    fn test_items_per_sec() {
        let state = PacingState {
            queue_length: 3,
            last_delay_ms: 250,
            is_processing: true,
        };
        assert_eq!(state.items_per_sec(), 4.0);
        assert_eq!(PacingState::default().items_per_sec(), 0.0);
    }
}
