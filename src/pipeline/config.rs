//! Pipeline configuration
//!
//! Pacing constants and display capacity are fixed by design; they are
//! grouped here as named parameters rather than read from the environment.

use super::display::DISPLAY_CAPACITY;
use super::pacing::PacingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub pacing: PacingConfig,
    /// Maximum records kept in the display buffer
    pub display_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pacing: PacingConfig::default(),
            display_capacity: DISPLAY_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pacing::{BASE_DELAY_MS, MAX_DELAY_MS, MIN_DELAY_MS};

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();

        assert_eq!(config.display_capacity, 200);
        assert_eq!(config.pacing.base_delay_ms, BASE_DELAY_MS);
        assert_eq!(config.pacing.min_delay_ms, MIN_DELAY_MS);
        assert_eq!(config.pacing.max_delay_ms, MAX_DELAY_MS);
    }
}
