//! Arena construction parameters.
//!
//! Mirrors `hparena_core::ArenaOptions`, with the bounds a user-supplied
//! value has to respect before an arena can be built from it.

use hparena_core::{ArenaOptions, FailurePolicy, GrowthStrategy};
use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Arena configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct ArenaConfig {
    /// What to do when huge pages are unavailable (`strict` or `fallback_to_regular_pages`).
    #[serde(default)]
    pub policy: FailurePolicy,

    /// Chunk sizing rule (`minimum` or `doubling`).
    #[serde(default)]
    pub growth: GrowthStrategy,

    /// Chunk size granularity in bytes (power of two, 4 KiB to 1 GiB).
    /// Huge-page chunks are still mapped in whole 2 MiB pages.
    #[serde(default = "default_chunk_granularity")]
    #[validate(range(min = 4096, max = 1073741824))]
    #[validate(custom(function = validation::validate_power_of_two))]
    pub chunk_granularity: usize,

    /// Largest alignment accepted by `allocate` (power of two, at most 4096).
    #[serde(default = "default_max_alignment")]
    #[validate(range(min = 1, max = 4096))]
    #[validate(custom(function = validation::validate_power_of_two))]
    pub max_alignment: usize,
}

fn default_chunk_granularity() -> usize {
    hparena_core::alloc::HUGE_PAGE_SIZE
}

fn default_max_alignment() -> usize {
    hparena_core::alloc::PAGE_SIZE
}

impl ArenaConfig {
    /// Core options for this configuration. Call after validation.
    pub fn options(&self) -> ArenaOptions {
        ArenaOptions::new(self.policy)
            .with_growth(self.growth)
            .with_chunk_granularity(self.chunk_granularity)
            .with_max_alignment(self.max_alignment)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::default(),
            growth: GrowthStrategy::default(),
            chunk_granularity: default_chunk_granularity(),
            max_alignment: default_max_alignment(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_maps_to_default_options() {
        assert_eq!(ArenaConfig::default().options(), ArenaOptions::default());
    }

    #[test]
    fn power_of_two_is_enforced() {
        let config = ArenaConfig {
            chunk_granularity: 3 * 4096,
            ..ArenaConfig::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("chunk_granularity"));
    }

    #[test]
    fn alignment_ceiling_is_a_page() {
        let config = ArenaConfig {
            max_alignment: 8192,
            ..ArenaConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ArenaConfig {
            max_alignment: 16,
            ..ArenaConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.options().max_alignment, 16);
    }
}
