//! ## hparena-core::alloc::options
//! **Construction-time arena configuration**

use serde::{Deserialize, Serialize};

use super::align::{HUGE_PAGE_SIZE, PAGE_SIZE};
use super::policy::{FailurePolicy, GrowthStrategy};

/// Fixed parameters of a [`HugepageArena`](super::arena::HugepageArena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaOptions {
    pub policy: FailurePolicy,
    pub growth: GrowthStrategy,
    /// Every chunk size is a multiple of this. Power of two, at least a page.
    pub chunk_granularity: usize,
    /// Largest alignment `allocate` accepts. Power of two, at most a page.
    pub max_alignment: usize,
}

impl ArenaOptions {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_growth(mut self, growth: GrowthStrategy) -> Self {
        self.growth = growth;
        self
    }

    pub fn with_chunk_granularity(mut self, granularity: usize) -> Self {
        self.chunk_granularity = granularity;
        self
    }

    pub fn with_max_alignment(mut self, alignment: usize) -> Self {
        self.max_alignment = alignment;
        self
    }

    /// Panics if the options cannot produce a correct arena.
    ///
    /// Chunks are only guaranteed page alignment, so a larger alignment
    /// ceiling could not be honoured without over-allocating.
    pub(crate) fn assert_valid(&self) {
        assert!(
            self.chunk_granularity.is_power_of_two() && self.chunk_granularity >= PAGE_SIZE,
            "chunk granularity must be a power of two of at least {PAGE_SIZE} bytes, got {}",
            self.chunk_granularity
        );
        assert!(
            self.max_alignment.is_power_of_two() && self.max_alignment <= PAGE_SIZE,
            "max alignment must be a power of two no larger than {PAGE_SIZE}, got {}",
            self.max_alignment
        );
    }
}

impl Default for ArenaOptions {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::default(),
            growth: GrowthStrategy::default(),
            chunk_granularity: HUGE_PAGE_SIZE,
            max_alignment: PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_configuration() {
        let options = ArenaOptions::default();
        assert_eq!(options.chunk_granularity, 2 * 1024 * 1024);
        assert_eq!(options.max_alignment, 4096);
        assert_eq!(options.growth, GrowthStrategy::Minimum);
        options.assert_valid();
    }

    #[test]
    fn builder_overrides() {
        let options = ArenaOptions::new(FailurePolicy::Strict)
            .with_growth(GrowthStrategy::Doubling)
            .with_chunk_granularity(PAGE_SIZE)
            .with_max_alignment(64);
        assert_eq!(options.policy, FailurePolicy::Strict);
        assert_eq!(options.growth, GrowthStrategy::Doubling);
        assert_eq!(options.chunk_granularity, PAGE_SIZE);
        assert_eq!(options.max_alignment, 64);
        options.assert_valid();
    }

    #[test]
    #[should_panic(expected = "max alignment")]
    fn alignment_above_page_is_rejected() {
        ArenaOptions::default().with_max_alignment(8192).assert_valid();
    }

    #[test]
    #[should_panic(expected = "chunk granularity")]
    fn granularity_below_page_is_rejected() {
        ArenaOptions::default().with_chunk_granularity(1024).assert_valid();
    }
}
