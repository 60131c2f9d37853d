//! ## hparena-core::alloc::policy
//! **Construction-time strategies for chunk acquisition**
//!
//! - [`FailurePolicy`]: what happens when huge-page backing cannot be obtained
//! - [`GrowthStrategy`]: how large the next chunk is

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::align::checked_align_up;

/// Behaviour when a huge-page mapping fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail the allocation with `OutOfMemory`; never touch regular pages.
    Strict,
    /// Retry the identical-size mapping with regular pages first.
    #[default]
    FallbackToRegularPages,
}

impl FailurePolicy {
    #[inline]
    pub fn allows_fallback(self) -> bool {
        matches!(self, FailurePolicy::FallbackToRegularPages)
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Strict => f.write_str("strict"),
            FailurePolicy::FallbackToRegularPages => f.write_str("fallback_to_regular_pages"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(FailurePolicy::Strict),
            "fallback" | "fallback_to_regular_pages" => Ok(FailurePolicy::FallbackToRegularPages),
            _ => Err(UnknownVariant(s.to_owned())),
        }
    }
}

/// Sizing rule for new chunks.
///
/// Both variants round to the chunk granularity and never return less than the
/// space the triggering request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStrategy {
    /// `max(required, granularity)` rounded up. Memory use stays close to what
    /// was asked for.
    #[default]
    Minimum,
    /// `max(2 * previous, required)` rounded up. Fewer mapping calls for
    /// steadily growing workloads.
    Doubling,
}

impl GrowthStrategy {
    /// Size of the chunk to map after a chunk of `previous` bytes (0 when the
    /// arena has none) could not hold `required` bytes.
    ///
    /// Returns `None` if the computation overflows.
    pub fn next_chunk_size(self, previous: usize, required: usize, granularity: usize) -> Option<usize> {
        let wanted = match self {
            GrowthStrategy::Minimum => required.max(granularity),
            GrowthStrategy::Doubling => previous.checked_mul(2)?.max(required).max(granularity),
        };
        checked_align_up(wanted, granularity)
    }
}

impl fmt::Display for GrowthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthStrategy::Minimum => f.write_str("minimum"),
            GrowthStrategy::Doubling => f.write_str("doubling"),
        }
    }
}

impl FromStr for GrowthStrategy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimum" => Ok(GrowthStrategy::Minimum),
            "doubling" => Ok(GrowthStrategy::Doubling),
            _ => Err(UnknownVariant(s.to_owned())),
        }
    }
}

/// Returned when parsing a policy name fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);
