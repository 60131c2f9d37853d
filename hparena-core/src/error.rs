use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Failure of an arena allocation. A failed call leaves the arena unchanged.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// Alignment is not a power of two or exceeds the configured ceiling.
    #[error("invalid alignment {alignment} (must be a power of two no larger than {max})")]
    InvalidAlignment { alignment: usize, max: usize },

    /// No backing memory could be mapped under the configured failure policy.
    #[error("out of memory mapping a chunk for a {size}-byte request")]
    OutOfMemory {
        size: usize,
        #[source]
        source: io::Error,
    },

    /// The arena's own chunk list could not grow.
    #[error("failed to grow arena bookkeeping: {0}")]
    BookkeepingAllocationFailure(#[from] TryReserveError),
}

impl ArenaError {
    /// A request whose chunk size cannot be represented.
    pub(crate) fn size_overflow(size: usize) -> Self {
        ArenaError::OutOfMemory {
            size,
            source: io::Error::new(io::ErrorKind::OutOfMemory, "chunk size overflows usize"),
        }
    }

    /// Whether this is memory exhaustion rather than a caller error.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(
            self,
            ArenaError::OutOfMemory { .. } | ArenaError::BookkeepingAllocationFailure(_)
        )
    }
}
