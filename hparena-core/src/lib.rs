//! # hparena-core
//!
//! Region ("arena") allocator that bump-allocates out of large chunks backed by
//! 2 MiB huge pages. Built for bulk-object workloads (graph and tree builders,
//! batch pipelines) where objects live until the whole arena is torn down.
//!
//! ### Expectations (Production):
//! - Allocation fast path is a handful of integer operations
//! - Fewer TLB misses than 4 KiB-page backed heaps for large live sets
//! - Predictable failure: a request either fully succeeds or returns an error
//!
//! ### Key Submodules:
//! - `alloc`: arena, policies, page sources and instrumentation hooks
//! - `error`: allocation error taxonomy
//!
//! ```no_run
//! use hparena_core::prelude::*;
//!
//! let arena = HugepageArena::new(FailurePolicy::FallbackToRegularPages);
//! let ptr = arena.allocate(112, 8)?;
//! assert_eq!(ptr.as_ptr() as usize % 8, 0);
//! # Ok::<(), ArenaError>(())
//! ```

pub mod alloc;
pub mod error;

pub mod prelude {
    pub use crate::alloc::*;
    pub use crate::error::*;
}

pub use crate::alloc::{ArenaOptions, ArenaStats, FailurePolicy, GrowthStrategy, HugepageArena};
pub use crate::error::ArenaError;
