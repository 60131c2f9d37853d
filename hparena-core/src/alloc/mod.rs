//! ## hparena-core::alloc
//! **Huge-page region allocation**
//!
//! ### Expectations (Production):
//! - O(1) bump path with no locking and no per-allocation metadata
//! - One `mmap` per chunk, 2 MiB granularity, page-aligned chunk bases
//! - Whole-arena teardown; nothing is freed individually
//!
//! ### Key Submodules:
//! - `arena/`: the [`HugepageArena`] itself
//! - `policy/`: failure policy and chunk growth strategy
//! - `pages/`: `mmap`-backed page sources
//! - `poison/`: AddressSanitizer hooks and redzones
//! - `stats/`: usage snapshots

pub mod align;
pub mod arena;
pub mod options;
pub mod pages;
pub mod poison;
pub mod policy;
pub mod stats;

pub use align::{align_up, checked_align_up, HUGE_PAGE_SIZE, PAGE_SIZE};
pub use arena::HugepageArena;
pub use options::ArenaOptions;
pub use pages::{MmapPages, PageKind, PageSource};
pub use poison::{DefaultPoisoner, NoopPoisoner, Poisoner};
pub use policy::{FailurePolicy, GrowthStrategy, UnknownVariant};
pub use stats::ArenaStats;
