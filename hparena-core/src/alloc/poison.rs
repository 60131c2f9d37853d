//! ## hparena-core::alloc::poison
//! **Memory-error instrumentation hooks**
//!
//! A freshly mapped chunk is poisoned as a whole; each allocation then
//! unpoisons exactly its own span. The `REDZONE` bytes reserved after every
//! allocation stay poisoned, so an overrun trips the sanitizer instead of
//! silently landing in the neighbouring object.
//!
//! [`NoopPoisoner`] compiles to nothing. [`AsanPoisoner`] is available with the
//! `asan` feature and must only be used in binaries built with
//! `-Zsanitizer=address`.

/// Accessibility hooks invoked by the arena.
pub trait Poisoner {
    /// Trailing bytes reserved after every allocation and never unpoisoned.
    const REDZONE: usize;

    /// Minimum start alignment of an allocation. Shadow memory tracks
    /// accessibility in granules, so allocations start on granule boundaries.
    const GRANULE: usize;

    /// Marks `[ptr, ptr + len)` as not yet handed out.
    fn mark_inaccessible(&self, ptr: *const u8, len: usize);

    /// Marks `[ptr, ptr + len)` as live.
    fn mark_accessible(&self, ptr: *const u8, len: usize);
}

/// Uninstrumented builds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPoisoner;

impl Poisoner for NoopPoisoner {
    const REDZONE: usize = 0;
    const GRANULE: usize = 1;

    #[inline(always)]
    fn mark_inaccessible(&self, _ptr: *const u8, _len: usize) {}

    #[inline(always)]
    fn mark_accessible(&self, _ptr: *const u8, _len: usize) {}
}

#[cfg(feature = "asan")]
mod asan {
    use std::ffi::c_void;

    extern "C" {
        fn __asan_poison_memory_region(addr: *const c_void, size: usize);
        fn __asan_unpoison_memory_region(addr: *const c_void, size: usize);
    }

    /// AddressSanitizer manual poisoning.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct AsanPoisoner;

    impl super::Poisoner for AsanPoisoner {
        const REDZONE: usize = 8;
        const GRANULE: usize = 8;

        #[inline]
        fn mark_inaccessible(&self, ptr: *const u8, len: usize) {
            // SAFETY: only updates shadow memory for a range the arena owns.
            unsafe { __asan_poison_memory_region(ptr.cast(), len) }
        }

        #[inline]
        fn mark_accessible(&self, ptr: *const u8, len: usize) {
            // SAFETY: as above.
            unsafe { __asan_unpoison_memory_region(ptr.cast(), len) }
        }
    }
}

#[cfg(feature = "asan")]
pub use asan::AsanPoisoner;

/// Hooks selected by the build configuration.
#[cfg(feature = "asan")]
pub type DefaultPoisoner = AsanPoisoner;

/// Hooks selected by the build configuration.
#[cfg(not(feature = "asan"))]
pub type DefaultPoisoner = NoopPoisoner;

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::Poisoner;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Mark {
        Inaccessible(usize, usize),
        Accessible(usize, usize),
    }

    /// Records every hook call; configured like an instrumented build.
    #[derive(Debug, Default)]
    pub struct RecordingPoisoner {
        pub marks: RefCell<Vec<Mark>>,
    }

    impl Poisoner for RecordingPoisoner {
        const REDZONE: usize = 8;
        const GRANULE: usize = 8;

        fn mark_inaccessible(&self, ptr: *const u8, len: usize) {
            self.marks
                .borrow_mut()
                .push(Mark::Inaccessible(ptr as usize, len));
        }

        fn mark_accessible(&self, ptr: *const u8, len: usize) {
            self.marks
                .borrow_mut()
                .push(Mark::Accessible(ptr as usize, len));
        }
    }
}
