//! ## hparena-core::alloc::arena
//! **Bump allocation over huge-page chunks**
//!
//! Requests are served by advancing an offset through the current chunk. When
//! a request does not fit, a new chunk is mapped (huge pages first, then the
//! configured [`FailurePolicy`]) and becomes current; whatever was left in the
//! previous chunk is abandoned. Nothing is freed until the arena is dropped.
//!
//! The arena is single-owner and single-threaded: allocation takes `&self`
//! through `Cell`/`RefCell`, which makes the type `!Sync`. Share it across
//! threads only behind your own lock, or give each thread its own arena.

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::io;
use std::ptr::{self, NonNull};
use std::slice;

use tracing::{debug, error};

use super::align::{align_up, checked_align_up, HUGE_PAGE_SIZE, PAGE_SIZE};
use super::options::ArenaOptions;
use super::pages::{MmapPages, PageKind, PageSource};
use super::poison::{DefaultPoisoner, Poisoner};
use super::policy::FailurePolicy;
use super::stats::ArenaStats;
use crate::error::ArenaError;

/// One contiguous mapping owned by an arena.
#[derive(Debug)]
struct Chunk {
    base: NonNull<u8>,
    size: usize,
    kind: PageKind,
}

impl Chunk {
    fn new(base: NonNull<u8>, size: usize, kind: PageKind) -> Self {
        // Alignment up to a page is only honoured because chunks start on one.
        assert_eq!(
            base.as_ptr() as usize % PAGE_SIZE,
            0,
            "page source returned a chunk that is not page aligned"
        );
        Self { base, size, kind }
    }

    fn contains(&self, addr: usize) -> bool {
        let start = self.base.as_ptr() as usize;
        addr >= start && addr < start + self.size
    }
}

/// Region allocator backed by huge pages.
#[derive(Debug)]
pub struct HugepageArena<S: PageSource = MmapPages, P: Poisoner = DefaultPoisoner> {
    /// Base of the current chunk; null until the first chunk is mapped.
    base: Cell<*mut u8>,
    /// Offset of the next free byte in the current chunk.
    offset: Cell<usize>,
    /// Size of the current chunk.
    capacity: Cell<usize>,
    chunks: RefCell<Vec<Chunk>>,
    options: ArenaOptions,
    source: S,
    poisoner: P,
}

// SAFETY: every chunk is exclusively owned by the arena; moving the arena moves
// that ownership. Borrows handed out by `alloc` are tied to `&self`, so none can
// outlive a move.
unsafe impl<S: PageSource + Send, P: Poisoner + Send> Send for HugepageArena<S, P> {}

impl HugepageArena {
    /// Creates an empty arena with default options and the given failure policy.
    ///
    /// No memory is mapped until the first allocation.
    pub fn new(policy: FailurePolicy) -> Self {
        Self::with_options(ArenaOptions::new(policy))
    }

    /// Creates an empty arena backed by `mmap`.
    ///
    /// # Panics
    ///
    /// If `options` has a granularity or alignment ceiling that is not a power
    /// of two, or an alignment ceiling above the page size.
    pub fn with_options(options: ArenaOptions) -> Self {
        Self::with_parts(options, MmapPages, DefaultPoisoner::default())
    }
}

impl Default for HugepageArena {
    fn default() -> Self {
        Self::with_options(ArenaOptions::default())
    }
}

impl<S: PageSource, P: Poisoner> HugepageArena<S, P> {
    /// Creates an empty arena over an arbitrary page source and set of
    /// instrumentation hooks.
    ///
    /// # Panics
    ///
    /// See [`HugepageArena::with_options`].
    pub fn with_parts(options: ArenaOptions, source: S, poisoner: P) -> Self {
        options.assert_valid();
        Self {
            base: Cell::new(ptr::null_mut()),
            offset: Cell::new(0),
            capacity: Cell::new(0),
            chunks: RefCell::new(Vec::new()),
            options,
            source,
            poisoner,
        }
    }

    /// Allocates `size` bytes at a multiple of `alignment`.
    ///
    /// The returned memory is writable and stays valid until the arena is
    /// dropped. A zero-sized request still yields a non-null, aligned address
    /// inside the arena, which must not be dereferenced.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::InvalidAlignment`] if `alignment` is not a power of two or
    ///   exceeds [`ArenaOptions::max_alignment`]. The arena is left untouched.
    /// - [`ArenaError::OutOfMemory`] if no chunk could be mapped under the
    ///   configured [`FailurePolicy`].
    /// - [`ArenaError::BookkeepingAllocationFailure`] if the chunk list could not
    ///   grow.
    #[inline]
    pub fn allocate(&self, size: usize, alignment: usize) -> Result<NonNull<u8>, ArenaError> {
        if !alignment.is_power_of_two() || alignment > self.options.max_alignment {
            return Err(ArenaError::InvalidAlignment {
                alignment,
                max: self.options.max_alignment,
            });
        }
        let alignment = alignment.max(P::GRANULE);

        match self.try_bump(size, alignment) {
            Some(ptr) => Ok(ptr),
            None => self.allocate_slow(size, alignment),
        }
    }

    /// [`allocate`](Self::allocate) for a [`Layout`].
    #[inline]
    pub fn alloc_layout(&self, layout: Layout) -> Result<NonNull<u8>, ArenaError> {
        self.allocate(layout.size(), layout.align())
    }

    /// Allocates `size` zeroed bytes at a multiple of `alignment`.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_bytes(&self, size: usize, alignment: usize) -> Result<&mut [u8], ArenaError> {
        let ptr = self.allocate(size, alignment)?;
        // SAFETY: a fresh span of a zero-initialised chunk that is never handed out again.
        Ok(unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), size) })
    }

    /// Moves `value` into the arena.
    ///
    /// The value is never dropped; its memory is reclaimed with the arena.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T>(&self, value: T) -> Result<&mut T, ArenaError> {
        let ptr = self.alloc_layout(Layout::new::<T>())?.cast::<T>();
        // SAFETY: fresh, suitably aligned, exclusively ours for the arena's lifetime.
        unsafe {
            ptr.as_ptr().write(value);
            Ok(&mut *ptr.as_ptr())
        }
    }

    /// Allocates a slice of `len` elements, initialising element `i` with `f(i)`.
    ///
    /// Elements are never dropped.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_fill_with<T, F>(&self, len: usize, mut f: F) -> Result<&mut [T], ArenaError>
    where
        F: FnMut(usize) -> T,
    {
        let layout = Layout::array::<T>(len)
            .map_err(|_| ArenaError::size_overflow(len.saturating_mul(std::mem::size_of::<T>())))?;
        let ptr = self.alloc_layout(layout)?.cast::<T>();
        for i in 0..len {
            // SAFETY: `i < len` and the allocation holds `len` elements.
            unsafe { ptr.as_ptr().add(i).write(f(i)) };
        }
        // SAFETY: all `len` elements were initialised above.
        Ok(unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), len) })
    }

    /// Number of chunks mapped so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks.borrow().len()
    }

    /// Bytes left in the current chunk before the next one is mapped.
    pub fn remaining(&self) -> usize {
        self.capacity.get() - self.offset.get()
    }

    /// Whether `ptr` points into memory owned by this arena.
    pub fn owns(&self, ptr: *const u8) -> bool {
        let addr = ptr as usize;
        self.chunks.borrow().iter().any(|chunk| chunk.contains(addr))
    }

    pub fn options(&self) -> &ArenaOptions {
        &self.options
    }

    pub fn page_source(&self) -> &S {
        &self.source
    }

    pub fn poisoner(&self) -> &P {
        &self.poisoner
    }

    pub fn stats(&self) -> ArenaStats {
        let mut stats = ArenaStats::default();
        for chunk in self.chunks.borrow().iter() {
            stats.record_chunk(chunk.kind, chunk.size);
        }
        stats.bytes_remaining = self.remaining();
        stats
    }

    /// The bump itself. Touches only the cursor cells.
    #[inline(always)]
    fn try_bump(&self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        let base = NonNull::new(self.base.get())?;
        let start = align_up(self.offset.get(), alignment);
        let end = start.checked_add(size)?.checked_add(P::REDZONE)?;
        let capacity = self.capacity.get();
        // `start == capacity` would hand a zero-sized request the one-past-end address.
        if end > capacity || start >= capacity {
            return None;
        }
        self.offset.set(end);

        // SAFETY: `start <= end <= capacity`, so the pointer stays inside the chunk.
        let ptr = unsafe { NonNull::new_unchecked(base.as_ptr().add(start)) };
        self.poisoner.mark_accessible(ptr.as_ptr(), size);
        Some(ptr)
    }

    #[cold]
    #[inline(never)]
    fn allocate_slow(&self, size: usize, alignment: usize) -> Result<NonNull<u8>, ArenaError> {
        let required = size
            .checked_add(P::REDZONE)
            .ok_or_else(|| ArenaError::size_overflow(size))?;
        let chunk_size = self
            .options
            .growth
            .next_chunk_size(self.capacity.get(), required, self.options.chunk_granularity)
            .ok_or_else(|| ArenaError::size_overflow(size))?;

        let mut chunks = self.chunks.borrow_mut();
        chunks.try_reserve(1)?;

        let chunk = self.map_chunk(chunk_size, size)?;
        let (kind, mapped) = (chunk.kind, chunk.size);
        self.poisoner.mark_inaccessible(chunk.base.as_ptr(), chunk.size);
        self.base.set(chunk.base.as_ptr());
        self.offset.set(0);
        self.capacity.set(chunk.size);
        chunks.push(chunk);
        debug!(chunk_size = mapped, kind = %kind, chunks = chunks.len(), "mapped arena chunk");
        drop(chunks);

        // A page-aligned chunk of at least `size + REDZONE` bytes always fits.
        match self.try_bump(size, alignment) {
            Some(ptr) => Ok(ptr),
            None => unreachable!("fresh {mapped}-byte chunk cannot hold {size} bytes"),
        }
    }

    /// Maps a chunk of at least `len` bytes. Huge-page chunks span whole huge
    /// pages, so they may come back larger than `len`.
    fn map_chunk(&self, len: usize, request: usize) -> Result<Chunk, ArenaError> {
        let huge = match checked_align_up(len, HUGE_PAGE_SIZE) {
            Some(huge_len) => self
                .source
                .map(huge_len, PageKind::Huge)
                .map(|base| Chunk::new(base, huge_len, PageKind::Huge)),
            None => Err(io::Error::new(
                io::ErrorKind::OutOfMemory,
                "chunk size overflows a whole number of huge pages",
            )),
        };
        let huge_err = match huge {
            Ok(chunk) => return Ok(chunk),
            Err(err) => err,
        };

        if !self.options.policy.allows_fallback() {
            error!(len, request, error = %huge_err, "huge page mapping failed under strict policy");
            return Err(ArenaError::OutOfMemory {
                size: request,
                source: huge_err,
            });
        }

        debug!(len, error = %huge_err, "huge page mapping failed, falling back to regular pages");
        match self.source.map(len, PageKind::Regular) {
            Ok(base) => Ok(Chunk::new(base, len, PageKind::Regular)),
            Err(err) => {
                error!(len, request, error = %err, "regular page mapping failed");
                Err(ArenaError::OutOfMemory {
                    size: request,
                    source: err,
                })
            }
        }
    }
}

impl<S: PageSource, P: Poisoner> Drop for HugepageArena<S, P> {
    fn drop(&mut self) {
        for chunk in self.chunks.get_mut().drain(..) {
            // Clear the shadow before the range goes back to the OS; a later
            // mapping at the same address must not inherit stale poison.
            self.poisoner.mark_accessible(chunk.base.as_ptr(), chunk.size);
            // SAFETY: mapped by `self.source`, released exactly once, and no
            // borrow of arena memory can outlive `&mut self`.
            if let Err(err) = unsafe { self.source.unmap(chunk.base, chunk.size) } {
                error!(size = chunk.size, kind = %chunk.kind, error = %err, "failed to release arena chunk");
            }
        }
    }
}
