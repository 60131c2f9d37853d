//! ## hparena-core::alloc::pages
//! **Backing memory for arena chunks**
//!
//! The only place the arena talks to the operating system. Everything above
//! this module deals in `(base, len)` pairs.

use std::fmt;
use std::io;
use std::ptr::{self, NonNull};

use super::align::HUGE_PAGE_SIZE;

/// Page granularity a chunk was mapped with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// `MAP_HUGETLB` backing (2 MiB pages).
    Huge,
    /// Ordinary 4 KiB pages.
    Regular,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageKind::Huge => f.write_str("huge"),
            PageKind::Regular => f.write_str("regular"),
        }
    }
}

/// Supplier of page-aligned, zero-initialised, read/write memory regions.
pub trait PageSource {
    /// Maps `len` bytes backed by pages of the given kind.
    fn map(&self, len: usize, kind: PageKind) -> io::Result<NonNull<u8>>;

    /// Returns a region to the system.
    ///
    /// # Safety
    ///
    /// `base` and `len` must describe a region previously returned by
    /// [`PageSource::map`] on this source, and no reference into it may be
    /// used afterwards.
    unsafe fn unmap(&self, base: NonNull<u8>, len: usize) -> io::Result<()>;
}

/// Anonymous private mappings through `mmap(2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MmapPages;

impl PageSource for MmapPages {
    fn map(&self, len: usize, kind: PageKind) -> io::Result<NonNull<u8>> {
        let mut flags = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS;
        if kind == PageKind::Huge {
            // The kernel would round the length up, and munmap of the recorded
            // length would then fail.
            if len % HUGE_PAGE_SIZE != 0 {
                return Err(io::Error::from_raw_os_error(libc::EINVAL));
            }
            flags |= libc::MAP_HUGETLB;
        }

        // SAFETY: anonymous mapping with no address hint; the kernel picks a fresh range.
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                flags,
                -1,
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "mmap returned null"))
    }

    unsafe fn unmap(&self, base: NonNull<u8>, len: usize) -> io::Result<()> {
        if libc::munmap(base.as_ptr().cast(), len) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
