//! ## hparena-core::alloc::stats
//! **Arena usage snapshot**
//!
//! Computed from the chunk list on request so the bump path carries no
//! counters.

use std::fmt;

use super::pages::PageKind;

/// Point-in-time view of an arena's backing memory.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Chunks currently owned.
    pub chunks: usize,
    /// Chunks backed by huge pages.
    pub huge_chunks: usize,
    /// Chunks that fell back to regular pages.
    pub regular_chunks: usize,
    /// Total bytes mapped across all chunks.
    pub bytes_mapped: usize,
    /// Bytes left in the current chunk.
    pub bytes_remaining: usize,
}

impl ArenaStats {
    pub(crate) fn record_chunk(&mut self, kind: PageKind, size: usize) {
        self.chunks += 1;
        self.bytes_mapped += size;
        match kind {
            PageKind::Huge => self.huge_chunks += 1,
            PageKind::Regular => self.regular_chunks += 1,
        }
    }
}

impl fmt::Display for ArenaStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} chunks ({} huge, {} regular), {} bytes mapped, {} bytes remaining in current chunk",
            self.chunks, self.huge_chunks, self.regular_chunks, self.bytes_mapped, self.bytes_remaining
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_chunk_splits_by_kind() {
        let mut stats = ArenaStats::default();
        stats.record_chunk(PageKind::Huge, 1 << 21);
        stats.record_chunk(PageKind::Regular, 1 << 22);
        stats.record_chunk(PageKind::Huge, 1 << 21);

        assert_eq!(stats.chunks, 3);
        assert_eq!(stats.huge_chunks, 2);
        assert_eq!(stats.regular_chunks, 1);
        assert_eq!(stats.bytes_mapped, (1 << 21) * 2 + (1 << 22));
    }
}
