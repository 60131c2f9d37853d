//! ## hparena-core::alloc::align
//! **Power-of-two rounding helpers**

/// Ordinary page size; the largest alignment a fresh chunk is guaranteed to have.
pub const PAGE_SIZE: usize = 4096;

/// Huge page size and the default chunk granularity.
pub const HUGE_PAGE_SIZE: usize = 1 << 21;

/// Rounds `size` up to the next multiple of `alignment`.
///
/// `alignment` must be a non-zero power of two. The result wraps if `size` is
/// within `alignment` of `usize::MAX`; use [`checked_align_up`] where the input
/// is caller-controlled.
#[inline(always)]
pub const fn align_up(size: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    size.wrapping_add(alignment - 1) & !(alignment - 1)
}

/// [`align_up`] that returns `None` instead of wrapping.
#[inline]
pub const fn checked_align_up(size: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    match size.checked_add(alignment - 1) {
        Some(padded) => Some(padded & !(alignment - 1)),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_basic_cases() {
        assert_eq!(align_up(1, 8), 8);
        assert_eq!(align_up(8, 8), 8);
        assert_eq!(align_up(9, 8), 16);
        assert_eq!(align_up(15, 16), 16);
        assert_eq!(align_up(17, 16), 32);
    }

    #[test]
    fn align_up_zero_and_unit_alignment() {
        assert_eq!(align_up(0, 4096), 0);
        assert_eq!(align_up(0, 1), 0);
        assert_eq!(align_up(12345, 1), 12345);
        assert_eq!(align_up(HUGE_PAGE_SIZE + 1, HUGE_PAGE_SIZE), 2 * HUGE_PAGE_SIZE);
    }

    #[test]
    fn checked_align_up_detects_overflow() {
        assert_eq!(checked_align_up(usize::MAX, 8), None);
        assert_eq!(checked_align_up(usize::MAX - 7, 8), Some(usize::MAX - 7));
        assert_eq!(checked_align_up(4097, PAGE_SIZE), Some(2 * PAGE_SIZE));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn align_up_rejects_non_power_of_two() {
        align_up(10, 12);
    }
}
