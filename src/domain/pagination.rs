//! Count-based pagination shared by every catalog listing.

use super::DomainError;

/// Offset/limit window computed for one page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Page actually served (after clamping, if any).
    pub page: i64,
    pub offset: u64,
    /// Zero means the window is known to be empty and no fetch is needed.
    pub limit: u64,
    pub total_pages: i64,
}

impl PageWindow {
    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }
}

/// Page number and size as requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }
}

/// Computes the window for `requested_page` out of `total_count` items.
///
/// With `clamp` set (homepage carousels), a page past the end wraps to 1 and
/// a page before the start wraps to the last page. Without it, an
/// out-of-range page yields an empty window and the caller still reports the
/// right `total_pages`.
pub fn paginate(
    total_count: u64,
    page_size: i64,
    requested_page: i64,
    clamp: bool,
) -> Result<PageWindow, DomainError> {
    if page_size <= 0 {
        return Err(DomainError::InvalidArgument(format!(
            "page size must be positive, got {}",
            page_size
        )));
    }

    let size = page_size as u64;
    let total_pages = total_count.div_ceil(size) as i64;

    let page = if clamp {
        if total_pages == 0 || requested_page > total_pages {
            1
        } else if requested_page < 1 {
            total_pages
        } else {
            requested_page
        }
    } else {
        requested_page
    };

    let empty = PageWindow {
        page,
        offset: 0,
        limit: 0,
        total_pages,
    };
    if page < 1 || page > total_pages {
        return Ok(empty);
    }

    // Offsets are bound as signed 64-bit values by the SQLite driver.
    match (page as u64 - 1).checked_mul(size) {
        Some(offset) if offset <= i64::MAX as u64 => Ok(PageWindow {
            page,
            offset,
            limit: size,
            total_pages,
        }),
        _ => Ok(empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_is_ceiling() {
        for (count, size, expected) in [(0, 10, 0), (1, 10, 1), (10, 10, 1), (11, 10, 2), (95, 7, 14)] {
            let w = paginate(count, size, 1, false).unwrap();
            assert_eq!(w.total_pages, expected, "count={} size={}", count, size);
        }
    }

    #[test]
    fn test_offset_follows_page() {
        let w = paginate(45, 10, 3, false).unwrap();
        assert_eq!(w.page, 3);
        assert_eq!(w.offset, 20);
        assert_eq!(w.limit, 10);
    }

    #[test]
    fn test_clamp_wraps_past_the_end_to_first_page() {
        let w = paginate(45, 10, 5 + 5, true).unwrap();
        assert_eq!(w.page, 1);
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn test_clamp_wraps_before_start_to_last_page() {
        for requested in [0, -1, -40] {
            let w = paginate(45, 10, requested, true).unwrap();
            assert_eq!(w.page, 5);
            assert_eq!(w.offset, 40);
        }
    }

    #[test]
    fn test_clamp_on_empty_listing_serves_first_page() {
        let w = paginate(0, 10, 0, true).unwrap();
        assert_eq!(w.page, 1);
        assert_eq!(w.total_pages, 0);
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn test_plain_mode_page_past_the_end_is_empty() {
        let w = paginate(45, 10, 9, false).unwrap();
        assert!(w.is_empty());
        assert_eq!(w.page, 9);
        assert_eq!(w.offset, 0);
        assert_eq!(w.total_pages, 5);
    }

    #[test]
    fn test_last_page_is_still_served() {
        let w = paginate(45, 10, 5, false).unwrap();
        assert_eq!(w.offset, 40);
        assert_eq!(w.limit, 10);
    }

    #[test]
    fn test_huge_page_number_is_empty_without_overflow() {
        let w = paginate(45, 10, i64::MAX, false).unwrap();
        assert!(w.is_empty());
        assert_eq!(w.page, i64::MAX);
        assert_eq!(w.total_pages, 5);
    }

    #[test]
    fn test_huge_page_size_stays_bindable() {
        let w = paginate(45, i64::MAX, 1, false).unwrap();
        assert_eq!(w.total_pages, 1);
        assert_eq!(w.offset, 0);
        assert!(w.limit <= i64::MAX as u64);

        let w = paginate(45, i64::MAX, 3, false).unwrap();
        assert!(w.is_empty());

        let w = paginate(45, i64::MAX, 3, true).unwrap();
        assert_eq!(w.page, 1);
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn test_plain_mode_page_zero_is_empty() {
        let w = paginate(45, 10, 0, false).unwrap();
        assert!(w.is_empty());
        assert_eq!(w.total_pages, 5);
    }

    #[test]
    fn test_non_positive_page_size_is_rejected() {
        assert!(matches!(
            paginate(10, 0, 1, false),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            paginate(10, -3, 1, true),
            Err(DomainError::InvalidArgument(_))
        ));
    }
}
