//! Page windows for product listings.
//!
//! Lookup is lenient: a missing or non-numeric `?page=` falls back to the
//! first page, and a number outside the valid range falls back to the last.

/// Splits `total` rows into pages of `per_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total: u64,
    per_page: u32,
}

/// One resolved page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based page number.
    pub number: u32,
    pub num_pages: u32,
    /// Row offset for `OFFSET`.
    pub offset: i64,
    /// Row count for `LIMIT`.
    pub limit: i64,
}

impl Paginator {
    /// Create a paginator. A `per_page` of zero is treated as one.
    #[must_use]
    pub fn new(total: u64, per_page: u32) -> Self {
        Self {
            total,
            per_page: per_page.max(1),
        }
    }

    /// Number of pages; an empty listing still has one (empty) page.
    #[must_use]
    pub fn num_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    /// Resolve the requested page string.
    #[must_use]
    pub fn page(&self, requested: Option<&str>) -> PageInfo {
        let num_pages = self.num_pages();
        let number = match requested.map(str::trim).map(str::parse::<i64>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n >= 1 && n <= i64::from(num_pages) => {
                u32::try_from(n).unwrap_or(num_pages)
            }
            Some(Ok(_)) => num_pages,
        };

        PageInfo {
            number,
            num_pages,
            offset: i64::from(number - 1) * i64::from(self.per_page),
            limit: i64::from(self.per_page),
        }
    }
}

impl PageInfo {
    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.number > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    /// Previous page number (saturates at 1).
    #[must_use]
    pub const fn prev(&self) -> u32 {
        if self.number > 1 { self.number - 1 } else { 1 }
    }

    /// Next page number (saturates at the last page).
    #[must_use]
    pub const fn next(&self) -> u32 {
        if self.number < self.num_pages {
            self.number + 1
        } else {
            self.num_pages
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_listing_has_one_page() {
        let p = Paginator::new(0, 16);
        assert_eq!(p.num_pages(), 1);
        let page = p.page(Some("3"));
        assert_eq!(page.number, 1);
        assert_eq!(page.offset, 0);
        assert!(!page.has_next());
    }

    #[test]
    fn missing_or_garbage_page_is_first() {
        let p = Paginator::new(40, 16);
        assert_eq!(p.page(None).number, 1);
        assert_eq!(p.page(Some("two")).number, 1);
        assert_eq!(p.page(Some("")).number, 1);
    }

    #[test]
    fn out_of_range_page_is_last() {
        let p = Paginator::new(40, 16);
        assert_eq!(p.num_pages(), 3);
        assert_eq!(p.page(Some("99")).number, 3);
        assert_eq!(p.page(Some("0")).number, 3);
        assert_eq!(p.page(Some("-1")).number, 3);
    }

    #[test]
    fn offsets_and_neighbours() {
        let page = Paginator::new(40, 16).page(Some("2"));
        assert_eq!(page.offset, 16);
        assert_eq!(page.limit, 16);
        assert!(page.has_prev());
        assert!(page.has_next());
        assert_eq!(page.prev(), 1);
        assert_eq!(page.next(), 3);
    }
}
