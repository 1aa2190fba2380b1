//! Page window. A zero page size means "no LIMIT".

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_number: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Pagination {
            page_number,
            page_size,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.page_number == 0 && self.page_size == 0
    }

    pub fn has_page_number(&self) -> bool {
        self.page_number > 0
    }

    pub fn has_page_size(&self) -> bool {
        self.page_size > 0
    }

    /// Rows skipped before this page; pages are 1-based.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_size) * u64::from(self.page_number.saturating_sub(1))
    }

    /// Caps the page size at `max` (0 or larger sizes are replaced by `max`).
    pub fn clamped(self, max: u32) -> Self {
        let page_size = if self.page_size == 0 || self.page_size > max {
            max
        } else {
            self.page_size
        };
        Pagination { page_size, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_one_based() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(3, 10).offset(), 20);
        assert_eq!(Pagination::new(0, 10).offset(), 0);
    }

    #[test]
    fn offset_does_not_overflow() {
        let p = Pagination::new(u32::MAX, u32::MAX);
        assert_eq!(p.offset(), u64::from(u32::MAX) * u64::from(u32::MAX - 1));
    }

    #[test]
    fn clamp_replaces_unbounded_and_large_sizes() {
        assert_eq!(Pagination::new(2, 0).clamped(100), Pagination::new(2, 100));
        assert_eq!(Pagination::new(2, 500).clamped(100).page_size, 100);
        assert_eq!(Pagination::new(2, 20).clamped(100).page_size, 20);
    }
}
