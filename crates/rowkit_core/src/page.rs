//! One page of a paginated query.

use serde::Serialize;

/// Rows of one page plus the totals used to render pagers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub list: Vec<T>,
    /// 1-based.
    pub page_number: u32,
    pub page_size: u32,
    pub total_page: u64,
    pub total_row: u64,
}

impl<T> Page<T> {
    pub fn new(list: Vec<T>, page_number: u32, page_size: u32, total_page: u64, total_row: u64) -> Self {
        Self {
            list,
            page_number,
            page_size,
            total_page,
            total_row,
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.page_number == 1
    }

    pub fn is_last_page(&self) -> bool {
        u64::from(self.page_number) >= self.total_page
    }

    /// Converts every row while keeping the totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            list: self.list.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_page: self.total_page,
            total_row: self.total_row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Page;

    #[test]
    fn first_and_last_page_flags() {
        let page = Page::new(vec![1, 2], 1, 2, 3, 5);
        assert!(page.is_first_page());
        assert!(!page.is_last_page());

        let last = Page::new(vec![5], 3, 2, 3, 5);
        assert!(last.is_last_page());
    }

    #[test]
    fn map_keeps_totals() {
        let page = Page::new(vec![1, 2], 2, 2, 4, 7).map(|value| value * 10);
        assert_eq!(page.list, vec![10, 20]);
        assert_eq!((page.page_number, page.total_page, page.total_row), (2, 4, 7));
    }
}
