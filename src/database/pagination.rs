use serde::{Deserialize, Serialize};

use crate::{constants::MAX_PAGE_SIZE, error::ApiError};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct PageContext<T> {
    pub rows: Vec<T>,
    pub total_rows: i64,
    pub next_offset: Option<i64>,
    pub prev_offset: Option<i64>,
}

impl<T> PageContext<T> {
    pub fn from_rows(rows: Vec<T>, total_rows: i64, page_size: i64, current_offset: i64) -> Self {
        if total_rows <= 0 {
            return Self::no_rows();
        }

        let next_offset = current_offset.saturating_add(page_size);
        let next_offset = (next_offset < total_rows).then_some(next_offset);

        // a page past the end links back to the last page that has rows
        let last_offset = (total_rows - 1) / page_size * page_size;
        let prev_offset = (current_offset > 0).then(|| {
            current_offset
                .saturating_sub(page_size)
                .clamp(0, last_offset)
        });

        Self {
            rows,
            total_rows,
            next_offset,
            prev_offset,
        }
    }

    pub fn no_rows() -> Self {
        Self {
            rows: vec![],
            total_rows: 0,
            next_offset: None,
            prev_offset: None,
        }
    }

    pub fn map<U, F>(self, f: F) -> PageContext<U>
    where
        F: FnMut(T) -> U,
    {
        PageContext {
            rows: self.rows.into_iter().map(f).collect(),
            total_rows: self.total_rows,
            next_offset: self.next_offset,
            prev_offset: self.prev_offset,
        }
    }
}

/// Resolved `page`/`limit` pair. Pages are 1-based and the offset always fits in an i64.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
    offset: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Result<Self, ApiError> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(ApiError::validation("Page numbers start at 1"));
        }

        let limit = limit.unwrap_or(default_limit);
        if limit < 1 {
            return Err(ApiError::validation("Limit must be positive"));
        }

        let limit = limit.min(MAX_PAGE_SIZE);
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| ApiError::validation("page: Page number is too large"))?;

        Ok(Self {
            page,
            limit,
            offset,
        })
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_first_page_has_no_neighbours() {
        let page: PageContext<i32> = PageContext::from_rows(vec![], 0, 6, 0);
        assert_eq!(page, PageContext::no_rows());
    }

    #[test]
    fn middle_page_links_both_ways() {
        let page = PageContext::from_rows(vec![7, 8, 9], 10, 3, 3);
        assert_eq!(page.next_offset, Some(6));
        assert_eq!(page.prev_offset, Some(0));
        assert_eq!(page.total_rows, 10);
    }

    #[test]
    fn last_page_has_no_next() {
        let page = PageContext::from_rows(vec![10], 10, 3, 9);
        assert_eq!(page.next_offset, None);
        assert_eq!(page.prev_offset, Some(6));
    }

    #[test]
    fn past_the_end_links_back_to_last_page() {
        let page: PageContext<i32> = PageContext::from_rows(vec![], 4, 6, 594);
        assert!(page.rows.is_empty());
        assert_eq!(page.total_rows, 4);
        assert_eq!(page.next_offset, None);
        assert_eq!(page.prev_offset, Some(0));

        let page: PageContext<i32> = PageContext::from_rows(vec![], 10, 3, 30);
        assert_eq!(page.prev_offset, Some(9));
    }

    #[test]
    fn empty_result_past_the_end_has_no_links() {
        let page: PageContext<i32> = PageContext::from_rows(vec![], 0, 6, 594);
        assert_eq!(page, PageContext::no_rows());
    }

    #[test]
    fn huge_offsets_do_not_overflow() {
        let page: PageContext<i32> = PageContext::from_rows(vec![], 4, MAX_PAGE_SIZE, i64::MAX);
        assert_eq!(page.next_offset, None);
        assert_eq!(page.prev_offset, Some(0));
    }

    #[test]
    fn map_keeps_links() {
        let page = PageContext::from_rows(vec![1, 2], 5, 2, 0).map(|n| n * 10);
        assert_eq!(page.rows, vec![10, 20]);
        assert_eq!(page.next_offset, Some(2));
    }

    #[test]
    fn page_request_resolves_offset_and_clamps_limit() {
        let request = PageRequest::new(Some(3), Some(4), 6).unwrap();
        assert_eq!(request.offset(), 8);

        let request = PageRequest::new(None, None, 6).unwrap();
        assert_eq!((request.page, request.limit, request.offset()), (1, 6, 0));

        let request = PageRequest::new(None, Some(10_000), 6).unwrap();
        assert_eq!(request.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn page_request_rejects_non_positive_values() {
        assert!(matches!(
            PageRequest::new(Some(0), None, 6),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            PageRequest::new(None, Some(0), 6),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn page_request_rejects_offsets_that_overflow() {
        match PageRequest::new(Some(i64::MAX), Some(100), 6) {
            Err(ApiError::Validation(info)) => assert!(info.starts_with("page")),
            other => panic!("expected a validation error, got {other:?}"),
        }

        let request = PageRequest::new(Some(i64::MAX / MAX_PAGE_SIZE), None, MAX_PAGE_SIZE).unwrap();
        assert!(request.offset() > 0);
    }
}
