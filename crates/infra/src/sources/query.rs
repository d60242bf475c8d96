//! Pagination and filter parameters for upstream reads.
//!
//! Both collaborators expose owner-scoped, paginated reads. The shapes here
//! are shared by every implementation (in-memory today, remote services
//! behind the same traits).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockrecon_purchasing::PurchaseOrderStatus;

/// Default page size for a single upstream read.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Hard cap on a single page.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Pagination parameters for upstream reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of records to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0),
        }
    }

    /// The page right after this one.
    pub fn next(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }
}

/// Filter criteria for purchase-order reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderFilter {
    /// Status whitelist; `None` returns every status.
    pub statuses: Option<Vec<PurchaseOrderStatus>>,
}

impl PurchaseOrderFilter {
    pub fn matches(&self, status: PurchaseOrderStatus) -> bool {
        self.statuses
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&status))
    }
}

/// Filter criteria for transfer reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFilter {
    /// Only transfers created at or after this time.
    pub created_after: Option<DateTime<Utc>>,
    /// Only transfers created before this time.
    pub created_before: Option<DateTime<Utc>>,
}

impl TransferFilter {
    /// A window whose lower bound lies after its upper bound.
    pub fn is_inverted(&self) -> bool {
        matches!(
            (self.created_after, self.created_before),
            (Some(after), Some(before)) if after > before
        )
    }

    pub fn matches(&self, created_at: DateTime<Utc>) -> bool {
        self.created_after.is_none_or(|after| created_at >= after)
            && self.created_before.is_none_or(|before| created_at < before)
    }
}

/// One page of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of records matching the filter (across all pages).
    pub total: u64,
    pub pagination: Pagination,
    pub has_more: bool,
}

impl<T: Clone> Page<T> {
    /// Slice a fully materialized, already-filtered result set.
    pub fn slice(all: &[T], pagination: Pagination) -> Self {
        let start = (pagination.offset as usize).min(all.len());
        let end = start.saturating_add(pagination.limit as usize).min(all.len());
        Self {
            items: all[start..end].to_vec(),
            total: all.len() as u64,
            pagination,
            has_more: end < all.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_capped() {
        assert_eq!(Pagination::new(Some(5000), None).limit, MAX_PAGE_SIZE);
        assert_eq!(Pagination::new(Some(0), None).limit, 1);
        assert_eq!(Pagination::new(None, Some(7)), Pagination { limit: 50, offset: 7 });
    }

    #[test]
    fn page_slice_reports_has_more() {
        let all: Vec<u32> = (0..5).collect();
        let first = Page::slice(&all, Pagination::new(Some(2), None));
        assert_eq!(first.items, vec![0, 1]);
        assert!(first.has_more);

        let last = Page::slice(&all, first.pagination.next().next());
        assert_eq!(last.items, vec![4]);
        assert!(!last.has_more);
        assert_eq!(last.total, 5);

        let past_end = Page::slice(&all, Pagination::new(Some(2), Some(10)));
        assert!(past_end.items.is_empty());
        assert!(!past_end.has_more);
    }

    #[test]
    fn status_filter() {
        let filter = PurchaseOrderFilter {
            statuses: Some(vec![PurchaseOrderStatus::Accepted]),
        };
        assert!(filter.matches(PurchaseOrderStatus::Accepted));
        assert!(!filter.matches(PurchaseOrderStatus::Draft));
        assert!(PurchaseOrderFilter::default().matches(PurchaseOrderStatus::Draft));
    }
}
