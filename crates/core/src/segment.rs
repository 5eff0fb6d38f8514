//! Segment bookkeeping: pagination state, per-segment counters, and the
//! post-join migration summary.
//!
//! Counters are local to each worker and summed after the join; nothing
//! here is shared between workers.

use std::ops::Range;

/// Pagination state for one scan segment.
///
/// Generic over the opaque continuation-token type handed back by the
/// store. The segment is exhausted once at least one page has been read
/// and the last response carried no continuation token.
#[derive(Debug, Clone)]
pub struct SegmentState<K> {
    pub segment: usize,
    pub last_evaluated_key: Option<K>,
    pub pages_read: usize,
}

impl<K> SegmentState<K> {
    pub fn new(segment: usize) -> Self {
        Self {
            segment,
            last_evaluated_key: None,
            pages_read: 0,
        }
    }

    /// Record one page response and its continuation token (if any).
    pub fn advance(&mut self, next_key: Option<K>) {
        self.pages_read += 1;
        self.last_evaluated_key = next_key;
    }

    pub fn is_exhausted(&self) -> bool {
        self.pages_read > 0 && self.last_evaluated_key.is_none()
    }
}

/// Counters owned by one worker and returned when it finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentReport {
    pub segment: usize,
    pub pages: usize,
    pub items: usize,
}

impl SegmentReport {
    pub fn new(segment: usize) -> Self {
        Self {
            segment,
            pages: 0,
            items: 0,
        }
    }

    pub fn record_page(&mut self, item_count: usize) {
        self.pages += 1;
        self.items += item_count;
    }
}

/// Aggregate totals computed after every worker has joined.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationSummary {
    pub segments: usize,
    pub pages: usize,
    pub items: usize,
    pub avg_page_size: f64,
}

impl MigrationSummary {
    pub fn from_reports(reports: &[SegmentReport]) -> Self {
        let pages: usize = reports.iter().map(|r| r.pages).sum();
        let items: usize = reports.iter().map(|r| r.items).sum();
        Self {
            segments: reports.len(),
            pages,
            items,
            avg_page_size: if pages == 0 {
                0.0
            } else {
                items as f64 / pages as f64
            },
        }
    }
}

/// Startup jitter for a worker, in whole seconds.
///
/// Only kicks in past 20 segments, to spread the initial burst of scans
/// over time instead of hitting the source's read capacity all at once.
/// Returns the half-open range to draw the delay from, `None` when no
/// delay applies.
pub fn jitter_secs(total_segments: usize) -> Option<Range<u64>> {
    if total_segments <= 20 {
        return None;
    }
    let upper = (total_segments / 10).max(2) as u64;
    Some(1..upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_state_not_exhausted_before_first_page() {
        let state: SegmentState<u32> = SegmentState::new(0);
        assert!(!state.is_exhausted());
    }

    #[test]
    fn test_segment_state_exhausted_when_token_absent() {
        let mut state: SegmentState<u32> = SegmentState::new(0);
        state.advance(Some(10));
        assert!(!state.is_exhausted());
        state.advance(None);
        assert!(state.is_exhausted());
        assert_eq!(state.pages_read, 2);
    }

    #[test]
    fn test_report_accumulates_pages_and_items() {
        let mut report = SegmentReport::new(3);
        report.record_page(500);
        report.record_page(250);
        report.record_page(0);
        assert_eq!(report.pages, 3);
        assert_eq!(report.items, 750);
    }

    #[test]
    fn test_summary_sums_reports() {
        let mut a = SegmentReport::new(0);
        a.record_page(500);
        a.record_page(100);
        let mut b = SegmentReport::new(1);
        b.record_page(400);

        let summary = MigrationSummary::from_reports(&[a, b]);
        assert_eq!(summary.segments, 2);
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.items, 1000);
        assert!((summary.avg_page_size - 1000.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_of_no_reports_is_zero() {
        let summary = MigrationSummary::from_reports(&[]);
        assert_eq!(summary.pages, 0);
        assert_eq!(summary.items, 0);
        assert_eq!(summary.avg_page_size, 0.0);
    }

    #[test]
    fn test_no_jitter_up_to_twenty_segments() {
        for segments in [1, 5, 20] {
            assert_eq!(jitter_secs(segments), None);
        }
    }

    #[test]
    fn test_jitter_range_past_twenty_segments() {
        assert_eq!(jitter_secs(21), Some(1..2));
        assert_eq!(jitter_secs(100), Some(1..10));
        assert_eq!(jitter_secs(250), Some(1..25));
    }
}
