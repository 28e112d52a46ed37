/// Heuristic number of scraped items a single result page yields.
pub const ITEMS_PER_PAGE_ESTIMATE: u64 = 25;

/// Estimates never exceed this; the remainder is reserved for the explicit
/// `completed` transition.
pub const PROGRESS_CEILING: f64 = 95.0;

/// Bar fill used while progress is indeterminate.
pub const INDETERMINATE_FILL: u8 = 10;

/// Bar fill once the job reports `completed`.
pub const COMPLETE_FILL: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Work is under way but nothing measurable has been processed yet.
    Indeterminate,
    /// Percentage in `[0, 100]`.
    Percent(f64),
}

impl Progress {
    pub fn complete() -> Self {
        Progress::Percent(f64::from(COMPLETE_FILL))
    }

    /// Whole-percent bar fill; fractional estimates are floored.
    pub fn fill(self) -> u8 {
        match self {
            Progress::Indeterminate => INDETERMINATE_FILL,
            Progress::Percent(pct) => pct.clamp(0.0, 100.0).floor() as u8,
        }
    }

    pub fn is_indeterminate(self) -> bool {
        matches!(self, Progress::Indeterminate)
    }
}

/// Estimates job progress from the number of processed items and the number
/// of pages the job was asked to scrape. A non-positive page count is
/// treated as one page.
pub fn estimate(processed_count: u64, max_pages: i64) -> Progress {
    if processed_count == 0 {
        return Progress::Indeterminate;
    }
    let pages = max_pages.max(1) as f64;
    let expected_total = ITEMS_PER_PAGE_ESTIMATE as f64 * pages;
    let pct = processed_count as f64 / expected_total * 100.0;
    Progress::Percent(pct.min(PROGRESS_CEILING))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_processed_is_indeterminate() {
        assert_eq!(estimate(0, 3), Progress::Indeterminate);
        assert_eq!(estimate(0, 0), Progress::Indeterminate);
        assert_eq!(estimate(0, 3).fill(), INDETERMINATE_FILL);
    }

    #[test]
    fn one_full_page_hits_ceiling() {
        assert_eq!(estimate(25, 1), Progress::Percent(PROGRESS_CEILING));
        assert_eq!(estimate(1000, 1), Progress::Percent(PROGRESS_CEILING));
    }

    #[test]
    fn fractional_estimate_is_floored_for_display() {
        let progress = estimate(20, 3);
        match progress {
            Progress::Percent(pct) => assert!((pct - 26.666).abs() < 0.01),
            Progress::Indeterminate => panic!("expected a percentage"),
        }
        assert_eq!(progress.fill(), 26);
    }

    #[test]
    fn non_positive_pages_clamp_to_one() {
        assert_eq!(estimate(5, 0), estimate(5, 1));
        assert_eq!(estimate(5, -4), estimate(5, 1));
        assert_eq!(estimate(5, 1).fill(), 20);
    }

    #[test]
    fn estimate_is_bounded_and_monotonic() {
        for pages in 1..=6 {
            let mut previous = 0.0;
            for processed in 1..=400u64 {
                let Progress::Percent(pct) = estimate(processed, pages) else {
                    panic!("processed > 0 must yield a percentage");
                };
                assert!((0.0..=PROGRESS_CEILING).contains(&pct));
                assert!(pct >= previous);
                previous = pct;
            }
        }
    }

    #[test]
    fn complete_fills_the_bar() {
        assert_eq!(Progress::complete().fill(), COMPLETE_FILL);
    }
}
