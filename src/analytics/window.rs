use chrono::{Days, Duration, NaiveDate, NaiveDateTime};

use crate::domain::BucketWidth;
use crate::error::{Error, Result};

/// Ceilings on window requests: how far back offset windows may reach
/// (day windows are unbounded backwards) and how many buckets one
/// query may emit.
#[derive(Debug, Clone, Copy)]
pub struct WindowLimits {
    pub max_minute_offset_minutes: i64,
    pub max_hour_offset_hours: i64,
    pub max_buckets: i64,
}

impl Default for WindowLimits {
    fn default() -> Self {
        Self {
            max_minute_offset_minutes: 120,
            max_hour_offset_hours: 168,
            max_buckets: 1000,
        }
    }
}

/// A resolved query window: the dense bucket grid to emit plus the
/// padded calendar-date range to fetch candidate counters from.
///
/// Bucket starts align to the width's grid, so adjacent offsets tile
/// without gap or overlap. Counters are keyed by local calendar date
/// and the fetch range is padded; exact membership is decided by
/// `index_of` during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub width: BucketWidth,
    pub bucket_count: usize,
    /// Start of the oldest bucket
    pub first_start: NaiveDateTime,
    /// Inclusive upper cutoff for rows (unfloored `now - offset`)
    pub end: NaiveDateTime,
    pub fetch_from: NaiveDate,
    pub fetch_to: NaiveDate,
}

impl QueryWindow {
    /// Resolve a window request against local "now". `window_len` and
    /// `offset` are in the width's own unit: minutes for 5-minute
    /// buckets, hours for hourly, days for daily.
    pub fn compute(
        width: BucketWidth,
        window_len: i64,
        offset: i64,
        now: NaiveDateTime,
        limits: &WindowLimits,
    ) -> Result<Self> {
        if window_len < 1 {
            return Err(Error::InvalidWindow(format!(
                "window must be at least 1, got {window_len}"
            )));
        }
        if offset < 0 {
            return Err(Error::InvalidWindow(format!(
                "offset must not be negative, got {offset}"
            )));
        }

        // Cap the emitted grid before any date arithmetic; huge window
        // lengths would otherwise allocate unbounded bucket vectors or
        // overflow chrono durations.
        let max_len = match width {
            BucketWidth::FiveMinute => limits.max_buckets.saturating_mul(5),
            _ => limits.max_buckets,
        };
        if window_len > max_len {
            return Err(Error::InvalidWindow(format!(
                "window exceeds {} buckets",
                limits.max_buckets
            )));
        }

        match width {
            BucketWidth::FiveMinute => {
                if offset > limits.max_minute_offset_minutes {
                    return Err(Error::InvalidWindow(format!(
                        "offset exceeds {} minutes",
                        limits.max_minute_offset_minutes
                    )));
                }
                let end = now - Duration::minutes(offset);
                let anchor = floor_to_grid(end, 5);
                let bucket_count = ((window_len + 4) / 5) as usize;
                let first_start = anchor - Duration::minutes(5 * (bucket_count as i64 - 1));
                Ok(Self {
                    width,
                    bucket_count,
                    first_start,
                    end,
                    fetch_from: first_start.date() - Duration::days(2),
                    fetch_to: end.date() + Duration::days(2),
                })
            }
            BucketWidth::Hour => {
                if offset > limits.max_hour_offset_hours {
                    return Err(Error::InvalidWindow(format!(
                        "offset exceeds {} hours",
                        limits.max_hour_offset_hours
                    )));
                }
                let end = now - Duration::hours(offset);
                let anchor = floor_to_grid(end, 60);
                let bucket_count = window_len as usize;
                let first_start = anchor - Duration::hours(bucket_count as i64 - 1);
                Ok(Self {
                    width,
                    bucket_count,
                    first_start,
                    end,
                    fetch_from: first_start.date() - Duration::days(1),
                    fetch_to: end.date() + Duration::days(1),
                })
            }
            BucketWidth::Day => {
                // Unbounded backwards, but a request past the calendar's
                // edge is still rejected rather than wrapped or panicked on
                let end_date = now
                    .date()
                    .checked_sub_days(Days::new(offset as u64))
                    .ok_or_else(|| {
                        Error::InvalidWindow(format!("offset {offset} is out of range"))
                    })?;
                let bucket_count = window_len as usize;
                let start_date = end_date
                    .checked_sub_days(Days::new(bucket_count as u64 - 1))
                    .ok_or_else(|| {
                        Error::InvalidWindow(format!("window {window_len} is out of range"))
                    })?;
                let first_start = start_date.and_hms_opt(0, 0, 0).unwrap_or_default();
                Ok(Self {
                    width,
                    bucket_count,
                    first_start,
                    // Rows anywhere inside the end date count; membership
                    // for day buckets compares dates, not instants.
                    end: end_date.and_hms_opt(0, 0, 0).unwrap_or_default(),
                    fetch_from: start_date
                        .checked_sub_days(Days::new(1))
                        .unwrap_or(start_date),
                    fetch_to: end_date + Duration::days(1),
                })
            }
        }
    }

    /// Start of bucket `i`, oldest first
    pub fn bucket_start(&self, i: usize) -> NaiveDateTime {
        self.first_start + Duration::minutes(self.width.minutes() * i as i64)
    }

    /// Which emitted bucket the instant belongs to, if any. Instants
    /// past the window end are rejected even when their floored bucket
    /// is emitted, which matters for offset windows.
    pub fn index_of(&self, instant: NaiveDateTime) -> Option<usize> {
        match self.width {
            BucketWidth::Day => {
                let days = (instant.date() - self.first_start.date()).num_days();
                if days < 0 || days as usize >= self.bucket_count {
                    return None;
                }
                Some(days as usize)
            }
            _ => {
                if instant > self.end {
                    return None;
                }
                let minutes = (instant - self.first_start).num_minutes();
                if minutes < 0 {
                    return None;
                }
                let idx = (minutes / self.width.minutes()) as usize;
                if idx >= self.bucket_count {
                    return None;
                }
                Some(idx)
            }
        }
    }

    /// Chart label for bucket `i`
    pub fn label(&self, i: usize) -> String {
        let start = self.bucket_start(i);
        match self.width {
            BucketWidth::FiveMinute => {
                let bucket_end = start + Duration::minutes(5);
                format!(
                    "{} - {}",
                    start.format("%-I:%M %p"),
                    bucket_end.format("%-I:%M %p")
                )
            }
            BucketWidth::Hour => start.format("%-I %p").to_string(),
            BucketWidth::Day => start.format("%b %-d").to_string(),
        }
    }
}

/// Floor an instant onto a minute grid, zeroing seconds
fn floor_to_grid(instant: NaiveDateTime, grid_minutes: i64) -> NaiveDateTime {
    let midnight = instant.date().and_hms_opt(0, 0, 0).unwrap_or_default();
    let minutes_into_day = (instant - midnight).num_minutes();
    midnight + Duration::minutes(minutes_into_day - minutes_into_day % grid_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_floor_to_grid() {
        assert_eq!(floor_to_grid(at(2024, 3, 15, 14, 33, 42), 5), at(2024, 3, 15, 14, 30, 0));
        assert_eq!(floor_to_grid(at(2024, 3, 15, 14, 35, 0), 5), at(2024, 3, 15, 14, 35, 0));
        assert_eq!(floor_to_grid(at(2024, 3, 15, 14, 33, 42), 60), at(2024, 3, 15, 14, 0, 0));
    }

    #[test]
    fn test_minute_window_bucket_count() {
        let limits = WindowLimits::default();
        let now = at(2024, 3, 15, 14, 33, 0);

        let w = QueryWindow::compute(BucketWidth::FiveMinute, 30, 0, now, &limits).unwrap();
        assert_eq!(w.bucket_count, 6);

        // Partial trailing bucket rounds up
        let w = QueryWindow::compute(BucketWidth::FiveMinute, 32, 0, now, &limits).unwrap();
        assert_eq!(w.bucket_count, 7);
    }

    #[test]
    fn test_minute_window_grid_alignment() {
        let limits = WindowLimits::default();
        let now = at(2024, 3, 15, 14, 33, 0);

        let w = QueryWindow::compute(BucketWidth::FiveMinute, 30, 0, now, &limits).unwrap();
        // Newest bucket starts at the 5-minute floor of now
        assert_eq!(w.bucket_start(5), at(2024, 3, 15, 14, 30, 0));
        assert_eq!(w.first_start, at(2024, 3, 15, 14, 5, 0));
        assert_eq!(w.end, now);
    }

    #[test]
    fn test_adjacent_offsets_tile() {
        let limits = WindowLimits::default();
        let now = at(2024, 3, 15, 14, 33, 0);

        let recent = QueryWindow::compute(BucketWidth::FiveMinute, 30, 0, now, &limits).unwrap();
        let older = QueryWindow::compute(BucketWidth::FiveMinute, 30, 30, now, &limits).unwrap();

        // Oldest bucket of the recent window starts exactly one width
        // after the newest bucket of the older window
        let older_newest = older.bucket_start(older.bucket_count - 1);
        assert_eq!(older_newest + Duration::minutes(5), recent.first_start);

        // No instant belongs to both windows
        let boundary = recent.first_start;
        assert!(recent.index_of(boundary).is_some());
        assert!(older.index_of(boundary).is_none());
    }

    #[test]
    fn test_rows_after_end_excluded() {
        let limits = WindowLimits::default();
        let now = at(2024, 3, 15, 14, 33, 0);

        let w = QueryWindow::compute(BucketWidth::FiveMinute, 30, 10, now, &limits).unwrap();
        // end = 14:23, newest bucket covers 14:20..14:25
        assert_eq!(w.end, at(2024, 3, 15, 14, 23, 0));
        assert_eq!(w.index_of(at(2024, 3, 15, 14, 22, 0)), Some(5));
        // 14:24 falls inside the emitted bucket but after the window end
        assert_eq!(w.index_of(at(2024, 3, 15, 14, 24, 0)), None);
    }

    #[test]
    fn test_hour_window() {
        let limits = WindowLimits::default();
        let now = at(2024, 3, 15, 14, 33, 0);

        let w = QueryWindow::compute(BucketWidth::Hour, 12, 0, now, &limits).unwrap();
        assert_eq!(w.bucket_count, 12);
        assert_eq!(w.first_start, at(2024, 3, 15, 3, 0, 0));
        assert_eq!(w.bucket_start(11), at(2024, 3, 15, 14, 0, 0));
        assert_eq!(w.index_of(at(2024, 3, 15, 14, 30, 0)), Some(11));
        assert_eq!(w.index_of(at(2024, 3, 15, 2, 59, 0)), None);
    }

    #[test]
    fn test_day_window() {
        let limits = WindowLimits::default();
        let now = at(2024, 3, 15, 14, 33, 0);

        let w = QueryWindow::compute(BucketWidth::Day, 7, 0, now, &limits).unwrap();
        assert_eq!(w.bucket_count, 7);
        assert_eq!(w.first_start.date(), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        // Events later today still land in the newest bucket
        assert_eq!(w.index_of(at(2024, 3, 15, 23, 59, 0)), Some(6));
        assert_eq!(w.index_of(at(2024, 3, 8, 12, 0, 0)), None);
        assert_eq!(w.index_of(at(2024, 3, 16, 0, 0, 0)), None);
    }

    #[test]
    fn test_day_window_offset() {
        let limits = WindowLimits::default();
        let now = at(2024, 3, 15, 14, 33, 0);

        let w = QueryWindow::compute(BucketWidth::Day, 7, 7, now, &limits).unwrap();
        assert_eq!(w.first_start.date(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(w.end.date(), NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
        assert_eq!(w.index_of(at(2024, 3, 9, 0, 0, 0)), None);
    }

    #[test]
    fn test_window_spans_midnight() {
        let limits = WindowLimits::default();
        let now = at(2024, 3, 15, 0, 12, 0);

        let w = QueryWindow::compute(BucketWidth::FiveMinute, 30, 0, now, &limits).unwrap();
        assert_eq!(w.first_start, at(2024, 3, 14, 23, 45, 0));
        assert_eq!(w.index_of(at(2024, 3, 14, 23, 50, 0)), Some(1));
        assert_eq!(w.index_of(at(2024, 3, 15, 0, 10, 0)), Some(5));
    }

    #[test]
    fn test_validation() {
        let limits = WindowLimits::default();
        let now = at(2024, 3, 15, 14, 33, 0);

        assert!(QueryWindow::compute(BucketWidth::FiveMinute, 0, 0, now, &limits).is_err());
        assert!(QueryWindow::compute(BucketWidth::FiveMinute, 30, -5, now, &limits).is_err());
        assert!(QueryWindow::compute(BucketWidth::FiveMinute, 30, 121, now, &limits).is_err());
        assert!(QueryWindow::compute(BucketWidth::Hour, 12, 169, now, &limits).is_err());
        // Day offsets are unbounded backwards
        assert!(QueryWindow::compute(BucketWidth::Day, 7, 3650, now, &limits).is_ok());
    }

    #[test]
    fn test_window_length_capped() {
        let limits = WindowLimits::default();
        let now = at(2024, 3, 15, 14, 33, 0);

        // 1000 buckets at each width is the default ceiling
        assert!(QueryWindow::compute(BucketWidth::FiveMinute, 5000, 0, now, &limits).is_ok());
        assert!(QueryWindow::compute(BucketWidth::FiveMinute, 5001, 0, now, &limits).is_err());
        assert!(QueryWindow::compute(BucketWidth::Hour, 1000, 0, now, &limits).is_ok());
        assert!(QueryWindow::compute(BucketWidth::Hour, 1001, 0, now, &limits).is_err());
        assert!(QueryWindow::compute(BucketWidth::Day, 1000, 0, now, &limits).is_ok());
        assert!(QueryWindow::compute(BucketWidth::Day, 50_000_000, 0, now, &limits).is_err());

        // Degenerate extremes come back as errors, never arithmetic panics
        assert!(QueryWindow::compute(BucketWidth::FiveMinute, i64::MAX, 0, now, &limits).is_err());
        assert!(QueryWindow::compute(BucketWidth::Hour, i64::MAX, 0, now, &limits).is_err());
        assert!(QueryWindow::compute(BucketWidth::Day, i64::MAX, 0, now, &limits).is_err());
        assert!(QueryWindow::compute(BucketWidth::Day, 7, i64::MAX, now, &limits).is_err());
    }

    #[test]
    fn test_labels() {
        let limits = WindowLimits::default();
        let now = at(2024, 3, 15, 15, 8, 0);

        let w = QueryWindow::compute(BucketWidth::FiveMinute, 10, 0, now, &limits).unwrap();
        assert_eq!(w.label(1), "3:05 PM - 3:10 PM");

        let w = QueryWindow::compute(BucketWidth::Hour, 2, 0, now, &limits).unwrap();
        assert_eq!(w.label(1), "3 PM");

        let w = QueryWindow::compute(BucketWidth::Day, 2, 0, now, &limits).unwrap();
        assert_eq!(w.label(1), "Mar 15");
    }

    #[test]
    fn test_fetch_range_padding() {
        let limits = WindowLimits::default();
        let now = at(2024, 3, 15, 14, 33, 0);

        let w = QueryWindow::compute(BucketWidth::FiveMinute, 30, 0, now, &limits).unwrap();
        assert_eq!(w.fetch_from, NaiveDate::from_ymd_opt(2024, 3, 13).unwrap());
        assert_eq!(w.fetch_to, NaiveDate::from_ymd_opt(2024, 3, 17).unwrap());

        let w = QueryWindow::compute(BucketWidth::Hour, 12, 0, now, &limits).unwrap();
        assert_eq!(w.fetch_from, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        assert_eq!(w.fetch_to, NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    }
}
