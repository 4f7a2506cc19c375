use chrono::{Datelike, Duration, NaiveDateTime};

use crate::domain::{RawCounterRows, SummaryStats};

/// Rolling totals across all categories: today, this week (starting
/// Sunday), this month, this year, and all time.
///
/// Each counter expands to `count` synthetic timestamps at its minute
/// start; sub-minute ordering is not recoverable and not needed since
/// period boundaries land on midnights.
pub fn summarize(rows: &RawCounterRows, now: NaiveDateTime) -> SummaryStats {
    let mut timestamps: Vec<NaiveDateTime> = Vec::new();
    for counter in &rows.qr_scans {
        expand(&mut timestamps, counter.instant(), counter.count);
    }
    for (_, counter) in &rows.social_clicks {
        expand(&mut timestamps, counter.instant(), counter.count);
    }
    for (_, counter) in &rows.custom_link_clicks {
        expand(&mut timestamps, counter.instant(), counter.count);
    }
    timestamps.sort();

    let today = now.date().and_hms_opt(0, 0, 0).unwrap_or_default();
    let week_start = today - Duration::days(now.date().weekday().num_days_from_sunday() as i64);
    let month_start = now
        .date()
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(today);
    let year_start = now
        .date()
        .with_month(1)
        .and_then(|d| d.with_day(1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(today);

    SummaryStats {
        today: count_since(&timestamps, today),
        this_week: count_since(&timestamps, week_start),
        this_month: count_since(&timestamps, month_start),
        this_year: count_since(&timestamps, year_start),
        total: timestamps.len() as i64,
    }
}

fn expand(timestamps: &mut Vec<NaiveDateTime>, instant: NaiveDateTime, count: i64) {
    for _ in 0..count {
        timestamps.push(instant);
    }
}

fn count_since(timestamps: &[NaiveDateTime], period_start: NaiveDateTime) -> i64 {
    timestamps.iter().filter(|t| **t >= period_start).count() as i64
}
