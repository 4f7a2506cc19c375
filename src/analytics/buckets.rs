use crate::domain::{Bucket, RawCounterRows};

use super::window::QueryWindow;

/// Fold raw counter rows into the window's dense bucket grid.
///
/// Every bucket of the window is emitted, oldest first and zero-filled,
/// so chart axes stay stable when a span saw no traffic. Each row adds
/// its full count to its bucket; rows outside the window are dropped.
pub fn aggregate(rows: &RawCounterRows, window: &QueryWindow) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = (0..window.bucket_count)
        .map(|i| Bucket::empty(window.bucket_start(i), window.label(i)))
        .collect();

    for counter in &rows.qr_scans {
        if let Some(i) = window.index_of(counter.instant()) {
            buckets[i].qr_scans += counter.count;
            buckets[i].total += counter.count;
        }
    }

    for (platform, counter) in &rows.social_clicks {
        if let Some(i) = window.index_of(counter.instant()) {
            *buckets[i]
                .social_clicks
                .entry(platform.clone())
                .or_insert(0) += counter.count;
            buckets[i].total += counter.count;
        }
    }

    for (_link_index, counter) in &rows.custom_link_clicks {
        if let Some(i) = window.index_of(counter.instant()) {
            buckets[i].custom_link_clicks += counter.count;
            buckets[i].total += counter.count;
        }
    }

    buckets
}
