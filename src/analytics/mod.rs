pub mod buckets;
pub mod summary;
pub mod window;

pub use buckets::aggregate;
pub use summary::summarize;
pub use window::{QueryWindow, WindowLimits};

use crate::db::{self, Pool};
use crate::domain::{ProfileId, RawCounterRows};
use crate::error::Result;

/// Fetch the candidate counter rows for one window, all three
/// categories concurrently.
pub async fn fetch_window_rows(
    pool: &Pool,
    profile_id: ProfileId,
    window: &QueryWindow,
) -> Result<RawCounterRows> {
    let (qr_scans, social_clicks, custom_link_clicks) = tokio::try_join!(
        db::qr_scans_in_range(pool, profile_id, window.fetch_from, window.fetch_to),
        db::social_clicks_in_range(pool, profile_id, window.fetch_from, window.fetch_to),
        db::custom_link_clicks_in_range(pool, profile_id, window.fetch_from, window.fetch_to),
    )?;

    Ok(RawCounterRows {
        qr_scans,
        social_clicks,
        custom_link_clicks,
    })
}

/// Fetch a profile's full counter history for summary statistics
pub async fn fetch_all_rows(pool: &Pool, profile_id: ProfileId) -> Result<RawCounterRows> {
    let (qr_scans, social_clicks, custom_link_clicks) = tokio::try_join!(
        db::all_qr_scans(pool, profile_id),
        db::all_social_clicks(pool, profile_id),
        db::all_custom_link_clicks(pool, profile_id),
    )?;

    Ok(RawCounterRows {
        qr_scans,
        social_clicks,
        custom_link_clicks,
    })
}
