use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use tracing::debug;

use crate::domain::PublicId;
use crate::error::Result;
use crate::state::AppState;

use super::recorder::{record_event, Event};

/// POST /t/qr/{public_id}
///
/// Ingress endpoints answer 204 whether or not the profile exists, so
/// probing a public id reveals nothing.
pub async fn qr_scan_handler(
    State(state): State<AppState>,
    Path(public_id): Path<PublicId>,
) -> Result<StatusCode> {
    debug!("QR scan for public_id={}", public_id);
    record_event(&state, public_id, Event::QrScan).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /t/social/{public_id}/{platform}
pub async fn social_click_handler(
    State(state): State<AppState>,
    Path((public_id, platform)): Path<(PublicId, String)>,
) -> Result<StatusCode> {
    debug!("Social click for public_id={} platform={}", public_id, platform);
    record_event(&state, public_id, Event::SocialClick(platform)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /t/link/{public_id}/{index}
pub async fn link_click_handler(
    State(state): State<AppState>,
    Path((public_id, link_index)): Path<(PublicId, i32)>,
) -> Result<StatusCode> {
    debug!(
        "Custom link click for public_id={} index={}",
        public_id, link_index
    );
    record_event(&state, public_id, Event::CustomLinkClick(link_index)).await?;
    Ok(StatusCode::NO_CONTENT)
}
