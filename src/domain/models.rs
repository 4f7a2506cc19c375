use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{MinuteCounter, ProfileId, ProfileStatus, PublicId};

/// A tracked link-in-bio profile. The engine only needs identity and
/// status; page content and branding live elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub public_id: PublicId,
    pub name: String,
    pub status: ProfileStatus,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_active(&self) -> bool {
        self.status == ProfileStatus::Active
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProfile {
    pub name: String,
}

/// Counter rows fetched for one window query, one set per category,
/// still carrying their per-platform / per-link keys.
#[derive(Debug, Clone, Default)]
pub struct RawCounterRows {
    pub qr_scans: Vec<MinuteCounter>,
    pub social_clicks: Vec<(String, MinuteCounter)>,
    pub custom_link_clicks: Vec<(i32, MinuteCounter)>,
}

impl RawCounterRows {
    pub fn is_empty(&self) -> bool {
        self.qr_scans.is_empty()
            && self.social_clicks.is_empty()
            && self.custom_link_clicks.is_empty()
    }
}
