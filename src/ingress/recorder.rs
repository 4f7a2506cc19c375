use chrono::{Local, NaiveDateTime, Timelike};
use tracing::debug;

use crate::db;
use crate::domain::{EventCategory, Profile, PublicId};
use crate::error::{Error, Result};
use crate::state::AppState;

/// One incoming event, carrying its category key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    QrScan,
    SocialClick(String),
    CustomLinkClick(i32),
}

impl Event {
    pub fn category(&self) -> EventCategory {
        match self {
            Event::QrScan => EventCategory::QrScan,
            Event::SocialClick(_) => EventCategory::SocialClick,
            Event::CustomLinkClick(_) => EventCategory::CustomLinkClick,
        }
    }
}

/// Count one event against the profile behind `public_id`.
///
/// Unknown and archived profiles take the same silent no-op path, so a
/// caller cannot tell them apart from live ones. Storage errors
/// propagate; lookup misses do not.
pub async fn record_event(state: &AppState, public_id: PublicId, event: Event) -> Result<()> {
    let profile = state
        .cache
        .get_or_insert_profile(public_id, move || async move {
            match db::get_profile_by_public_id(&state.pool, public_id).await {
                Ok(profile) => Ok(Some(profile)),
                Err(Error::ProfileNotFound) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await?;

    let profile = match profile {
        Some(p) => p,
        None => {
            debug!(
                "No profile for public_id={}, dropping {}",
                public_id,
                event.category()
            );
            return Ok(());
        }
    };

    if !profile.is_active() {
        debug!(
            "Profile {} is archived, dropping {}",
            profile.id,
            event.category()
        );
        return Ok(());
    }

    let now = Local::now().naive_local();
    record_event_at(state, &profile, event, now).await
}

/// Apply one counter upsert for the minute containing `now`
pub async fn record_event_at(
    state: &AppState,
    profile: &Profile,
    event: Event,
    now: NaiveDateTime,
) -> Result<()> {
    let date = now.date();
    let hour = now.hour();
    let minute = now.minute();

    match event {
        Event::QrScan => {
            db::record_qr_scan(&state.pool, profile.id, date, hour, minute).await?;
        }
        Event::SocialClick(platform) => {
            db::record_social_click(&state.pool, profile.id, &platform, date, hour, minute)
                .await?;
        }
        Event::CustomLinkClick(link_index) => {
            db::record_custom_link_click(&state.pool, profile.id, link_index, date, hour, minute)
                .await?;
        }
    }

    Ok(())
}
