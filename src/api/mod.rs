use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::analytics::{self, aggregate, summarize, QueryWindow, WindowLimits};
use crate::db;
use crate::domain::{BucketWidth, CreateProfile, ProfileId, ProfileStatus};
use crate::error::Error;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BucketQuery {
    pub width: Option<String>,
    pub window: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }
    }
}

/// Window length when the query omits one, in the width's own unit
fn default_window(width: BucketWidth) -> i64 {
    match width {
        BucketWidth::FiveMinute => 30,
        BucketWidth::Hour => 12,
        BucketWidth::Day => 7,
    }
}

fn window_limits(state: &AppState) -> WindowLimits {
    WindowLimits {
        max_minute_offset_minutes: state.settings.max_minute_offset_minutes,
        max_hour_offset_hours: state.settings.max_hour_offset_hours,
        max_buckets: state.settings.max_window_buckets,
    }
}

/// GET /api/profiles/:id/buckets?width=5m|hour|day&window=N&offset=N
pub async fn get_buckets(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Query(query): Query<BucketQuery>,
) -> Response {
    let profile_id: ProfileId = match profile_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error("Invalid profile ID")),
            )
                .into_response()
        }
    };

    let width = match query.width.as_deref() {
        None => BucketWidth::FiveMinute,
        Some(s) => match BucketWidth::from_str(s) {
            Some(w) => w,
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<()>::error("Invalid width")),
                )
                    .into_response()
            }
        },
    };

    if let Err(e) = db::get_profile(&state.pool, profile_id).await {
        return profile_error_response(e);
    }

    let window_len = query.window.unwrap_or_else(|| default_window(width));
    let offset = query.offset.unwrap_or(0);
    let now = Local::now().naive_local();

    let window = match QueryWindow::compute(width, window_len, offset, now, &window_limits(&state))
    {
        Ok(w) => w,
        Err(e @ Error::InvalidWindow(_)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(&e.to_string())),
            )
                .into_response()
        }
        Err(e) => {
            error!("Error computing window: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to compute window")),
            )
                .into_response();
        }
    };

    match analytics::fetch_window_rows(&state.pool, profile_id, &window).await {
        Ok(rows) => Json(ApiResponse::success(aggregate(&rows, &window))).into_response(),
        Err(e) => {
            error!("Error fetching counters: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to fetch counters")),
            )
                .into_response()
        }
    }
}

/// GET /api/profiles/:id/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> Response {
    let profile_id: ProfileId = match profile_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error("Invalid profile ID")),
            )
                .into_response()
        }
    };

    if let Err(e) = db::get_profile(&state.pool, profile_id).await {
        return profile_error_response(e);
    }

    match analytics::fetch_all_rows(&state.pool, profile_id).await {
        Ok(rows) => {
            let now = Local::now().naive_local();
            Json(ApiResponse::success(summarize(&rows, now))).into_response()
        }
        Err(e) => {
            error!("Error fetching counters: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to fetch counters")),
            )
                .into_response()
        }
    }
}

/// GET /api/profiles
pub async fn list_profiles(State(state): State<AppState>) -> Response {
    match db::list_profiles(&state.pool).await {
        Ok(profiles) => Json(ApiResponse::success(profiles)).into_response(),
        Err(e) => {
            error!("Error listing profiles: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to list profiles")),
            )
                .into_response()
        }
    }
}

/// GET /api/profiles/:id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> Response {
    let profile_id: ProfileId = match profile_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error("Invalid profile ID")),
            )
                .into_response()
        }
    };

    match db::get_profile(&state.pool, profile_id).await {
        Ok(profile) => Json(ApiResponse::success(profile)).into_response(),
        Err(e) => profile_error_response(e),
    }
}

/// POST /api/profiles
pub async fn create_profile(
    State(state): State<AppState>,
    Json(input): Json<CreateProfile>,
) -> Response {
    match db::create_profile(&state.pool, input).await {
        Ok(profile) => (StatusCode::CREATED, Json(ApiResponse::success(profile))).into_response(),
        Err(e) => {
            error!("Error creating profile: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to create profile")),
            )
                .into_response()
        }
    }
}

/// POST /api/profiles/:id/archive
pub async fn archive_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> Response {
    set_status(state, profile_id, ProfileStatus::Archived).await
}

/// POST /api/profiles/:id/activate
pub async fn activate_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> Response {
    set_status(state, profile_id, ProfileStatus::Active).await
}

async fn set_status(state: AppState, profile_id: String, status: ProfileStatus) -> Response {
    let profile_id: ProfileId = match profile_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error("Invalid profile ID")),
            )
                .into_response()
        }
    };

    match db::set_profile_status(&state.pool, profile_id, status).await {
        Ok(profile) => {
            // The recorder caches by public id; drop the stale entry so
            // the status change takes effect immediately
            state.cache.invalidate_profile(profile.public_id).await;
            Json(ApiResponse::success(profile)).into_response()
        }
        Err(e) => profile_error_response(e),
    }
}

fn profile_error_response(e: Error) -> Response {
    match e {
        Error::ProfileNotFound => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Profile not found")),
        )
            .into_response(),
        e => {
            error!("Error fetching profile: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to fetch profile")),
            )
                .into_response()
        }
    }
}
