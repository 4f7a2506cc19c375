use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Stable internal identifier of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub Uuid);

impl ProfileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProfileId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Shareable identifier embedded in QR codes and public profile URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicId(pub Uuid);

impl PublicId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for PublicId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PublicId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileStatus {
    Active,
    Archived,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "AC",
            Self::Archived => "AR",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "AC" => Some(Self::Active),
            "AR" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Archived => write!(f, "Archived"),
        }
    }
}

/// The three event kinds the engine counts independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    QrScan,
    SocialClick,
    CustomLinkClick,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QrScan => "qr_scan",
            Self::SocialClick => "social_click",
            Self::CustomLinkClick => "custom_link_click",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Span of one chart bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BucketWidth {
    FiveMinute,
    Hour,
    Day,
}

impl BucketWidth {
    pub fn minutes(&self) -> i64 {
        match self {
            Self::FiveMinute => 5,
            Self::Hour => 60,
            Self::Day => 24 * 60,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FiveMinute => "5m",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "5m" => Some(Self::FiveMinute),
            "hour" => Some(Self::Hour),
            "day" => Some(Self::Day),
            _ => None,
        }
    }
}

impl fmt::Display for BucketWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One persisted counter cell: how many events landed in a single
/// local-time minute. At most one row exists per key tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteCounter {
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
    pub count: i64,
}

impl MinuteCounter {
    /// Reconstruct the local instant this counter describes. Writes always
    /// use in-range hour/minute components, so construction cannot fail for
    /// persisted rows; out-of-range components clamp to midnight.
    pub fn instant(&self) -> NaiveDateTime {
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0)
            .unwrap_or(NaiveTime::MIN);
        self.date.and_time(time)
    }
}

/// One dense chart bucket. Serialized camelCase for the chart contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub start: NaiveDateTime,
    pub label: String,
    pub qr_scans: i64,
    /// Per-platform click splits. An ordered map keeps repeated
    /// aggregations bit-identical.
    pub social_clicks: BTreeMap<String, i64>,
    pub custom_link_clicks: i64,
    pub total: i64,
}

impl Bucket {
    pub fn empty(start: NaiveDateTime, label: String) -> Self {
        Self {
            start,
            label,
            qr_scans: 0,
            social_clicks: BTreeMap::new(),
            custom_link_clicks: 0,
            total: 0,
        }
    }

    /// Platforms ordered by descending click count; ties keep the map's
    /// alphabetical order, so the result is stable.
    pub fn platforms_by_count(&self) -> Vec<(&str, i64)> {
        let mut platforms: Vec<(&str, i64)> = self
            .social_clicks
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        platforms.sort_by(|a, b| b.1.cmp(&a.1));
        platforms
    }
}

/// Rolling totals for the summary panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub today: i64,
    pub this_week: i64,
    pub this_month: i64,
    pub this_year: i64,
    pub total: i64,
}
