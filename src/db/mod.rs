use chrono::{NaiveDate, Utc};

use crate::domain::{
    CreateProfile, MinuteCounter, Profile, ProfileId, ProfileStatus, PublicId,
};
use crate::error::{Error, Result};

#[cfg(feature = "postgres")]
pub type Pool = sqlx::PgPool;
#[cfg(feature = "postgres")]
pub type PoolOptions = sqlx::postgres::PgPoolOptions;

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
pub type Pool = sqlx::SqlitePool;
#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
pub type PoolOptions = sqlx::sqlite::SqlitePoolOptions;

pub async fn create_pool(url: &str) -> Result<Pool> {
    let pool = PoolOptions::new().max_connections(10).connect(url).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    #[cfg(feature = "postgres")]
    {
        let sql = include_str!("../../migrations/postgres/001_initial.sql");
        sqlx::raw_sql(sql).execute(pool).await?;
    }

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    {
        let sql = include_str!("../../migrations/sqlite/001_initial.sql");
        sqlx::raw_sql(sql).execute(pool).await?;
    }

    Ok(())
}

// Profile queries

pub async fn get_profile(pool: &Pool, id: ProfileId) -> Result<Profile> {
    #[cfg(feature = "postgres")]
    let row: ProfileRow = sqlx::query_as(
        r#"SELECT id, public_id, name, status, created_at
           FROM profiles WHERE id = $1"#,
    )
    .bind(id.0)
    .fetch_optional(pool)
    .await?
    .ok_or(Error::ProfileNotFound)?;

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    let row: ProfileRow = sqlx::query_as(
        r#"SELECT id, public_id, name, status, created_at
           FROM profiles WHERE id = ?"#,
    )
    .bind(id.0.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or(Error::ProfileNotFound)?;

    Ok(row.into())
}

pub async fn get_profile_by_public_id(pool: &Pool, public_id: PublicId) -> Result<Profile> {
    #[cfg(feature = "postgres")]
    let row: ProfileRow = sqlx::query_as(
        r#"SELECT id, public_id, name, status, created_at
           FROM profiles WHERE public_id = $1"#,
    )
    .bind(public_id.0)
    .fetch_optional(pool)
    .await?
    .ok_or(Error::ProfileNotFound)?;

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    let row: ProfileRow = sqlx::query_as(
        r#"SELECT id, public_id, name, status, created_at
           FROM profiles WHERE public_id = ?"#,
    )
    .bind(public_id.0.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or(Error::ProfileNotFound)?;

    Ok(row.into())
}

pub async fn list_profiles(pool: &Pool) -> Result<Vec<Profile>> {
    #[cfg(feature = "postgres")]
    let rows: Vec<ProfileRow> = sqlx::query_as(
        r#"SELECT id, public_id, name, status, created_at
           FROM profiles ORDER BY name, id"#,
    )
    .fetch_all(pool)
    .await?;

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    let rows: Vec<ProfileRow> = sqlx::query_as(
        r#"SELECT id, public_id, name, status, created_at
           FROM profiles ORDER BY name, id"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn create_profile(pool: &Pool, input: CreateProfile) -> Result<Profile> {
    let id = ProfileId::new();
    let public_id = PublicId::new();
    let now = Utc::now();

    #[cfg(feature = "postgres")]
    sqlx::query(
        r#"INSERT INTO profiles (id, public_id, name, created_at)
           VALUES ($1, $2, $3, $4)"#,
    )
    .bind(id.0)
    .bind(public_id.0)
    .bind(&input.name)
    .bind(now)
    .execute(pool)
    .await?;

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    sqlx::query(
        r#"INSERT INTO profiles (id, public_id, name, created_at)
           VALUES (?, ?, ?, ?)"#,
    )
    .bind(id.0.to_string())
    .bind(public_id.0.to_string())
    .bind(&input.name)
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    get_profile(pool, id).await
}

pub async fn set_profile_status(
    pool: &Pool,
    id: ProfileId,
    status: ProfileStatus,
) -> Result<Profile> {
    #[cfg(feature = "postgres")]
    let affected = sqlx::query("UPDATE profiles SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(id.0)
        .execute(pool)
        .await?
        .rows_affected();

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    let affected = sqlx::query("UPDATE profiles SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id.0.to_string())
        .execute(pool)
        .await?
        .rows_affected();

    if affected == 0 {
        return Err(Error::ProfileNotFound);
    }

    get_profile(pool, id).await
}

// Counter increments. One atomic upsert per event: the row for the
// (profile, minute) key is created at 1 or bumped by 1.

pub async fn record_qr_scan(
    pool: &Pool,
    profile_id: ProfileId,
    date: NaiveDate,
    hour: u32,
    minute: u32,
) -> Result<()> {
    #[cfg(feature = "postgres")]
    sqlx::query(
        r#"INSERT INTO qr_scans_by_minute (profile_id, click_date, click_hour, click_minute, click_count)
           VALUES ($1, $2, $3, $4, 1)
           ON CONFLICT (profile_id, click_date, click_hour, click_minute)
           DO UPDATE SET click_count = qr_scans_by_minute.click_count + 1"#,
    )
    .bind(profile_id.0)
    .bind(date)
    .bind(hour as i32)
    .bind(minute as i32)
    .execute(pool)
    .await?;

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    sqlx::query(
        r#"INSERT INTO qr_scans_by_minute (profile_id, click_date, click_hour, click_minute, click_count)
           VALUES (?, ?, ?, ?, 1)
           ON CONFLICT (profile_id, click_date, click_hour, click_minute)
           DO UPDATE SET click_count = click_count + 1"#,
    )
    .bind(profile_id.0.to_string())
    .bind(date.format("%Y-%m-%d").to_string())
    .bind(hour as i32)
    .bind(minute as i32)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn record_social_click(
    pool: &Pool,
    profile_id: ProfileId,
    platform: &str,
    date: NaiveDate,
    hour: u32,
    minute: u32,
) -> Result<()> {
    #[cfg(feature = "postgres")]
    sqlx::query(
        r#"INSERT INTO social_clicks_by_minute (profile_id, platform, click_date, click_hour, click_minute, click_count)
           VALUES ($1, $2, $3, $4, $5, 1)
           ON CONFLICT (profile_id, platform, click_date, click_hour, click_minute)
           DO UPDATE SET click_count = social_clicks_by_minute.click_count + 1"#,
    )
    .bind(profile_id.0)
    .bind(platform)
    .bind(date)
    .bind(hour as i32)
    .bind(minute as i32)
    .execute(pool)
    .await?;

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    sqlx::query(
        r#"INSERT INTO social_clicks_by_minute (profile_id, platform, click_date, click_hour, click_minute, click_count)
           VALUES (?, ?, ?, ?, ?, 1)
           ON CONFLICT (profile_id, platform, click_date, click_hour, click_minute)
           DO UPDATE SET click_count = click_count + 1"#,
    )
    .bind(profile_id.0.to_string())
    .bind(platform)
    .bind(date.format("%Y-%m-%d").to_string())
    .bind(hour as i32)
    .bind(minute as i32)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn record_custom_link_click(
    pool: &Pool,
    profile_id: ProfileId,
    link_index: i32,
    date: NaiveDate,
    hour: u32,
    minute: u32,
) -> Result<()> {
    #[cfg(feature = "postgres")]
    sqlx::query(
        r#"INSERT INTO custom_link_clicks_by_minute (profile_id, link_index, click_date, click_hour, click_minute, click_count)
           VALUES ($1, $2, $3, $4, $5, 1)
           ON CONFLICT (profile_id, link_index, click_date, click_hour, click_minute)
           DO UPDATE SET click_count = custom_link_clicks_by_minute.click_count + 1"#,
    )
    .bind(profile_id.0)
    .bind(link_index)
    .bind(date)
    .bind(hour as i32)
    .bind(minute as i32)
    .execute(pool)
    .await?;

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    sqlx::query(
        r#"INSERT INTO custom_link_clicks_by_minute (profile_id, link_index, click_date, click_hour, click_minute, click_count)
           VALUES (?, ?, ?, ?, ?, 1)
           ON CONFLICT (profile_id, link_index, click_date, click_hour, click_minute)
           DO UPDATE SET click_count = click_count + 1"#,
    )
    .bind(profile_id.0.to_string())
    .bind(link_index)
    .bind(date.format("%Y-%m-%d").to_string())
    .bind(hour as i32)
    .bind(minute as i32)
    .execute(pool)
    .await?;

    Ok(())
}

// Counter range fetches. Counters are keyed by local calendar date, so
// callers pass a padded inclusive date range and filter exact instants
// during aggregation.

pub async fn qr_scans_in_range(
    pool: &Pool,
    profile_id: ProfileId,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<MinuteCounter>> {
    #[cfg(feature = "postgres")]
    let rows: Vec<CounterRow> = sqlx::query_as(
        r#"SELECT click_date, click_hour, click_minute, click_count
           FROM qr_scans_by_minute
           WHERE profile_id = $1 AND click_date >= $2 AND click_date <= $3"#,
    )
    .bind(profile_id.0)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    let rows: Vec<CounterRow> = sqlx::query_as(
        r#"SELECT click_date, click_hour, click_minute, click_count
           FROM qr_scans_by_minute
           WHERE profile_id = ? AND click_date >= ? AND click_date <= ?"#,
    )
    .bind(profile_id.0.to_string())
    .bind(from.format("%Y-%m-%d").to_string())
    .bind(to.format("%Y-%m-%d").to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn social_clicks_in_range(
    pool: &Pool,
    profile_id: ProfileId,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<(String, MinuteCounter)>> {
    #[cfg(feature = "postgres")]
    let rows: Vec<PlatformCounterRow> = sqlx::query_as(
        r#"SELECT platform, click_date, click_hour, click_minute, click_count
           FROM social_clicks_by_minute
           WHERE profile_id = $1 AND click_date >= $2 AND click_date <= $3"#,
    )
    .bind(profile_id.0)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    let rows: Vec<PlatformCounterRow> = sqlx::query_as(
        r#"SELECT platform, click_date, click_hour, click_minute, click_count
           FROM social_clicks_by_minute
           WHERE profile_id = ? AND click_date >= ? AND click_date <= ?"#,
    )
    .bind(profile_id.0.to_string())
    .bind(from.format("%Y-%m-%d").to_string())
    .bind(to.format("%Y-%m-%d").to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into_pair()).collect())
}

pub async fn custom_link_clicks_in_range(
    pool: &Pool,
    profile_id: ProfileId,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<(i32, MinuteCounter)>> {
    #[cfg(feature = "postgres")]
    let rows: Vec<LinkCounterRow> = sqlx::query_as(
        r#"SELECT link_index, click_date, click_hour, click_minute, click_count
           FROM custom_link_clicks_by_minute
           WHERE profile_id = $1 AND click_date >= $2 AND click_date <= $3"#,
    )
    .bind(profile_id.0)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    let rows: Vec<LinkCounterRow> = sqlx::query_as(
        r#"SELECT link_index, click_date, click_hour, click_minute, click_count
           FROM custom_link_clicks_by_minute
           WHERE profile_id = ? AND click_date >= ? AND click_date <= ?"#,
    )
    .bind(profile_id.0.to_string())
    .bind(from.format("%Y-%m-%d").to_string())
    .bind(to.format("%Y-%m-%d").to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into_pair()).collect())
}

// Full-history fetches feeding summary statistics, oldest first.

pub async fn all_qr_scans(pool: &Pool, profile_id: ProfileId) -> Result<Vec<MinuteCounter>> {
    #[cfg(feature = "postgres")]
    let rows: Vec<CounterRow> = sqlx::query_as(
        r#"SELECT click_date, click_hour, click_minute, click_count
           FROM qr_scans_by_minute
           WHERE profile_id = $1
           ORDER BY click_date, click_hour, click_minute"#,
    )
    .bind(profile_id.0)
    .fetch_all(pool)
    .await?;

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    let rows: Vec<CounterRow> = sqlx::query_as(
        r#"SELECT click_date, click_hour, click_minute, click_count
           FROM qr_scans_by_minute
           WHERE profile_id = ?
           ORDER BY click_date, click_hour, click_minute"#,
    )
    .bind(profile_id.0.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn all_social_clicks(
    pool: &Pool,
    profile_id: ProfileId,
) -> Result<Vec<(String, MinuteCounter)>> {
    #[cfg(feature = "postgres")]
    let rows: Vec<PlatformCounterRow> = sqlx::query_as(
        r#"SELECT platform, click_date, click_hour, click_minute, click_count
           FROM social_clicks_by_minute
           WHERE profile_id = $1
           ORDER BY click_date, click_hour, click_minute"#,
    )
    .bind(profile_id.0)
    .fetch_all(pool)
    .await?;

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    let rows: Vec<PlatformCounterRow> = sqlx::query_as(
        r#"SELECT platform, click_date, click_hour, click_minute, click_count
           FROM social_clicks_by_minute
           WHERE profile_id = ?
           ORDER BY click_date, click_hour, click_minute"#,
    )
    .bind(profile_id.0.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into_pair()).collect())
}

pub async fn all_custom_link_clicks(
    pool: &Pool,
    profile_id: ProfileId,
) -> Result<Vec<(i32, MinuteCounter)>> {
    #[cfg(feature = "postgres")]
    let rows: Vec<LinkCounterRow> = sqlx::query_as(
        r#"SELECT link_index, click_date, click_hour, click_minute, click_count
           FROM custom_link_clicks_by_minute
           WHERE profile_id = $1
           ORDER BY click_date, click_hour, click_minute"#,
    )
    .bind(profile_id.0)
    .fetch_all(pool)
    .await?;

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    let rows: Vec<LinkCounterRow> = sqlx::query_as(
        r#"SELECT link_index, click_date, click_hour, click_minute, click_count
           FROM custom_link_clicks_by_minute
           WHERE profile_id = ?
           ORDER BY click_date, click_hour, click_minute"#,
    )
    .bind(profile_id.0.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into_pair()).collect())
}

// Row types for SQLx mapping - PostgreSQL versions
#[cfg(feature = "postgres")]
#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: uuid::Uuid,
    public_id: uuid::Uuid,
    name: String,
    status: String,
    created_at: chrono::DateTime<Utc>,
}

#[cfg(feature = "postgres")]
impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: ProfileId(row.id),
            public_id: PublicId(row.public_id),
            name: row.name,
            status: ProfileStatus::from_str(&row.status).unwrap_or(ProfileStatus::Active),
            created_at: row.created_at,
        }
    }
}

#[cfg(feature = "postgres")]
#[derive(sqlx::FromRow)]
struct CounterRow {
    click_date: NaiveDate,
    click_hour: i32,
    click_minute: i32,
    click_count: i64,
}

#[cfg(feature = "postgres")]
impl From<CounterRow> for MinuteCounter {
    fn from(row: CounterRow) -> Self {
        Self {
            date: row.click_date,
            hour: row.click_hour as u32,
            minute: row.click_minute as u32,
            count: row.click_count,
        }
    }
}

#[cfg(feature = "postgres")]
#[derive(sqlx::FromRow)]
struct PlatformCounterRow {
    platform: String,
    click_date: NaiveDate,
    click_hour: i32,
    click_minute: i32,
    click_count: i64,
}

#[cfg(feature = "postgres")]
impl PlatformCounterRow {
    fn into_pair(self) -> (String, MinuteCounter) {
        (
            self.platform,
            MinuteCounter {
                date: self.click_date,
                hour: self.click_hour as u32,
                minute: self.click_minute as u32,
                count: self.click_count,
            },
        )
    }
}

#[cfg(feature = "postgres")]
#[derive(sqlx::FromRow)]
struct LinkCounterRow {
    link_index: i32,
    click_date: NaiveDate,
    click_hour: i32,
    click_minute: i32,
    click_count: i64,
}

#[cfg(feature = "postgres")]
impl LinkCounterRow {
    fn into_pair(self) -> (i32, MinuteCounter) {
        (
            self.link_index,
            MinuteCounter {
                date: self.click_date,
                hour: self.click_hour as u32,
                minute: self.click_minute as u32,
                count: self.click_count,
            },
        )
    }
}

// Row types for SQLx mapping - SQLite versions (UUIDs and dates stored as TEXT)
#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: String,
    public_id: String,
    name: String,
    status: String,
    created_at: String,
}

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: ProfileId(row.id.parse().unwrap_or_default()),
            public_id: PublicId(row.public_id.parse().unwrap_or_default()),
            name: row.name,
            status: ProfileStatus::from_str(&row.status).unwrap_or(ProfileStatus::Active),
            created_at: chrono::DateTime::parse_from_rfc3339(&row.created_at)
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }
    }
}

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
}

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
#[derive(sqlx::FromRow)]
struct CounterRow {
    click_date: String,
    click_hour: i32,
    click_minute: i32,
    click_count: i64,
}

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
impl From<CounterRow> for MinuteCounter {
    fn from(row: CounterRow) -> Self {
        Self {
            date: parse_date(&row.click_date),
            hour: row.click_hour as u32,
            minute: row.click_minute as u32,
            count: row.click_count,
        }
    }
}

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
#[derive(sqlx::FromRow)]
struct PlatformCounterRow {
    platform: String,
    click_date: String,
    click_hour: i32,
    click_minute: i32,
    click_count: i64,
}

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
impl PlatformCounterRow {
    fn into_pair(self) -> (String, MinuteCounter) {
        (
            self.platform,
            MinuteCounter {
                date: parse_date(&self.click_date),
                hour: self.click_hour as u32,
                minute: self.click_minute as u32,
                count: self.click_count,
            },
        )
    }
}

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
#[derive(sqlx::FromRow)]
struct LinkCounterRow {
    link_index: i32,
    click_date: String,
    click_hour: i32,
    click_minute: i32,
    click_count: i64,
}

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
impl LinkCounterRow {
    fn into_pair(self) -> (i32, MinuteCounter) {
        (
            self.link_index,
            MinuteCounter {
                date: parse_date(&self.click_date),
                hour: self.click_hour as u32,
                minute: self.click_minute as u32,
                count: self.click_count,
            },
        )
    }
}
