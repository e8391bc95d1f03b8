use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::dto::NewScanRequest;

/// One recorded scan. Rows are immutable once created; there is no
/// update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScanRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_name: String,
    pub food_category: String,
    pub carbon_footprint: f64,
    pub water_usage: f64,
    pub sustainability_score: f64,
    pub scan_date: Date,
    pub image_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

impl ScanRecord {
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        scan: &NewScanRequest,
    ) -> anyhow::Result<ScanRecord> {
        let record = sqlx::query_as::<_, ScanRecord>(
            r#"
            INSERT INTO scan_history
                (user_id, food_name, food_category, carbon_footprint,
                 water_usage, sustainability_score, scan_date, image_url, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, food_name, food_category, carbon_footprint,
                      water_usage, sustainability_score, scan_date, image_url,
                      notes, created_at
            "#,
        )
        .bind(user_id)
        .bind(&scan.food_name)
        .bind(&scan.food_category)
        .bind(scan.carbon_footprint)
        .bind(scan.water_usage)
        .bind(scan.sustainability_score)
        .bind(scan.scan_date)
        .bind(&scan.image_url)
        .bind(&scan.notes)
        .fetch_one(db)
        .await?;
        Ok(record)
    }

    /// A user's history, most recent scan date first, optionally bounded
    /// by an inclusive date range.
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        since: Option<Date>,
        until: Option<Date>,
    ) -> anyhow::Result<Vec<ScanRecord>> {
        let rows = sqlx::query_as::<_, ScanRecord>(
            r#"
            SELECT id, user_id, food_name, food_category, carbon_footprint,
                   water_usage, sustainability_score, scan_date, image_url,
                   notes, created_at
            FROM scan_history
            WHERE user_id = $1
              AND ($2::date IS NULL OR scan_date >= $2)
              AND ($3::date IS NULL OR scan_date <= $3)
            ORDER BY scan_date DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(until)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// All of a user's scans, newest first. Feeds the dashboard summary.
    pub async fn list_all_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ScanRecord>> {
        let rows = sqlx::query_as::<_, ScanRecord>(
            r#"
            SELECT id, user_id, food_name, food_category, carbon_footprint,
                   water_usage, sustainability_score, scan_date, image_url,
                   notes, created_at
            FROM scan_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
