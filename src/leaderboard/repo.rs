use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

/// Every `(user_id, sustainability_score)` pair on record, all users.
pub async fn score_pairs(db: &PgPool) -> anyhow::Result<Vec<(Uuid, f64)>> {
    let rows = sqlx::query_as::<_, (Uuid, f64)>(
        r#"
        SELECT user_id, sustainability_score
        FROM scan_history
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Display names for the given users. Users without a profile row or
/// without a name are simply absent from the map.
pub async fn display_names(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<HashMap<Uuid, String>> {
    let rows = sqlx::query_as::<_, (Uuid, Option<String>)>(
        r#"
        SELECT id, full_name
        FROM profiles
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, name)| name.map(|n| (id, n)))
        .collect())
}
