use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{SearchRequest, SupplierRecord};

/// Record one discovery run and its result list.
pub async fn insert_search(
    pool: &PgPool,
    search_id: Uuid,
    request: &SearchRequest,
    results: &[SupplierRecord],
) -> Result<(), sqlx::Error> {
    let results_json = serde_json::to_value(results).unwrap_or(serde_json::Value::Null);

    sqlx::query(
        r#"
        insert into searches (id, search_term, region, mode, results)
        values ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(search_id)
    .bind(&request.product_name)
    .bind(&request.region)
    .bind(format!("{:?}", request.mode).to_lowercase())
    .bind(results_json)
    .execute(pool)
    .await?;

    Ok(())
}
