use std::collections::HashMap;

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::{BusinessAnalysis, SupplierRecord};

/// Upsert a business analysis keyed by its unique website URL. A re-analysis
/// of a known URL overwrites the record and bumps `last_analyzed`.
pub async fn upsert_business_analysis(
    pool: &PgPool,
    analysis: &BusinessAnalysis,
) -> Result<(), sqlx::Error> {
    let score_breakdown = serde_json::to_value(&analysis.score_data)
        .unwrap_or(serde_json::Value::Null);

    let (b2b_verified, b2b_url, b2b_name) = if analysis.marketplace_presence.alibaba_verified {
        (
            true,
            analysis.marketplace_presence.alibaba_url.clone(),
            Some("Alibaba".to_string()),
        )
    } else if analysis.marketplace_presence.thomasnet_listed {
        (
            true,
            analysis.marketplace_presence.thomasnet_url.clone(),
            Some("ThomasNet".to_string()),
        )
    } else {
        (false, None, None)
    };

    sqlx::query(
        r#"
        insert into suppliers
            (id, company_name, website_url, favicon_url, email, phone, location,
             overall_score, star_rating, grade, score_analysis, score_breakdown,
             certifications, b2b_platform_verified, b2b_platform_url,
             b2b_platform_name, search_id, last_analyzed)
        values
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, now())
        on conflict (website_url) do update set
            company_name = excluded.company_name,
            favicon_url = excluded.favicon_url,
            email = excluded.email,
            phone = excluded.phone,
            location = excluded.location,
            overall_score = excluded.overall_score,
            star_rating = excluded.star_rating,
            grade = excluded.grade,
            score_analysis = excluded.score_analysis,
            score_breakdown = excluded.score_breakdown,
            certifications = excluded.certifications,
            b2b_platform_verified = excluded.b2b_platform_verified,
            b2b_platform_url = excluded.b2b_platform_url,
            b2b_platform_name = excluded.b2b_platform_name,
            search_id = excluded.search_id,
            last_analyzed = now()
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&analysis.company_name)
    .bind(&analysis.website_url)
    .bind(&analysis.favicon_url)
    .bind(&analysis.website_data.contact.email)
    .bind(&analysis.website_data.contact.phone)
    .bind(&analysis.website_data.location)
    .bind(analysis.score_data.total)
    .bind(analysis.score_data.stars as i16)
    .bind(&analysis.score_data.grade)
    .bind(&analysis.score_data.narrative)
    .bind(score_breakdown)
    .bind(&analysis.website_data.certifications)
    .bind(b2b_verified)
    .bind(b2b_url)
    .bind(b2b_name)
    .bind(analysis.search_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Which of these URLs were analyzed before. Used to skip re-analysis.
pub async fn check_existing_urls(
    pool: &PgPool,
    urls: &[String],
) -> Result<HashMap<String, bool>, sqlx::Error> {
    if urls.is_empty() {
        return Ok(HashMap::new());
    }

    let existing: Vec<String> = sqlx::query_scalar(
        r#"
        select website_url from suppliers where website_url = any($1)
        "#,
    )
    .bind(urls)
    .fetch_all(pool)
    .await?;

    let existing: std::collections::HashSet<String> = existing.into_iter().collect();
    Ok(urls
        .iter()
        .map(|url| (url.clone(), existing.contains(url)))
        .collect())
}

/// Suppliers discovered by one search, best score first.
pub async fn get_suppliers_by_search_id(
    pool: &PgPool,
    search_id: Uuid,
) -> Result<Vec<SupplierRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        select company_name, website_url, email, phone, score_analysis
        from suppliers
        where search_id = $1
        order by overall_score desc
        "#,
    )
    .bind(search_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| SupplierRecord {
            name: row.get("company_name"),
            url: row.get("website_url"),
            email: row.get("email"),
            phone: row.get("phone"),
            summary: row.get("score_analysis"),
        })
        .collect())
}
