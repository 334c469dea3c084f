use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dal::supplier_db,
    domain::SupplierRecord,
    services::{analysis, MarketplaceMatcher, Oracle, SearchProvider},
};

#[derive(Deserialize)]
struct AnalyzeBody {
    records: Vec<SupplierRecord>,
    search_id: Option<Uuid>,
}

/// Enrichment path: analyze each supplier not seen before and persist the
/// result. Per-supplier failures are logged and skipped.
#[post("/run")]
async fn run_analysis(
    body: web::Json<AnalyzeBody>,
    oracle: web::Data<dyn Oracle>,
    provider: web::Data<SearchProvider>,
    matcher: web::Data<MarketplaceMatcher>,
    pool: web::Data<PgPool>,
) -> HttpResponse {
    let urls: Vec<String> = body.records.iter().map(|r| r.url.clone()).collect();
    let existing = match supplier_db::check_existing_urls(&pool, &urls).await {
        Ok(existing) => existing,
        Err(e) => {
            log::error!("Error checking existing urls: {:?}", e);
            Default::default()
        }
    };

    let mut analyzed = 0usize;
    let mut skipped = 0usize;

    for record in &body.records {
        if existing.get(&record.url).copied().unwrap_or(false) {
            log::info!("Skipping previously analyzed supplier: {}", record.url);
            skipped += 1;
            continue;
        }

        let result = analysis::analyze_business(
            oracle.get_ref(),
            &provider,
            &matcher,
            record,
            body.search_id,
        )
        .await;

        match supplier_db::upsert_business_analysis(&pool, &result).await {
            Ok(()) => analyzed += 1,
            Err(e) => log::error!("Error saving analysis for {}: {:?}", record.url, e),
        }
    }

    HttpResponse::Ok().json(serde_json::json!({
        "analyzed": analyzed,
        "skipped": skipped,
    }))
}

#[derive(Deserialize)]
struct SuppliersQuery {
    search_id: Uuid,
}

#[get("/suppliers")]
async fn suppliers_by_search(
    query: web::Query<SuppliersQuery>,
    pool: web::Data<PgPool>,
) -> HttpResponse {
    match supplier_db::get_suppliers_by_search_id(&pool, query.search_id).await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => {
            log::error!(
                "Error fetching suppliers for search {}: {:?}",
                query.search_id,
                e
            );
            HttpResponse::InternalServerError().finish()
        }
    }
}
