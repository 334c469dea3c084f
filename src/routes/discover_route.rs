use std::sync::Arc;

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dal::search_db,
    domain::{SearchMode, SearchRequest},
    services::{discovery, DiscoveryCache, Oracle, SearchProvider},
};

#[derive(Deserialize)]
struct DiscoverQuery {
    product: String,
    region: String,
    mode: Option<SearchMode>,
    max_results: Option<usize>,
}

#[get("")]
async fn discover(
    query: web::Query<DiscoverQuery>,
    provider: web::Data<SearchProvider>,
    oracle: web::Data<dyn Oracle>,
    cache: web::Data<DiscoveryCache>,
    pool: web::Data<PgPool>,
) -> HttpResponse {
    let request = SearchRequest {
        product_name: query.product.clone(),
        region: query.region.clone(),
        mode: query.mode.unwrap_or(SearchMode::Quick),
        max_results: query.max_results,
    };

    let oracle: Arc<dyn Oracle> = oracle.into_inner();
    let results = discovery::discover_suppliers(&provider, oracle, &cache, &request).await;

    let search_id = Uuid::new_v4();
    if let Err(e) = search_db::insert_search(&pool, search_id, &request, &results).await {
        log::error!("Error recording search {}: {:?}", search_id, e);
    }

    HttpResponse::Ok().json(serde_json::json!({
        "search_id": search_id,
        "results": results,
    }))
}
