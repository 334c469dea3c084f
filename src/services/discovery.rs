use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;

use crate::domain::{
    candidate, SearchMode, SearchRequest, SupplierRecord, ValidatedSupplier,
};

use super::{
    cache::DiscoveryCache, contacts, fetcher, relevance, search_provider::SearchProvider,
    validator, Oracle,
};

/// Top-level discovery pipeline: candidate search, domain filtering,
/// bounded-concurrency validation, dedup, result assembly. Always returns a
/// (possibly empty) list; per-candidate failures never surface to the
/// caller.
pub async fn discover_suppliers(
    provider: &SearchProvider,
    oracle: Arc<dyn Oracle>,
    cache: &DiscoveryCache,
    request: &SearchRequest,
) -> Vec<SupplierRecord> {
    let cache_key = DiscoveryCache::key(&request.product_name, &request.region, request.mode);
    if let Some(cached) = cache.get(&cache_key).await {
        return cached;
    }

    let links = provider.candidate_urls(request).await;
    log::info!(
        "{} candidates for '{}' in '{}' before filtering",
        links.len(),
        request.product_name,
        request.region
    );

    let filtered =
        candidate::dedup_by_registrable_domain(candidate::filter_candidate_urls(links));
    log::info!("{} candidates after domain filtering", filtered.len());

    // Non-quick modes amortize network latency with a shared-session batch
    // prefetch before the validation pass.
    let prefetched = match request.mode {
        SearchMode::Quick => HashMap::new(),
        _ => fetcher::prefetch_texts(filtered.clone()).await,
    };

    let validated = run_validation(
        filtered,
        request.quota(),
        oracle,
        prefetched,
        request.product_name.clone(),
        request.region.clone(),
        request.mode,
    )
    .await;

    // Completion order can interleave domains; dedup once more on the way
    // out so the result set is distinct by registrable domain.
    let records: Vec<SupplierRecord> = validated
        .into_iter()
        .filter_map(|s| candidate::registrable_domain(&s.url).map(|domain| (domain, s)))
        .unique_by(|(domain, _)| domain.clone())
        .map(|(_, s)| SupplierRecord::from(s))
        .collect();

    log::info!(
        "{} validated suppliers for '{}' in '{}'",
        records.len(),
        request.product_name,
        request.region
    );

    cache.put(cache_key, records.clone()).await;
    records
}

#[allow(clippy::too_many_arguments)]
async fn run_validation(
    links: Vec<String>,
    quota: usize,
    oracle: Arc<dyn Oracle>,
    prefetched: HashMap<String, String>,
    product_name: String,
    region: String,
    mode: SearchMode,
) -> Vec<ValidatedSupplier> {
    let client = fetcher::build_http_client();
    let prefetched = Arc::new(prefetched);
    let product_name = Arc::new(product_name);
    let region = Arc::new(region);

    let validate = move |link: String| {
        let oracle = oracle.clone();
        let client = client.clone();
        let prefetched = prefetched.clone();
        let product_name = product_name.clone();
        let region = region.clone();
        async move {
            validate_candidate(
                link,
                oracle.as_ref(),
                &client,
                &prefetched,
                &product_name,
                &region,
                mode,
            )
            .await
        }
    };

    validator::validate_until_quota(links, quota, validate).await
}

/// Per-URL validation: fetch (or reuse prefetched text), classify relevance,
/// extract contacts, optionally summarise. `None` on any failure.
async fn validate_candidate(
    link: String,
    oracle: &dyn Oracle,
    client: &reqwest::Client,
    prefetched: &HashMap<String, String>,
    product_name: &str,
    region: &str,
    mode: SearchMode,
) -> Option<ValidatedSupplier> {
    let (cleaned_text, raw_html) = match prefetched.get(&link) {
        Some(text) => (text.clone(), None),
        None => {
            let page = fetcher::fetch_page(client, &link).await?;
            (page.cleaned_text, Some(page.raw_html))
        }
    };

    if !relevance::is_relevant_supplier_page(oracle, &link, product_name, region, &cleaned_text)
        .await
    {
        return None;
    }

    let details =
        contacts::extract_contact_details(oracle, &link, region, &cleaned_text, raw_html.as_deref())
            .await;
    let (email, phone) = contacts::parse_contact_details(&details);

    let summary = match mode {
        SearchMode::Quick => None,
        _ => relevance::summarise_supplier(oracle, &link, product_name, region, &cleaned_text).await,
    };

    Some(ValidatedSupplier {
        company_name: candidate::company_name_from_url(&link),
        url: link,
        email,
        phone,
        summary,
    })
}
