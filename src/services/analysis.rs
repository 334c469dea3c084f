use url::Url;
use uuid::Uuid;

use crate::domain::{BusinessAnalysis, SupplierRecord};

use super::{
    analyzer, fetcher, marketplace::MarketplaceMatcher, scoring, sentiment,
    search_provider::SearchProvider, Oracle,
};

/// Favicon through Google's favicon service; avoids probing the site for
/// `/favicon.ico` variants.
pub fn favicon_url(website_url: &str) -> Option<String> {
    let parsed = Url::parse(website_url).ok()?;
    let host = parsed.host_str()?;
    Some(format!(
        "https://www.google.com/s2/favicons?domain={}&sz=64",
        host
    ))
}

/// Background enrichment for one discovered supplier: website analysis,
/// marketplace presence, sentiment, then the deterministic score. Each step
/// degrades independently; the analysis record is always produced.
pub async fn analyze_business(
    oracle: &dyn Oracle,
    provider: &SearchProvider,
    matcher: &MarketplaceMatcher,
    record: &SupplierRecord,
    search_id: Option<Uuid>,
) -> BusinessAnalysis {
    log::info!("Analyzing business: {} ({})", record.name, record.url);

    let client = fetcher::build_http_client();
    let mut website_data = analyzer::analyze_website(&client, &record.url).await;

    // Discovery-time contact info fills any gap the analyzer left.
    if website_data.contact.email.is_none() {
        website_data.contact.email = record.email.clone();
    }
    if website_data.contact.phone.is_none() {
        website_data.contact.phone = record.phone.clone();
    }
    if website_data.company_name.is_none() {
        website_data.company_name = Some(record.name.clone());
    }

    let marketplace_presence = matcher.check_presence(&record.name, &record.url).await;
    if marketplace_presence.alibaba_verified {
        log::info!(
            "Found on Alibaba: {:?}",
            marketplace_presence.alibaba_url
        );
    }
    if marketplace_presence.thomasnet_listed {
        log::info!(
            "Found on ThomasNet: {:?}",
            marketplace_presence.thomasnet_url
        );
    }

    let sentiment_data = sentiment::analyze_sentiment(provider, oracle, &record.name).await;

    let score_data = scoring::calculate_score(&website_data, &marketplace_presence, &sentiment_data);
    log::info!(
        "Score for {}: {}/25 (grade {}, {} stars)",
        record.name,
        score_data.total,
        score_data.grade,
        score_data.stars
    );

    BusinessAnalysis {
        company_name: website_data
            .company_name
            .clone()
            .unwrap_or_else(|| record.name.clone()),
        website_url: record.url.clone(),
        search_id,
        favicon_url: favicon_url(&record.url),
        website_data,
        marketplace_presence,
        sentiment_data,
        score_data,
    }
}
