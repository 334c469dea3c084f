use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use suplink::domain::{SearchMode, SearchRequest, SupplierRecord};
use suplink::services::{
    contacts, discovery, relevance, DiscoveryCache, Oracle, SearchProvider,
};

/// Deterministic oracle double: a fixed classify response, or an error when
/// none is scripted.
struct ScriptedOracle {
    classify_response: Option<String>,
}

impl ScriptedOracle {
    fn answering(response: &str) -> Self {
        ScriptedOracle {
            classify_response: Some(response.to_string()),
        }
    }

    fn down() -> Self {
        ScriptedOracle {
            classify_response: None,
        }
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn classify(&self, _text: &str, _question: &str) -> anyhow::Result<String> {
        match &self.classify_response {
            Some(response) => Ok(response.clone()),
            None => Err(anyhow::anyhow!("oracle unavailable")),
        }
    }

    async fn extract_structured(
        &self,
        _text: &str,
        _schema_hint: &str,
    ) -> anyhow::Result<serde_json::Value> {
        Err(anyhow::anyhow!("oracle unavailable"))
    }
}

#[tokio::test]
async fn relevance_accepts_only_the_strict_link_format() {
    let link = "https://teaexports.example.com";
    let text = "Bulk green tea supplier shipping worldwide.";

    let accept = ScriptedOracle::answering("link: https://teaexports.example.com");
    assert!(relevance::is_relevant_supplier_page(&accept, link, "green tea", "Vietnam", text).await);

    let reject = ScriptedOracle::answering("link: None");
    assert!(!relevance::is_relevant_supplier_page(&reject, link, "green tea", "Vietnam", text).await);

    // Fail-closed: prose answers and oracle failures both reject.
    let prose = ScriptedOracle::answering("This website seems to be a supplier.");
    assert!(!relevance::is_relevant_supplier_page(&prose, link, "green tea", "Vietnam", text).await);

    let down = ScriptedOracle::down();
    assert!(!relevance::is_relevant_supplier_page(&down, link, "green tea", "Vietnam", text).await);
}

#[tokio::test]
async fn relevance_rejects_empty_pages_without_asking_the_oracle() {
    let down = ScriptedOracle::down();
    assert!(
        !relevance::is_relevant_supplier_page(
            &down,
            "https://a.example.com",
            "green tea",
            "Vietnam",
            ""
        )
        .await
    );
}

#[tokio::test]
async fn contact_extraction_prefers_tel_over_fax_when_oracle_is_down() {
    let text = "Fax: 555-1234 for document transmissions only, responses can \
                take up to two business days to arrive.  Tel: 555-9999";
    let oracle = ScriptedOracle::down();

    let details =
        contacts::extract_contact_details(&oracle, "https://a.example.com", "", text, None).await;
    let (_, phone) = contacts::parse_contact_details(&details);

    let digits: String = phone
        .unwrap()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    assert_eq!(digits, "5559999");
}

#[tokio::test]
async fn contact_extraction_accepts_the_oracle_choice_for_ambiguous_pages() {
    let text = "Call our Munich office: 089 1234567. Warehouse contact \
                number for deliveries and inbound logistics: 089 7654321.";
    let oracle = ScriptedOracle::answering("089 7654321");

    let details =
        contacts::extract_contact_details(&oracle, "https://a.example.com", "Germany", text, None)
            .await;
    let (_, phone) = contacts::parse_contact_details(&details);

    let digits: String = phone
        .unwrap()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    assert!(digits.ends_with("7654321"));
}

#[tokio::test]
async fn contact_extraction_on_empty_page_is_empty_not_an_error() {
    let oracle = ScriptedOracle::down();
    let details =
        contacts::extract_contact_details(&oracle, "https://a.example.com", "", "", None).await;
    assert_eq!(details, "");
}

#[tokio::test]
async fn cached_results_short_circuit_the_pipeline() {
    // Provider with no keys: a live run would come back empty.
    let provider = SearchProvider::new(None, None);
    let oracle: Arc<dyn Oracle> = Arc::new(ScriptedOracle::down());
    let cache = DiscoveryCache::new(8, Duration::from_secs(60));

    let request = SearchRequest {
        product_name: "green tea".to_string(),
        region: "Vietnam".to_string(),
        mode: SearchMode::Quick,
        max_results: None,
    };

    let key = DiscoveryCache::key("green tea", "Vietnam", SearchMode::Quick);
    cache
        .put(
            key,
            vec![SupplierRecord {
                name: "Cached".to_string(),
                url: "https://cached.example.com".to_string(),
                email: None,
                phone: None,
                summary: None,
            }],
        )
        .await;

    let results = discovery::discover_suppliers(&provider, oracle, &cache, &request).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Cached");
}

#[tokio::test]
async fn total_provider_misconfiguration_yields_an_empty_list() {
    let provider = SearchProvider::new(None, None);
    let oracle: Arc<dyn Oracle> = Arc::new(ScriptedOracle::down());
    let cache = DiscoveryCache::new(8, Duration::from_secs(60));

    let request = SearchRequest {
        product_name: "green tea".to_string(),
        region: "Vietnam".to_string(),
        mode: SearchMode::Quick,
        max_results: Some(5),
    };

    let results = discovery::discover_suppliers(&provider, oracle, &cache, &request).await;
    assert!(results.is_empty());
}
