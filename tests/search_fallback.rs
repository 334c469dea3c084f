use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use suplink::domain::{SearchMode, SearchRequest};
use suplink::services::SearchProvider;

fn request(mode: SearchMode) -> SearchRequest {
    SearchRequest {
        product_name: "green tea".to_string(),
        region: "Vietnam".to_string(),
        mode,
        max_results: None,
    }
}

fn provider_for(server: &MockServer) -> SearchProvider {
    SearchProvider::new(Some("serper-key".to_string()), Some("tavily-key".to_string()))
        .with_endpoints(
            format!("{}/serper", server.uri()),
            format!("{}/tavily", server.uri()),
        )
}

#[tokio::test]
async fn quick_mode_uses_serper_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/serper"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic": [
                {"link": "https://teaexports.example.com"},
                {"link": "https://greenleaf.example.org"},
            ]
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let links = provider.candidate_urls(&request(SearchMode::Quick)).await;

    assert_eq!(
        links,
        vec![
            "https://teaexports.example.com",
            "https://greenleaf.example.org",
        ]
    );
}

#[tokio::test]
async fn quick_mode_falls_back_to_tavily_when_serper_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/serper"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tavily"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"url": "https://fallback.example.com"}]
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let links = provider.candidate_urls(&request(SearchMode::Quick)).await;

    assert_eq!(links, vec!["https://fallback.example.com"]);
}

#[tokio::test]
async fn basic_mode_falls_back_to_serper_when_tavily_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tavily"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/serper"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic": [{"link": "https://serper-fallback.example.com"}]
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let links = provider.candidate_urls(&request(SearchMode::Basic)).await;

    assert_eq!(links, vec!["https://serper-fallback.example.com"]);
}

#[tokio::test]
async fn both_providers_failing_yields_empty_never_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/serper"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tavily"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let provider = provider_for(&server);

    for mode in [SearchMode::Quick, SearchMode::Basic, SearchMode::Advanced] {
        let links = provider.candidate_urls(&request(mode)).await;
        assert!(links.is_empty());
    }
}

#[tokio::test]
async fn unconfigured_keys_degrade_to_empty() {
    let provider = SearchProvider::new(None, None);
    let links = provider.candidate_urls(&request(SearchMode::Advanced)).await;
    assert!(links.is_empty());
}
