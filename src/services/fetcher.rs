use std::collections::HashMap;
use std::time::Duration;

use fake_user_agent::get_rua;
use itertools::Itertools;
use scraper::Html;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A fetched and cleaned page. Owned by the requesting worker and discarded
/// once validation finishes.
pub struct FetchedPage {
    pub url: String,
    pub raw_html: String,
    pub cleaned_text: String,
}

pub fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(get_rua())
        .timeout(FETCH_TIMEOUT)
        .build()
        .unwrap()
}

/// Fetch a single page and clean it. Any network or decoding failure is
/// logged and collapses to `None`; one bad URL never disturbs the pipeline.
pub async fn fetch_page(client: &reqwest::Client, link: &str) -> Option<FetchedPage> {
    let response = match client.get(link).send().await {
        Ok(res) => res,
        Err(e) => {
            log::error!("Fetch error for {}: {:?}", link, e);
            return None;
        }
    };

    if !response.status().is_success() {
        log::error!("Fetch for {} returned status {}", link, response.status());
        return None;
    }

    match response.text().await {
        Ok(raw_html) => {
            let cleaned_text = clean_html(&raw_html);
            log::info!("Fetched {} ({} chars of text)", link, cleaned_text.len());
            Some(FetchedPage {
                url: link.to_string(),
                raw_html,
                cleaned_text,
            })
        }
        Err(e) => {
            log::error!("Failed to read body of {}: {:?}", link, e);
            None
        }
    }
}

/// Visible text of a document: head, script, style and noscript subtrees
/// dropped, whitespace collapsed to single spaces.
pub fn clean_html(raw_html: &str) -> String {
    let document = Html::parse_document(raw_html);

    let mut pieces: Vec<&str> = vec![];
    for node in document.tree.nodes() {
        if let Some(text) = node.value().as_text() {
            let in_skipped_subtree = node.ancestors().any(|ancestor| {
                ancestor.value().as_element().is_some_and(|el| {
                    matches!(el.name(), "head" | "script" | "style" | "noscript")
                })
            });
            if !in_skipped_subtree {
                pieces.push(&**text);
            }
        }
    }

    pieces
        .join(" ")
        .split_whitespace()
        .join(" ")
}

/// Prefetch cleaned texts for a batch of links over one shared client
/// (shared connection pool). Failed fetches are simply absent from the map.
pub async fn prefetch_texts(links: Vec<String>) -> HashMap<String, String> {
    let client = build_http_client();

    let mut handles = vec![];
    for link in links {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let page = fetch_page(&client, &link).await;
            (link, page)
        }));
    }

    let mut texts = HashMap::new();
    for handle in handles {
        if let Ok((link, Some(page))) = handle.await {
            texts.insert(link, page.cleaned_text);
        }
    }
    texts
}
