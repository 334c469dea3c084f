use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{SearchMode, SearchRequest};

const SERPER_URL: &str = "https://google.serper.dev/search";
const TAVILY_URL: &str = "https://api.tavily.com/search";
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(12);

pub enum ProviderResult {
    Links(Vec<String>),
    NoResults,
    Unavailable,
}

#[derive(Serialize)]
struct SerperPayload {
    q: String,
    num: usize,
    page: usize,
    location: String,
}

#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganicItem>,
}

#[derive(Deserialize)]
struct SerperOrganicItem {
    link: Option<String>,
}

#[derive(Serialize)]
struct TavilyPayload {
    api_key: String,
    query: String,
    search_depth: String,
    max_results: usize,
    include_answer: bool,
    include_raw_content: bool,
    include_images: bool,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResultItem>,
}

#[derive(Deserialize)]
struct TavilyResultItem {
    url: Option<String>,
}

/// Uniform "get candidate URLs" across the two search providers, with
/// fallback ordering per mode. Never errors: an unreachable or unconfigured
/// provider degrades to the other one, and finally to the empty list.
pub struct SearchProvider {
    client: reqwest::Client,
    serper_api_key: Option<String>,
    tavily_api_key: Option<String>,
    serper_url: String,
    tavily_url: String,
}

impl SearchProvider {
    pub fn new(serper_api_key: Option<String>, tavily_api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .unwrap();
        SearchProvider {
            client,
            serper_api_key,
            tavily_api_key,
            serper_url: SERPER_URL.to_string(),
            tavily_url: TAVILY_URL.to_string(),
        }
    }

    /// Point both providers at alternative endpoints (test servers).
    pub fn with_endpoints(mut self, serper_url: String, tavily_url: String) -> Self {
        self.serper_url = serper_url;
        self.tavily_url = tavily_url;
        self
    }

    pub async fn candidate_urls(&self, request: &SearchRequest) -> Vec<String> {
        let max_results = request.mode.provider_max_results();

        let primary = match request.mode {
            SearchMode::Quick => {
                self.serper_search(&request.product_name, &request.region, max_results)
                    .await
            }
            SearchMode::Basic => {
                self.tavily_search(&request.product_name, &request.region, "basic", max_results)
                    .await
            }
            SearchMode::Advanced => {
                self.tavily_search(&request.product_name, &request.region, "advanced", max_results)
                    .await
            }
        };

        if let ProviderResult::Links(links) = primary {
            return links;
        }

        // Primary yielded nothing or is down; try the other provider.
        let fallback = match request.mode {
            SearchMode::Quick => {
                log::error!("Serper unavailable or empty; falling back to Tavily");
                self.tavily_search(&request.product_name, &request.region, "basic", 25)
                    .await
            }
            _ => {
                log::error!("Tavily unavailable or empty; falling back to Serper");
                self.serper_search(&request.product_name, &request.region, 40)
                    .await
            }
        };

        match fallback {
            ProviderResult::Links(links) => links,
            _ => {
                log::error!(
                    "No search provider produced candidates for '{}' in '{}'",
                    request.product_name,
                    request.region
                );
                vec![]
            }
        }
    }

    async fn serper_search(
        &self,
        product_name: &str,
        region: &str,
        num: usize,
    ) -> ProviderResult {
        let Some(api_key) = self.serper_api_key.as_deref() else {
            log::error!("Serper API key missing");
            return ProviderResult::Unavailable;
        };

        let payload = SerperPayload {
            q: format!(
                "{} supplier in {} -cart -basket -marketplace -directory -b2b",
                product_name, region
            ),
            num,
            page: 0,
            location: region.to_string(),
        };

        let response = self
            .client
            .post(&self.serper_url)
            .header("X-API-KEY", api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => match res.json::<SerperResponse>().await {
                Ok(json) => {
                    let links: Vec<String> = json
                        .organic
                        .into_iter()
                        .filter_map(|item| item.link)
                        .collect();
                    log::info!("Serper returned {} candidate urls", links.len());
                    match links.is_empty() {
                        true => ProviderResult::NoResults,
                        false => ProviderResult::Links(links),
                    }
                }
                Err(e) => {
                    log::error!("Error deserializing Serper response: {:?}", e);
                    ProviderResult::Unavailable
                }
            },
            Ok(res) => {
                log::error!("Serper returned status {}", res.status());
                ProviderResult::Unavailable
            }
            Err(e) => {
                log::error!("Serper request error: {:?}", e);
                ProviderResult::Unavailable
            }
        }
    }

    async fn tavily_search(
        &self,
        product_name: &str,
        region: &str,
        depth: &str,
        max_results: usize,
    ) -> ProviderResult {
        let Some(api_key) = self.tavily_api_key.as_deref() else {
            log::error!("Tavily API key missing");
            return ProviderResult::Unavailable;
        };

        let payload = TavilyPayload {
            api_key: api_key.to_string(),
            query: format!(
                "bulk suppliers OR wholesale suppliers of {} in {}",
                product_name, region
            ),
            search_depth: depth.to_string(),
            max_results,
            include_answer: false,
            include_raw_content: false,
            include_images: false,
        };

        log::info!("Tavily search depth={} max_results={}", depth, max_results);

        let response = self.client.post(&self.tavily_url).json(&payload).send().await;

        match response {
            Ok(res) if res.status().is_success() => match res.json::<TavilyResponse>().await {
                Ok(json) => {
                    let links: Vec<String> = json
                        .results
                        .into_iter()
                        .filter_map(|item| item.url)
                        .collect();
                    log::info!("Tavily returned {} candidate urls", links.len());
                    match links.is_empty() {
                        true => ProviderResult::NoResults,
                        false => ProviderResult::Links(links),
                    }
                }
                Err(e) => {
                    log::error!("Error deserializing Tavily response: {:?}", e);
                    ProviderResult::Unavailable
                }
            },
            Ok(res) => {
                log::error!("Tavily returned status {}", res.status());
                ProviderResult::Unavailable
            }
            Err(e) => {
                log::error!("Tavily request error: {:?}", e);
                ProviderResult::Unavailable
            }
        }
    }

    pub fn serper_configured(&self) -> bool {
        self.serper_api_key.is_some()
    }

    /// News/review search used by the sentiment analyzer. Quick single-page
    /// Serper query returning (title, snippet) pairs.
    pub async fn search_mentions(&self, query: &str, num: usize) -> Vec<(String, String)> {
        let Some(api_key) = self.serper_api_key.as_deref() else {
            return vec![];
        };

        #[derive(Deserialize)]
        struct MentionItem {
            title: Option<String>,
            snippet: Option<String>,
        }
        #[derive(Deserialize)]
        struct MentionResponse {
            #[serde(default)]
            organic: Vec<MentionItem>,
        }

        let payload = serde_json::json!({ "q": query, "num": num });
        let response = self
            .client
            .post(&self.serper_url)
            .header("X-API-KEY", api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => {
                match res.json::<MentionResponse>().await {
                    Ok(json) => json
                        .organic
                        .into_iter()
                        .take(num)
                        .map(|item| {
                            (
                                item.title.unwrap_or_default(),
                                item.snippet.unwrap_or_default(),
                            )
                        })
                        .collect(),
                    Err(e) => {
                        log::error!("Error deserializing mention search: {:?}", e);
                        vec![]
                    }
                }
            }
            Ok(res) => {
                log::error!("Mention search returned status {}", res.status());
                vec![]
            }
            Err(e) => {
                log::error!("Mention search error: {:?}", e);
                vec![]
            }
        }
    }
}
