use scraper::{Html, Selector};
use url::Url;

use crate::domain::{DetectionMethod, MarketplacePresence};
use crate::services::fetcher;

/// Anchors examined on a supplier homepage before giving up.
const LINK_SCAN_CAP: usize = 100;

/// Search-side matches below this similarity are surfaced flagged weak.
const MATCH_THRESHOLD: f64 = 0.6;

pub struct MarketplaceLinks {
    pub alibaba_url: Option<String>,
    pub thomasnet_url: Option<String>,
}

fn host_of(link: &str) -> Option<String> {
    Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

pub fn is_alibaba_host(link: &str) -> bool {
    host_of(link).is_some_and(|h| h.contains("alibaba.com"))
}

pub fn is_thomasnet_host(link: &str) -> bool {
    host_of(link).is_some_and(|h| h.contains("thomasnet.com"))
}

/// Store name from an Alibaba storefront URL by positional hostname parsing:
/// `https://jiaruihongxin.en.alibaba.com` -> `jiaruihongxin`.
pub fn extract_alibaba_store_name(link: &str) -> Option<String> {
    let host = host_of(link)?;
    let parts: Vec<&str> = host.split('.').collect();
    match parts.len() >= 3 {
        true => Some(parts[0].to_string()),
        false => None,
    }
}

/// Name similarity in [0,1]: exact match 1.0, one containing the other 0.9,
/// otherwise a normalized edit ratio.
pub fn similarity_score(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 0.9;
    }
    strsim::normalized_levenshtein(&a, &b)
}

/// Direct detection: the supplier's own URL already lives on a marketplace.
pub fn direct_presence(website_url: &str) -> Option<MarketplacePresence> {
    if is_alibaba_host(website_url) {
        let mut presence = MarketplacePresence {
            alibaba_verified: true,
            alibaba_url: Some(website_url.to_string()),
            alibaba_store_name: extract_alibaba_store_name(website_url),
            detection_method: Some(DetectionMethod::DirectUrl),
            ..Default::default()
        };
        if is_thomasnet_host(website_url) {
            presence.thomasnet_listed = true;
            presence.thomasnet_url = Some(website_url.to_string());
        }
        return Some(presence);
    }

    if is_thomasnet_host(website_url) {
        return Some(MarketplacePresence {
            thomasnet_listed: true,
            thomasnet_url: Some(website_url.to_string()),
            detection_method: Some(DetectionMethod::DirectUrl),
            ..Default::default()
        });
    }

    None
}

/// Harvest outbound marketplace links from homepage HTML. First hit per
/// marketplace wins; scanning stops after the anchor cap or once both are
/// found.
pub fn find_marketplace_links(html: &str) -> MarketplaceLinks {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let mut links = MarketplaceLinks {
        alibaba_url: None,
        thomasnet_url: None,
    };

    for anchor in document.select(&anchor_selector).take(LINK_SCAN_CAP) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.starts_with("http") {
            continue;
        }
        let lowered = href.to_lowercase();

        if links.alibaba_url.is_none() && lowered.contains("alibaba.com") {
            links.alibaba_url = Some(href.to_string());
        }
        if links.thomasnet_url.is_none() && lowered.contains("thomasnet.com") {
            links.thomasnet_url = Some(href.to_string());
        }
        if links.alibaba_url.is_some() && links.thomasnet_url.is_some() {
            break;
        }
    }

    links
}

pub fn presence_from_website_links(links: MarketplaceLinks) -> Option<MarketplacePresence> {
    if links.alibaba_url.is_none() && links.thomasnet_url.is_none() {
        return None;
    }
    Some(MarketplacePresence {
        alibaba_verified: links.alibaba_url.is_some(),
        alibaba_url: links.alibaba_url,
        alibaba_store_name: None,
        thomasnet_listed: links.thomasnet_url.is_some(),
        thomasnet_url: links.thomasnet_url,
        detection_method: Some(DetectionMethod::WebsiteLink),
        weak_match: false,
    })
}

/// Best fuzzy match of a company name among marketplace search-result
/// titles. Below-threshold winners are surfaced flagged weak rather than
/// silently dropped.
pub fn pick_best_match<'a>(
    company_name: &str,
    titles: &'a [String],
) -> Option<(&'a str, f64, bool)> {
    titles
        .iter()
        .map(|title| (title.as_str(), similarity_score(company_name, title)))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(title, score)| (title, score, score < MATCH_THRESHOLD))
}

pub struct MarketplaceMatcher {
    client: reqwest::Client,
    /// Marketplace-side search trips bot protection; off unless explicitly
    /// enabled.
    search_enabled: bool,
}

impl Default for MarketplaceMatcher {
    fn default() -> Self {
        MarketplaceMatcher {
            client: fetcher::build_http_client(),
            search_enabled: false,
        }
    }
}

impl MarketplaceMatcher {
    pub fn with_search_enabled(mut self, enabled: bool) -> Self {
        self.search_enabled = enabled;
        self
    }

    /// Strategies in order, short-circuiting on the first success:
    /// direct URL, on-site link harvesting, then (only when enabled)
    /// marketplace-side search.
    pub async fn check_presence(
        &self,
        company_name: &str,
        website_url: &str,
    ) -> MarketplacePresence {
        if let Some(presence) = direct_presence(website_url) {
            log::info!(
                "Direct marketplace detection for {}: {:?}",
                website_url,
                presence.detection_method
            );
            return presence;
        }

        match fetcher::fetch_page(&self.client, website_url).await {
            Some(page) => {
                let links = find_marketplace_links(&page.raw_html);
                if let Some(presence) = presence_from_website_links(links) {
                    log::info!("Found marketplace link on {}", website_url);
                    return presence;
                }
            }
            None => {
                log::error!("Could not fetch homepage for link harvest: {}", website_url);
            }
        }

        if !self.search_enabled {
            log::info!("Skipping marketplace search for {} (disabled)", company_name);
            return MarketplacePresence::default();
        }

        self.search_alibaba(company_name).await
    }

    /// Best-effort search-side detection. Bot protection makes this flaky;
    /// failures degrade to "no presence".
    async fn search_alibaba(&self, company_name: &str) -> MarketplacePresence {
        let search_url = format!(
            "https://www.alibaba.com/trade/search?SearchText={}",
            company_name.replace(' ', "+")
        );

        let Some(page) = fetcher::fetch_page(&self.client, &search_url).await else {
            return MarketplacePresence::default();
        };

        let document = Html::parse_document(&page.raw_html);
        let title_selector = Selector::parse(
            "[class*=supplier], [class*=company], [class*=store]",
        )
        .unwrap();

        let titles: Vec<String> = document
            .select(&title_selector)
            .take(5)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        match pick_best_match(company_name, &titles) {
            Some((title, score, weak)) => {
                log::info!(
                    "Alibaba search match for '{}': '{}' (similarity {:.2}{})",
                    company_name,
                    title,
                    score,
                    if weak { ", weak" } else { "" },
                );
                MarketplacePresence {
                    alibaba_verified: true,
                    alibaba_url: Some(search_url),
                    alibaba_store_name: Some(title.to_string()),
                    detection_method: Some(DetectionMethod::SearchMatch),
                    weak_match: weak,
                    ..Default::default()
                }
            }
            None => MarketplacePresence::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_alibaba_url_is_verified_with_store_name() {
        let presence = direct_presence("https://jiaruihongxin.en.alibaba.com").unwrap();

        assert!(presence.alibaba_verified);
        assert_eq!(
            presence.alibaba_store_name.as_deref(),
            Some("jiaruihongxin")
        );
        assert_eq!(presence.detection_method, Some(DetectionMethod::DirectUrl));
        assert!(!presence.thomasnet_listed);
    }

    #[test]
    fn plain_supplier_url_has_no_direct_presence() {
        assert!(direct_presence("https://www.acmetools.com").is_none());
    }

    #[test]
    fn homepage_alibaba_link_yields_website_link_detection() {
        let html = r#"
            <html><body>
              <a href="/about">About us</a>
              <a href="https://www.alibaba.com/some-store">Our Alibaba store</a>
              <a href="https://twitter.com/acme">Twitter</a>
            </body></html>
        "#;
        let links = find_marketplace_links(html);
        let presence = presence_from_website_links(links).unwrap();

        assert!(presence.alibaba_verified);
        assert_eq!(
            presence.alibaba_url.as_deref(),
            Some("https://www.alibaba.com/some-store")
        );
        assert_eq!(
            presence.detection_method,
            Some(DetectionMethod::WebsiteLink)
        );
        assert!(!presence.weak_match);
    }

    #[test]
    fn relative_marketplace_hrefs_are_ignored() {
        let html = r#"<a href="/alibaba.com/fake">nope</a>"#;
        let links = find_marketplace_links(html);
        assert!(links.alibaba_url.is_none());
    }

    #[test]
    fn similarity_scores_exact_substring_and_fuzzy() {
        assert_eq!(similarity_score("Acme Tools", "acme tools"), 1.0);
        assert_eq!(similarity_score("Acme", "Acme Tools Ltd"), 0.9);
        assert!(similarity_score("Acme Tools", "Acme Toolz") > 0.8);
        assert_eq!(similarity_score("", "anything"), 0.0);
    }

    #[test]
    fn weak_matches_are_flagged_not_dropped() {
        let titles = vec![
            "Completely Different Trading Co".to_string(),
            "Another Unrelated Vendor".to_string(),
        ];
        let (_, score, weak) = pick_best_match("Acme Tools", &titles).unwrap();

        assert!(score < 0.6);
        assert!(weak);
    }
}
