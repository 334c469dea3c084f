use itertools::Itertools;
use url::Url;

/// Marketplace, social and aggregator hosts that can never be a supplier's
/// own website. Matched as case-insensitive substrings of the whole URL.
pub const EXCLUDED_DOMAINS: &[&str] = &[
    "alibaba",
    "aliexpress",
    "indiamart",
    "amazon",
    "made-in-china",
    "globalsources",
    "tradeindia",
    "ec21",
    "dhgate",
    "exportersindia",
    "ecplaza",
    "exporthub",
    "walmart",
    "ebay",
    "shopify",
    "bigcommerce",
    "woocommerce",
    "etsy",
    "overstock",
    "newegg",
    "tradekey",
    "hktdc",
    "kompass",
    "yellowpages",
    "zoominfo",
    "yellowbook",
    "thomasnet",
    "supplierdirectory",
    "businessdirectory",
    "b2bmarketplace",
    "b2bcentral",
    "b2bconnect",
    "b2bsourcing",
    "b2bsupplier",
    "b2bwholesale",
    "pinterest",
    "linkedin",
    "reddit",
    "facebook",
    "wikipedia",
    "forbes",
    "bbc",
    "cnn",
    "swiggy",
    "zomato",
    "talabat",
];

/// Path or query tokens indicating non-HTML or clearly irrelevant content.
const EXCLUDED_PATH_TOKENS: &[&str] = &[
    "list",
    "data",
    "dictionary",
    "word",
    "aspx",
    "pdf",
    "txt",
    "doc",
    "xls",
    "video",
    "image",
];

/// Compound TLDs where the registrable domain needs three labels.
const COMPOUND_TLDS: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "com.au", "co.au", "net.au", "co.nz", "co.jp",
    "co.kr", "co.in", "com.cn", "com.br", "com.mx", "com.sg", "com.hk",
    "com.tw", "com.tr", "co.za", "com.pk", "com.my",
];

/// Drop deny-listed hosts and URLs with excluded path tokens. Pure and
/// deterministic; applying it twice yields the same output.
pub fn filter_candidate_urls(urls: Vec<String>) -> Vec<String> {
    urls.into_iter()
        .filter(|u| {
            let lowered = u.to_lowercase();
            !EXCLUDED_DOMAINS
                .iter()
                .any(|domain| lowered.contains(domain))
        })
        .filter(|u| {
            let lowered = u.to_lowercase();
            !EXCLUDED_PATH_TOKENS
                .iter()
                .any(|token| lowered.contains(token))
        })
        .collect()
}

/// Registrable domain of a URL: host without `www.`, reduced to the apex
/// (compound-TLD aware). `https://shop.example.co.uk/x` -> `example.co.uk`.
pub fn registrable_domain(candidate_url: &str) -> Option<String> {
    let parsed = Url::parse(candidate_url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    if host.is_empty() {
        return None;
    }
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() <= 2 {
        return Some(host.to_string());
    }

    let last_two = parts[parts.len() - 2..].join(".");
    match COMPOUND_TLDS.contains(&last_two.as_str()) {
        true => Some(parts[parts.len() - 3..].join(".")),
        false => Some(last_two),
    }
}

/// Keep the first URL seen for each registrable domain; URLs that fail to
/// parse are dropped. Order of survivors is input order.
pub fn dedup_by_registrable_domain(urls: Vec<String>) -> Vec<String> {
    urls.into_iter()
        .filter_map(|u| registrable_domain(&u).map(|domain| (domain, u)))
        .unique_by(|(domain, _)| domain.clone())
        .map(|(_, u)| u)
        .collect()
}

/// Company name guessed from the URL: first label of the registrable domain,
/// capitalized. `https://www.acme-tools.com` -> `Acme-tools`.
pub fn company_name_from_url(candidate_url: &str) -> String {
    let name = registrable_domain(candidate_url)
        .and_then(|domain| domain.split('.').next().map(|s| s.to_string()))
        .unwrap_or_else(|| "Unknown".to_string());

    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Unknown".to_string(),
    }
}
