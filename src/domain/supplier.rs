use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Quick,
    Basic,
    Advanced,
}

impl SearchMode {
    /// Accepted-supplier quota for this mode; validation is cancelled once
    /// the quota is reached.
    pub fn validation_quota(&self) -> usize {
        match self {
            SearchMode::Quick => 15,
            SearchMode::Basic => 20,
            SearchMode::Advanced => 25,
        }
    }

    pub fn provider_max_results(&self) -> usize {
        match self {
            SearchMode::Quick => 40,
            SearchMode::Basic => 25,
            SearchMode::Advanced => 40,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub product_name: String,
    pub region: String,
    pub mode: SearchMode,
    pub max_results: Option<usize>,
}

impl SearchRequest {
    pub fn quota(&self) -> usize {
        self.max_results.unwrap_or_else(|| self.mode.validation_quota())
    }
}

/// A candidate URL that passed relevance validation. Appended at most once
/// to the shared result set by the worker that validated it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSupplier {
    pub url: String,
    pub company_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub name: String,
    pub url: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub summary: Option<String>,
}

impl From<ValidatedSupplier> for SupplierRecord {
    fn from(value: ValidatedSupplier) -> Self {
        SupplierRecord {
            name: value.company_name,
            url: value.url,
            email: value.email,
            phone: value.phone,
            summary: value.summary,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketplacePresence {
    pub alibaba_verified: bool,
    pub alibaba_url: Option<String>,
    pub alibaba_store_name: Option<String>,
    pub thomasnet_listed: bool,
    pub thomasnet_url: Option<String>,
    pub detection_method: Option<DetectionMethod>,
    /// Set when a search-side match scored below the similarity threshold;
    /// such matches are surfaced, never silently dropped.
    pub weak_match: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    DirectUrl,
    WebsiteLink,
    SearchMatch,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AboutInfo {
    pub founded_year: Option<i32>,
    pub years_in_business: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisualElements {
    pub has_contact_form: bool,
    pub has_social_media: bool,
    pub has_downloads: bool,
    pub has_news_section: bool,
    pub has_chat: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualitySignals {
    pub has_ssl: bool,
    pub has_awards: bool,
    pub has_partnerships: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreshnessSignals {
    pub recent_dates: bool,
}

/// Everything the analyzer could read off a supplier website. Missing parts
/// degrade scoring to neutral defaults instead of blocking it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebsiteData {
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub contact: ContactInfo,
    pub about: AboutInfo,
    pub certifications: Vec<String>,
    pub visual_elements: VisualElements,
    pub quality_signals: QualitySignals,
    pub freshness_signals: FreshnessSignals,
    pub analysis_failed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentData {
    pub sentiment_available: bool,
    pub sentiment_score: i32,
    pub sentiment_label: String,
    pub positive_mentions: u32,
    pub negative_mentions: u32,
    pub neutral_mentions: u32,
    pub news_count: u32,
    pub analysis_summary: String,
}

impl Default for SentimentData {
    fn default() -> Self {
        SentimentData {
            sentiment_available: false,
            sentiment_score: 50,
            sentiment_label: "neutral".to_string(),
            positive_mentions: 0,
            negative_mentions: 0,
            neutral_mentions: 0,
            news_count: 0,
            analysis_summary: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessAnalysis {
    pub company_name: String,
    pub website_url: String,
    pub search_id: Option<uuid::Uuid>,
    pub favicon_url: Option<String>,
    pub website_data: WebsiteData,
    pub marketplace_presence: MarketplacePresence,
    pub sentiment_data: SentimentData,
    pub score_data: crate::services::scoring::ScoreBreakdown,
}
