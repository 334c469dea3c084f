pub mod analysis;
pub mod analyzer;
pub mod cache;
pub mod certification;
pub mod contacts;
pub mod discovery;
pub mod fetcher;
pub mod marketplace;
pub mod oracle;
pub mod relevance;
pub mod scoring;
pub mod search_provider;
pub mod sentiment;
pub mod validator;

pub use cache::DiscoveryCache;
pub use marketplace::MarketplaceMatcher;
pub use oracle::{Oracle, OpenaiOracle};
pub use search_provider::{ProviderResult, SearchProvider};
