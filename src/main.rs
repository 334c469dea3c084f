use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use env_logger::Env;
use sqlx::postgres::PgPoolOptions;
use suplink::{
    configuration::get_configuration,
    services::{DiscoveryCache, MarketplaceMatcher, OpenaiOracle, Oracle, SearchProvider},
    startup::run,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");

    let pool_options = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(15 * 60)); // 15 minutes

    let connection_pool = pool_options.connect_lazy_with(configuration.database.with_db());

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;

    let oracle: Arc<dyn Oracle> = Arc::new(OpenaiOracle::new(configuration.api_keys.openai));
    let provider = SearchProvider::new(
        configuration.api_keys.serper,
        configuration.api_keys.tavily,
    );
    let matcher =
        MarketplaceMatcher::default().with_search_enabled(configuration.discovery.marketplace_search);
    let cache = DiscoveryCache::new(
        configuration.discovery.cache_capacity,
        Duration::from_secs(configuration.discovery.cache_ttl_seconds),
    );

    run(listener, connection_pool, oracle, provider, matcher, cache)?.await
}
