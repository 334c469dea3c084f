use std::net::TcpListener;
use std::sync::Arc;

use actix_web::{
    dev::Server,
    middleware::Logger,
    web::{self, Data},
    App, HttpServer,
};
use sqlx::PgPool;

use crate::{
    routes::{analysis_route, discover_route},
    services::{DiscoveryCache, MarketplaceMatcher, Oracle, SearchProvider},
};

pub fn run(
    listener: TcpListener,
    db_pool: PgPool,
    oracle: Arc<dyn Oracle>,
    provider: SearchProvider,
    matcher: MarketplaceMatcher,
    cache: DiscoveryCache,
) -> Result<Server, std::io::Error> {
    let db_pool = Data::new(db_pool);
    let oracle: Data<dyn Oracle> = Data::from(oracle);
    let provider = Data::new(provider);
    let matcher = Data::new(matcher);
    let cache = Data::new(cache);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(web::scope("/discover").service(discover_route::discover))
            .service(
                web::scope("/analysis")
                    .service(analysis_route::run_analysis)
                    .service(analysis_route::suppliers_by_search),
            )
            .app_data(db_pool.clone())
            .app_data(oracle.clone())
            .app_data(provider.clone())
            .app_data(matcher.clone())
            .app_data(cache.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
