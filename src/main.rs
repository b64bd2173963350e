mod config;
mod db;
mod errors;
mod middleware;
mod models;
mod routes;
mod services;
mod telemetry;
mod utils;
#[cfg(test)]
mod test_support;

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;
use std::time::Duration;

use crate::config::AppConfig;
use crate::services::gold_price_service::{run_price_ticker, GoldPriceService};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init();

    let config = AppConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    tracing::info!("🔌 Connecting to database...");
    let db = db::establish_connection(&config)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))?;
    db::create_schema(&db).await.map_err(io::Error::other)?;
    tracing::info!("✅ Database connected!");

    let price = GoldPriceService::initialize_default(&db)
        .await
        .map_err(io::Error::other)?;
    tracing::info!(buy = %price.buy_price, sell = %price.sell_price, "current gold price");

    tokio::spawn(run_price_ticker(
        db.clone(),
        Duration::from_secs(config.price_tick_seconds),
    ));

    let bind = (config.host.clone(), config.port);
    tracing::info!("🚀 Starting server on http://{}:{}", bind.0, bind.1);

    let config = web::Data::new(config);
    let db = web::Data::new(db);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(config.clone())
            .configure(routes::configure_routes)
    })
        .bind(bind)?
        .run()
        .await
}
