// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database and Apollo client, refresh data, start HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Utc;
use config::Config;
use dotenv::dotenv;
use services::{start_cleanup_task, ApolloKinoClient, CinemaRateLimiter, SyncService};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            &config.log_level
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    log::info!("Starting kino-booking service...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Apollo Kino client shared by all workers
    let apollo = match ApolloKinoClient::from_config(&config) {
        Ok(client) => web::Data::new(client),
        Err(e) => {
            log::error!("Failed to create Apollo Kino client: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Apollo Kino feed: {}", apollo.base_url());

    // 6. Rebuild the catalogue before serving
    if config.refresh_on_startup {
        match SyncService::refresh_database(&pool, apollo.get_ref(), Utc::now()).await {
            Ok(stats) => log::info!(
                "Startup refresh: {} cinemas, {} films, {} sessions ({} sample) in {}s",
                stats.cinemas_created,
                stats.films_created,
                stats.sessions_created,
                stats.sample_sessions_created,
                stats.duration_seconds
            ),
            Err(e) => log::error!("Startup refresh failed, serving existing data: {}", e),
        }
    }

    // 7. Rate limiter for the cinema endpoints
    let limiter = Arc::new(CinemaRateLimiter::new(config.rate_limit_per_minute));
    log::info!(
        "Cinema endpoints limited to {} requests per minute per client",
        limiter.per_minute()
    );
    if config.trust_proxy {
        log::info!("Rate limiter keys on forwarded client addresses (TRUST_PROXY)");
    }
    start_cleanup_task(limiter.clone(), 300);

    // 8. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_clone = config.clone();

    HttpServer::new(move || {
        App::new()
            // Application state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_clone.clone()))
            .app_data(apollo.clone())
            .app_data(web::Data::new(limiter.clone()))
            // Middleware
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::films_config)
            .configure(handlers::sessions_config)
            .configure(handlers::cinemas_config)
            .configure(handlers::bookings_config)
            .configure(handlers::apollo_config)
            .configure(handlers::admin_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
