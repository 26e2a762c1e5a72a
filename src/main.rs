//! LTRA console backend server
//!
//! Serves the licensing and numbering resource console API over a
//! PostgreSQL database or the in-memory demo dataset.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use ltra_api::{configure, health};
use ltra_auth::{JwtService, PasswordService};
use ltra_cache::QueryCache;
use ltra_core::config::{AppConfig, StorageBackend};
use ltra_core::AppError;
use ltra_db::{create_pool, MemoryStore, Store};
use ltra_services::Services;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Password of the demo accounts when none is configured
const DEFAULT_SEED_PASSWORD: &str = "ltra-demo-2024";

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ltra_console={lvl},ltra_api={lvl},ltra_services={lvl},ltra_db={lvl},actix_web=info,sqlx=warn",
            lvl = log_level
        ))
    });

    let json = env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

/// Build the repository bundle for the configured backend
async fn open_store(config: &AppConfig) -> anyhow::Result<Store> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&config.database)
                .await
                .context("failed to create database pool")?;
            info!(
                max_connections = config.database.max_connections,
                "Database connection established"
            );
            Ok(Store::postgres(pool))
        }
        StorageBackend::Memory => {
            let password = match config.storage.seed_password.as_deref() {
                Some(password) => password,
                None => {
                    warn!("storage.seed_password not set, demo accounts use the default password");
                    DEFAULT_SEED_PASSWORD
                }
            };
            let hash = PasswordService::new()
                .hash_password(password)
                .context("failed to hash demo password")?;

            let memory = MemoryStore::seeded();
            memory.set_missing_password_hashes(&hash);
            Ok(Store::memory(Arc::new(memory)))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting LTRA console backend v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("failed to load configuration")?;
    info!(backend = %config.storage.backend, "Configuration loaded");

    let store = open_store(&config).await?;
    let cache = QueryCache::from_config(&config.cache).await;

    let jwt_service = Arc::new(JwtService::new(
        &config.auth.jwt_secret,
        config.auth.jwt_expiration_secs,
    ));
    info!(
        "JWT service configured with {} second token expiration",
        config.auth.jwt_expiration_secs
    );

    let services = web::Data::new(Services::new(&store, cache, jwt_service.clone()));
    let jwt_data = web::Data::new(jwt_service);
    let origins = config.cors.origin_list();

    let bind_addr = config.server_addr();
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, config.server.workers
    );

    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
                header::COOKIE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(services.clone())
            .app_data(jwt_data.clone())
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::InvalidInput(err.to_string()).into()
            }))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::InvalidInput(err.to_string()).into()
            }))
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::NormalizePath::trim())
            .route("/health", web::get().to(health))
            .service(web::scope("/api/v1").configure(configure))
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/health"))
                        .finish()
                }),
            )
    })
    .workers(config.server.workers)
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {}", bind_addr))?
    .run()
    .await?;

    Ok(())
}
