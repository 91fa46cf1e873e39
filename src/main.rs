use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware};
use friender::config::Settings;
use friender::routes::{self, auth::TokenVerifier, error as api_error, AppState};
use friender::services::{FriendService, HttpGeocoder, PostgresClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting Friender matching service...");

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    info!("Configuration loaded successfully");

    // Initialize geocoder
    let geocoder = HttpGeocoder::new(
        settings.geocoder.endpoint.clone(),
        settings.geocoder.access_token.clone(),
        settings.geocoder.country.clone(),
        Duration::from_secs(settings.geocoder.timeout_secs.unwrap_or(10)),
    )
    .map_err(|e| {
        error!("Failed to create geocoder: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    if settings.geocoder.access_token.is_empty() {
        error!("Geocoder access token is empty; profile edits will fail to locate zip codes");
    }

    // Initialize PostgreSQL client
    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            Some(db_max_conn),
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e)
        })?,
    );

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    // Build application state
    let app_state = AppState {
        friends: FriendService::new(postgres.clone(), postgres, Arc::new(geocoder)),
        tokens: Arc::new(TokenVerifier::new(&settings.auth.secret_key)),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(api_error::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(api_error::handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(api_error::handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
