use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use tablefare_web::config::{Config, LoggingConfig};
use tablefare_web::middleware::SessionState;
use tablefare_web::services::{
    AdminService, ContentService, HttpAuthGateway, RateLimitService, SubscriberService,
};
use tablefare_web::{AppState, build_app};

#[derive(Parser)]
#[command(name = "tablefare-web", about = "TableFare marketing site and CMS backend")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = Config::load_from(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let _log_guard = init_tracing(&config.logging);

    let pool = connect_database(&config.database.url).await?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let state = Arc::new(AppState {
        content_service: ContentService::new(pool.clone()),
        subscriber_service: SubscriberService::new(pool.clone()),
        admin_service: AdminService::new(pool.clone()),
        rate_limit_service: RateLimitService::with_in_memory_store(config.rate_limit.clone()),
        config: config.clone(),
    });

    let session_state = SessionState {
        auth_gateway: Arc::new(HttpAuthGateway::new(&config.auth)),
        admin_service: AdminService::new(pool),
    };

    let app = build_app(state, session_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("TableFare web backend listening on {}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("Server error")?;

    Ok(())
}

async fn connect_database(url: &str) -> anyhow::Result<sqlx::SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("Invalid database URL: {}", url))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to connect to database")
}

/// Install the tracing subscriber. Returns the appender guard when file
/// logging is enabled; dropping it would stop the background writer.
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.file {
        Some(file) => {
            let path = Path::new(file);
            let directory = path.parent().unwrap_or_else(|| Path::new("logs"));
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "tablefare-web.log".to_string());

            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();

            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(env_filter).init();
            None
        }
    }
}
