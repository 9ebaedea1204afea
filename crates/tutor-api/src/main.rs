use std::path::Path;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use tutor_api::{app, ApiConfig, AppState};
use tutor_db::{log_pool_metrics, Database};

const DEFAULT_FILTER: &str = "tutor_api=debug,tutor_db=info,tower_http=debug";

/// Log output options, read from the environment.
///
/// - `LOG_FORMAT`: "json" or "text" (default "text")
/// - `LOG_FILE`: write to a daily-rotated file instead of stdout
/// - `LOG_ANSI`: force ANSI colors on or off
/// - `RUST_LOG`: filter directives
struct LogSettings {
    json: bool,
    file: Option<String>,
    ansi: Option<bool>,
}

impl LogSettings {
    fn from_env() -> Self {
        Self {
            json: std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")),
            file: std::env::var("LOG_FILE").ok().filter(|p| !p.trim().is_empty()),
            ansi: std::env::var("LOG_ANSI")
                .ok()
                .map(|v| matches!(v.as_str(), "true" | "1")),
        }
    }

    /// Install the global subscriber. The returned guard flushes the file
    /// writer and must live until shutdown.
    fn init(&self) -> Option<WorkerGuard> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

        let (layer, guard) = match &self.file {
            Some(path) => {
                let path = Path::new(path);
                let dir = path.parent().unwrap_or(Path::new("."));
                let name = path
                    .file_name()
                    .and_then(|f| f.to_str())
                    .unwrap_or("tutor-api.log");
                let (writer, guard) =
                    tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
                let layer = if self.json {
                    fmt::layer().json().with_writer(writer).boxed()
                } else {
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(self.ansi.unwrap_or(false))
                        .boxed()
                };
                (layer, Some(guard))
            }
            None => {
                let layer = if self.json {
                    fmt::layer().json().boxed()
                } else {
                    fmt::layer().with_ansi(self.ansi.unwrap_or(true)).boxed()
                };
                (layer, None)
            }
        };

        tracing_subscriber::registry().with(filter).with(layer).init();
        guard
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let logging = LogSettings::from_env();
    let _guard = logging.init();
    info!(
        subsystem = "api",
        json = logging.json,
        log_file = logging.file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ApiConfig::from_env();
    let addr = config.addr()?;

    let db = Database::connect_with_config(&config.database_url, config.pool.clone()).await?;
    db.migrate().await?;
    log_pool_metrics(db.pool());
    info!(subsystem = "api", op = "startup", "Database ready");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(subsystem = "api", op = "startup", %addr, "Listening");

    axum::serve(listener, app(AppState::from_database(&db), &config))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!(subsystem = "api", op = "shutdown", "Shutdown signal received");
        })
        .await?;

    Ok(())
}
