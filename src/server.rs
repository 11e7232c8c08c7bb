//! Server initialization and startup logic.

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rednote_api::{ApiServer, AppState, BrowserPages, ServiceSettings, XhsService};
use rednote_browser::{BrowserManager, BrowserManagerConfig, CookieStore};
use rednote_config::{data_dir, Config, ConfigValidator};

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.rednote-mcp/logs/ with daily rotation.
pub(crate) fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = data_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("rednote-mcp")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer on drop; keep it for the process lifetime.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Validate `config`, logging warnings.
fn check_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let warnings = ConfigValidator::validate(config).into_result()?;
    for w in warnings {
        warn!("Config {}: {}", w.path, w.message);
    }
    Ok(())
}

/// Browser, cookie store and service for `config`.
fn build_service(config: &Config) -> (Arc<BrowserManager>, Arc<XhsService>) {
    let manager = Arc::new(BrowserManager::new(BrowserManagerConfig::from(&config.browser)));
    let cookies = CookieStore::new(config.cookies.resolve_path());
    info!("Cookie file: {}", cookies.path().display());

    let pages = Arc::new(BrowserPages::new(manager.clone(), cookies.clone()));
    let service = Arc::new(XhsService::new(pages, cookies, ServiceSettings::from(config)));
    (manager, service)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the REST and MCP server in foreground.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    check_config(&config)?;
    info!("Starting rednote-mcp v{}", env!("CARGO_PKG_VERSION"));
    info!("Browser headless: {}", config.browser.headless);

    let (manager, service) = build_service(&config);
    let state = Arc::new(AppState::new(service)?);
    let server = ApiServer::new(config.server.bind_addr(), state);

    let served = server.run(shutdown_signal()).await;

    if let Err(e) = manager.shutdown_chrome().await {
        warn!("Failed to stop Chrome cleanly: {}", e);
    }
    served
}

/// Log in by scanning a QR code in a visible browser window.
pub(crate) async fn run_login(mut config: Config) -> Result<(), Box<dyn std::error::Error>> {
    config.browser.headless = false;
    check_config(&config)?;

    let (manager, service) = build_service(&config);
    info!("Opening xiaohongshu for QR login; scan the code in the browser window");
    let outcome = service.login_interactive().await;

    if let Err(e) = manager.shutdown_chrome().await {
        warn!("Failed to stop Chrome cleanly: {}", e);
    }
    match outcome? {
        true => info!("Login succeeded; cookies saved to {}", service.cookie_path()),
        false => warn!("Login was not completed before the deadline"),
    }
    Ok(())
}
