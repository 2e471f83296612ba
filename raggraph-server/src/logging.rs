//! Process setup: `.env` loading and tracing subscribers.

/// Load .env from current directory; if not found, try parent (workspace root when run from crate dir).
pub fn load_dotenv() {
    if dotenv::dotenv().is_ok() {
        return;
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(parent) = cwd.parent() {
            let env_path = parent.join(".env");
            if env_path.is_file() {
                let _ = dotenv::from_path(env_path);
            }
        }
    }
}

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,raggraph=debug,raggraph_server=debug";

/// Initializes tracing: always to stdout; if env `LOG_FILE` is set, also to that file (append,
/// plain text).
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::Layer;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(filter.clone());

    let registry = tracing_subscriber::registry().with(stdout_layer);

    match std::env::var("LOG_FILE") {
        Ok(path) if !path.is_empty() => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_filter(filter);
            registry.with(file_layer).try_init()?;
            tracing::info!(path = %path, "logging to file");
        }
        _ => registry.try_init()?,
    }
    Ok(())
}
