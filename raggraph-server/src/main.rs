//! HTTP server exposing the retrieval chat graph: `POST /chat` as JSON or server-sent
//! events, and `GET /threads/:thread_id` for persisted conversation state.
//!
//! Configure via env (see `RagBuildConfig::from_env`): PORT, OPENAI_API_KEY, OPENAI_MODEL,
//! OPENAI_BASE_URL, DOCS_PATHS, RETRIEVER_TOOL_NAME, RETRIEVER_TOOL_DESCRIPTION, LOG_FILE.
//! Load .env with dotenv.

mod app;
mod logging;

use std::sync::Arc;

use raggraph::{build_rag_runner, RagBuildConfig};
use tracing::info;

use app::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    logging::load_dotenv();

    if std::env::var("LOG_FILE").is_err() {
        eprintln!("raggraph-server: LOG_FILE not set, logs only to stdout.");
    }
    logging::init_tracing()?;

    let config = RagBuildConfig::from_env()?;
    info!(
        model = %config.model,
        base_url = ?config.openai_base_url,
        embedding_model = ?config.embedding_model,
        docs_paths = ?config.docs_paths,
        tool = %config.retriever_tool_name,
        "config loaded"
    );

    let runner = build_rag_runner(&config).await?;
    let app = app::router(Arc::new(AppState { runner }));

    let listen = format!("0.0.0.0:{}", config.port);
    info!("listening on http://{}", listen);
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
