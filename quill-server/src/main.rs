use anyhow::{Context, Result};
use clap::Parser;
use quill_common::observability::{init_logging, LogConfig, LogFormat};
use quill_config::QuillSettingsLoader;
use quill_extract::ArticleExtractor;
use quill_http::HttpClient;
use quill_server::{build_router, AppState};
use quill_store::StyleStore;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "quill-server", about = "Personal writing style guide service")]
struct Cli {
    /// Path to the TOML config file (missing file falls back to env/defaults).
    #[arg(short, long, env = "QUILL_CONFIG", default_value = "quill.toml")]
    config: PathBuf,

    /// Override the configured bind address (host:port).
    #[arg(long)]
    bind: Option<String>,

    /// Emit JSON-encoded logs instead of plain text.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = init_logging(LogConfig {
        app_name: "quill-server",
        emit_stderr: true,
        format: if cli.log_json {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        ..LogConfig::default()
    })?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_path = %log_path.display(),
        config = %cli.config.display(),
        "quill.starting"
    );

    let settings = QuillSettingsLoader::new()
        .with_file(&cli.config)
        .load()
        .context("failed to load configuration")?;

    let store = StyleStore::connect(&settings.database.url)
        .await
        .context("failed to open database")?;
    info!(url = %settings.database.url, "quill.store_ready");

    let (llm, model_name) = match settings.llm.as_ref() {
        Some(llm_settings) => {
            let client = quill_llm::client_from_config(&llm_settings.to_llm_config())
                .context("failed to initialize LLM client")?;
            let name = client.model_name().to_string();
            info!(model = %name, "quill.llm_ready");
            (Some(client), name)
        }
        None => {
            warn!("no LLM provider configured; analysis, style-guide, and chat routes will fail");
            (None, quill_llm::DEFAULT_ANTHROPIC_MODEL.to_string())
        }
    };

    // The extractor only ever fetches absolute URLs, so the anchor below is
    // never joined against.
    let http = HttpClient::new("http://localhost/")
        .map_err(|e| anyhow::anyhow!("http client init: {e}"))?;
    let mut extractor = ArticleExtractor::new(http);
    if let Some(ua) = settings.extractor.user_agent.as_deref() {
        extractor = extractor.with_user_agent(ua);
    }

    let state = AppState::new(store, llm, extractor, model_name);
    let app = build_router(state);

    let bind_addr = cli.bind.unwrap_or(settings.server.bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "quill.listening");

    axum::serve(listener, app).await?;
    Ok(())
}
