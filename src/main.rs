use std::fs;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quill::auth::{PasswordHasher, TokenSigner};
use quill::config::{GenAiConfig, ServerConfig};
use quill::genai::{GeminiEmbedder, GeminiGenerator};
use quill::server::{AppState, create_router};
use quill::store::{SqliteStore, Store};
use quill::vector::{MemoryStore, QdrantStore, VectorStore};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "A blog and PDF question-answering server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

fn load_config(host: String, port: u16, data_dir: String) -> anyhow::Result<ServerConfig> {
    let token_secret = match std::env::var("QUILL_TOKEN_SECRET") {
        Ok(s) if !s.is_empty() => s,
        _ => bail!("QUILL_TOKEN_SECRET must be set to a non-empty signing key"),
    };

    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        bail!("GEMINI_API_KEY must be set");
    }

    Ok(ServerConfig {
        host,
        port,
        data_dir: data_dir.into(),
        token_secret,
        qdrant_url: std::env::var("QDRANT_URL").ok().filter(|s| !s.is_empty()),
        qdrant_api_key: std::env::var("QDRANT_API_KEY").ok(),
        genai: GenAiConfig {
            api_key,
            ..GenAiConfig::default()
        },
    })
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    fs::create_dir_all(&config.data_dir)?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let vectors: Arc<dyn VectorStore> = match &config.qdrant_url {
        Some(url) => Arc::new(QdrantStore::new(url, config.qdrant_api_key.clone())?),
        None => {
            tracing::warn!("QDRANT_URL not set, using in-memory vector store");
            Arc::new(MemoryStore::new())
        }
    };
    vectors.ensure_collection().await?;

    let state = Arc::new(AppState {
        store: Arc::new(store),
        vectors,
        embedder: Arc::new(GeminiEmbedder::new(&config.genai)?),
        generator: Arc::new(GeminiGenerator::new(&config.genai)?),
        tokens: TokenSigner::new(&config.token_secret),
        passwords: PasswordHasher::new(),
    });

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("quill=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            let config = load_config(host, port, data_dir)?;
            run_serve(config).await?;
        }
    }

    Ok(())
}
