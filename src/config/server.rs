use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Symmetric key used to sign session tokens.
    pub token_secret: String,
    /// Qdrant endpoint (e.g. "http://127.0.0.1:6333"). If not set, an
    /// in-memory vector store is used instead.
    pub qdrant_url: Option<String>,
    pub qdrant_api_key: Option<String>,
    pub genai: GenAiConfig,
}

/// Settings for the hosted embedding and generation APIs.
#[derive(Debug, Clone)]
pub struct GenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    /// Maximum retry attempts for rate-limited embedding calls.
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("quill.db")
    }
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            embedding_model: "text-embedding-004".to_string(),
            generation_model: "gemini-2.5-flash".to_string(),
            max_retries: 5,
            timeout_secs: 30,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            token_secret: String::new(),
            qdrant_url: None,
            qdrant_api_key: None,
            genai: GenAiConfig::default(),
        }
    }
}
