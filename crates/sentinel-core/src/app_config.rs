use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub es_url: String,
    pub es_username: Option<String>,
    pub es_password: Option<String>,
    pub index: String,
    pub weapons_path: PathBuf,
    pub sentiment_lexicon_path: Option<PathBuf>,
    pub batch_size: usize,
    pub chunk_size: usize,
    pub scroll_keepalive: String,
    pub bulk_timeout_secs: u64,
    pub es_request_timeout_secs: u64,
    pub es_max_retries: u32,
    pub es_retry_backoff_ms: u64,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub text_column: String,
    pub flag_column: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("es_url", &self.es_url)
            .field(
                "es_username",
                &self.es_username.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "es_password",
                &self.es_password.as_ref().map(|_| "[redacted]"),
            )
            .field("index", &self.index)
            .field("weapons_path", &self.weapons_path)
            .field("sentiment_lexicon_path", &self.sentiment_lexicon_path)
            .field("batch_size", &self.batch_size)
            .field("chunk_size", &self.chunk_size)
            .field("scroll_keepalive", &self.scroll_keepalive)
            .field("bulk_timeout_secs", &self.bulk_timeout_secs)
            .field("es_request_timeout_secs", &self.es_request_timeout_secs)
            .field("es_max_retries", &self.es_max_retries)
            .field("es_retry_backoff_ms", &self.es_retry_backoff_ms)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("text_column", &self.text_column)
            .field("flag_column", &self.flag_column)
            .finish()
    }
}
