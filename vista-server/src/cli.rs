use clap::Parser;

use vista_types::models::{ServerConfig, UpstreamConfig, DEFAULT_API_BASE};

#[derive(Parser, Debug)]
#[command(
    name = "vista-server",
    about = "Vista - streamed image descriptions from a multimodal chat API",
    version = env!("CARGO_PKG_VERSION"),
    author
)]
pub struct Cli {
    #[arg(long, env = "VISTA_HOST", default_value = "127.0.0.1", help = "Interface to bind")]
    pub host: String,

    #[arg(short, long, env = "VISTA_PORT", default_value = "8501")]
    pub port: u16,

    #[arg(
        long,
        env = "VISTA_API_BASE",
        default_value = DEFAULT_API_BASE,
        help = "Chat completions API base URL"
    )]
    pub api_base: String,

    #[arg(long, env = "VISTA_CONNECT_TIMEOUT_SECS", default_value = "10")]
    pub connect_timeout_secs: u64,

    /// Largest accepted upload
    #[arg(long, env = "VISTA_MAX_UPLOAD_MB", default_value = "200")]
    pub max_upload_mb: usize,

    #[arg(
        long,
        env = "VISTA_SESSION_TTL_SECS",
        default_value = "3600",
        help = "Idle time after which a session is dropped"
    )]
    pub session_ttl_secs: u64,

    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            max_upload_bytes: self.max_upload_mb.saturating_mul(1024 * 1024),
            session_ttl_secs: self.session_ttl_secs,
            upstream: UpstreamConfig {
                api_base: self.api_base.clone(),
                connect_timeout_secs: self.connect_timeout_secs,
            },
        }
    }
}
