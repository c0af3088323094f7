use anyhow::Context;
use std::{net::SocketAddr, path::PathBuf, time::Duration};

pub const DEFAULT_MASTER_USER_ID: &str = "00000000-0000-0000-0000-000000000000";

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    /// Root directory of stored media files.
    pub media_dir: PathBuf,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Replaces the embedded AI catalog when set.
    pub ai_config: Option<PathBuf>,
    /// Owner of new library content and target of "take" transfers.
    pub master_user_id: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("VTT_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid VTT_LISTEN_ADDR")?;
        let db_path = std::env::var("VTT_DB_PATH").unwrap_or_else(|_| "./db/app.db".into());
        let media_dir = std::env::var("VTT_MEDIA_DIR")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| PathBuf::from("./media"), PathBuf::from);
        let cors_allow = std::env::var("VTT_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("VTT_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "120000".into())
            .parse()
            .context("Invalid VTT_REQUEST_TIMEOUT_MS")?;
        let ai_config = std::env::var("VTT_AI_CONFIG")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let master_user_id = std::env::var("VTT_MASTER_USER_ID")
            .ok()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEFAULT_MASTER_USER_ID.to_string());
        Ok(Self {
            listen_addr,
            db_path,
            media_dir,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            ai_config,
            master_user_id,
        })
    }
}
