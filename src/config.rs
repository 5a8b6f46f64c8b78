use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Where pages, client scripts and uploaded photos live on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub pages_dir: PathBuf,
    pub public_dir: PathBuf,
    pub css_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub upload_dir: PathBuf,
    /// URL under which files in `upload_dir` are reachable.
    pub upload_url_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub paths: PathsConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "artspace".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "artspace-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        let paths = PathsConfig {
            pages_dir: env_path("PAGES_DIR", "html"),
            public_dir: env_path("PUBLIC_DIR", "public"),
            css_dir: env_path("CSS_DIR", "css"),
            assets_dir: env_path("ASSETS_DIR", "assets"),
            upload_dir: env_path("UPLOAD_DIR", "assets/uploads"),
            upload_url_prefix: std::env::var("UPLOAD_URL_PREFIX")
                .unwrap_or_else(|_| "/assets/uploads".into()),
        };
        Ok(Self {
            database_url,
            max_connections,
            jwt,
            paths,
        })
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
