use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SocialConnectConfig {
    pub api_port: u16,
    pub paths: SocialConnectPaths,
    pub admin: AdminConfig,
}

impl SocialConnectConfig {
    pub fn from_env() -> Result<Self> {
        let paths = SocialConnectPaths::discover()?;
        let api_port = env::var("SOCIALCONNECT_API_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(8080);
        let admin = AdminConfig::from_env();
        Ok(Self {
            api_port,
            paths,
            admin,
        })
    }

    pub fn new(api_port: u16, paths: SocialConnectPaths) -> Self {
        Self {
            api_port,
            paths,
            admin: AdminConfig::from_env(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// How many profiles the admin dashboard's recent-users listing returns.
    pub recent_users_limit: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            recent_users_limit: 10,
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Self {
        let recent_users_limit = env::var("SOCIALCONNECT_ADMIN_RECENT_LIMIT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(10);
        Self { recent_users_limit }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SocialConnectPaths {
    pub base: PathBuf,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub logs_dir: PathBuf,
}

impl SocialConnectPaths {
    pub fn discover() -> Result<Self> {
        if let Ok(base) = env::var("SOCIALCONNECT_BASE_DIR") {
            return Self::from_base_dir(base);
        }
        let exe_path = env::current_exe()
            .map_err(|err| anyhow!("failed to resolve current executable: {err}"))?;
        let base = exe_path
            .parent()
            .ok_or_else(|| anyhow!("executable path missing parent"))?
            .to_path_buf();
        Self::from_base_dir(base)
    }

    pub fn from_base_dir<P: AsRef<Path>>(base: P) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        let data_dir = base.join("data");
        let db_path = data_dir.join("socialconnect.db");
        let logs_dir = base.join("logs");
        Ok(Self {
            base,
            data_dir,
            db_path,
            logs_dir,
        })
    }
}
