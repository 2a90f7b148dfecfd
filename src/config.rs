// src/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const LOCAL_API_URL: &str = "http://localhost:8000/api";
pub const PRODUCTION_API_URL: &str = "https://resumeboost.vercel.app/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
const CONFIG_FILE: &str = "resumeboost.yaml";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub environment: String,
    pub api_base_url: String,
    pub credential_path: PathBuf,
    pub timeout_seconds: u64,
    pub output_dir: PathBuf,
}

/// One section of resumeboost.yaml; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ProfileConfig {
    api_base_url: Option<String>,
    credential_path: Option<PathBuf>,
    timeout_seconds: Option<u64>,
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: ProfileConfig,
    #[serde(default)]
    production: ProfileConfig,
}

impl ClientConfig {
    /// Load configuration based on environment
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading client configuration for environment: {}", environment);

        let profile = Self::load_profile(Path::new(CONFIG_FILE), &environment)?;
        let mut config = Self::from_profile(&environment, profile);

        if let Ok(url) = std::env::var("RESUMEBOOST_API_URL") {
            config = config.with_api_base_url(url);
        }
        if let Ok(path) = std::env::var("RESUMEBOOST_CREDENTIAL_PATH") {
            config = config.with_credential_path(PathBuf::from(path));
        }
        if let Ok(secs) = std::env::var("RESUMEBOOST_TIMEOUT_SECS") {
            let secs = secs
                .parse::<u64>()
                .context("RESUMEBOOST_TIMEOUT_SECS must be a whole number of seconds")?;
            config.timeout_seconds = secs;
        }

        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("RESUMEBOOST_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_profile(path: &Path, environment: &str) -> Result<ProfileConfig> {
        if !path.exists() {
            return Ok(ProfileConfig::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    pub(crate) fn from_profile(environment: &str, profile: ProfileConfig) -> Self {
        let default_url = match environment {
            "production" => PRODUCTION_API_URL,
            _ => LOCAL_API_URL,
        };

        Self {
            environment: environment.to_string(),
            api_base_url: profile
                .api_base_url
                .unwrap_or_else(|| default_url.to_string()),
            credential_path: profile
                .credential_path
                .unwrap_or_else(default_credential_path),
            timeout_seconds: profile.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
            output_dir: profile.output_dir.unwrap_or_else(|| PathBuf::from("out")),
        }
    }

    pub fn with_api_base_url(mut self, url: String) -> Self {
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_credential_path(mut self, path: PathBuf) -> Self {
        self.credential_path = path;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }
}

fn default_credential_path() -> PathBuf {
    let base = std::env::var("HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::current_dir())
        .unwrap_or_else(|_| PathBuf::from("."));
    base.join(".resumeboost").join("access_code.json")
}
