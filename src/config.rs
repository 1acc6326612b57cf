use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// Extraction service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Base URL of the generative language API (overridable for proxies and tests).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            endpoint: default_endpoint(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

/// Artifact rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Directory receiving `knowledge_graph-<id>.html` artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_height")]
    pub height: String,
    #[serde(default = "default_width")]
    pub width: String,
    #[serde(default = "default_bgcolor")]
    pub bgcolor: String,
    #[serde(default = "default_font_color")]
    pub font_color: String,
    #[serde(default = "default_filter_menu")]
    pub filter_menu: bool,
    #[serde(default = "default_cdn_url")]
    pub cdn_url: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            height: default_height(),
            width: default_width(),
            bgcolor: default_bgcolor(),
            font_color: default_font_color(),
            filter_menu: default_filter_menu(),
            cdn_url: default_cdn_url(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("graphs")
}

fn default_height() -> String {
    "1200px".to_string()
}

fn default_width() -> String {
    "100%".to_string()
}

fn default_bgcolor() -> String {
    "#222222".to_string()
}

fn default_font_color() -> String {
    "white".to_string()
}

fn default_filter_menu() -> bool {
    true
}

fn default_cdn_url() -> String {
    "https://cdnjs.cloudflare.com/ajax/libs/vis-network/9.1.2/dist/vis-network.min.js".to_string()
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Height in pixels of the iframe embedding the artifact
    #[serde(default = "default_display_height")]
    pub display_height: u32,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            port: default_http_port(),
            allowed_origins: Vec::new(),
            display_height: default_display_height(),
        }
    }
}

fn default_http_port() -> u16 {
    8501
}

fn default_display_height() -> u32 {
    1000
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in TEXTGRAPH_CONFIG environment variable (must exist)
    /// 2. ./config.toml in current directory (defaults are used when absent)
    pub fn load() -> Result<Self> {
        // Optional file
        let _ = dotenv::dotenv();

        let config = match std::env::var("TEXTGRAPH_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => {
                let path = PathBuf::from("config.toml");
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    log::debug!("No config.toml found, using defaults");
                    Config::default()
                }
            }
        };

        config.validate()?;

        Ok(config)
    }

    /// Parse a config file without validating it
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Validate configuration values
    ///
    /// The extraction credential is required up front so that no generation
    /// is ever attempted without it.
    pub fn validate(&self) -> Result<()> {
        self.api_key()?;

        if self.extraction.provider != "gemini" {
            anyhow::bail!(
                "extraction.provider '{}' is not supported (expected \"gemini\")",
                self.extraction.provider
            );
        }

        if !(0.0..=2.0).contains(&self.extraction.temperature) {
            anyhow::bail!("extraction.temperature must be between 0.0 and 2.0");
        }

        if self.extraction.timeout_secs == 0 {
            anyhow::bail!("extraction.timeout_secs must be greater than 0");
        }

        if self.http_server.port == 0 {
            anyhow::bail!("http_server.port must be greater than 0");
        }

        Ok(())
    }

    /// Read the extraction API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        let key = std::env::var(&self.extraction.api_key_env).with_context(|| {
            format!(
                "{} not found. Please add it to your .env file or environment before running.",
                self.extraction.api_key_env
            )
        })?;

        if key.trim().is_empty() {
            anyhow::bail!("{} is set but empty", self.extraction.api_key_env);
        }

        Ok(key)
    }
}
