use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles loading the JSON configuration file, applying the
/// `LOCALLINGUA_*` environment overrides and validating the result.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Local model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Local model configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelConfig {
    /// Path to the GGUF model file
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Display name reported by the health endpoint
    #[serde(default)]
    pub model_name: Option<String>,

    /// Maximum number of completions in flight
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Serve the deterministic fake translator when no model is available
    #[serde(default)]
    pub allow_fake_translator: bool,

    /// llama.cpp server runtime settings
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            model_name: None,
            max_concurrency: default_max_concurrency(),
            allow_fake_translator: false,
            runtime: RuntimeConfig::default(),
        }
    }
}

/// llama.cpp server runtime configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Server binary name or path
    #[serde(default = "default_runtime_binary")]
    pub binary: String,

    /// Context window in tokens
    #[serde(default = "default_context_size")]
    pub context_size: u32,

    /// Layers offloaded to the GPU (-1 for all)
    #[serde(default = "default_gpu_layers")]
    pub gpu_layers: i32,

    /// CPU threads; half the available cores when unset
    #[serde(default)]
    pub threads: Option<usize>,

    /// How long to wait for the model to load, in seconds
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    /// Per-completion HTTP timeout, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: default_runtime_binary(),
            context_size: default_context_size(),
            gpu_layers: default_gpu_layers(),
            threads: None,
            startup_timeout_secs: default_startup_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Optional deadline for a whole translate request, in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_max_concurrency() -> usize {
    1
}

fn default_runtime_binary() -> String {
    "llama-server".to_string()
}

fn default_context_size() -> u32 {
    4096
}

fn default_gpu_layers() -> i32 {
    -1
}

fn default_startup_timeout_secs() -> u64 {
    120
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

/// Environment variables understood by the service
pub const ENV_MODEL_PATH: &str = "LOCALLINGUA_MODEL_PATH";
pub const ENV_MODEL_NAME: &str = "LOCALLINGUA_MODEL_NAME";
pub const ENV_MAX_CONCURRENCY: &str = "LOCALLINGUA_MAX_CONCURRENCY";
pub const ENV_ALLOW_FAKE_TRANSLATOR: &str = "LOCALLINGUA_ALLOW_FAKE_TRANSLATOR";
pub const ENV_LLAMA_SERVER: &str = "LOCALLINGUA_LLAMA_SERVER";

/// Dotenv file consulted for variables missing from the process environment
pub const DOTENV_FILE: &str = ".env";

/// Read `KEY=VALUE` lines from a dotenv file; a missing file yields no entries
///
/// Blank lines and `#` comments are skipped, an `export ` prefix is accepted and
/// one pair of matching quotes around the value is removed.
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if !path.exists() {
        return Ok(vars);
    }

    let content = fs::read_to_string(path).context(format!("Failed to read {:?}", path))?;
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            warn!("Ignoring malformed line {} in {:?}", index + 1, path);
            continue;
        };
        vars.insert(key.trim().to_string(), unquote(value.trim()).to_string());
    }
    debug!("Read {} variables from {:?}", vars.len(), path);
    Ok(vars)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Parse a concurrency value; anything unusable falls back to 1
pub fn parse_max_concurrency(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .map(|value| value.max(1) as usize)
        .unwrap_or(1)
}

/// Expand a leading `~/` against the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

impl Config {
    /// Load a configuration file, or defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let file = File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Load the file, then apply overrides from the process environment
    /// and from `.env` in the working directory
    pub fn load_with_env(path: &Path) -> Result<Self> {
        Self::load_layered(path, Path::new(DOTENV_FILE), |key| std::env::var(key).ok())
    }

    /// Load the file and apply overrides; `lookup` wins over the dotenv file
    pub fn load_layered<F>(path: &Path, dotenv_path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load(path)?;
        let dotenv = read_dotenv(dotenv_path)?;
        config.apply_env(|key| lookup(key).or_else(|| dotenv.get(key).cloned()));
        Ok(config)
    }

    /// Apply `LOCALLINGUA_*` overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = non_empty(ENV_MODEL_PATH) {
            self.model.model_path = Some(PathBuf::from(path));
        }
        if let Some(name) = non_empty(ENV_MODEL_NAME) {
            self.model.model_name = Some(name);
        }
        if let Some(raw) = lookup(ENV_MAX_CONCURRENCY) {
            let parsed = parse_max_concurrency(Some(&raw));
            if raw.trim().parse::<i64>().is_err() {
                warn!("{}={:?} is not a number, using {}", ENV_MAX_CONCURRENCY, raw, parsed);
            }
            self.model.max_concurrency = parsed;
        }
        if let Some(flag) = lookup(ENV_ALLOW_FAKE_TRANSLATOR) {
            self.model.allow_fake_translator = flag.trim() == "1";
        }
        if let Some(binary) = non_empty(ENV_LLAMA_SERVER) {
            self.model.runtime.binary = binary;
        }
    }

    /// Model path with `~` expanded, if one is configured
    pub fn resolved_model_path(&self) -> Option<PathBuf> {
        self.model.model_path.as_deref().map(expand_home)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.model.max_concurrency == 0 {
            return Err(anyhow!("model.max_concurrency must be at least 1"));
        }
        if self.model.runtime.binary.trim().is_empty() {
            return Err(anyhow!("model.runtime.binary must not be empty"));
        }
        if self.model.runtime.startup_timeout_secs == 0 {
            return Err(anyhow!("model.runtime.startup_timeout_secs must be positive"));
        }
        if self.model.runtime.request_timeout_secs == 0 {
            return Err(anyhow!("model.runtime.request_timeout_secs must be positive"));
        }
        if self.server.port == 0 {
            return Err(anyhow!("server.port must not be 0"));
        }
        if self.server.request_timeout_secs == Some(0) {
            return Err(anyhow!("server.request_timeout_secs must be positive when set"));
        }
        Ok(())
    }
}
