use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;
use tutor_core::config::{
    DEFAULT_MAX_STEPS, DEFAULT_MODEL_NAME, DEFAULT_OUTPUT_LOCATION, DEFAULT_PUBLIC_HOST,
    DEFAULT_PUBLIC_PORT, PipelineConfig, VisualizationMode,
};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:9099";
const DEFAULT_API_BASE: &str = "http://localhost:8000/v1";
const DEFAULT_API_KEY: &str = "sk-abc";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub api_key: String,
    pub api_base: String,
    pub log_level: Level,
    pub prompts_path: Option<PathBuf>,
    pub pipeline: PipelineConfig,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str = var_or("BIND_ADDRESS", DEFAULT_BIND_ADDRESS);
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let api_key = var_or("OPENAI_API_KEY", DEFAULT_API_KEY);
        let api_base = var_or("OPENAI_API_BASE", DEFAULT_API_BASE);
        if api_base.trim().is_empty() {
            return Err(ConfigError::MissingVar(
                "OPENAI_API_BASE must not be empty".to_string(),
            ));
        }

        let max_steps: usize = parse_var("MAX_STEPS", DEFAULT_MAX_STEPS)?;
        if max_steps == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_STEPS".to_string(),
                "must be a positive number".to_string(),
            ));
        }

        let visualization_mode: VisualizationMode =
            parse_var("VISUALIZATION_MODE", VisualizationMode::default())?;
        let public_port: u16 = parse_var("PUBLIC_PORT", DEFAULT_PUBLIC_PORT)?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let prompts_path = std::env::var("PROMPTS_PATH").ok().map(PathBuf::from);

        let pipeline = PipelineConfig {
            model_name: var_or("MODEL_NAME", DEFAULT_MODEL_NAME),
            max_steps,
            output_location: PathBuf::from(var_or("OUTPUT_DIR", DEFAULT_OUTPUT_LOCATION)),
            visualization_mode,
            public_host: var_or("PUBLIC_HOST", DEFAULT_PUBLIC_HOST),
            public_port,
        };

        Ok(Self {
            bind_address,
            api_key,
            api_base,
            log_level,
            prompts_path,
            pipeline,
        })
    }
}
