//! Pipeline Configuration
//!
//! The options ("valves") that control a lesson pipeline. Loading them from the
//! environment is the host's job; the core only receives a finished
//! `PipelineConfig` at construction time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MODEL_NAME: &str = "gpt-4";
pub const DEFAULT_MAX_STEPS: usize = 5;
pub const DEFAULT_OUTPUT_LOCATION: &str = "/app/pipelines/outputs";
pub const DEFAULT_PUBLIC_HOST: &str = "localhost";
pub const DEFAULT_PUBLIC_PORT: u16 = 9099;

/// How (and whether) each step gets a visual artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationMode {
    /// No visualization stage runs.
    #[default]
    Off,
    /// The artifact is persisted and the step block carries a URL to it.
    Link,
    /// The artifact is persisted and the step block embeds the document.
    Inline,
}

impl VisualizationMode {
    pub fn is_enabled(self) -> bool {
        self != VisualizationMode::Off
    }
}

impl fmt::Display for VisualizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisualizationMode::Off => write!(f, "off"),
            VisualizationMode::Link => write!(f, "link"),
            VisualizationMode::Inline => write!(f, "inline"),
        }
    }
}

impl FromStr for VisualizationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "none" | "" => Ok(VisualizationMode::Off),
            "link" => Ok(VisualizationMode::Link),
            "inline" => Ok(VisualizationMode::Inline),
            other => Err(format!(
                "'{}' is not a visualization mode (expected off, link or inline)",
                other
            )),
        }
    }
}

/// Everything a `TutorPipeline` needs to know besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub model_name: String,
    pub max_steps: usize,
    pub output_location: PathBuf,
    pub visualization_mode: VisualizationMode,
    pub public_host: String,
    pub public_port: u16,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            max_steps: DEFAULT_MAX_STEPS,
            output_location: PathBuf::from(DEFAULT_OUTPUT_LOCATION),
            visualization_mode: VisualizationMode::default(),
            public_host: DEFAULT_PUBLIC_HOST.to_string(),
            public_port: DEFAULT_PUBLIC_PORT,
        }
    }
}

impl PipelineConfig {
    /// The URL prefix under which persisted artifacts are served in link mode.
    pub fn public_base_url(&self) -> String {
        format!("http://{}:{}/outputs", self.public_host, self.public_port)
    }
}
