//! Configuration structures for termscan.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::highlight::SearchMode;

/// Main configuration for termscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TermscanConfig {
    /// Highlighting configuration.
    pub highlight: HighlightConfig,

    /// URL fetching configuration.
    pub fetch: FetchConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Highlighting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Highlight the built-in key terms unless disabled on the command line.
    pub key_terms_enabled: bool,

    /// How the search term is interpreted.
    pub search_mode: SearchMode,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            key_terms_enabled: true,
            search_mode: SearchMode::Literal,
        }
    }
}

/// URL fetching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Overall request timeout in seconds.
    pub timeout_secs: u64,

    /// User-Agent header sent with requests.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            user_agent: concat!("termscan/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format used when none is given (`json`, `csv`, `text`, `html`).
    pub default_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: "text".to_string(),
        }
    }
}

impl TermscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
