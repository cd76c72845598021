//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod extract;
pub mod highlight;
pub mod terms;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, error};

use termscan_core::{LoadedDocument, TermscanConfig};

use crate::input::{load_document, loading_spinner};

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("termscan")
        .join("config.json")
}

/// Load the configuration from `--config`, else the default location, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TermscanConfig> {
    if let Some(path) = config_path {
        return TermscanConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to read config file {}", path));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config file {}", path.display());
        return TermscanConfig::from_file(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()));
    }

    Ok(TermscanConfig::default())
}

/// Load `input` behind a spinner, turning failures into the user-facing message.
pub async fn load_with_spinner(
    input: &str,
    content_type: Option<&str>,
    config: &TermscanConfig,
) -> anyhow::Result<LoadedDocument> {
    let pb = loading_spinner(&format!("Loading {}...", input));
    let result = load_document(input, content_type, config, &pb).await;
    pb.finish_and_clear();

    result.map_err(|e| {
        error!("Failed to load {}: {}", input, e);
        let message = e.user_message();
        anyhow::Error::new(e).context(message)
    })
}
