//! Extract command - print the text segments of one document.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use super::{load_config, load_with_spinner};
use crate::output::{format_extracted, resolve_format, write_output, ExtractFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file path or http(s) URL
    #[arg(required = true)]
    input: String,

    /// Treat the input as this content type instead of detecting it
    #[arg(long)]
    content_type: Option<String>,

    /// Output format (defaults to output.default_format from the config)
    #[arg(short, long, value_enum)]
    format: Option<ExtractFormat>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let document = load_with_spinner(&args.input, args.content_type.as_deref(), &config).await?;
    info!("Extracted {} ({})", document.name, document.page_summary());

    let format = resolve_format(args.format, &config.output.default_format, ExtractFormat::Text);
    let output = format_extracted(&document, format)?;

    eprintln!(
        "{} Extracted {} ({})",
        style("✓").green(),
        document.name,
        document.page_summary()
    );

    write_output(&output, args.output.as_deref())
}
