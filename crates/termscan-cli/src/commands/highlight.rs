//! Highlight command - mark search and key terms in one document.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::debug;

use termscan_core::{count_key_terms, Highlighter, RenderedSegment, SearchMode, TermscanConfig};

use super::{load_config, load_with_spinner};
use crate::output::{format_highlighted, resolve_format, write_output, HighlightFormat};

/// Arguments for the highlight command.
#[derive(Args)]
pub struct HighlightArgs {
    /// Input file path or http(s) URL
    #[arg(required = true)]
    input: String,

    /// Search term, matched case-insensitively
    #[arg(short, long, default_value = "")]
    search: String,

    /// Interpret the search term as a regular expression
    #[arg(long)]
    regex: bool,

    /// Do not highlight the built-in key terms
    #[arg(long)]
    no_key_terms: bool,

    /// Treat the input as this content type instead of detecting it
    #[arg(long)]
    content_type: Option<String>,

    /// Output format (defaults to output.default_format from the config)
    #[arg(short, long, value_enum)]
    format: Option<HighlightFormat>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: HighlightArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    // Build the highlighter first so a bad pattern fails before any download.
    let highlighter = build_highlighter(&args, &config)?;
    debug!(
        "Highlighting with search: {}, key terms: {}",
        highlighter.has_search(),
        highlighter.key_terms_enabled()
    );

    let document = load_with_spinner(&args.input, args.content_type.as_deref(), &config).await?;

    let rendered: Vec<RenderedSegment> = document
        .segments
        .iter()
        .map(|segment| RenderedSegment {
            page_number: segment.page_number,
            markup: highlighter.highlight(&segment.text),
        })
        .collect();

    let format = resolve_format(args.format, &config.output.default_format, HighlightFormat::Text);
    let output = format_highlighted(&document, &rendered, format)?;

    let hits = count_key_terms(&document.full_text());
    eprintln!(
        "{} Highlighted {} ({}), {} key term occurrences",
        style("✓").green(),
        document.name,
        document.page_summary(),
        hits.total()
    );

    write_output(&output, args.output.as_deref())
}

fn build_highlighter(args: &HighlightArgs, config: &TermscanConfig) -> anyhow::Result<Highlighter> {
    let mode = if args.regex {
        SearchMode::Pattern
    } else {
        config.highlight.search_mode
    };
    let key_terms = config.highlight.key_terms_enabled && !args.no_key_terms;

    Highlighter::new()
        .with_key_terms(key_terms)
        .with_search_mode(&args.search, mode)
        .with_context(|| format!("Invalid search pattern: {}", args.search))
}
