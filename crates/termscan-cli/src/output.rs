//! Output formatting for extracted and highlighted documents.

use std::fs;
use std::path::Path;

use console::style;
use serde::Serialize;

use termscan_core::highlight::{KEY_TERM_HIGHLIGHT_CLASS, SEARCH_HIGHLIGHT_CLASS};
use termscan_core::{LoadedDocument, RenderedSegment};

/// Format of `extract` output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ExtractFormat {
    /// JSON document with all segments
    Json,
    /// One CSV row per segment
    Csv,
    /// Plain text with page headers
    Text,
}

/// Format of `highlight` output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum HighlightFormat {
    /// Standalone HTML page
    Html,
    /// JSON document with marked-up segments
    Json,
    /// Marked-up text with page headers
    Text,
}

/// Pick `explicit`, else the configured default if it names a valid variant, else `fallback`.
pub fn resolve_format<F: clap::ValueEnum>(explicit: Option<F>, configured: &str, fallback: F) -> F {
    explicit
        .or_else(|| F::from_str(configured, true).ok())
        .unwrap_or(fallback)
}

pub fn format_extracted(document: &LoadedDocument, format: ExtractFormat) -> anyhow::Result<String> {
    match format {
        ExtractFormat::Json => Ok(serde_json::to_string_pretty(&ExtractOutput::from(document))?),
        ExtractFormat::Csv => format_extracted_csv(document),
        ExtractFormat::Text => Ok(format_pages(
            document,
            document.segments.iter().map(|s| (s.page_number.map(|n| n.get()), s.text.as_str())),
        )),
    }
}

pub fn format_highlighted(
    document: &LoadedDocument,
    rendered: &[RenderedSegment],
    format: HighlightFormat,
) -> anyhow::Result<String> {
    match format {
        HighlightFormat::Html => Ok(format_html(document, rendered)),
        HighlightFormat::Json => {
            let output = HighlightOutput {
                name: &document.name,
                format: document.format.to_string(),
                summary: document.page_summary(),
                segments: rendered,
            };
            Ok(serde_json::to_string_pretty(&output)?)
        }
        HighlightFormat::Text => Ok(format_pages(
            document,
            rendered.iter().map(|s| (s.page_number.map(|n| n.get()), s.markup.as_str())),
        )),
    }
}

/// Write to `path`, or stdout when none is given.
pub fn write_output(output: &str, path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = path {
        fs::write(path, output)?;
        eprintln!("{} Output written to {}", style("✓").green(), path.display());
    } else {
        println!("{}", output);
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractOutput<'a> {
    name: &'a str,
    format: String,
    page_summary: String,
    segments: &'a [termscan_core::TextSegment],
}

impl<'a> From<&'a LoadedDocument> for ExtractOutput<'a> {
    fn from(document: &'a LoadedDocument) -> Self {
        Self {
            name: &document.name,
            format: document.format.to_string(),
            page_summary: document.page_summary(),
            segments: &document.segments,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HighlightOutput<'a> {
    name: &'a str,
    format: String,
    #[serde(rename = "pageSummary")]
    summary: String,
    segments: &'a [RenderedSegment],
}

fn format_extracted_csv(document: &LoadedDocument) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["page", "text"])?;
    for segment in &document.segments {
        let page = segment.page_number.map(|n| n.to_string()).unwrap_or_default();
        wtr.write_record([page.as_str(), segment.text.as_str()])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_pages<'a>(
    document: &LoadedDocument,
    pages: impl Iterator<Item = (Option<u32>, &'a str)>,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("{} ({})\n", document.name, document.page_summary()));
    for (page, text) in pages {
        output.push('\n');
        if let Some(page) = page {
            output.push_str(&format!("--- Page {} ---\n", page));
        }
        output.push_str(text);
        output.push('\n');
    }

    output
}

fn format_html(document: &LoadedDocument, rendered: &[RenderedSegment]) -> String {
    let mut output = String::new();
    let title = escape_html(&document.name);

    output.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    output.push_str(&format!("<title>{}</title>\n", title));
    output.push_str("<style>\n");
    output.push_str(".page { margin-bottom: 2em; }\n");
    output.push_str(".page-number { font-weight: bold; color: #666; }\n");
    output.push_str(".text-content { white-space: pre-wrap; }\n");
    output.push_str(&format!(".{} {{ background: #ffeb3b; }}\n", SEARCH_HIGHLIGHT_CLASS));
    output.push_str(&format!(".{} {{ background: #ffab91; }}\n", KEY_TERM_HIGHLIGHT_CLASS));
    output.push_str("</style>\n</head>\n<body>\n");

    output.push_str("<div class=\"document-info\">\n");
    output.push_str(&format!("<h2>{}</h2>\n", title));
    output.push_str(&format!("<p>{}</p>\n", document.page_summary()));
    output.push_str("</div>\n<div class=\"document-content\">\n");

    for segment in rendered {
        output.push_str("<div class=\"page\">\n");
        if let Some(page) = segment.page_number {
            output.push_str(&format!("<div class=\"page-number\">Page {}</div>\n", page));
        }
        // Markup is emitted as produced by the highlighter.
        output.push_str(&format!("<div class=\"text-content\">{}</div>\n", segment.markup));
        output.push_str("</div>\n");
    }

    output.push_str("</div>\n</body>\n</html>\n");
    output
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
