//! DOCX raw text extraction using zip and quick-xml.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::{debug, trace};
use zip::result::ZipError;
use zip::ZipArchive;

use super::TextExtractor;
use crate::error::{DocxError, ExtractionError};
use crate::format::DocumentFormat;
use crate::models::TextSegment;

/// Package relationships part.
const PACKAGE_RELS: &str = "_rels/.rels";

/// Main document part used when the package relationships do not name one.
const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

/// Text appended after every paragraph.
const PARAGRAPH_BREAK: &str = "\n\n";

/// DOCX extractor producing a single, unpaginated segment.
pub struct DocxTextExtractor;

impl DocxTextExtractor {
    /// Create a new DOCX extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for DocxTextExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn extract(&self, data: &[u8]) -> Result<Vec<TextSegment>, ExtractionError> {
        let mut archive = ZipArchive::new(Cursor::new(data)).map_err(DocxError::from)?;

        let part = main_document_part(&mut archive);
        debug!("Reading DOCX main document part {}", part);

        let xml = read_part(&mut archive, &part)?;
        let text = flatten_document_xml(&xml)?;

        debug!("Extracted {} chars of DOCX text", text.len());
        Ok(vec![TextSegment::whole(text)])
    }
}

/// Extract the raw text of a DOCX document as a single segment.
pub fn extract_docx(data: &[u8]) -> Result<Vec<TextSegment>, ExtractionError> {
    DocxTextExtractor::new().extract(data)
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, part: &str) -> Result<String, DocxError> {
    let mut file = match archive.by_name(part) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Err(DocxError::MissingPart(part.to_string())),
        Err(e) => return Err(e.into()),
    };

    let mut content = String::new();
    file.read_to_string(&mut content).map_err(|e| DocxError::Read {
        part: part.to_string(),
        reason: e.to_string(),
    })?;
    Ok(content)
}

/// Path of the main document part, following the package's officeDocument relationship.
fn main_document_part(archive: &mut ZipArchive<Cursor<&[u8]>>) -> String {
    let Ok(rels) = read_part(archive, PACKAGE_RELS) else {
        return DEFAULT_DOCUMENT_PART.to_string();
    };

    let mut reader = Reader::from_str(&rels);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Relationship" => {
                if let Some(target) = office_document_target(&e) {
                    return target;
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    DEFAULT_DOCUMENT_PART.to_string()
}

fn office_document_target(relationship: &BytesStart<'_>) -> Option<String> {
    let mut is_office_document = false;
    let mut target = None;

    for attr in relationship.attributes().flatten() {
        let value = attr.unescape_value().ok()?;
        match attr.key.as_ref() {
            b"Type" => is_office_document = value.ends_with("/officeDocument"),
            b"Target" => target = Some(value.trim_start_matches('/').to_string()),
            _ => {}
        }
    }

    if is_office_document { target } else { None }
}

/// Flatten WordprocessingML into plain text: paragraphs end with a blank line,
/// tabs and breaks become `\t` and `\n`, everything else is dropped.
fn flatten_document_xml(xml: &str) -> Result<String, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text = false;
    // Tab stop definitions (`tabs/tab`) are formatting, not content.
    let mut in_tab_stops = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"tabs" => in_tab_stops = true,
                b"tab" if !in_tab_stops => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" if !in_tab_stops => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                b"p" => text.push_str(PARAGRAPH_BREAK),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"tabs" => in_tab_stops = false,
                b"p" => text.push_str(PARAGRAPH_BREAK),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let unescaped = e.unescape().map_err(|e| DocxError::Xml(e.to_string()))?;
                text.push_str(&unescaped);
            }
            Ok(Event::CData(e)) if in_text => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocxError::Xml(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            Ok(other) => trace!("Skipping XML event {:?}", other),
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_segment_without_page() {
        let data = fixtures::docx_with_paragraphs(&["First paragraph.", "Second paragraph."]);
        let segments = extract_docx(&data).unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].page_number, None);
        assert_eq!(segments[0].text, "First paragraph.\n\nSecond paragraph.\n\n");
    }

    #[test]
    fn test_runs_concatenate_verbatim() {
        let xml = fixtures::document_xml(
            r#"<w:p><w:r><w:t xml:space="preserve">Bad </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>debts</w:t></w:r><w:r><w:t xml:space="preserve"> &amp; write offs</w:t></w:r></w:p>"#,
        );
        let text = flatten_document_xml(&xml).unwrap();
        assert_eq!(text, "Bad debts & write offs\n\n");
    }

    #[test]
    fn test_tabs_and_breaks() {
        let xml = fixtures::document_xml(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Name</w:t><w:tab/><w:t>Value</w:t><w:br/><w:t>Next</w:t></w:r></w:p>"#,
        );
        let text = flatten_document_xml(&xml).unwrap();
        assert_eq!(text, "Name\tValue\nNext\n\n");
    }

    #[test]
    fn test_any_namespace_prefix() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?><x:document xmlns:x="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><x:body><x:p><x:r><x:t>Going</x:t><x:tab/><x:t>concern</x:t></x:r></x:p></x:body></x:document>"#;
        let data = fixtures::docx_from_parts(&[("word/document.xml", xml)]);
        let segments = extract_docx(&data).unwrap();
        assert_eq!(segments[0].text, "Going\tconcern\n\n");
    }

    #[test]
    fn test_empty_paragraph_and_deleted_text() {
        let xml = fixtures::document_xml(
            r#"<w:p/><w:p><w:del><w:r><w:delText>removed</w:delText></w:r></w:del><w:r><w:t>kept</w:t></w:r></w:p>"#,
        );
        let text = flatten_document_xml(&xml).unwrap();
        assert_eq!(text, "\n\nkept\n\n");
    }

    #[test]
    fn test_table_cells_are_paragraphs() {
        let xml = fixtures::document_xml(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>A1</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>B1</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );
        let text = flatten_document_xml(&xml).unwrap();
        assert_eq!(text, "A1\n\nB1\n\n");
    }

    #[test]
    fn test_main_part_from_relationships() {
        let data = fixtures::docx_from_parts(&[
            (
                "_rels/.rels",
                r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="/word/main.xml"/></Relationships>"#,
            ),
            ("word/main.xml", &fixtures::document_xml("<w:p><w:r><w:t>Relocated</w:t></w:r></w:p>")),
        ]);
        let segments = extract_docx(&data).unwrap();
        assert_eq!(segments[0].text, "Relocated\n\n");
    }

    #[test]
    fn test_missing_document_part() {
        let data = fixtures::docx_from_parts(&[("word/styles.xml", "<w:styles/>")]);
        let err = extract_docx(&data).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Docx(DocxError::MissingPart(ref part)) if part == "word/document.xml"
        ));
    }

    #[test]
    fn test_not_a_zip() {
        // OLE compound file header of a legacy .doc
        let data = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0, 0, 0, 0];
        let err = extract_docx(&data).unwrap_err();
        assert!(matches!(err, ExtractionError::Docx(DocxError::Archive(_))));
    }

    #[test]
    fn test_malformed_xml() {
        let data = fixtures::docx_from_parts(&[("word/document.xml", "<w:document><w:body><w:p></w:body>")]);
        let err = extract_docx(&data).unwrap_err();
        assert!(matches!(err, ExtractionError::Docx(DocxError::Xml(_))));
    }
}
