//! PDF page text extraction using lopdf.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Encoding, Object, ObjectId};
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use tracing::{debug, trace};

use super::TextExtractor;
use crate::error::{ExtractionError, PdfError};
use crate::format::DocumentFormat;
use crate::models::TextSegment;

/// How deep nested form XObjects are followed.
const MAX_FORM_DEPTH: usize = 8;

/// `TJ` kerning (thousandths of an em) below which a word gap is assumed.
const TJ_SPACE_THRESHOLD: f64 = -100.0;

/// Joiner placed between text items of one page.
const ITEM_SEPARATOR: &str = " ";

/// PDF extractor producing one segment per page.
pub struct PdfTextExtractor {
    max_form_depth: usize,
}

impl PdfTextExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            max_form_depth: MAX_FORM_DEPTH,
        }
    }

    fn load(&self, data: &[u8]) -> Result<Document, PdfError> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        Ok(doc)
    }

    /// Text items of one page, in content stream order.
    fn page_items(&self, doc: &Document, page: u32, page_id: ObjectId) -> Result<Vec<String>, PdfError> {
        let content = doc.get_page_content(page_id).map_err(|e| PdfError::PageContent {
            page,
            reason: e.to_string(),
        })?;
        let resources = get_page_resources(doc, page_id);

        let mut items = Vec::new();
        self.collect_items(doc, &content, resources.as_ref(), None, 0, &mut items)
            .map_err(|reason| PdfError::PageContent { page, reason })?;

        trace!("Page {}: {} text items", page, items.len());
        Ok(items)
    }

    fn collect_items(
        &self,
        doc: &Document,
        content: &[u8],
        resources: Option<&Dictionary>,
        inherited_font: Option<&Encoding<'_>>,
        depth: usize,
        items: &mut Vec<String>,
    ) -> Result<(), String> {
        let content = Content::decode(content).map_err(|e| e.to_string())?;
        let fonts = font_encodings(doc, resources);
        let mut font = inherited_font;

        for op in &content.operations {
            match op.operator.as_str() {
                "Tf" => {
                    let name = op.operands.first().and_then(|o| o.as_name().ok());
                    font = name.and_then(|name| fonts.get(name));
                }
                // For `"` the string is the third operand, after word and char spacing.
                "Tj" | "'" | "\"" => {
                    if let Some(Object::String(bytes, _)) = op.operands.last() {
                        items.push(decode_text(bytes, font));
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(parts)) = op.operands.first() {
                        items.push(join_tj_array(parts, font));
                    }
                }
                "Do" if depth < self.max_form_depth => {
                    let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) else {
                        continue;
                    };
                    if let Some((form_content, form_resources)) = form_xobject(doc, resources, name) {
                        trace!("Following form XObject {}", String::from_utf8_lossy(name));
                        let nested = form_resources.as_ref().or(resources);
                        self.collect_items(doc, &form_content, nested, font, depth + 1, items)?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfTextExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract(&self, data: &[u8]) -> Result<Vec<TextSegment>, ExtractionError> {
        let doc = self.load(data)?;
        let pages = doc.get_pages();
        debug!("Loaded PDF with {} pages", pages.len());

        let mut segments = Vec::with_capacity(pages.len());
        for (index, (&page, &page_id)) in pages.iter().enumerate() {
            let items = self.page_items(&doc, page, page_id)?;
            let page_number = NonZeroU32::MIN.saturating_add(index as u32);
            segments.push(TextSegment::page(items.join(ITEM_SEPARATOR), page_number));
        }

        Ok(segments)
    }
}

/// Extract one segment per page from PDF bytes.
pub fn extract_pdf(data: &[u8]) -> Result<Vec<TextSegment>, ExtractionError> {
    PdfTextExtractor::new().extract(data)
}

/// Encodings of the fonts in `resources` that declare an `Encoding` or a `ToUnicode` map.
///
/// Fonts declaring neither are left out, so their strings take the
/// `decode_pdf_string` fallback.
fn font_encodings<'a>(doc: &'a Document, resources: Option<&'a Dictionary>) -> BTreeMap<Vec<u8>, Encoding<'a>> {
    let mut encodings = BTreeMap::new();

    let Some(fonts) = resources
        .and_then(|r| r.get(b"Font").ok())
        .and_then(|f| doc.dereference(f).ok())
        .and_then(|(_, f)| f.as_dict().ok())
    else {
        return encodings;
    };

    for (name, value) in fonts.iter() {
        let Some(font) = doc.dereference(value).ok().and_then(|(_, f)| f.as_dict().ok()) else {
            continue;
        };
        if !font.has(b"Encoding") && !font.has(b"ToUnicode") {
            continue;
        }
        match font.get_font_encoding(doc) {
            Ok(encoding) => {
                trace!("Font {} uses {:?}", String::from_utf8_lossy(name), encoding);
                encodings.insert(name.clone(), encoding);
            }
            Err(e) => debug!("Font {} encoding unreadable: {}", String::from_utf8_lossy(name), e),
        }
    }

    encodings
}

/// Decode a string operand through the current font's encoding when it has one.
fn decode_text(bytes: &[u8], font: Option<&Encoding<'_>>) -> String {
    match font {
        Some(encoding) => {
            Document::decode_text(encoding, bytes).unwrap_or_else(|_| decode_pdf_string(bytes))
        }
        None => decode_pdf_string(bytes),
    }
}

/// Concatenate the strings of a `TJ` array into a single item.
fn join_tj_array(parts: &[Object], font: Option<&Encoding<'_>>) -> String {
    let mut text = String::new();
    for part in parts {
        match part {
            Object::String(bytes, _) => text.push_str(&decode_text(bytes, font)),
            Object::Integer(n) if (*n as f64) < TJ_SPACE_THRESHOLD => text.push(' '),
            Object::Real(r) if f64::from(*r) < TJ_SPACE_THRESHOLD => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Decode a PDF string operand: UTF-16BE with BOM, then UTF-8, then Latin-1.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Content and own resources of the form XObject `name`, if it is one.
fn form_xobject(
    doc: &Document,
    resources: Option<&Dictionary>,
    name: &[u8],
) -> Option<(Vec<u8>, Option<Dictionary>)> {
    let xobjects = resources?.get(b"XObject").ok()?;
    let (_, xobjects) = doc.dereference(xobjects).ok()?;
    let entry = xobjects.as_dict().ok()?.get(name).ok()?;
    let (_, object) = doc.dereference(entry).ok()?;

    let Object::Stream(stream) = object else {
        return None;
    };
    if stream.dict.get(b"Subtype").ok()?.as_name().ok()? != b"Form" {
        return None;
    }

    let content = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    let own_resources = stream
        .dict
        .get(b"Resources")
        .ok()
        .and_then(|r| doc.dereference(r).ok())
        .and_then(|(_, r)| r.as_dict().ok().cloned());

    Some((content, own_resources))
}

/// Get resources dictionary for a page, handling inheritance
fn get_page_resources(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    let page = doc.get_object(page_id).ok()?.as_dict().ok()?;
    resources_or_parent(doc, page)
}

fn resources_or_parent(doc: &Document, node: &Dictionary) -> Option<Dictionary> {
    if let Ok(resources) = node.get(b"Resources") {
        if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
            return Some(res_dict.clone());
        }
    }

    // Continue up the tree
    if let Ok(Object::Reference(parent_id)) = node.get(b"Parent") {
        let parent = doc.get_object(*parent_id).ok()?.as_dict().ok()?;
        return resources_or_parent(doc, parent);
    }
    None
}
