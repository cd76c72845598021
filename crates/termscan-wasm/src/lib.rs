//! WASM bindings for termscan.
//!
//! Extraction runs behind JS promises; the `DocumentViewer` class keeps the
//! state of one viewer session for a browser UI.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Promise, Uint8Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use termscan_core::{
    document_name_from_url, extract, highlight, DocumentFormat, Error, LoadedDocument, SearchMode,
    ViewerState, KEY_TERMS,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract the per-page segments of a PDF.
///
/// Resolves to an array of `{ text, pageNumber }`; rejects with a user-facing message.
#[wasm_bindgen]
pub fn extract_pdf(data: Vec<u8>) -> Promise {
    extract_as(data, DocumentFormat::Pdf)
}

/// Extract the single segment of a DOCX document.
#[wasm_bindgen]
pub fn extract_docx(data: Vec<u8>) -> Promise {
    extract_as(data, DocumentFormat::Docx)
}

/// Extract using the format named by an HTTP content type.
#[wasm_bindgen]
pub fn extract_for_content_type(data: Vec<u8>, content_type: &str) -> Promise {
    extract_as(data, DocumentFormat::from_content_type(content_type))
}

/// Classify a content type as `"pdf"`, `"docx"` or `"unsupported"`.
#[wasm_bindgen]
pub fn classify_content_type(content_type: &str) -> String {
    DocumentFormat::from_content_type(content_type).to_string()
}

/// Highlight `text` with a literal search term and, optionally, the key terms.
#[wasm_bindgen]
pub fn highlight_text(text: &str, search_term: &str, highlight_key_terms: bool) -> String {
    highlight(text, search_term, highlight_key_terms)
}

/// The built-in key terms in application order.
#[wasm_bindgen]
pub fn key_terms() -> Array {
    KEY_TERMS.iter().map(|term| JsValue::from_str(term)).collect()
}

fn extract_as(data: Vec<u8>, format: DocumentFormat) -> Promise {
    future_to_promise(async move {
        let segments = extract(&data, format).map_err(to_js_error)?;
        to_js(&segments)
    })
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_js_error(e: Error) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
    JsValue::from_str(&e.user_message())
}

fn transport_error(value: JsValue) -> Error {
    Error::network(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

async fn fetch_document(url: &str) -> Result<LoadedDocument, Error> {
    let window = web_sys::window().ok_or_else(|| Error::network("no window available"))?;

    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(transport_error)?
        .dyn_into()
        .map_err(transport_error)?;

    if !response.ok() {
        return Err(Error::http_status(response.status()));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .map_err(transport_error)?
        .unwrap_or_default();

    let buffer = JsFuture::from(response.array_buffer().map_err(transport_error)?)
        .await
        .map_err(transport_error)?;
    let data = Uint8Array::new(&buffer).to_vec();

    let format = DocumentFormat::from_content_type(&content_type).require_supported(&content_type)?;
    let segments = extract(&data, format)?;

    Ok(LoadedDocument::new(document_name_from_url(url), format, segments))
}

/// Viewer session for a browser UI.
///
/// Load methods return promises resolving to `true` on success and `false`
/// on failure; the failure message is then available from `error`.
#[wasm_bindgen]
pub struct DocumentViewer {
    state: Rc<RefCell<ViewerState>>,
}

#[wasm_bindgen]
impl DocumentViewer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ViewerState::new())),
        }
    }

    /// Load an uploaded file, classified by the MIME type the browser declared.
    pub fn load_file(&self, data: Vec<u8>, file_name: String, mime_type: String) -> Promise {
        let state = Rc::clone(&self.state);
        state.borrow_mut().begin_load();

        future_to_promise(async move {
            let result = DocumentFormat::from_file_mime(&mime_type)
                .require_supported(&mime_type)
                .and_then(|format| {
                    let segments = extract(&data, format)?;
                    Ok(LoadedDocument::new(file_name, format, segments))
                });
            Ok(finish(&state, result))
        })
    }

    /// Fetch and load a document from a URL.
    pub fn load_url(&self, url: String) -> Promise {
        let state = Rc::clone(&self.state);
        if !state.borrow_mut().check_url(&url) {
            return Promise::resolve(&JsValue::FALSE);
        }
        state.borrow_mut().begin_load();

        future_to_promise(async move {
            let result = fetch_document(&url).await;
            Ok(finish(&state, result))
        })
    }

    /// Clear the document, search term and error.
    pub fn reset(&self) {
        self.state.borrow_mut().reset();
    }

    /// Segments with highlight markers, as `{ pageNumber, markup }` objects.
    pub fn render(&self) -> Result<JsValue, JsValue> {
        let rendered = self.state.borrow_mut().render();
        to_js(&rendered)
    }

    pub fn toggle_key_terms(&self) {
        self.state.borrow_mut().toggle_key_terms();
    }

    /// Interpret the search term as a regular expression instead of plain text.
    pub fn set_regex_search(&self, enabled: bool) {
        let mode = if enabled {
            SearchMode::Pattern
        } else {
            SearchMode::Literal
        };
        let state = self.state.take();
        *self.state.borrow_mut() = state.with_search_mode(mode);
    }

    #[wasm_bindgen(getter)]
    pub fn search_term(&self) -> String {
        self.state.borrow().search_term().to_string()
    }

    #[wasm_bindgen(setter)]
    pub fn set_search_term(&self, term: String) {
        self.state.borrow_mut().set_search_term(term);
    }

    #[wasm_bindgen(getter)]
    pub fn highlight_key_terms(&self) -> bool {
        self.state.borrow().highlight_key_terms()
    }

    #[wasm_bindgen(setter)]
    pub fn set_highlight_key_terms(&self, enabled: bool) {
        self.state.borrow_mut().set_highlight_key_terms(enabled);
    }

    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.state.borrow().file_name().to_string()
    }

    /// `"1 page"` or `"N pages"`, undefined before a document is loaded.
    #[wasm_bindgen(getter)]
    pub fn page_summary(&self) -> Option<String> {
        self.state.borrow().document().map(|d| d.page_summary())
    }

    #[wasm_bindgen(getter)]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error().map(str::to_string)
    }
}

impl Default for DocumentViewer {
    fn default() -> Self {
        Self::new()
    }
}

fn finish(state: &RefCell<ViewerState>, result: Result<LoadedDocument, Error>) -> JsValue {
    if let Err(e) = &result {
        web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
    }
    let ok = result.is_ok();
    state.borrow_mut().finish_load(result);
    JsValue::from_bool(ok)
}
