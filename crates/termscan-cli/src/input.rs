//! Loading documents from local files or URLs.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use termscan_core::models::config::FetchConfig;
use termscan_core::{
    document_name_from_url, extract, mime_for_path, DocumentFormat, Error, ExtractionError,
    LoadedDocument, TermscanConfig,
};

/// Whether `input` should be fetched rather than read from disk.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Spinner shown while a document loads.
pub fn loading_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Load and extract `input`, a file path or an http(s) URL.
///
/// `content_type` overrides format detection for both kinds of input.
pub async fn load_document(
    input: &str,
    content_type: Option<&str>,
    config: &TermscanConfig,
    pb: &ProgressBar,
) -> Result<LoadedDocument, Error> {
    if is_url(input) {
        load_url(input, content_type, &config.fetch, pb).await
    } else {
        load_file(Path::new(input), content_type, pb).await
    }
}

async fn load_file(
    path: &Path,
    content_type: Option<&str>,
    pb: &ProgressBar,
) -> Result<LoadedDocument, Error> {
    let (format, hint) = match content_type {
        Some(ct) => (DocumentFormat::from_content_type(ct), ct.to_string()),
        None => {
            let mime = mime_for_path(path).unwrap_or("");
            let hint = if mime.is_empty() {
                path.display().to_string()
            } else {
                mime.to_string()
            };
            (DocumentFormat::from_file_mime(mime), hint)
        }
    };
    let format = format.require_supported(&hint)?;

    info!("Reading {} as {}", path.display(), format);
    pb.set_message(format!("Reading {}...", path.display()));
    let data = tokio::fs::read(path).await?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    extract_in_background(name, data, format, pb).await
}

async fn load_url(
    url: &str,
    content_type: Option<&str>,
    config: &FetchConfig,
    pb: &ProgressBar,
) -> Result<LoadedDocument, Error> {
    pb.set_message(format!("Fetching {}...", url));
    let fetched = fetch(url, config).await?;

    let content_type = content_type.unwrap_or(fetched.content_type.as_str());
    let format = DocumentFormat::from_content_type(content_type).require_supported(content_type)?;
    debug!("Fetched {} bytes, content type {:?} -> {}", fetched.data.len(), content_type, format);

    extract_in_background(document_name_from_url(url), fetched.data, format, pb).await
}

/// Response body and its declared content type.
pub struct Fetched {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Download `url`. Every failure is a transport error.
pub async fn fetch(url: &str, config: &FetchConfig) -> Result<Fetched, Error> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| Error::network(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::network(e.to_string()))?;

    if !response.status().is_success() {
        return Err(Error::http_status(response.status().as_u16()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let mut data = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::network(e.to_string()))?;
        data.extend_from_slice(&chunk);
    }

    Ok(Fetched { data, content_type })
}

/// Run the synchronous extractor on the blocking pool and await it.
async fn extract_in_background(
    name: String,
    data: Vec<u8>,
    format: DocumentFormat,
    pb: &ProgressBar,
) -> Result<LoadedDocument, Error> {
    pb.set_message(format!("Extracting {} text...", format));

    let segments = tokio::task::spawn_blocking(move || extract(&data, format))
        .await
        .map_err(|e| ExtractionError::Aborted {
            format,
            reason: e.to_string(),
        })??;

    Ok(LoadedDocument::new(name, format, segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its base URL.
    async fn serve_once(head: &str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut response = format!(
            "{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            head,
            body.len()
        )
        .into_bytes();
        response.extend(body);

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0; 4096];
            let _ = socket.read(&mut request).await.unwrap();
            socket.write_all(&response).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn one_page_pdf(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/a.pdf"));
        assert!(is_url("http://example.com/a.pdf"));
        assert!(!is_url("ftp://example.com/a.pdf"));
        assert!(!is_url("reports/https.pdf"));
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let pb = ProgressBar::hidden();
        let err = load_document("notes.txt", None, &TermscanConfig::default(), &pb)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let pb = ProgressBar::hidden();
        let err = load_document("does/not/exist.pdf", None, &TermscanConfig::default(), &pb)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_content_type_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        std::fs::write(&path, b"not a pdf").unwrap();

        let pb = ProgressBar::hidden();
        let err = load_document(
            path.to_str().unwrap(),
            Some("application/pdf"),
            &TermscanConfig::default(),
            &pb,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let config = FetchConfig {
            timeout_secs: 5,
            ..FetchConfig::default()
        };
        let err = match fetch("http://127.0.0.1:1/report.pdf", &config).await {
            Ok(_) => panic!("fetch should fail"),
            Err(e) => e,
        };
        assert!(err.is_transport());
        assert!(matches!(err, Error::Transport { status: None, .. }));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let base = serve_once("HTTP/1.1 404 Not Found", Vec::new()).await;
        let pb = ProgressBar::hidden();
        let err = load_document(
            &format!("{}/files/report.pdf", base),
            None,
            &TermscanConfig::default(),
            &pb,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Transport { status: Some(404), .. }));
        assert!(err.user_message().contains("HTTP error! Status: 404"));
    }

    #[tokio::test]
    async fn test_url_pdf_named_after_last_path_segment() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/pdf; charset=binary",
            one_page_pdf("A breach occurred"),
        )
        .await;
        let pb = ProgressBar::hidden();
        let document = load_document(
            &format!("{}/files/report.pdf", base),
            None,
            &TermscanConfig::default(),
            &pb,
        )
        .await
        .unwrap();

        assert_eq!(document.name, "report.pdf");
        assert_eq!(document.format, DocumentFormat::Pdf);
        assert_eq!(document.segments.len(), 1);
        assert_eq!(document.segments[0].text, "A breach occurred");
    }
}
