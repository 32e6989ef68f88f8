//! File ingestion: turn a selected file into an embeddable `data:` URL.
//!
//! Uploads are checked against a per-use policy (MIME allow-list, size
//! ceiling, extension denylist) before any bytes are encoded. The reverse
//! direction infers a MIME type from the leading base64 characters of a
//! bare encoded string so stored images can be previewed.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use tracing::debug;

use crate::error::IngestionError;

const MIB: u64 = 1024 * 1024;

/// Extensions refused whatever MIME type the file claims.
pub const DISALLOWED_EXTENSIONS: &[&str] = &["exe", "bat", "sh", "js", "php"];

const DOCUMENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/tiff",
    "image/tif",
    "image/jfif",
    "application/pdf",
];

const PHOTO_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Leading base64 characters of well-known formats.
const SIGNATURES: &[(&str, &str)] = &[
    ("/9j/", "image/jpeg"),
    ("iVBOR", "image/png"),
    ("R0lGOD", "image/gif"),
    ("JVBER", "application/pdf"),
    ("SUkq", "image/tiff"),
];

const FALLBACK_MIME: &str = "application/octet-stream";

/// A file picked by the applicant, fully read into memory.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into().to_ascii_lowercase(),
            bytes,
        }
    }

    /// Read a file from disk, deriving its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, IngestionError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| IngestionError::Read(format!("{}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_from_extension(&name);
        Ok(Self::new(name, mime, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension, if the name has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }
}

fn mime_from_extension(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        _ => FALLBACK_MIME,
    }
}

/// What an upload slot accepts.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed: &'static [&'static str],
    allowed_label: &'static str,
    subject: &'static str,
    max_bytes: u64,
}

impl UploadPolicy {
    /// Address-proof documents: images, TIFF and PDF.
    pub fn documents(max_bytes: u64) -> Self {
        Self {
            allowed: DOCUMENT_TYPES,
            allowed_label: "JPEG, PNG, TIFF, or PDF files",
            subject: "File",
            max_bytes,
        }
    }

    /// Applicant photo: common web image formats only.
    pub fn photo(max_bytes: u64) -> Self {
        Self {
            allowed: PHOTO_TYPES,
            allowed_label: "JPG, PNG, or WebP images",
            subject: "Photo",
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn allows_mime(&self, mime: &str) -> bool {
        self.allowed.contains(&mime.to_ascii_lowercase().as_str())
    }

    /// Check type, size and extension, in that order.
    pub fn check(&self, file: &SelectedFile) -> Result<(), IngestionError> {
        if !self.allows_mime(&file.mime) {
            return Err(IngestionError::UnsupportedType {
                mime: file.mime.clone(),
                allowed: self.allowed_label.to_string(),
            });
        }
        if file.size() > self.max_bytes {
            return Err(IngestionError::TooLarge {
                subject: self.subject.to_string(),
                size: file.size(),
                max_mb: self.max_bytes.div_ceil(MIB),
            });
        }
        if let Some(ext) = file.extension()
            && DISALLOWED_EXTENSIONS.contains(&ext.as_str())
        {
            return Err(IngestionError::DisallowedExtension {
                name: file.name.clone(),
            });
        }
        Ok(())
    }
}

/// Validate `file` against `policy` and encode it as a `data:` URL.
///
/// Encoding runs on the blocking pool; large PDFs take noticeable time.
pub async fn ingest(file: SelectedFile, policy: &UploadPolicy) -> Result<String, IngestionError> {
    policy.check(&file)?;

    let name = file.name.clone();
    let size = file.size();
    let encoded = tokio::task::spawn_blocking(move || {
        let body = general_purpose::STANDARD.encode(&file.bytes);
        format!("data:{};base64,{}", file.mime, body)
    })
    .await
    .map_err(|e| IngestionError::Read(e.to_string()))?;

    debug!(file = %name, size, "File ingested");
    Ok(encoded)
}

/// Infer the MIME type of a bare base64 string from its leading characters.
pub fn detect_mime(encoded: &str) -> &'static str {
    let body = encoded.trim_start();
    SIGNATURES
        .iter()
        .find(|(prefix, _)| body.starts_with(prefix))
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_MIME)
}

/// MIME type of a stored image string, from its `data:` header when present.
pub fn mime_of(stored: &str) -> String {
    if let Some(rest) = stored.strip_prefix("data:")
        && let Some((mime, _)) = rest.split_once([';', ','])
        && !mime.is_empty()
    {
        return mime.to_ascii_lowercase();
    }
    detect_mime(stored).to_string()
}

/// The base64 payload without any `data:...;base64,` header.
pub fn strip_data_url(stored: &str) -> &str {
    if stored.starts_with("data:")
        && let Some((_, body)) = stored.split_once(',')
    {
        return body;
    }
    stored
}

/// A `data:` URL suitable for previewing a stored image or document.
pub fn preview_data_url(stored: &str) -> String {
    if stored.is_empty() || stored.starts_with("data:") {
        return stored.to_string();
    }
    format!("data:{};base64,{}", detect_mime(stored), stored)
}

/// Whether a stored string previews as an image (as opposed to a PDF or
/// unknown binary).
pub fn is_image(stored: &str) -> bool {
    mime_of(stored).starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[tokio::test]
    async fn ingest_produces_data_url() {
        let file = SelectedFile::new("proof.png", "image/png", PNG_HEADER.to_vec());
        let url = ingest(file, &UploadPolicy::documents(100 * MIB))
            .await
            .unwrap();
        assert!(url.starts_with("data:image/png;base64,iVBOR"));
        assert_eq!(mime_of(&url), "image/png");
    }

    #[test]
    fn policy_rejects_type_then_size_then_extension() {
        let policy = UploadPolicy::photo(4);

        let gif = SelectedFile::new("a.gif", "image/gif", vec![0; 2]);
        let err = policy.check(&gif).unwrap_err();
        assert_eq!(err.to_string(), "Only JPG, PNG, or WebP images are allowed");

        let big = SelectedFile::new("a.png", "image/png", vec![0; 5]);
        assert!(matches!(
            policy.check(&big),
            Err(IngestionError::TooLarge { size: 5, .. })
        ));

        let sneaky = SelectedFile::new("payload.PHP", "image/png", vec![0; 2]);
        assert_eq!(
            policy.check(&sneaky).unwrap_err().to_string(),
            "Invalid file type"
        );
    }

    #[test]
    fn photo_ceiling_message() {
        let policy = UploadPolicy::photo(5 * MIB);
        let big = SelectedFile::new("me.jpg", "image/jpeg", vec![0; (5 * MIB + 1) as usize]);
        assert_eq!(
            policy.check(&big).unwrap_err().to_string(),
            "Photo must be under 5MB"
        );
    }

    #[test]
    fn documents_accept_pdf_and_tiff() {
        let policy = UploadPolicy::documents(MIB);
        for mime in ["application/pdf", "image/tiff", "image/jpg", "IMAGE/JPEG"] {
            let file = SelectedFile::new("doc", mime, vec![1]);
            assert!(policy.check(&file).is_ok(), "{mime}");
        }
        let webp = SelectedFile::new("doc.webp", "image/webp", vec![1]);
        assert!(policy.check(&webp).is_err());
    }

    #[test]
    fn detects_signatures() {
        assert_eq!(detect_mime("/9j/4AAQ"), "image/jpeg");
        assert_eq!(detect_mime("iVBORw0K"), "image/png");
        assert_eq!(detect_mime("R0lGODlh"), "image/gif");
        assert_eq!(detect_mime("JVBERi0x"), "application/pdf");
        assert_eq!(detect_mime("SUkqAAgA"), "image/tiff");
        assert_eq!(detect_mime("AAAA"), "application/octet-stream");
    }

    #[test]
    fn preview_adds_header_only_when_missing() {
        assert_eq!(preview_data_url("JVBERi0x"), "data:application/pdf;base64,JVBERi0x");
        assert_eq!(
            preview_data_url("data:image/png;base64,iVBOR"),
            "data:image/png;base64,iVBOR"
        );
        assert_eq!(preview_data_url(""), "");
        assert!(is_image("/9j/4AAQ"));
        assert!(!is_image("JVBERi0x"));
    }

    #[test]
    fn strip_removes_header() {
        assert_eq!(strip_data_url("data:image/jpeg;base64,/9j/xx"), "/9j/xx");
        assert_eq!(strip_data_url("/9j/xx"), "/9j/xx");
    }

    #[tokio::test]
    async fn reads_from_disk() {
        let mut tmp = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        tmp.write_all(PNG_HEADER).unwrap();

        let file = SelectedFile::from_path(tmp.path()).await.unwrap();
        assert_eq!(file.mime, "image/png");
        assert_eq!(file.size(), PNG_HEADER.len() as u64);

        let missing = SelectedFile::from_path(tmp.path().with_extension("nope")).await;
        assert!(matches!(missing, Err(IngestionError::Read(_))));
    }
}
