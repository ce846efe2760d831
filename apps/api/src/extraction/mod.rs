//! Text extraction: the only stage that touches raw file bytes.
//!
//! `AppState` carries an `Arc<dyn TextExtractor>` so tests and alternative
//! backends (OCR, remote services) can be swapped in without touching the
//! analysis pipeline.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::errors::AppError;

/// Declared media types the analyzer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    PlainText,
}

impl MediaType {
    pub const ALLOWED: &'static [&'static str] = &["application/pdf", "text/plain"];

    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::PlainText => "text/plain",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

impl FromStr for MediaType {
    type Err = AppError;

    /// Accepts MIME strings with parameters, e.g. `text/plain; charset=utf-8`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let essence = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" => Ok(MediaType::Pdf),
            "text/plain" => Ok(MediaType::PlainText),
            _ => Err(AppError::UnsupportedMediaType(format!(
                "{value} (expected one of {})",
                MediaType::ALLOWED.join(", ")
            ))),
        }
    }
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, data: Bytes, media_type: MediaType) -> Result<String, AppError>;
}

/// Default backend: `pdf-extract` for PDFs, strict UTF-8 for plain text.
///
/// A blocking parse cannot be cancelled, so a timed-out PDF keeps its thread
/// until the parser returns. Each parse holds a permit for its whole run,
/// which caps how many such threads can pile up; callers queued behind a full
/// pool hit their own timeout instead.
pub struct DocumentTextExtractor {
    pdf_permits: Arc<Semaphore>,
}

impl DocumentTextExtractor {
    pub fn new(max_concurrent_pdfs: usize) -> Self {
        Self {
            pdf_permits: Arc::new(Semaphore::new(max_concurrent_pdfs.max(1))),
        }
    }
}

impl Default for DocumentTextExtractor {
    fn default() -> Self {
        Self::new(4)
    }
}

#[async_trait]
impl TextExtractor for DocumentTextExtractor {
    async fn extract(&self, data: Bytes, media_type: MediaType) -> Result<String, AppError> {
        debug!("Extracting {} bytes as {media_type}", data.len());
        match media_type {
            MediaType::Pdf => {
                let permit = self
                    .pdf_permits
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF permits closed: {e}")))?;
                // pdf-extract is CPU-bound and synchronous
                let task = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    extract_pdf_text(&data)
                });
                match task.await {
                    Ok(result) => result,
                    // malformed PDFs can panic inside the parser
                    Err(e) if e.is_panic() => Err(AppError::Extraction(
                        "the PDF structure could not be parsed".to_string(),
                    )),
                    Err(e) => Err(AppError::Internal(anyhow::anyhow!(
                        "PDF extraction task failed: {e}"
                    ))),
                }
            }
            MediaType::PlainText => decode_plain_text(&data),
        }
    }
}

fn extract_pdf_text(data: &[u8]) -> Result<String, AppError> {
    pdf_extract::extract_text_from_mem(data)
        .map_err(|e| AppError::Extraction(format!("could not read PDF: {e}")))
}

fn decode_plain_text(data: &[u8]) -> Result<String, AppError> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    String::from_utf8(data.to_vec())
        .map_err(|e| AppError::Extraction(format!("text is not valid UTF-8: {e}")))
}
