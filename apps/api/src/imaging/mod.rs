//! Image Pipeline: turns an uploaded resume file into the representation the
//! extraction client consumes: up to `MAX_PAGES` JPEG page images, or the raw
//! text body for plain-text uploads.
//!
//! Flow per format:
//! - pdf        → rasterize at `RENDER_DPI` → JPEG q`JPEG_QUALITY`
//! - docx / doc → convert to PDF in a scoped temp dir → as pdf
//! - txt        → `RenderedDocument::TextBody`, no imaging
//! - png / jpeg → the uploaded bytes, untouched, as a single page

pub mod convert;
pub mod encode;
pub mod pdf;

#[cfg(test)]
pub mod testing;

use std::path::Path;

use serde::Serialize;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info};

use crate::errors::FailureKind;
use crate::imaging::convert::DocumentConverter;
use crate::imaging::encode::encode_jpeg;
use crate::imaging::pdf::{PageRasterizer, RasterOptions};

/// Pages beyond this are silently dropped.
pub const MAX_PAGES: usize = 5;
pub const RENDER_DPI: u32 = 300;
pub const JPEG_QUALITY: u8 = 95;
/// Shortest plain-text body (in characters, after trimming) worth sending to the model.
pub const MIN_TEXT_CHARS: usize = 50;

/// Failure of an external converter, rasterizer or codec.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("PDF rendering failed: {0}")]
    Pdfium(String),

    #[error("Document conversion failed: {0}")]
    Converter(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Text file is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("No images were extracted from the file")]
    NoPagesExtracted,

    #[error("Text content is too short or empty ({chars} characters, minimum {MIN_TEXT_CHARS})")]
    TextTooShort { chars: usize },

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl RenderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RenderError::UnsupportedFormat(_) | RenderError::TextTooShort { .. } => {
                FailureKind::Validation
            }
            RenderError::NoPagesExtracted | RenderError::Conversion(_) => FailureKind::Conversion,
        }
    }
}

/// Supported upload formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Doc,
    Txt,
    Png,
    Jpeg,
}

impl DocumentFormat {
    /// Parses an extension with or without the leading dot, case-insensitively.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            "txt" => Some(Self::Txt),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// One page ready for transport to the vision model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl PageImage {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "image/jpeg",
        }
    }

    /// `data:` URL carrying the base64-encoded bytes.
    pub fn data_url(&self) -> String {
        encode::data_url(self.mime_type, &self.bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedDocument {
    Pages(Vec<PageImage>),
    TextBody(String),
}

/// Dispatches a saved upload to the right conversion path.
pub struct ImagePipeline<'a> {
    rasterizer: &'a dyn PageRasterizer,
    converter: &'a dyn DocumentConverter,
}

impl<'a> ImagePipeline<'a> {
    pub fn new(rasterizer: &'a dyn PageRasterizer, converter: &'a dyn DocumentConverter) -> Self {
        Self {
            rasterizer,
            converter,
        }
    }

    pub async fn render(&self, path: &Path) -> Result<RenderedDocument, RenderError> {
        let format = DocumentFormat::from_path(path).ok_or_else(|| {
            RenderError::UnsupportedFormat(
                path.extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_else(|| "(none)".to_string()),
            )
        })?;
        info!("Rendering {} as {:?}", path.display(), format);

        match format {
            DocumentFormat::Pdf => self.rasterize_pdf(path).await,
            DocumentFormat::Docx | DocumentFormat::Doc => {
                // Dropping the TempDir removes the intermediate PDF on every path out.
                let scratch = TempDir::new().map_err(ConversionError::from)?;
                let pdf_path = self.converter.convert_to_pdf(path, scratch.path()).await?;
                debug!("Converted {} → {}", path.display(), pdf_path.display());
                self.rasterize_pdf(&pdf_path).await
            }
            DocumentFormat::Txt => read_text_body(path).await,
            DocumentFormat::Png | DocumentFormat::Jpeg => {
                let bytes = tokio::fs::read(path).await.map_err(ConversionError::from)?;
                info!("Image size: {:.2} KB", bytes.len() as f64 / 1024.0);
                let mime_type = if format == DocumentFormat::Png {
                    "image/png"
                } else {
                    "image/jpeg"
                };
                Ok(RenderedDocument::Pages(vec![PageImage { bytes, mime_type }]))
            }
        }
    }

    async fn rasterize_pdf(&self, pdf_path: &Path) -> Result<RenderedDocument, RenderError> {
        let options = RasterOptions {
            dpi: RENDER_DPI,
            max_pages: MAX_PAGES,
        };
        let mut images = self.rasterizer.render_pages(pdf_path, &options).await?;
        info!("Rasterized {} page(s)", images.len());
        images.truncate(MAX_PAGES);

        if images.is_empty() {
            return Err(RenderError::NoPagesExtracted);
        }

        let pages = tokio::task::spawn_blocking(move || {
            images
                .iter()
                .map(|img| encode_jpeg(img, JPEG_QUALITY).map(PageImage::jpeg))
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(|e| ConversionError::Task(format!("JPEG encode task panicked: {e}")))?
        .map_err(ConversionError::from)?;

        for (idx, page) in pages.iter().enumerate() {
            debug!("Page {} size: {:.2} KB", idx + 1, page.bytes.len() as f64 / 1024.0);
        }

        Ok(RenderedDocument::Pages(pages))
    }
}

async fn read_text_body(path: &Path) -> Result<RenderedDocument, RenderError> {
    let bytes = tokio::fs::read(path).await.map_err(ConversionError::from)?;
    let text = String::from_utf8(bytes).map_err(ConversionError::from)?;
    let chars = text.trim().chars().count();
    info!("Read {} characters of text", chars);

    if chars < MIN_TEXT_CHARS {
        return Err(RenderError::TextTooShort { chars });
    }
    Ok(RenderedDocument::TextBody(text))
}
