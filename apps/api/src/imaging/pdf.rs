//! PDF rasterisation via pdfium.
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks for the whole render, so the work runs inside
//! `tokio::task::spawn_blocking` and never on a runtime worker thread.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

use crate::imaging::ConversionError;

/// PDF points per inch; pdfium page sizes are expressed in points.
const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterOptions {
    pub dpi: u32,
    /// Rendering stops after this many pages.
    pub max_pages: usize,
}

/// Renders the pages of a PDF on disk, in page order.
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    async fn render_pages(
        &self,
        pdf_path: &Path,
        options: &RasterOptions,
    ) -> Result<Vec<DynamicImage>, ConversionError>;
}

pub struct PdfiumRasterizer {
    library_dir: Option<PathBuf>,
}

impl PdfiumRasterizer {
    /// `library_dir` holds the pdfium shared library; `None` uses the system lookup path.
    pub fn new(library_dir: Option<PathBuf>) -> Self {
        Self { library_dir }
    }
}

#[async_trait]
impl PageRasterizer for PdfiumRasterizer {
    async fn render_pages(
        &self,
        pdf_path: &Path,
        options: &RasterOptions,
    ) -> Result<Vec<DynamicImage>, ConversionError> {
        let path = pdf_path.to_path_buf();
        let library_dir = self.library_dir.clone();
        let options = *options;

        tokio::task::spawn_blocking(move || {
            render_pages_blocking(&path, library_dir.as_deref(), &options)
        })
        .await
        .map_err(|e| ConversionError::Task(format!("Render task panicked: {e}")))?
    }
}

fn bind_pdfium(library_dir: Option<&Path>) -> Result<Pdfium, ConversionError> {
    let bindings = match library_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ConversionError::Pdfium(format!("failed to load pdfium library: {e:?}")))?;

    Ok(Pdfium::new(bindings))
}

fn render_pages_blocking(
    pdf_path: &Path,
    library_dir: Option<&Path>,
    options: &RasterOptions,
) -> Result<Vec<DynamicImage>, ConversionError> {
    let pdfium = bind_pdfium(library_dir)?;

    let document = pdfium.load_pdf_from_file(pdf_path, None).map_err(|e| {
        ConversionError::Pdfium(format!("failed to open {}: {e:?}", pdf_path.display()))
    })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let render_config =
        PdfRenderConfig::new().scale_page_by_factor(options.dpi as f32 / POINTS_PER_INCH);

    let mut images = Vec::with_capacity(options.max_pages);
    for (idx, page) in pages.iter().enumerate().take(options.max_pages) {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| ConversionError::Pdfium(format!("page {}: {e:?}", idx + 1)))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        images.push(image);
    }

    Ok(images)
}
