//! Test doubles for the rasterizer and converter seams.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};

use super::convert::DocumentConverter;
use super::pdf::{PageRasterizer, RasterOptions};
use super::ConversionError;

/// Returns `pages` synthetic pages; page `i` is `width_of(i)` pixels wide so
/// tests can check ordering after a JPEG round trip.
pub struct FakeRasterizer {
    pages: usize,
    failure: Option<String>,
    requests: Mutex<Vec<(PathBuf, RasterOptions)>>,
}

impl FakeRasterizer {
    pub fn with_pages(pages: usize) -> Self {
        Self {
            pages,
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            failure: Some(detail.to_string()),
            ..Self::with_pages(0)
        }
    }

    pub fn width_of(index: usize) -> u32 {
        8 * (index as u32 + 1)
    }

    pub fn requests(&self) -> Vec<(PathBuf, RasterOptions)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRasterizer for FakeRasterizer {
    async fn render_pages(
        &self,
        pdf_path: &Path,
        options: &RasterOptions,
    ) -> Result<Vec<DynamicImage>, ConversionError> {
        self.requests
            .lock()
            .unwrap()
            .push((pdf_path.to_path_buf(), *options));

        if let Some(detail) = &self.failure {
            return Err(ConversionError::Pdfium(detail.clone()));
        }

        // Ignores `max_pages` on purpose: the pipeline must enforce the cap itself.
        Ok((0..self.pages)
            .map(|i| {
                DynamicImage::ImageRgb8(RgbImage::from_pixel(
                    Self::width_of(i),
                    8,
                    Rgb([255, 255, 255]),
                ))
            })
            .collect())
    }
}

/// Writes a placeholder PDF into `out_dir` and remembers where.
pub struct FakeConverter {
    fail: bool,
    produced: Mutex<Vec<PathBuf>>,
}

impl FakeConverter {
    pub fn new() -> Self {
        Self {
            fail: false,
            produced: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn produced(&self) -> Vec<PathBuf> {
        self.produced.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentConverter for FakeConverter {
    async fn convert_to_pdf(
        &self,
        input: &Path,
        out_dir: &Path,
    ) -> Result<PathBuf, ConversionError> {
        if self.fail {
            return Err(ConversionError::Converter("soffice exited with 1".to_string()));
        }
        let stem = input.file_stem().unwrap().to_string_lossy().to_string();
        let pdf_path = out_dir.join(format!("{stem}.pdf"));
        tokio::fs::write(&pdf_path, b"%PDF-1.4 converted").await?;
        self.produced.lock().unwrap().push(pdf_path.clone());
        Ok(pdf_path)
    }
}
