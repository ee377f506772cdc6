//! Template merging with PDFium
//!
//! Builds each certificate as a fresh document: template pages are copied in
//! the order given by the [`PagePlan`], and overlay draw operations are
//! replayed on top of the pages that call for them.

use crate::error::{Error, Result};
use crate::fields::Anomaly;
use crate::overlay::{DrawOp, Overlay, OverlayPage};
use crate::pdf::plan::{PagePlan, PageSource};
use crate::source::{ResolvedFont, ResolvedTemplate};
use pdfium_render::prelude::*;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Bind to the PDFium library.
///
/// Looks in `extra_dir` first, then the working directory, `/opt/pdfium/lib`
/// and finally the system library path.
pub fn create_pdfium(extra_dir: Option<&Path>) -> Result<Pdfium> {
    let extra = extra_dir
        .map(|dir| dir.to_string_lossy().to_string())
        .into_iter();

    let candidates = extra.chain(["./".to_string(), "/opt/pdfium/lib".to_string()]);

    let mut last_error = None;
    for dir in candidates {
        match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir)) {
            Ok(bindings) => return Ok(Pdfium::new(bindings)),
            Err(e) => last_error = Some(e),
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| Error::Pdfium {
        reason: format!(
            "Failed to initialize PDFium: {} (last path error: {})",
            e,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        ),
    })?;

    Ok(Pdfium::new(bindings))
}

fn map_pdfium_error(err: PdfiumError) -> Error {
    Error::Pdfium {
        reason: format!("{}", err),
    }
}

/// A merged certificate and the images PDFium could not place in it
#[derive(Debug)]
pub struct RenderedCertificate {
    pub pdf: Vec<u8>,
    pub anomalies: Vec<Anomaly>,
}

/// Merges overlays onto the shared template
pub struct CertificateRenderer {
    pdfium: Pdfium,
    template: Vec<u8>,
    template_pages: usize,
    font: Vec<u8>,
    font_name: String,
    /// Size of pages appended without a template page behind them
    page_size: (f32, f32),
}

impl CertificateRenderer {
    /// Open the template once to validate it and count its pages
    pub fn new(
        pdfium: Pdfium,
        template: ResolvedTemplate,
        font: ResolvedFont,
        page_size: (f32, f32),
    ) -> Result<Self> {
        let template_pages = {
            let document = pdfium
                .load_pdf_from_byte_slice(&template.data, None)
                .map_err(|e| Error::InvalidPdf {
                    reason: format!("{}: {}", template.source_name, e),
                })?;
            document.pages().len() as usize
        };

        if template_pages == 0 {
            return Err(Error::InvalidPdf {
                reason: format!("{} has no pages", template.source_name),
            });
        }

        tracing::debug!(
            template = %template.source_name,
            font = %font.source_name,
            pages = template_pages,
            "Template loaded"
        );

        Ok(Self {
            pdfium,
            template: template.data,
            template_pages,
            font: font.data,
            font_name: font.source_name,
            page_size,
        })
    }

    pub fn template_pages(&self) -> usize {
        self.template_pages
    }

    pub fn pdfium(&self) -> &Pdfium {
        &self.pdfium
    }

    /// Produce the certificate described by `plan`.
    ///
    /// A font PDFium cannot load is reported as [`Error::InvalidFont`], which
    /// is fatal for the run since every record shares it.
    pub fn render(&self, overlay: &Overlay, plan: &PagePlan) -> Result<RenderedCertificate> {
        let template = self
            .pdfium
            .load_pdf_from_byte_slice(&self.template, None)
            .map_err(map_pdfium_error)?;

        let mut document = self.pdfium.create_new_pdf().map_err(map_pdfium_error)?;
        let font = document
            .fonts_mut()
            .load_true_type_from_bytes(&self.font, false)
            .map_err(|e| Error::InvalidFont {
                path: self.font_name.clone(),
                reason: e.to_string(),
            })?;

        let mut anomalies = Vec::new();

        for (dest, source) in plan.pages.iter().enumerate() {
            let dest_index = dest as PdfPageIndex;

            let overlay_index = match *source {
                PageSource::Composite {
                    template: page,
                    overlay,
                } => {
                    self.copy_template_page(&mut document, &template, page, dest_index)?;
                    Some(overlay)
                }
                PageSource::Template { template: page } => {
                    self.copy_template_page(&mut document, &template, page, dest_index)?;
                    None
                }
                PageSource::OverlayOnly { overlay } => {
                    let (width, height) = self.page_size;
                    document
                        .pages_mut()
                        .create_page_at_end(PdfPagePaperSize::Custom(
                            PdfPoints::new(width),
                            PdfPoints::new(height),
                        ))
                        .map_err(map_pdfium_error)?;
                    Some(overlay)
                }
            };

            if let Some(index) = overlay_index {
                let ops = overlay.page(index).ok_or_else(|| Error::Pdfium {
                    reason: format!(
                        "Overlay page {} requested but only {} composed",
                        index + 1,
                        overlay.page_count()
                    ),
                })?;
                let mut page = document
                    .pages()
                    .get(dest_index)
                    .map_err(map_pdfium_error)?;
                anomalies.extend(draw_page(&mut page, ops, font)?);
            }
        }

        let pdf = document.save_to_bytes().map_err(map_pdfium_error)?;
        Ok(RenderedCertificate { pdf, anomalies })
    }

    fn copy_template_page(
        &self,
        document: &mut PdfDocument,
        template: &PdfDocument,
        page: usize,
        dest_index: PdfPageIndex,
    ) -> Result<()> {
        if page >= self.template_pages {
            return Err(Error::TemplateMissingPage {
                page: page + 1,
                total: self.template_pages,
            });
        }

        document
            .pages_mut()
            .copy_page_from_document(template, page as PdfPageIndex, dest_index)
            .map_err(map_pdfium_error)
    }
}

/// Replay one overlay page's draw operations onto `page`.
///
/// Text failures abort the record; an image that PDFium refuses to embed
/// leaves its rectangle blank and is returned as an anomaly.
fn draw_page(
    page: &mut PdfPage,
    overlay: &OverlayPage,
    font: PdfFontToken,
) -> Result<Vec<Anomaly>> {
    let mut anomalies = Vec::new();

    for op in &overlay.ops {
        match op {
            DrawOp::Text { text, at, style } => {
                let mut object = page
                    .objects_mut()
                    .create_text_object(
                        PdfPoints::new(at.x),
                        PdfPoints::new(at.y),
                        text,
                        font,
                        PdfPoints::new(style.size),
                    )
                    .map_err(map_pdfium_error)?;
                object
                    .set_fill_color(PdfColor::new(
                        style.color.r,
                        style.color.g,
                        style.color.b,
                        255,
                    ))
                    .map_err(map_pdfium_error)?;
            }
            DrawOp::Image {
                image,
                source,
                rect,
            } => {
                let placed = page.objects_mut().create_image_object(
                    PdfPoints::new(rect.x),
                    PdfPoints::new(rect.y),
                    &**image,
                    Some(PdfPoints::new(rect.width)),
                    Some(PdfPoints::new(rect.height)),
                );
                if let Err(e) = placed {
                    anomalies.push(embed_failure(source, e));
                }
            }
        }
    }

    // Attribute changes made after an object was added (fill colour) only
    // reach the content stream on regeneration
    page.regenerate_content().map_err(map_pdfium_error)?;

    Ok(anomalies)
}

fn embed_failure(source: &Path, reason: impl Display) -> Anomaly {
    tracing::warn!(
        path = %source.display(),
        error = %reason,
        "Failed to embed image, leaving its area blank"
    );
    Anomaly::ImageEmbedFailed {
        path: PathBuf::from(source),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_failure_names_the_image() {
        let anomaly = embed_failure(Path::new("data/courbes/42_courbe1.png"), "bitmap too large");
        assert_eq!(
            anomaly,
            Anomaly::ImageEmbedFailed {
                path: PathBuf::from("data/courbes/42_courbe1.png"),
                reason: "bitmap too large".to_string(),
            }
        );
    }

    #[test]
    fn test_embedding_errors_land_in_the_summary_shape() {
        let anomaly = embed_failure(Path::new("photos/7.jpg"), "out of memory");
        let json = serde_json::to_value(&anomaly).unwrap();
        assert_eq!(json["kind"], "image_embed_failed");
        assert_eq!(json["path"], "photos/7.jpg");
    }
}
