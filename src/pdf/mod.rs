//! PDF layer
//!
//! Page planning is pure; merging uses PDFium and the final clean-up uses
//! qpdf.

mod plan;
mod qpdf;
mod render;

pub use plan::{page_plan, PagePlan, PageSource, CONTINUATION_CHART_THRESHOLD};
pub use qpdf::QpdfWrapper;
pub use render::{create_pdfium, CertificateRenderer, RenderedCertificate};
