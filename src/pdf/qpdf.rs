//! qpdf FFI wrapper
//!
//! Structural checks on the template and final clean-up of generated
//! certificates, using the qpdf crate (vendored FFI).

use crate::error::{Error, Result};
use qpdf::{ObjectStreamMode, QPdf};

/// Wrapper for qpdf operations via FFI
pub struct QpdfWrapper;

/// Helper: open a QPdf from memory
fn open_qpdf(data: &[u8]) -> Result<QPdf> {
    QPdf::read_from_memory(data).map_err(map_qpdf_error)
}

/// Map qpdf crate errors to our error types
fn map_qpdf_error(e: qpdf::QPdfError) -> Error {
    Error::QpdfError {
        reason: e.to_string(),
    }
}

impl QpdfWrapper {
    /// Get the page count of a PDF
    pub fn get_page_count(input_data: &[u8]) -> Result<usize> {
        let qpdf = open_qpdf(input_data)?;
        let pages = qpdf.get_num_pages().map_err(map_qpdf_error)?;
        Ok(pages as usize)
    }

    /// Rewrite a PDF with compressed streams and object streams.
    ///
    /// Drops objects no page references, which matters here because every
    /// certificate carries a copy of the template's resources.
    pub fn optimize(input_data: &[u8]) -> Result<Vec<u8>> {
        let qpdf = open_qpdf(input_data)?;

        let mut writer = qpdf.writer();
        writer
            .object_stream_mode(ObjectStreamMode::Generate)
            .compress_streams(true)
            .preserve_unreferenced_objects(false);
        writer.write_to_memory().map_err(map_qpdf_error)
    }
}
