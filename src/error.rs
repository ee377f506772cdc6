//! Error types for the certificate batch generator

use thiserror::Error;

/// Result type alias for the certificate batch generator
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the certificate batch generator
#[derive(Error, Debug)]
pub enum Error {
    /// Font resource missing at startup
    #[error("Font file not found: {path}")]
    FontNotFound { path: String },

    /// Participant table missing
    #[error("Participant table not found: {path}")]
    TableNotFound { path: String },

    /// Participant table has an extension we cannot read
    #[error("Unsupported table format: {path}")]
    UnsupportedTable { path: String },

    /// Spreadsheet could not be opened or parsed
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// CSV could not be parsed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Participant table has no header row
    #[error("Participant table is empty: {path}")]
    EmptyTable { path: String },

    /// One or more required columns are absent from the header row
    #[error("Missing required columns {missing:?} (found: {found:?})")]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// A row has no usable identifier
    #[error("Row {row} has no identifier")]
    MissingIdentifier { row: usize },

    /// Font file present but PDFium cannot load it
    #[error("Invalid font {path}: {reason}")]
    InvalidFont { path: String, reason: String },

    /// Template document missing
    #[error("Template not found: {path}")]
    TemplateNotFound { path: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// Template lacks a page the merge requires
    #[error("Template has no page {page} (total: {total})")]
    TemplateMissingPage { page: usize, total: usize },

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// qpdf error
    #[error("qpdf error: {reason}")]
    QpdfError { reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error aborts the whole run rather than a single record.
    ///
    /// Startup resources (font, table, template) and the PDF engine itself are
    /// shared by every record, so failing on them stops everything.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::FontNotFound { .. }
            | Error::TableNotFound { .. }
            | Error::UnsupportedTable { .. }
            | Error::Spreadsheet(_)
            | Error::Csv(_)
            | Error::EmptyTable { .. }
            | Error::MissingColumns { .. }
            | Error::InvalidFont { .. }
            | Error::TemplateNotFound { .. }
            | Error::InvalidPdf { .. } => true,
            Error::MissingIdentifier { .. }
            | Error::TemplateMissingPage { .. }
            | Error::Pdfium { .. }
            | Error::QpdfError { .. }
            | Error::Io(_)
            | Error::Serialization(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_errors_are_fatal() {
        assert!(Error::FontNotFound {
            path: "fonts/x.ttf".to_string()
        }
        .is_fatal());
        assert!(Error::MissingColumns {
            missing: vec!["ID".to_string()],
            found: vec![],
        }
        .is_fatal());
        assert!(Error::InvalidFont {
            path: "fonts/x.ttf".to_string(),
            reason: "not a TrueType font".to_string(),
        }
        .is_fatal());
        assert!(Error::TemplateNotFound {
            path: "template.pdf".to_string()
        }
        .is_fatal());
    }

    #[test]
    fn test_record_errors_are_not_fatal() {
        assert!(!Error::MissingIdentifier { row: 3 }.is_fatal());
        assert!(!Error::TemplateMissingPage { page: 1, total: 0 }.is_fatal());
        assert!(!Error::Pdfium {
            reason: "draw failed".to_string()
        }
        .is_fatal());
    }

    #[test]
    fn test_missing_columns_message_lists_both_sides() {
        let err = Error::MissingColumns {
            missing: vec!["Type de mission".to_string()],
            found: vec!["ID".to_string(), "Nom".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("Type de mission"));
        assert!(message.contains("Nom"));
    }
}
