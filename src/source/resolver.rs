//! Resolution of the fixed-path resources shared by every record

use crate::error::{Error, Result};
use std::path::Path;

/// Template PDF loaded into memory
pub struct ResolvedTemplate {
    pub data: Vec<u8>,
    pub source_name: String,
}

/// Font file loaded into memory
pub struct ResolvedFont {
    pub data: Vec<u8>,
    pub source_name: String,
}

/// Read the template PDF and check its header
pub fn resolve_template<P: AsRef<Path>>(path: P) -> Result<ResolvedTemplate> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::TemplateNotFound {
            path: path.display().to_string(),
        });
    }

    let data = std::fs::read(path).map_err(Error::Io)?;

    // Validate PDF header
    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::InvalidPdf {
            reason: format!("{} is not a valid PDF file", path.display()),
        });
    }

    Ok(ResolvedTemplate {
        data,
        source_name: path.display().to_string(),
    })
}

/// Read the TrueType font used for every drawn string
pub fn resolve_font<P: AsRef<Path>>(path: P) -> Result<ResolvedFont> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(Error::FontNotFound {
            path: path.display().to_string(),
        });
    }

    let data = std::fs::read(path).map_err(Error::Io)?;

    Ok(ResolvedFont {
        data,
        source_name: path.display().to_string(),
    })
}
