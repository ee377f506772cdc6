//! Batch configuration
//!
//! Every path and constant the pipeline needs lives here. Defaults mirror the
//! on-disk layout the certificate design was built around, relative to a base
//! directory (usually the working directory).

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Which chart layout the batch produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineVariant {
    /// Up to four rounds, `{id}_courbe{n}` charts, mission type column required
    #[default]
    MultiChart,
    /// A single `{id}_courbe` chart, page 2 always emitted
    SingleChart,
}

impl PipelineVariant {
    /// Highest round number probed for charts
    pub fn max_rounds(self) -> u8 {
        match self {
            PipelineVariant::MultiChart => 4,
            PipelineVariant::SingleChart => 1,
        }
    }

    /// File stem (without extension) of the chart for `round`
    pub fn chart_stem(self, identifier: &str, round: u8) -> String {
        match self {
            PipelineVariant::MultiChart => format!("{}_courbe{}", identifier, round),
            PipelineVariant::SingleChart => format!("{}_courbe", identifier),
        }
    }

    /// Whether page 2 is drawn even when no chart was found
    pub fn always_emits_chart_page(self) -> bool {
        matches!(self, PipelineVariant::SingleChart)
    }

    /// Whether the mission type column must be present in the table
    pub fn requires_mission_type(self) -> bool {
        matches!(self, PipelineVariant::MultiChart)
    }
}

/// Column headers of the participant table
#[derive(Debug, Clone)]
pub struct ColumnNames {
    pub identifier: String,
    pub last_name: String,
    pub first_name: String,
    pub registration_date: String,
    pub mission_type: String,
    /// Optional plain mission text, used when no mission type is given
    pub mission: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            identifier: "ID".to_string(),
            last_name: "Nom".to_string(),
            first_name: "Prénom".to_string(),
            registration_date: "Date d'enregistrement".to_string(),
            mission_type: "Type de mission".to_string(),
            mission: "Mission".to_string(),
        }
    }
}

impl ColumnNames {
    /// Headers that must exist for `variant`, in table order of importance
    pub fn required(&self, variant: PipelineVariant) -> Vec<&str> {
        let mut required = vec![
            self.identifier.as_str(),
            self.last_name.as_str(),
            self.first_name.as_str(),
            self.registration_date.as_str(),
        ];
        if variant.requires_mission_type() {
            required.push(self.mission_type.as_str());
        }
        required
    }
}

/// Fixed strings printed on every certificate
#[derive(Debug, Clone)]
pub struct CertificateText {
    pub instructor: String,
    pub aircraft: String,
    pub map: String,
    /// Mission type shown when a record has none
    pub default_mission_type: String,
}

impl Default for CertificateText {
    fn default() -> Self {
        Self {
            instructor: "ARESIA".to_string(),
            aircraft: "M-2000C".to_string(),
            map: "Caucasus".to_string(),
            default_mission_type: "AIR - GROUND".to_string(),
        }
    }
}

/// Configuration for one batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Participant table (`.xlsx`, `.xls`, `.xlsm`, `.ods` or `.csv`)
    pub table_path: PathBuf,
    /// Static template PDF
    pub template_path: PathBuf,
    /// TrueType font used for every string
    pub font_path: PathBuf,
    pub photos_dir: PathBuf,
    pub charts_dir: PathBuf,
    pub output_dir: PathBuf,
    pub variant: PipelineVariant,
    pub columns: ColumnNames,
    pub text: CertificateText,
    /// Recompress output through qpdf (default: true)
    pub optimize_output: bool,
    /// Extra directory searched first for the PDFium shared library
    pub pdfium_dir: Option<PathBuf>,
    /// Where to write the JSON run summary, if anywhere
    pub summary_path: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::with_base_dir(".")
    }
}

impl BatchConfig {
    /// Default layout rooted at `base`
    pub fn with_base_dir<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        let data = base.join("data");
        Self {
            table_path: data.join("visiteurs-aresia.xlsx"),
            template_path: data.join("template.pdf"),
            font_path: base.join("fonts").join("Comfortaa-Regular.ttf"),
            photos_dir: data.join("photos"),
            charts_dir: data.join("courbes"),
            output_dir: base.join("output"),
            variant: PipelineVariant::default(),
            columns: ColumnNames::default(),
            text: CertificateText::default(),
            optimize_output: true,
            pdfium_dir: None,
            summary_path: None,
        }
    }

    /// Check startup preconditions that do not require opening documents
    pub fn validate(&self) -> Result<()> {
        if !self.font_path.is_file() {
            return Err(Error::FontNotFound {
                path: self.font_path.display().to_string(),
            });
        }
        Ok(())
    }
}
