//! Batch driver
//!
//! Startup loads every shared resource (font, participant table, template)
//! and fails the whole run if any is unusable. After that each record is
//! processed on its own: a record that fails is logged and reported in the
//! summary while the remaining records carry on.

use crate::config::BatchConfig;
use crate::error::{Error, Result};
use crate::fields::{Anomaly, DerivedFields};
use crate::overlay::{compose, Layout};
use crate::pdf::{create_pdfium, page_plan, CertificateRenderer, QpdfWrapper};
use crate::source::{read_table, resolve_font, resolve_template, ParticipantRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One certificate written to disk
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedCertificate {
    pub identifier: String,
    pub path: PathBuf,
    pub pages: usize,
    /// Rounds whose chart file was found
    pub rounds: Vec<u8>,
    /// Whether the continuation page was kept
    pub continuation_page: bool,
    pub anomalies: Vec<Anomaly>,
}

/// A record that produced no certificate
#[derive(Debug, Clone, Serialize)]
pub struct FailedRecord {
    pub row: usize,
    pub identifier: Option<String>,
    pub reason: String,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub generated: Vec<GeneratedCertificate>,
    pub failed: Vec<FailedRecord>,
}

impl BatchSummary {
    pub fn anomaly_count(&self) -> usize {
        self.generated.iter().map(|c| c.anomalies.len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Write the summary as pretty-printed JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Read the participant table and project it onto records
pub fn load_participants(config: &BatchConfig) -> Result<Vec<ParticipantRecord>> {
    let table = read_table(&config.table_path)?;
    tracing::info!(columns = ?table.headers, "Columns detected in participant table");
    table.participants(&config.columns, config.variant)
}

/// Generates certificates one record at a time
pub struct BatchRunner {
    config: BatchConfig,
    layout: Layout,
    renderer: CertificateRenderer,
}

impl BatchRunner {
    /// Load the font and template, then create the output directory.
    ///
    /// Nothing is written before every shared resource has been validated.
    pub fn new(config: BatchConfig, pdfium: pdfium_render::prelude::Pdfium) -> Result<Self> {
        config.validate()?;
        let font = resolve_font(&config.font_path)?;
        let template = resolve_template(&config.template_path)?;

        let template_pages =
            QpdfWrapper::get_page_count(&template.data).map_err(|e| Error::InvalidPdf {
                reason: format!("{}: {}", template.source_name, e),
            })?;
        tracing::info!(
            template = %template.source_name,
            pages = template_pages,
            "Template opened"
        );

        let layout = Layout::default();
        let renderer = CertificateRenderer::new(pdfium, template, font, layout.page_size)?;

        std::fs::create_dir_all(&config.output_dir)?;

        Ok(Self {
            config,
            layout,
            renderer,
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn renderer(&self) -> &CertificateRenderer {
        &self.renderer
    }

    /// Build and write the certificate for one record
    pub fn generate(&self, record: &ParticipantRecord) -> Result<GeneratedCertificate> {
        let fields = DerivedFields::derive(record, &self.config)?;
        let rounds = fields.rounds_found();

        tracing::info!(
            id = %fields.identifier,
            name = %fields.full_name(),
            "Processing participant"
        );
        tracing::info!(
            mission_type = %fields.mission_type,
            mission_name = %fields.mission_name,
            "Mission resolved"
        );
        tracing::info!(
            raw = ?record.registration_date,
            formatted = %fields.date,
            "Registration date"
        );
        tracing::info!(rounds = ?rounds, total = rounds.len(), "Charts found");

        let overlay = compose(&fields, &self.layout, self.config.variant);
        let plan = page_plan(
            fields.chart_count(),
            overlay.page_count(),
            self.renderer.template_pages(),
        )?;
        tracing::info!(
            continuation_page = plan.include_overlay_page3,
            "Page 3 will be {}",
            if plan.include_overlay_page3 {
                "included"
            } else {
                "suppressed"
            }
        );

        let rendered = self.renderer.render(&overlay, &plan)?;
        let mut pdf = rendered.pdf;
        if self.config.optimize_output {
            pdf = QpdfWrapper::optimize(&pdf)?;
        }

        let path = self.config.output_dir.join(fields.output_file_name());
        std::fs::write(&path, &pdf)?;
        tracing::info!(path = %path.display(), "Certificate generated");

        let mut anomalies = fields.anomalies;
        anomalies.extend(overlay.anomalies);
        anomalies.extend(rendered.anomalies);

        Ok(GeneratedCertificate {
            identifier: fields.identifier,
            path,
            pages: plan.page_count(),
            rounds,
            continuation_page: plan.include_overlay_page3,
            anomalies,
        })
    }

    /// Process every record, isolating per-record failures.
    ///
    /// An error that affects every record (see [`Error::is_fatal`]) stops the
    /// run at the record that hit it.
    pub fn run(&self, records: &[ParticipantRecord]) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();

        for record in records {
            match self.generate(record) {
                Ok(certificate) => summary.generated.push(certificate),
                Err(e) if e.is_fatal() => {
                    tracing::error!(
                        row = record.row,
                        error = %e,
                        generated = summary.generated.len(),
                        "Aborting batch"
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(
                        row = record.row,
                        id = record.identifier.as_deref().unwrap_or("<none>"),
                        error = %e,
                        "Certificate generation failed"
                    );
                    summary.failed.push(FailedRecord {
                        row: record.row,
                        identifier: record.identifier.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            generated = summary.generated.len(),
            failed = summary.failed.len(),
            anomalies = summary.anomaly_count(),
            "All certificates processed"
        );
        Ok(summary)
    }
}

/// Run a complete batch: startup checks, every record, optional summary file
pub fn run_batch(config: BatchConfig) -> Result<BatchSummary> {
    config.validate()?;
    let records = load_participants(&config)?;
    let pdfium = create_pdfium(config.pdfium_dir.as_deref())?;
    let summary_path = config.summary_path.clone();

    let runner = BatchRunner::new(config, pdfium)?;
    let summary = runner.run(&records)?;

    if let Some(path) = summary_path {
        summary.write_json(&path)?;
        tracing::info!(path = %path.display(), "Summary written");
    }

    Ok(summary)
}
