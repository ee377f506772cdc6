//! Certificate batch generator - Entry point

use std::path::PathBuf;

use anyhow::{bail, Context};
use certificate_batch::{run_batch, BatchConfig, PipelineVariant};
use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate training certificates from a participant table", long_about = None)]
struct Cli {
    /// Directory holding `data/`, `fonts/` and `output/`
    #[arg(long, default_value = ".", value_hint = ValueHint::DirPath)]
    base_dir: PathBuf,

    /// Participant table (.xlsx, .xls, .ods or .csv)
    #[arg(long, value_hint = ValueHint::FilePath)]
    table: Option<PathBuf>,

    /// Template PDF
    #[arg(long, value_hint = ValueHint::FilePath)]
    template: Option<PathBuf>,

    /// TrueType font used for all text
    #[arg(long, value_hint = ValueHint::FilePath)]
    font: Option<PathBuf>,

    #[arg(long, value_hint = ValueHint::DirPath)]
    photos_dir: Option<PathBuf>,

    #[arg(long, value_hint = ValueHint::DirPath)]
    charts_dir: Option<PathBuf>,

    #[arg(long, value_hint = ValueHint::DirPath)]
    output_dir: Option<PathBuf>,

    /// Chart layout
    #[arg(long, value_enum, default_value_t = VariantOpt::Multi)]
    variant: VariantOpt,

    #[arg(long)]
    instructor: Option<String>,

    #[arg(long)]
    aircraft: Option<String>,

    #[arg(long)]
    map: Option<String>,

    /// Write certificates exactly as PDFium produced them
    #[arg(long, action = ArgAction::SetTrue)]
    no_optimize: bool,

    /// Directory containing the PDFium shared library
    #[arg(long, value_hint = ValueHint::DirPath)]
    pdfium_dir: Option<PathBuf>,

    /// Write a JSON run summary to this path
    #[arg(long, value_hint = ValueHint::FilePath)]
    summary: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum VariantOpt {
    /// Up to four rounds of charts
    Multi,
    /// One chart per participant
    Single,
}

impl From<VariantOpt> for PipelineVariant {
    fn from(opt: VariantOpt) -> Self {
        match opt {
            VariantOpt::Multi => PipelineVariant::MultiChart,
            VariantOpt::Single => PipelineVariant::SingleChart,
        }
    }
}

impl Cli {
    fn into_config(self) -> BatchConfig {
        let mut config = BatchConfig::with_base_dir(&self.base_dir);

        if let Some(table) = self.table {
            config.table_path = table;
        }
        if let Some(template) = self.template {
            config.template_path = template;
        }
        if let Some(font) = self.font {
            config.font_path = font;
        }
        if let Some(dir) = self.photos_dir {
            config.photos_dir = dir;
        }
        if let Some(dir) = self.charts_dir {
            config.charts_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(instructor) = self.instructor {
            config.text.instructor = instructor;
        }
        if let Some(aircraft) = self.aircraft {
            config.text.aircraft = aircraft;
        }
        if let Some(map) = self.map {
            config.text.map = map;
        }

        config.variant = self.variant.into();
        config.optimize_output = !self.no_optimize;
        config.pdfium_dir = self.pdfium_dir;
        config.summary_path = self.summary;
        config
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "certificate_batch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Cli::parse().into_config();
    tracing::info!(table = %config.table_path.display(), "Starting certificate batch");

    let summary = run_batch(config).context("certificate batch aborted")?;

    if !summary.is_success() {
        bail!(
            "{} of {} certificates failed",
            summary.failed.len(),
            summary.failed.len() + summary.generated.len()
        );
    }

    Ok(())
}
