//! Certificate batch generator
//!
//! Reads participants from a spreadsheet and produces one personalized PDF
//! certificate each, by drawing per-person values onto a fixed template:
//! - `source`: participant table, template, font, photo and chart lookup
//! - `fields`: date formatting, mission labels, derived display values
//! - `overlay`: layout table and overlay composition
//! - `pdf`: page planning and template merging
//! - `batch`: the per-record driver and run summary

pub mod batch;
pub mod config;
pub mod error;
pub mod fields;
pub mod overlay;
pub mod pdf;
pub mod source;

pub use batch::{run_batch, BatchRunner, BatchSummary, GeneratedCertificate};
pub use config::{BatchConfig, CertificateText, ColumnNames, PipelineVariant};
pub use error::{Error, Result};
