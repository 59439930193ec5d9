//! Batch processing of PAGE-XML files.
//!
//! Each input file is loaded, repaired, stamped with a provenance
//! `MetadataItem` and written to the output directory under an id derived
//! from the input id. Documents are independent and may be processed in
//! parallel.

use crate::config::{ErrorPolicy, ProcessorConfig};
use crate::error::{Error, Result};
use crate::page::{Document, MetadataItem};
use crate::repair::{repair_document, RepairReport};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// One input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// File id, e.g. `OCR-D-IN_0001`
    pub id: String,
    /// Page id, if known
    pub page_id: Option<String>,
    /// Location of the PAGE-XML file
    pub path: PathBuf,
}

impl InputFile {
    /// An input file whose id is the file stem of `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            id,
            page_id: None,
            path,
        }
    }

    /// Set the page id.
    pub fn with_page_id(mut self, page_id: impl Into<String>) -> Self {
        self.page_id = Some(page_id.into());
        self
    }

    /// Page id used in log messages: the page id if known, else the file id.
    pub fn log_id(&self) -> &str {
        self.page_id.as_deref().unwrap_or(&self.id)
    }
}

/// A successfully processed document.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFile {
    /// Input file id
    pub input_id: String,
    /// Output file id
    pub output_id: String,
    /// Location of the written document
    pub output_path: PathBuf,
    /// Per-segment outcomes
    pub report: RepairReport,
}

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Documents written, in input order
    pub processed: Vec<ProcessedFile>,
    /// Documents that failed, with their input ids, in input order
    pub failed: Vec<(String, Error)>,
}

impl RunSummary {
    /// Whether every document was processed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total number of repaired segments.
    pub fn repaired(&self) -> usize {
        self.processed.iter().map(|f| f.report.repaired()).sum()
    }
}

/// Repairs reading order inconsistencies in a batch of documents.
#[derive(Debug, Clone, Default)]
pub struct RepairProcessor {
    config: ProcessorConfig,
}

impl RepairProcessor {
    /// Tool name recorded in the provenance metadata.
    pub const TOOL: &'static str = "ocrd-repair-inconsistencies";

    /// Create a processor.
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Output id for the input at `index`.
    ///
    /// The input file group in `input_id` is replaced by the output file
    /// group; if the id does not contain it, a sequential id is made.
    pub fn output_file_id(&self, input_id: &str, index: usize) -> String {
        let replaced = if self.config.input_file_grp.is_empty() {
            input_id.to_string()
        } else {
            input_id.replace(&self.config.input_file_grp, &self.config.output_file_grp)
        };
        if replaced == input_id {
            format!("{}_{:04}", self.config.output_file_grp, index + 1)
        } else {
            replaced
        }
    }

    /// Output location for `output_id`.
    pub fn output_path(&self, output_id: &str) -> PathBuf {
        self.config.output_dir.join(format!("{}.xml", output_id))
    }

    /// The provenance entry added to each processed document.
    pub fn metadata_item(&self) -> MetadataItem {
        MetadataItem::processing_step(&self.config.step, Self::TOOL).with_labels(
            "ocrd-tool",
            "parameters",
            self.config.parameter_labels(),
        )
    }

    /// Repair `document` in place and record provenance.
    pub fn process_document(&self, document: &mut Document, page_id: &str) -> Result<RepairReport> {
        let report = repair_document(document, page_id)?;
        document.add_metadata_item(&self.metadata_item());
        Ok(report)
    }

    /// Load, repair and save one input file.
    ///
    /// # Errors
    ///
    /// Fails if the input cannot be loaded, the output exists and
    /// overwriting is disabled, or the output cannot be written.
    pub fn process_file(&self, input: &InputFile, index: usize) -> Result<ProcessedFile> {
        let output_id = self.output_file_id(&input.id, index);
        let output_path = self.output_path(&output_id);
        if !self.config.overwrite && output_path.exists() {
            return Err(Error::OutputExists(output_path));
        }

        let mut document = Document::from_file(&input.path)?;
        let report = self.process_document(&mut document, input.log_id())?;
        log::info!(
            "Page \"{}\": {} repaired, {} unrepairable, {} skipped",
            input.log_id(),
            report.repaired(),
            report.unrepairable(),
            report.skipped()
        );

        ensure_dir(&self.config.output_dir)?;
        document.save(&output_path)?;
        Ok(ProcessedFile {
            input_id: input.id.clone(),
            output_id,
            output_path,
            report,
        })
    }

    /// Process all `inputs`.
    ///
    /// With [`ErrorPolicy::Abort`] the first failure (in input order) is
    /// returned; documents already running in parallel still finish. With
    /// [`ErrorPolicy::Skip`] failures are logged and collected in the
    /// summary.
    pub fn process(&self, inputs: &[InputFile]) -> Result<RunSummary> {
        let results: Vec<Result<ProcessedFile>> = match self.config.jobs {
            1 => self.run_sequential(inputs),
            0 => self.run_parallel(inputs),
            jobs => rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()?
                .install(|| self.run_parallel(inputs)),
        };

        let mut summary = RunSummary::default();
        for (input, result) in inputs.iter().zip(results) {
            match result {
                Ok(file) => summary.processed.push(file),
                Err(e) => match self.config.error_policy {
                    ErrorPolicy::Abort => return Err(e),
                    ErrorPolicy::Skip => {
                        log::error!("Skipping {}: {}", input.path.display(), e);
                        summary.failed.push((input.id.clone(), e));
                    },
                },
            }
        }
        Ok(summary)
    }

    fn run_sequential(&self, inputs: &[InputFile]) -> Vec<Result<ProcessedFile>> {
        let mut results = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            let result = self.process_file(input, index);
            let failed = result.is_err();
            results.push(result);
            if failed && self.config.error_policy == ErrorPolicy::Abort {
                break;
            }
        }
        results
    }

    fn run_parallel(&self, inputs: &[InputFile]) -> Vec<Result<ProcessedFile>> {
        inputs
            .par_iter()
            .enumerate()
            .map(|(index, input)| self.process_file(input, index))
            .collect()
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.as_os_str().is_empty() && !dir.is_dir() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}
