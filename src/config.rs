//! Configuration for a repair run.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Default input file group.
pub const DEFAULT_INPUT_FILE_GRP: &str = "OCR-D-IN";
/// Default output file group.
pub const DEFAULT_OUTPUT_FILE_GRP: &str = "OCR-D-REPAIR";
/// Default workflow step recorded in the provenance metadata.
pub const DEFAULT_STEP: &str = "layout/repair";

/// What to do when a document fails to load, repair or save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failed document.
    #[default]
    Abort,
    /// Log the failure and continue with the next document.
    Skip,
}

/// Repair run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    /// Input file group; replaced in file ids to derive output ids.
    pub input_file_grp: String,

    /// Output file group.
    pub output_file_grp: String,

    /// Directory receiving the output documents.
    pub output_dir: PathBuf,

    /// Processing parameters, recorded in the provenance metadata.
    pub parameters: Map<String, Value>,

    /// Replace existing output files.
    pub overwrite: bool,

    /// Worker threads; 0 uses the rayon default, 1 processes sequentially.
    pub jobs: usize,

    /// Failure handling.
    pub error_policy: ErrorPolicy,

    /// Workflow step name for the provenance metadata.
    pub step: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessorConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            input_file_grp: DEFAULT_INPUT_FILE_GRP.to_string(),
            output_file_grp: DEFAULT_OUTPUT_FILE_GRP.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_FILE_GRP),
            parameters: Map::new(),
            overwrite: false,
            jobs: 1,
            error_policy: ErrorPolicy::Abort,
            step: DEFAULT_STEP.to_string(),
        }
    }

    /// Set the input file group.
    pub fn with_input_file_grp(mut self, grp: impl Into<String>) -> Self {
        self.input_file_grp = grp.into();
        self
    }

    /// Set the output file group.
    pub fn with_output_file_grp(mut self, grp: impl Into<String>) -> Self {
        self.output_file_grp = grp.into();
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Replace all parameters.
    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set one parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Allow replacing existing output files.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set the number of worker threads.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set the failure handling.
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Set the workflow step name.
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = step.into();
        self
    }

    /// Parameters as `(name, value)` strings, in key order.
    ///
    /// String values are taken verbatim; everything else is rendered as
    /// JSON.
    pub fn parameter_labels(&self) -> Vec<(String, String)> {
        self.parameters
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

/// Parse a JSON object of parameters.
pub fn parse_parameters(json: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::Parameter(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(e) => Err(Error::Parameter(e.to_string())),
    }
}

/// Read a JSON object of parameters from `path`.
pub fn load_parameters(path: impl AsRef<Path>) -> Result<Map<String, Value>> {
    let path = path.as_ref();
    log::debug!("Loading parameters from {}", path.display());
    parse_parameters(&fs::read_to_string(path)?)
}

/// Interpret a command-line parameter value: valid JSON is taken as
/// such, anything else as a plain string.
pub fn parse_parameter_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
