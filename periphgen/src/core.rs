//! Pipeline facade shared by the CLI and library users.

use std::path::{Path, PathBuf};

use crate::analyzer::{RulesEngine, ValidationReport, ValidationStats};
use crate::codegen::{CodeEmitter, GenerationError};
use crate::model::PeripheralConfig;
use crate::normalize::normalize;
use crate::parser::{self, ParseError};
use crate::summary::Summary;

#[derive(Debug, thiserror::Error)]
pub enum PeriphGenError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

impl PeriphGenError {
    /// The report that blocked generation, if that is what failed.
    pub fn blocking_report(&self) -> Option<&ValidationReport> {
        match self {
            PeriphGenError::Generation(GenerationError::Blocked(report)) => Some(&**report),
            _ => None,
        }
    }
}

/// Options for validation runs.
#[derive(Clone, Debug, Default)]
pub struct ValidationOptions {
    /// Treat warnings as errors.
    pub strict: bool,
    /// Rule ids to run; empty runs all of them.
    pub rules: Vec<String>,
}

/// Per-file validation result.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub file: PathBuf,
    pub report: ValidationReport,
}

impl ValidationResult {
    pub fn passed(&self) -> bool {
        self.report.passed()
    }

    pub fn stats(&self) -> ValidationStats {
        self.report.stats()
    }

    pub fn total_issues(&self) -> usize {
        self.report.total_issues()
    }
}

/// Generated source together with the (error-free) report it passed.
#[derive(Debug, Clone)]
pub struct Generation {
    pub source: String,
    pub report: ValidationReport,
}

/// Recursively discover YAML peripheral descriptions in a directory.
pub fn discover_config_files(dir: &Path) -> Result<Vec<PathBuf>, PeriphGenError> {
    let mut files = Vec::new();
    walk_dir(dir, &mut files, 0)?;
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>, depth: usize) -> Result<(), PeriphGenError> {
    if depth > 20 {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with('.') || name == "target" || name == "build" {
                continue;
            }
            walk_dir(&path, files, depth + 1)?;
        } else if path.is_file() {
            if let Some("yaml" | "yml") = path.extension().and_then(|s| s.to_str()) {
                files.push(path);
            }
        }
    }
    Ok(())
}

/// Core API used by the CLI.
pub struct PeriphGen;

impl PeriphGen {
    /// Read and parse a peripheral description.
    pub fn load(path: &Path) -> Result<PeripheralConfig, PeriphGenError> {
        Ok(parser::parse_file(path)?)
    }

    pub fn validate(config: &PeripheralConfig, options: &ValidationOptions) -> ValidationReport {
        RulesEngine::with_default_rules().validate(config, options)
    }

    /// Validate a single description file.
    pub fn validate_file(
        path: &Path,
        options: &ValidationOptions,
    ) -> Result<ValidationResult, PeriphGenError> {
        let config = Self::load(path)?;
        let report = Self::validate(&config, options);
        tracing::info!(
            "Validated {}: {} error(s), {} warning(s)",
            path.display(),
            report.stats().errors,
            report.stats().warnings
        );
        Ok(ValidationResult {
            file: path.to_path_buf(),
            report,
        })
    }

    /// Validate every description under a directory. Stops at the first
    /// file that cannot be parsed.
    pub fn validate_project(
        dir: &Path,
        options: &ValidationOptions,
    ) -> Result<Vec<ValidationResult>, PeriphGenError> {
        let files = discover_config_files(dir)?;
        tracing::debug!("Found {} description(s) under {}", files.len(), dir.display());
        files
            .iter()
            .map(|path| Self::validate_file(path, options))
            .collect()
    }

    pub fn summarize(config: &PeripheralConfig) -> Summary {
        Summary::from_config(config)
    }

    /// Validate, normalize and emit. Fails with
    /// [`GenerationError::Blocked`] when validation reports errors.
    pub fn generate(
        config: &PeripheralConfig,
        options: &ValidationOptions,
    ) -> Result<Generation, PeriphGenError> {
        let report = Self::validate(config, options);
        if report.has_errors() {
            return Err(GenerationError::Blocked(Box::new(report)).into());
        }
        let normalized = normalize(config)?;
        let source = CodeEmitter::emit(&report, &normalized)?;
        Ok(Generation { source, report })
    }

    /// Generate from `input` and write the result to `output`. Nothing is
    /// written unless generation succeeds.
    pub fn generate_file(
        input: &Path,
        output: &Path,
        options: &ValidationOptions,
    ) -> Result<Generation, PeriphGenError> {
        let config = Self::load(input)?;
        let generation = Self::generate(&config, options)?;
        std::fs::write(output, &generation.source)?;
        tracing::info!(
            "Wrote {} bytes to {}",
            generation.source.len(),
            output.display()
        );
        Ok(generation)
    }
}
