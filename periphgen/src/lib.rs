//! periphgen - STM32 peripheral descriptions to HAL init code
//!
//! This library reads a YAML description of a board's GPIO pins, UART and
//! I2C instances and timers, validates it against the hardware's rules and
//! generates the matching STM32 Cube HAL initialization source.
//!
//! # Quick Start
//!
//! ```no_run
//! use periphgen::{PeriphGen, ValidationOptions};
//! use std::path::Path;
//!
//! let options = ValidationOptions::default();
//! let result = PeriphGen::validate_file(Path::new("board.yaml"), &options).unwrap();
//!
//! for issue in result.report.issues() {
//!     println!("{}", issue);
//! }
//! ```
//!
//! # Pipeline
//!
//! - **Parser**: YAML to [`PeripheralConfig`], structural errors are fatal
//! - **Analyzer**: rule-based validation into a [`ValidationReport`]
//! - **Normalizer**: defaults, ordering and shared-pin merging
//! - **Code emitter**: deterministic C source

pub mod analyzer;
pub mod codegen;
pub mod core;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod summary;

// Re-export main types
pub use analyzer::{Issue, Rule, RulesEngine, Severity, ValidationReport, ValidationStats};
pub use codegen::{CodeEmitter, GenerationError};
pub use crate::core::{
    discover_config_files, Generation, PeriphGen, PeriphGenError, ValidationOptions,
    ValidationResult,
};
pub use model::{PeripheralConfig, PeripheralKind, PeripheralRef};
pub use normalize::{normalize, NormalizedConfig};
pub use parser::{parse_file, parse_str, ParseError};
pub use summary::Summary;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Issue, PeriphGen, PeriphGenError, PeripheralConfig, Severity, ValidationOptions,
        ValidationReport, ValidationResult,
    };
}
