//! Validate a peripheral description and print the results.
//! Run with: cargo run --example validate_config [path/to/board.yaml]

use periphgen::prelude::*;
use std::path::Path;

fn main() -> Result<(), PeriphGenError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/discovery.yaml".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example validate_config [path/to/board.yaml]");
        std::process::exit(2);
    }

    let result = PeriphGen::validate_file(path, &ValidationOptions::default())?;

    println!("Validation results for: {}", result.file.display());
    println!("Total issues: {}", result.total_issues());
    println!();

    for issue in result.report.issues() {
        println!("  {}", issue);
        if let Some(ref suggestion) = issue.suggestion {
            println!("    Suggestion: {}", suggestion);
        }
    }

    if !result.passed() {
        println!("\nValidation failed ({} error(s)).", result.stats().errors);
        std::process::exit(1);
    }

    let config = PeriphGen::load(path)?;
    println!("\n{}", PeriphGen::summarize(&config));
    Ok(())
}
