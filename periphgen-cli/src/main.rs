//! periphgen CLI - validate STM32 peripheral descriptions and generate HAL init code.

use clap::{Parser, Subcommand, ValueEnum};
use periphgen::{
    GenerationError, Issue, PeriphGen, PeriphGenError, RulesEngine, Severity, ValidationOptions,
    ValidationReport, ValidationResult,
};
use std::path::{Path, PathBuf};
use std::process;

const EXIT_OK: i32 = 0;
const EXIT_INVALID: i32 = 1;
const EXIT_PARSE: i32 = 2;
const EXIT_INTERNAL: i32 = 3;

#[derive(Parser)]
#[command(name = "periphgen")]
#[command(about = "STM32 peripheral description validator and HAL code generator", long_about = None)]
#[command(version)]
struct Cli {
    /// Log verbosity (logs go to stderr)
    #[arg(long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate HAL initialization source from a description
    Generate {
        /// Path to the YAML peripheral description
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Output file, or `-` for stdout
        #[arg(short, long, value_name = "FILE", default_value = "peripheral_init.c")]
        output: PathBuf,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Validate a description, or every description under a directory
    Validate {
        /// Path to a YAML description or a directory of them
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Run only the given rule (repeatable)
        #[arg(long = "rule", value_name = "ID")]
        rules: Vec<String>,
    },

    /// Print an overview of the configured peripherals
    Summary {
        /// Path to the YAML peripheral description
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: SummaryFormat,
    },

    /// List available validation rules
    Rules {
        /// Show detailed rule descriptions
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
    /// GitHub Actions format
    Github,
    /// GitLab CI format
    Gitlab,
}

#[derive(Clone, ValueEnum)]
enum SummaryFormat {
    Human,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::from(cli.log_level))
        .init();

    let exit_code = match cli.command {
        Commands::Generate {
            config,
            output,
            strict,
        } => handle_generate(&config, &output, strict),
        Commands::Validate {
            config,
            format,
            strict,
            rules,
        } => handle_validate(&config, format, ValidationOptions { strict, rules }),
        Commands::Summary { config, format } => handle_summary(&config, format),
        Commands::Rules { verbose } => {
            handle_rules(verbose);
            EXIT_OK
        }
    };

    process::exit(exit_code);
}

fn exit_code_for(err: &PeriphGenError) -> i32 {
    match err {
        PeriphGenError::Parse(_) => EXIT_PARSE,
        PeriphGenError::Generation(GenerationError::Blocked(_)) => EXIT_INVALID,
        PeriphGenError::Io(_) | PeriphGenError::Generation(_) => EXIT_INTERNAL,
    }
}

fn report_failure(err: &PeriphGenError) -> i32 {
    if let Some(report) = err.blocking_report() {
        for issue in report.issues() {
            eprintln!("{}", issue);
        }
    }
    eprintln!("Error: {}", err);
    exit_code_for(err)
}

fn handle_generate(config: &Path, output: &Path, strict: bool) -> i32 {
    let options = ValidationOptions {
        strict,
        ..Default::default()
    };

    let to_stdout = output.as_os_str() == "-";
    let result = if to_stdout {
        PeriphGen::load(config).and_then(|parsed| PeriphGen::generate(&parsed, &options))
    } else {
        PeriphGen::generate_file(config, output, &options)
    };

    match result {
        Ok(generation) => {
            for issue in generation.report.warnings() {
                eprintln!("{}", issue);
            }
            if to_stdout {
                print!("{}", generation.source);
            } else {
                eprintln!("Wrote {}", output.display());
            }
            EXIT_OK
        }
        Err(e) => report_failure(&e),
    }
}

fn handle_validate(path: &Path, format: OutputFormat, options: ValidationOptions) -> i32 {
    let results = if path.is_dir() {
        PeriphGen::validate_project(path, &options)
    } else {
        PeriphGen::validate_file(path, &options).map(|result| vec![result])
    };

    match results {
        Ok(results) => {
            if let Err(e) = output_results(&results, &format) {
                eprintln!("Error: {}", e);
                return EXIT_INTERNAL;
            }
            if results.iter().all(ValidationResult::passed) {
                EXIT_OK
            } else {
                EXIT_INVALID
            }
        }
        Err(e) => report_failure(&e),
    }
}

fn handle_summary(path: &Path, format: SummaryFormat) -> i32 {
    let config = match PeriphGen::load(path) {
        Ok(config) => config,
        Err(e) => return report_failure(&e),
    };
    let summary = PeriphGen::summarize(&config);

    match format {
        SummaryFormat::Human => println!("{}", summary),
        SummaryFormat::Json => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return EXIT_INTERNAL;
            }
        },
    }
    EXIT_OK
}

fn output_results(results: &[ValidationResult], format: &OutputFormat) -> serde_json::Result<()> {
    match format {
        OutputFormat::Human => output_human(results),
        OutputFormat::Json => output_json(results)?,
        OutputFormat::Github => output_github(results),
        OutputFormat::Gitlab => output_gitlab(results)?,
    }
    Ok(())
}

fn print_issue(issue: &Issue) {
    println!("    - {}", issue.message);
    println!("      Location: {}", issue.location());
    if let Some(related) = &issue.related {
        println!("      Conflicts with: {} ({})", related.path(), related.name);
    }
    if let Some(suggestion) = &issue.suggestion {
        println!("      Suggestion: {}", suggestion);
    }
}

fn output_human(results: &[ValidationResult]) {
    for result in results {
        println!("\nFile: {}", result.file.display());
        println!("{}", "─".repeat(60));

        if result.total_issues() == 0 {
            println!("  No issues found");
            continue;
        }

        let report: &ValidationReport = &result.report;
        let errors: Vec<_> = report.errors().collect();
        let warnings: Vec<_> = report.warnings().collect();

        if !errors.is_empty() {
            println!("\n  ERRORS:");
            for issue in errors {
                print_issue(issue);
            }
        }
        if !warnings.is_empty() {
            println!("\n  WARNINGS:");
            for issue in warnings {
                print_issue(issue);
            }
        }

        println!("\n  Summary:");
        println!("    Errors:   {}", result.stats().errors);
        println!("    Warnings: {}", result.stats().warnings);
    }
}

fn output_json(results: &[ValidationResult]) -> serde_json::Result<()> {
    let output = serde_json::json!({
        "results": results.iter().map(|r| {
            serde_json::json!({
                "file": r.file.display().to_string(),
                "passed": r.passed(),
                "issues": r.report.issues(),
                "stats": r.stats(),
            })
        }).collect::<Vec<_>>(),
        "summary": {
            "total_files": results.len(),
            "total_issues": results.iter().map(|r| r.total_issues()).sum::<usize>(),
            "errors": results.iter().map(|r| r.stats().errors).sum::<usize>(),
            "warnings": results.iter().map(|r| r.stats().warnings).sum::<usize>(),
        }
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn severity_to_github(issue: &Issue) -> &'static str {
    match issue.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

fn output_github(results: &[ValidationResult]) {
    for result in results {
        for issue in result.report.issues() {
            println!(
                "::{} file={},title={}::{}: {}",
                severity_to_github(issue),
                result.file.display(),
                issue.rule_id,
                issue.location(),
                issue.message.replace('\n', " ")
            );
        }
    }
}

fn severity_to_gitlab(issue: &Issue) -> &'static str {
    match issue.severity {
        Severity::Error => "blocker",
        Severity::Warning => "minor",
    }
}

fn output_gitlab(results: &[ValidationResult]) -> serde_json::Result<()> {
    let mut reports = Vec::new();
    for result in results {
        for issue in result.report.issues() {
            reports.push(serde_json::json!({
                "description": format!("{}: {}", issue.location(), issue.message),
                "check_name": issue.rule_id,
                "severity": severity_to_gitlab(issue),
                "location": {
                    "path": result.file.display().to_string(),
                }
            }));
        }
    }
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn handle_rules(verbose: bool) {
    println!("Available validation rules:\n");

    let engine = RulesEngine::with_default_rules();
    for rule in engine.rules() {
        println!("  {}", rule.id());
        println!("    {}", rule.name());
        if verbose {
            println!("    {}", rule.description());
        }
        println!();
    }
}
