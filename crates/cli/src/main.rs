//! `rdti-generate` -- batch RDTI document generation from a JSON file.
//!
//! Reads a list of project records (or `{ "projects": [...] }`), writes one
//! DOCX per valid record and prints the batch response as JSON on stdout.
//! Exits non-zero when the batch status is `error`.
//!
//! ```text
//! rdti-generate <input.json> [--check]
//! ```
//!
//! `--check` only runs the strict schema validator and prints its errors.
//!
//! # Environment variables
//!
//! | Variable        | Required | Default                           | Description              |
//! |-----------------|----------|-----------------------------------|--------------------------|
//! | `OUTPUT_DIR`    | no       | `output`                          | Where documents go       |
//! | `TEMPLATE_PATH` | no       | `templates/RDTI_GA_template.docx` | DOCX template            |
//! | `DATE_FORMAT`   | no       | `iso`                             | `iso` or `au`            |

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use rdti_core::dates::DateFormat;
use rdti_core::validation::schema::validate_projects_schema;
use rdti_pipeline::batch::{BatchGenerator, BatchOptions, BatchResponse, BatchStatus};
use rdti_pipeline::render::DocxRenderer;
use rdti_pipeline::storage::LocalStore;
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: rdti-generate <input.json> [--check]";

/// Parsed command line.
#[derive(Debug, PartialEq, Eq)]
struct Args {
    input: PathBuf,
    check: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut input = None;
        let mut check = false;
        for arg in args {
            match arg.as_str() {
                "--check" => check = true,
                flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
                path if input.is_none() => input = Some(PathBuf::from(path)),
                extra => bail!("unexpected argument {extra}\n{USAGE}"),
            }
        }
        let input = input.with_context(|| USAGE.to_string())?;
        Ok(Self { input, check })
    }
}

/// Batch options from `OUTPUT_DIR`, `TEMPLATE_PATH` and `DATE_FORMAT`.
fn options_from_env() -> anyhow::Result<BatchOptions> {
    let output_dir = std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".into());
    let template_path = std::env::var("TEMPLATE_PATH")
        .unwrap_or_else(|_| "templates/RDTI_GA_template.docx".into());
    let date_format =
        DateFormat::from_name(&std::env::var("DATE_FORMAT").unwrap_or_else(|_| "iso".into()))?;
    Ok(BatchOptions::new(output_dir, template_path).with_date_format(date_format))
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let raw = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let input: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", args.input.display()))?;

    if args.check {
        let errors = match validate_projects_schema(&input) {
            Ok(_) => Vec::new(),
            Err(errors) => errors,
        };
        let valid = errors.is_empty();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "valid": valid, "errors": errors }))?
        );
        return Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    let options = options_from_env()?;
    tracing::info!(
        input = %args.input.display(),
        output_dir = %options.output_dir.display(),
        template = %options.template_path.display(),
        "Generating documents"
    );

    let generator = BatchGenerator::new(Arc::new(LocalStore), Arc::new(DocxRenderer::new()));
    let result = generator.generate(&input, &options).await?;
    let response = BatchResponse::from(&result);
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(match response.status {
        BatchStatus::Success => ExitCode::SUCCESS,
        BatchStatus::Error => ExitCode::FAILURE,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the JSON response.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rdti_cli=info,rdti_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Document generation failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Args> {
        Args::parse(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn parses_input_and_check_flag() {
        assert_eq!(
            parse(&["in.json"]).unwrap(),
            Args {
                input: PathBuf::from("in.json"),
                check: false
            }
        );
        assert_eq!(
            parse(&["--check", "in.json"]).unwrap(),
            Args {
                input: PathBuf::from("in.json"),
                check: true
            }
        );
    }

    #[test]
    fn rejects_missing_or_extra_arguments() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["a.json", "b.json"]).is_err());
        assert!(parse(&["--verbose", "a.json"]).is_err());
    }
}
