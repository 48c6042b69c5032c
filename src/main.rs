// src/main.rs
use std::path::{Path, PathBuf};

use clap::Parser;
use doc_text_extractor::utils::{self, AppError};
use doc_text_extractor::{get_supported_extensions, DocumentFormat, Extractor, SourceFile};
use serde::Serialize;

/// Command Line Interface for PDF / EPUB text extraction
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Documents to extract (.pdf or .epub)
    #[arg(required_unless_present = "list_extensions")]
    files: Vec<PathBuf>,

    /// Print one JSON record per file instead of raw text
    #[arg(long)]
    json: bool,

    /// Print the supported file extensions and exit
    #[arg(long)]
    list_extensions: bool,

    /// Keep processing remaining files after a failure
    #[arg(short, long)]
    keep_going: bool,
}

/// One line of `--json` output
#[derive(Serialize, Debug)]
struct ExtractionRecord<'a> {
    file: &'a str,
    format: Option<DocumentFormat>,
    chars: usize,
    extracted_at: String,
    text: &'a str,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting with args: {:?}", args);

    if args.list_extensions {
        println!("{}", get_supported_extensions());
        return Ok(());
    }

    // 3. Extract each file in turn
    let extractor: Extractor = Extractor::default();
    let mut success_count = 0usize;
    let mut failure_count = 0usize;

    for path in &args.files {
        match extract_one(&extractor, path, args.json).await {
            Ok(()) => success_count += 1,
            Err(e) => {
                tracing::error!("Failed to extract {}: {}", path.display(), e);
                failure_count += 1;
                if !args.keep_going {
                    return Err(e);
                }
            }
        }
    }

    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);

    ensure_any_succeeded(success_count, failure_count)
}

fn ensure_any_succeeded(success_count: usize, failure_count: usize) -> Result<(), AppError> {
    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!("Failed to extract text from any of {} files", failure_count)));
    }
    Ok(())
}

async fn extract_one(extractor: &Extractor, path: &Path, json: bool) -> Result<(), AppError> {
    let file = SourceFile::from_path(path).await?;
    let text = extractor.extract(&file).await?;

    if json {
        let record = ExtractionRecord {
            file: &file.name,
            format: DocumentFormat::from_file_name(&file.name),
            chars: text.chars().count(),
            extracted_at: chrono::Utc::now().to_rfc3339(),
            text: &text,
        };
        println!("{}", serde_json::to_string(&record)?);
    } else {
        println!("{}", text);
    }
    Ok(())
}
