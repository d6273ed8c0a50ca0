//! undocx CLI - DOCX table extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use undocx::{
    extract_dir, parse_file_with_options, CorpusStats, JsonFormat, ParseOptions, TableRecord,
};

#[derive(Parser)]
#[command(name = "undocx")]
#[command(version)]
#[command(about = "Extract tables and their context from DOCX documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract table records from a file or a directory of files
    Extract {
        /// Input DOCX file or directory
        #[arg(value_name = "PATH")]
        input: PathBuf,

        /// Output directory (one JSON file per table)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Context window budget in paragraphs
        #[arg(long, value_name = "N")]
        window: Option<usize>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Fail on the first malformed table instead of skipping it
        #[arg(long)]
        strict: bool,
    },

    /// Convert a document to JSON
    Json {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document information
    Info {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Aggregate statistics over previously extracted records
    Stats {
        /// Directory of extracted JSON records
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Keep only tables with more than one cell, row and column
        #[arg(long)]
        non_trivial: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            window,
            compact,
            strict,
        } => cmd_extract(&input, output.as_deref(), window, compact, strict),
        Commands::Json {
            input,
            output,
            compact,
        } => cmd_json(&input, output.as_deref(), compact),
        Commands::Info { input } => cmd_info(&input),
        Commands::Stats { input, non_trivial } => cmd_stats(&input, non_trivial),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn parse_options(window: Option<usize>, strict: bool) -> ParseOptions {
    let mut options = ParseOptions::default();
    if let Some(size) = window {
        options = options.with_context_window(size);
    }
    if strict {
        options = options.strict();
    }
    options
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    window: Option<usize>,
    compact: bool,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = parse_options(window, strict);

    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_tables", stem))
    });

    if input.is_dir() {
        return cmd_extract_batch(input, &output_dir, &options);
    }

    let records = undocx::extract_file(input, options)?;
    fs::create_dir_all(&output_dir)?;

    let format = json_format(compact);
    for record in &records {
        let path = output_dir.join(format!("{}.json", record.label));
        fs::write(&path, undocx::render::to_json(record, format)?)?;
    }

    println!(
        "{} {} table(s) from {} to {}",
        "Extracted".green().bold(),
        records.len(),
        input.display(),
        output_dir.display()
    );

    Ok(())
}

fn cmd_extract_batch(
    input: &Path,
    output_dir: &Path,
    options: &ParseOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Extracting tables from {}...", input.display()));

    let summary = extract_dir(input, output_dir, options)?;

    pb.finish_and_clear();

    println!("{}", "Batch extraction".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Files processed".bold(), summary.files_ok);
    if summary.files_failed > 0 {
        println!(
            "{}: {}",
            "Files failed".bold(),
            summary.files_failed.to_string().red()
        );
    }
    println!("{}: {}", "Tables extracted".bold(), summary.tables_extracted);
    println!("{}: {}", "Output".bold(), output_dir.display());

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = undocx::parse_file(input)?;
    let json = undocx::render::to_json(&doc, json_format(compact))?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = parse_file_with_options(input, ParseOptions::default())?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Paragraphs".bold(), doc.paragraph_count());
    println!("{}: {}", "Tables".bold(), doc.table_count());

    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref creator) = doc.metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref subject) = doc.metadata.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = doc.metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    Ok(())
}

fn cmd_stats(input: &Path, non_trivial: bool) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_records(input)?;
    if records.is_empty() {
        println!("{}", "No records found".yellow());
        return Ok(());
    }

    let stats = CorpusStats::from_records(&records, non_trivial)?;

    println!("{}", "Corpus statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}", stats);

    Ok(())
}

fn load_records(dir: &Path) -> Result<Vec<TableRecord>, Box<dyn std::error::Error>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let data = fs::read_to_string(&path)?;
        records.push(serde_json::from_str(&data)?);
    }
    Ok(records)
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}
