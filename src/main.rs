use clap::{Parser, Subcommand};
use complyreport::{
    AnalysisResult, ReportError, ReportGenerator, ReportOptions, SummaryResponse, inspect_pdf_path,
    to_analysis_result,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "complyreport")]
#[command(about = "Render compliance analysis results as paginated PDF reports", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an analysis JSON file to PDF.
    Render {
        input: PathBuf,

        /// Treat the input as a raw summarisation backend response.
        #[arg(long)]
        from_summary: bool,

        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[arg(long)]
        file_name: Option<String>,

        #[arg(long)]
        no_metadata: bool,

        /// Write JSONL layout events to this file.
        #[arg(long)]
        debug_log: Option<PathBuf>,
    },

    /// Print version, page count and size of a PDF.
    Inspect { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Render {
            input,
            from_summary,
            output_dir,
            file_name,
            no_metadata,
            debug_log,
        } => {
            let analysis = load_analysis(&input, from_summary)?;
            let mut builder = ReportGenerator::builder();
            if let Some(path) = debug_log {
                builder = builder.debug_log(path);
            }
            let generator = builder.build()?;
            let options = ReportOptions {
                file_name,
                include_metadata: !no_metadata,
                output_dir,
            };
            let saved = generator.generate_report(&analysis, &options)?;
            println!(
                "{} ({} pages, {} bytes)",
                saved.path.display(),
                saved.page_count,
                saved.bytes
            );
        }
        Commands::Inspect { file } => {
            let report = inspect_pdf_path(&file)?;
            println!("version:   {}", report.pdf_version);
            println!("pages:     {}", report.page_count);
            println!("encrypted: {}", report.encrypted);
            println!("bytes:     {}", report.file_size_bytes);
            if let Some(title) = report.title {
                println!("title:     {}", title);
            }
        }
    }
    Ok(())
}

fn load_analysis(input: &Path, from_summary: bool) -> Result<AnalysisResult, ReportError> {
    let json = std::fs::read_to_string(input)?;
    if !from_summary {
        return AnalysisResult::from_json(&json);
    }
    let response = SummaryResponse::from_json(&json)?;
    let filename = response
        .document_analysis
        .as_ref()
        .and_then(|doc| doc.filename.clone())
        .or_else(|| {
            input
                .file_stem()
                .map(|stem| format!("{}.pdf", stem.to_string_lossy()))
        })
        .unwrap_or_default();
    to_analysis_result(&response, &filename)
}
