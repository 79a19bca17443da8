use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use bgc_tables::batch::parse_directory;
use bgc_tables::collect::{collect_relevant, document_status};
use bgc_tables::config::{ConfigLoader, ResolvedConfig};
use bgc_tables::coordinates::{
    COORDINATES_FILE, GenomeLibrary, SEQUENCES_FILE, collect_coordinates, write_gene_sequences,
};
use bgc_tables::domain::SearchProgram;
use bgc_tables::error::BgcError;
use bgc_tables::output::{CoordinatesSummary, ExtractSummary, JsonOutput, OutputMode};
use bgc_tables::search::{SearchRequest, SearchRunner, SystemSearchRunner};
use bgc_tables::store::TableStore;

#[derive(Parser)]
#[command(name = "bgc-tables")]
#[command(about = "Flatten biosynthetic gene cluster annotation JSON into per-region CSV tables")]
#[command(version, author)]
struct Cli {
    /// Print command results as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (default: ./bgc-tables.json when present)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Extract the six tables from a directory of annotation documents")]
    Extract(ExtractArgs),
    #[command(about = "Check whether a document has records with analysis results")]
    Status(StatusArgs),
    #[command(about = "Copy documents with analysis results out of a results directory")]
    Collect(CollectArgs),
    #[command(about = "Collect query gene coordinates and, optionally, their sequences")]
    Coordinates(CoordinatesArgs),
    #[command(about = "Run the external sequence search tool")]
    Search(SearchArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Directory containing annotation documents
    input_dir: PathBuf,
    /// Directory for the CSV tables (default: ./temp_file)
    output_dir: Option<PathBuf>,
}

#[derive(Args)]
struct StatusArgs {
    document: PathBuf,
}

#[derive(Args)]
struct CollectArgs {
    results_dir: PathBuf,
    destination: PathBuf,
}

#[derive(Args)]
struct CoordinatesArgs {
    /// Annotation results directory holding one `<run>/clusterblast/` per run
    results_dir: PathBuf,
    /// Directory for ctg_coordinates.csv and ctg_sequences.fasta (default: ./temp_file)
    output_dir: Option<PathBuf>,
    /// Directory of genome FASTA files; when given, gene sequences are written too
    #[arg(long)]
    fasta_dir: Option<PathBuf>,
}

#[derive(Args)]
struct SearchArgs {
    #[arg(long)]
    query: PathBuf,
    #[arg(long)]
    db: PathBuf,
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    program: Option<SearchProgram>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            if let Some(err) = report.downcast_ref::<BgcError>() {
                return ExitCode::from(map_exit_code(err));
            }
            ExitCode::from(1)
        }
    }
}

fn map_exit_code(error: &BgcError) -> u8 {
    match error {
        BgcError::InputNotFound(_) | BgcError::NotADirectory(_) => 2,
        BgcError::MissingTool(_) | BgcError::SearchFailed { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract(args) => run_extract(args, &config, output_mode),
        Commands::Status(args) => run_status(args, output_mode),
        Commands::Collect(args) => run_collect(args, &config, output_mode),
        Commands::Coordinates(args) => run_coordinates(args, &config, output_mode),
        Commands::Search(args) => run_search(args, &config, output_mode),
    }
}

fn run_extract(
    args: ExtractArgs,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<ExitCode> {
    let output_dir = args.output_dir.unwrap_or_else(|| config.output_dir.clone());
    let outcome = parse_directory(&args.input_dir, &config.ignore, config.score_selection)?;

    let store = TableStore::new(&output_dir)?;
    let files = store.write_all(&outcome.tables)?;
    let summary = ExtractSummary::new(
        args.input_dir.display().to_string(),
        store.root().to_string(),
        &outcome,
        files.iter().map(|path| path.to_string()).collect(),
    );

    match output_mode {
        OutputMode::Json => JsonOutput::print_extract(&summary).into_diagnostic()?,
        OutputMode::Human => print_extract_summary(&summary),
    }
    Ok(ExitCode::SUCCESS)
}

fn run_status(args: StatusArgs, output_mode: OutputMode) -> miette::Result<ExitCode> {
    let status = document_status(&args.document)?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_status(&status).into_diagnostic()?,
        OutputMode::Human => {
            if status.is_relevant() {
                println!(
                    "{}: {} of {} records with analysis results",
                    status.path,
                    status.analyzable_records.len(),
                    status.records
                );
            } else {
                println!("{}: no analysis results", status.path);
            }
        }
    }
    if status.is_relevant() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn run_collect(
    args: CollectArgs,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<ExitCode> {
    let report = collect_relevant(&args.results_dir, &args.destination, &config.ignore)?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_collect(&report).into_diagnostic()?,
        OutputMode::Human => {
            println!("copied:       {}", report.copied.len());
            println!("not relevant: {}", report.not_relevant.len());
            println!("missing JSON: {}", report.missing.len());
            println!("failed:       {}", report.failed.len());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_coordinates(
    args: CoordinatesArgs,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<ExitCode> {
    let output_dir = args.output_dir.unwrap_or_else(|| config.output_dir.clone());
    let outcome = collect_coordinates(&args.results_dir, &config.ignore)?;

    let store = TableStore::new(&output_dir)?;
    let mut files = vec![store.write_named(COORDINATES_FILE, &outcome.table())?];
    let sequences = match &args.fasta_dir {
        Some(fasta_dir) => {
            let mut library = GenomeLibrary::new(fasta_dir);
            let (path, report) = store.write_with(SEQUENCES_FILE, |file| {
                write_gene_sequences(&outcome.genes, &mut library, file)
            })?;
            files.push(path);
            Some(report)
        }
        None => None,
    };

    let summary = CoordinatesSummary::new(
        args.results_dir.display().to_string(),
        outcome.report,
        sequences,
        files.iter().map(|path| path.to_string()).collect(),
    );
    match output_mode {
        OutputMode::Json => JsonOutput::print_coordinates(&summary).into_diagnostic()?,
        OutputMode::Human => {
            println!("genes:         {}", summary.coordinates.genes);
            println!("files parsed:  {}", summary.coordinates.files_parsed);
            println!("files skipped: {}", summary.coordinates.skipped.len());
            if let Some(sequences) = &summary.sequences {
                println!("sequences:     {}", sequences.written);
                println!("genes skipped: {}", sequences.skipped.len());
            }
            for file in &summary.files {
                println!("written: {file}");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_search(
    args: SearchArgs,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<ExitCode> {
    let program = args.program.unwrap_or(config.search.program);
    let runner = match &config.search.executable {
        Some(executable) => SystemSearchRunner::with_executable(program, executable.clone()),
        None => SystemSearchRunner::new(program),
    };
    let request = SearchRequest {
        query: args.query,
        database: args.db,
        output: args.out,
    };
    let outcome = runner.run(&request)?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_search(&outcome).into_diagnostic()?,
        OutputMode::Human => println!(
            "{} completed, results saved to {}",
            outcome.program, outcome.output
        ),
    }
    Ok(ExitCode::SUCCESS)
}

fn print_extract_summary(summary: &ExtractSummary) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{cyan}bgc-tables summary{reset}");
    println!(
        "{green}documents parsed: {} of {}{reset}",
        summary.report.documents_parsed, summary.report.documents_seen
    );
    println!(
        "{green}records processed: {}{reset}",
        summary.report.records_processed
    );
    for (kind, rows) in &summary.rows {
        println!("  {kind}: {rows} rows");
    }
    if !summary.report.skipped.is_empty() {
        println!("{yellow}skipped files: {}{reset}", summary.report.skipped.len());
        for skipped in &summary.report.skipped {
            println!("{yellow}  {}: {}{reset}", skipped.path, skipped.reason);
        }
    }
    println!("{cyan}tables written to {}{reset}", summary.output_dir);
}
