mod commands;
mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ledgerly",
    version,
    about = "Turn bank statement PDFs into spreadsheet reports"
)]
struct Cli {
    /// Log pipeline decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
pub struct LayoutArgs {
    /// Predefined layout: standard, slash (default: standard)
    #[arg(short, long = "preset", value_name = "NAME")]
    pub preset: Option<String>,

    /// Custom JSON layout file (overrides --preset)
    #[arg(short, long = "layout", value_name = "FILE")]
    pub layout: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExtractorArgs {
    /// Java runtime used to run tabula
    #[arg(long, env = "TABULA_JAVA", default_value = "java")]
    pub java: PathBuf,

    /// Path to the tabula-java jar
    #[arg(long = "tabula-jar", env = "TABULA_JAR", default_value = "tabula.jar")]
    pub tabula_jar: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a statement (PDF or pre-extracted tables JSON) into an .xlsx report
    Convert {
        /// Path to statement PDF or tables JSON
        input_file: PathBuf,

        /// Where to write the report (default: <stem>.xlsx next to the input)
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Directory for per-run temporary files (default: system temp dir)
        #[arg(long, value_name = "DIR")]
        staging_dir: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,

        #[command(flatten)]
        extractor: ExtractorArgs,
    },
    /// Parse a statement into a ledger and summary (without writing a report)
    Parse {
        /// Path to statement PDF or tables JSON
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed output to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,

        #[command(flatten)]
        extractor: ExtractorArgs,
    },
    /// Manage and inspect statement layouts
    Layouts {
        #[command(subcommand)]
        action: LayoutsAction,
    },
}

#[derive(Subcommand)]
enum LayoutsAction {
    /// List predefined layouts
    List,
    /// Explain a layout in plain language
    Explain {
        /// Preset name (e.g., "standard")
        preset: String,
    },
    /// Print the JSON schema with field descriptions and example
    Schema,
    /// Validate a custom layout file
    Validate {
        /// Path to JSON layout file
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            input_file,
            out,
            staging_dir,
            layout,
            extractor,
        } => commands::convert::run(input_file, out, staging_dir, &layout, &extractor),
        Commands::Parse {
            input_file,
            output,
            out,
            layout,
            extractor,
        } => commands::parse::run(input_file, &output, out, &layout, &extractor),
        Commands::Layouts { action } => match action {
            LayoutsAction::List => commands::layouts::list(),
            LayoutsAction::Explain { preset } => commands::layouts::explain(&preset),
            LayoutsAction::Schema => commands::layouts::schema(),
            LayoutsAction::Validate { file } => commands::layouts::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
