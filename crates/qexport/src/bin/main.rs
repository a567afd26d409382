//! Questionnaire export command-line interface

use clap::{Parser, Subcommand};
use qexport::cli::{export, output, reachable};
use std::path::PathBuf;

/// Questionnaire export tool
#[derive(Parser)]
#[command(name = "qexport")]
#[command(author, version, about = "Conditional questionnaire exports", long_about = None)]
struct Cli {
    /// Verbose output (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export answers and codebooks of a study into a zip archive
    Export {
        /// Data snapshot (JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Archive to write (`-` for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Export options file (JSON)
        #[arg(long = "options")]
        options_file: Option<PathBuf>,

        /// Study name
        #[arg(short, long)]
        study: Option<String>,

        /// Questionnaire versions (id:version)
        #[arg(short, long = "questionnaire")]
        questionnaires: Vec<String>,

        /// Features to export (answers, codebook)
        #[arg(short = 'F', long = "feature")]
        features: Vec<String>,

        /// Participants to include
        #[arg(short, long = "participant")]
        participants: Vec<String>,

        /// CSV delimiter
        #[arg(long)]
        delimiter: Option<char>,

        /// Offset of exported dates from UTC in minutes
        #[arg(long, allow_hyphen_values = true)]
        utc_offset: Option<i32>,

        /// Abort the export after this many seconds
        #[arg(long = "timeout-secs")]
        timeout: Option<u64>,
    },

    /// List the questions of a questionnaire that conditions do not rule out
    Reachable {
        /// Data snapshot (JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Questionnaire version (id:version)
        questionnaire: String,

        /// Pretty-print output
        #[arg(short, long)]
        pretty: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let result = match cli.command {
        Commands::Export {
            data,
            output,
            options_file,
            study,
            questionnaires,
            features,
            participants,
            delimiter,
            utc_offset,
            timeout,
        } => {
            let config = export::ExportConfig {
                options_file,
                study,
                data,
                output_file: output,
                questionnaires,
                features,
                participants,
                delimiter,
                utc_offset_minutes: utc_offset,
                timeout_secs: timeout,
                verbose: cli.verbose > 0,
            };
            export::export(config).await
        }

        Commands::Reachable {
            data,
            questionnaire,
            pretty,
            output,
        } => {
            let config = reachable::ReachableConfig {
                data,
                questionnaire,
                pretty,
                output_file: output,
            };
            reachable::reachable(config).await
        }
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
