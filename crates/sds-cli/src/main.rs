mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sds",
    version,
    about = "Safety data sheet extraction tool for CFF/HP template families"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one safety data sheet PDF into a structured record
    Parse {
        /// Path to PDF file
        input_file: PathBuf,

        /// Template mode: cff-ko, cff-en, hp-ko or hp-en
        #[arg(short, long)]
        mode: String,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the record to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Parse a batch of PDFs; one document failing never aborts the rest
    Batch {
        /// Paths to PDF files
        input_files: Vec<PathBuf>,

        /// Template mode: cff-ko, cff-en, hp-ko or hp-en
        #[arg(short, long)]
        mode: String,

        /// Directory to write one JSON record per input file
        #[arg(short = 'O', long = "out-dir", value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
    /// List the supported template modes
    Modes,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            input_file,
            mode,
            output,
            out,
        } => commands::parse::run(input_file, &mode, &output, out),
        Commands::Batch {
            input_files,
            mode,
            out_dir,
        } => commands::batch::run(input_files, &mode, out_dir),
        Commands::Modes => commands::modes::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
