use clap::{Parser, Subcommand};
use miette::{miette, Result};
use std::path::PathBuf;

use recomp_tracker::cli::{self, OptionArgs};

#[derive(Parser)]
#[command(name = "recomp-tracker")]
#[command(about = "Recomposition tracking instrumentation for reactive render functions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inject tracker calls into a source file
    Instrument {
        /// Input Rust source file
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Report declarations, call edges and the instrumentation closure
    Analyze {
        /// Input Rust source file
        input: PathBuf,

        /// Output format (json, text)
        #[arg(short, long, default_value = "json")]
        format: String,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Export the render-function call graph
    Graph {
        /// Input Rust source file
        input: PathBuf,

        /// Output DOT file (defaults to stdout)
        #[arg(short, long)]
        dot: Option<PathBuf>,

        #[command(flatten)]
        options: OptionArgs,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Instrument {
            input,
            output,
            options,
        } => {
            let options = options.resolve().map_err(|e| miette!("{}", e))?;
            cli::instrument::instrument(&input, output.as_deref(), options)
                .map_err(miette::Report::new)
        }
        Commands::Analyze {
            input,
            format,
            options,
        } => {
            let options = options.resolve().map_err(|e| miette!("{}", e))?;
            cli::analyze::analyze(&input, &format, options).map_err(miette::Report::new)
        }
        Commands::Graph {
            input,
            dot,
            options,
        } => {
            let options = options.resolve().map_err(|e| miette!("{}", e))?;
            cli::graph::graph(&input, dot.as_deref(), options).map_err(miette::Report::new)
        }
    }
}
