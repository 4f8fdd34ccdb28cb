//! nuqasm Command-Line Interface
//!
//! Translates OpenQASM 2 programs into JSON translation units and
//! materializes programs or saved units into circuits.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use nuqasm::NuqasmError;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::SourceArgs;
use commands::translate::TranslateArgs;
use commands::{circuit, translate, version};

/// nuqasm - OpenQASM 2 translator and gate-macro expander
#[derive(Parser)]
#[command(name = "nuqasm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate OpenQASM 2 files into JSON translation units
    Translate(TranslateArgs),

    /// Build a circuit from a program or a saved translation unit
    Circuit {
        /// Input file (OpenQASM 2, or a `.json` translation unit)
        input: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a JSON summary instead of OpenQASM
        #[arg(long)]
        summary: bool,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Translate(args) => translate::execute(&args),

        Commands::Circuit {
            input,
            source,
            output,
            summary,
        } => circuit::execute(&input, &source, output.as_deref(), summary),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        if let Some(err) = e.downcast_ref::<NuqasmError>() {
            let packet = serde_json::to_string(&err.packet())?;
            eprintln!("{packet}");
            std::process::exit(err.errcode());
        }
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
