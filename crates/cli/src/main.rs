// SocMap - SoC Interconnect Configuration Compiler
// Copyright (C) 2026 SocMap Project
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use clap::{Parser, Subcommand};
use socmap_codegen::{
    generate_address_map, generate_driver_header, generate_linker_script,
    generate_reachability_dump,
};
use socmap_config::{DirRecordProvider, SystemRecord};
use socmap_core::Soc;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

const EXIT_OK: u8 = 0;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_OUTPUT_ERROR: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "SoC interconnect address-map compiler",
    long_about = None
)]
struct Cli {
    /// Path to the system record (YAML)
    #[arg(short, long)]
    system: PathBuf,

    /// Directory holding the per-bus config_<name>.yaml records
    #[arg(short, long)]
    config_dir: PathBuf,

    /// Enable verbose compilation tracing
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile and validate the address map without emitting artifacts.
    Check,

    /// Emit the GNU linker script.
    LinkerScript(OutputArgs),

    /// Emit the C driver header.
    Header(OutputArgs),

    /// Emit the reachability matrix (CSV).
    Dump(OutputArgs),

    /// Emit the resolved address map (JSON); stdout unless -o is given.
    Map(MapArgs),
}

#[derive(Parser, Debug)]
struct OutputArgs {
    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Parser, Debug)]
struct MapArgs {
    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn compile(cli: &Cli) -> anyhow::Result<Soc> {
    let system = SystemRecord::from_file(&cli.system)?;
    let provider = DirRecordProvider::new(&cli.config_dir);
    Soc::build(system, &provider)
}

fn write_artifact(path: &Path, content: &str) -> ExitCode {
    if let Err(e) = std::fs::write(path, content) {
        error!("Failed to write {:?}: {}", path, e);
        return ExitCode::from(EXIT_OUTPUT_ERROR);
    }
    info!("Wrote {:?}", path);
    ExitCode::from(EXIT_OK)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for piped artifacts.
    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(std::io::stderr)
            .init();
    }

    // Any validation failure aborts before a single artifact is written.
    let soc = match compile(&cli) {
        Ok(soc) => soc,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let (artifact, output) = match &cli.command {
        Commands::Check => {
            info!("address map is valid");
            return ExitCode::from(EXIT_OK);
        }
        Commands::LinkerScript(args) => (generate_linker_script(&soc), Some(&args.output)),
        Commands::Header(args) => (generate_driver_header(&soc), Some(&args.output)),
        Commands::Dump(args) => (generate_reachability_dump(&soc), Some(&args.output)),
        Commands::Map(args) => (generate_address_map(&soc), args.output.as_ref()),
    };

    let content = match artifact {
        Ok(content) => content,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };
    match output {
        Some(path) => write_artifact(path, &content),
        None => {
            println!("{content}");
            ExitCode::from(EXIT_OK)
        }
    }
}
