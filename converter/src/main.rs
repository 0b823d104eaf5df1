//! volreg2itk CLI - Convert AFNI 3dVolreg matrices to ITK transform files
//!
//! # Commands
//!
//! ```bash
//! volreg2itk convert mats.aff12.1D          # Write mats.aff12_mc4d_itk.txt in the current dir
//! volreg2itk convert mats.1D --stdout       # Print the ITK document
//! volreg2itk batch run-*.aff12.1D -o work/  # Convert many files concurrently
//! volreg2itk inspect mats.1D                # Show repacked parameters as JSON
//! volreg2itk serve                          # Start HTTP server (port 3000)
//! volreg2itk config                         # Show effective configuration
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use volreg2itk::api::logs::set_quiet;
use volreg2itk::{
    build_document, convert, convert_batch, convert_file, ConvertOptions, ConverterConfig,
};

#[derive(Parser)]
#[command(name = "volreg2itk")]
#[command(about = "Convert AFNI 3dVolreg affine matrices to ITK transform files", long_about = None)]
struct Cli {
    /// Only print results, no progress logs
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one matrix file
    Convert {
        /// Input matrix file (12 values per row)
        input: PathBuf,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Suffix replacing the input extension
        #[arg(long)]
        suffix: Option<String>,

        /// Print the document instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Convert several matrix files concurrently
    Batch {
        /// Input matrix files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Suffix replacing the input extension
        #[arg(long)]
        suffix: Option<String>,
    },

    /// Print the repacked transforms as JSON
    Inspect {
        /// Input matrix file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    set_quiet(cli.quiet);

    let config = ConverterConfig::from_env();

    let result = match cli.command {
        Commands::Convert {
            input,
            output_dir,
            suffix,
            stdout,
        } => {
            let config = config.with_output_dir(output_dir).with_suffix(suffix);
            cmd_convert(&input, &config, stdout)
        }

        Commands::Batch {
            inputs,
            output_dir,
            suffix,
        } => {
            let config = config.with_output_dir(output_dir).with_suffix(suffix);
            cmd_batch(inputs, &config).await
        }

        Commands::Inspect { input, output } => cmd_inspect(&input, output.as_deref()),

        Commands::Serve { port } => {
            let mut config = config;
            if let Some(p) = port {
                config.port = p;
            }
            volreg2itk::server::start_server(config).await
        }

        Commands::Config => cmd_config(&config),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    config: &ConverterConfig,
    stdout: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if stdout {
        let text = fs::read_to_string(input)?;
        println!("{}", convert(&text)?);
        return Ok(());
    }

    let converted = convert_file(input, &ConvertOptions::from(config))?;
    println!("{}", converted.output.display());
    Ok(())
}

async fn cmd_batch(
    inputs: Vec<PathBuf>,
    config: &ConverterConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = convert_batch(inputs, ConvertOptions::from(config)).await;

    let mut failed = 0;
    for (input, result) in &results {
        match result {
            Ok(converted) => println!("{}", converted.output.display()),
            Err(e) => {
                failed += 1;
                eprintln!("❌ {}: {}", input.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, results.len()).into());
    }
    Ok(())
}

fn cmd_inspect(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(input)?;
    let document = build_document(&text)?;

    let json = serde_json::to_string_pretty(&document)?;
    write_output(&json, output)?;
    Ok(())
}

fn cmd_config(config: &ConverterConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
