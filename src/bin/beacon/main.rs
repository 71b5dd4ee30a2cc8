mod decode;
mod info;

use std::fs::File;
use std::io::{stderr, stdout, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use beacon::{FrameReader, Schema};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a beacon dump into CSV files.
    ///
    /// Writes thermal_data.csv and sun_sensor_data.csv to the output directory,
    /// sorted by time with repeated timestamps removed. Nothing is written if
    /// the dump cannot be fully decoded.
    Decode {
        /// Output directory.
        #[arg(short, long, default_value = ".", value_name = "dir")]
        output: PathBuf,

        /// Number of decimal places for calibrated values, at most 9.
        #[arg(short, long, default_value_t = beacon::export::DEFAULT_PRECISION)]
        precision: usize,

        /// Schema JSON file. Keys not present take their default value.
        #[arg(short, long, value_name = "path")]
        schema: Option<PathBuf>,

        /// Skip frames with an unexpected section identifier instead of failing.
        #[arg(long, action)]
        resync: bool,

        /// Also write power_data.csv and attitude_data.csv.
        #[arg(long, action)]
        all: bool,

        /// Overwrite output files if they already exist
        #[arg(long, action)]
        clobber: bool,

        /// Input dump file.
        input: PathBuf,
    },
    /// Show frame counts and series coverage for a beacon dump
    Info {
        /// Input dump file
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: info::Format,

        /// Schema JSON file.
        #[arg(short, long, value_name = "path")]
        schema: Option<PathBuf>,

        /// Skip frames with an unexpected section identifier instead of failing.
        #[arg(long, action)]
        resync: bool,
    },
    /// Print the default schema as JSON.
    Schema,
}

fn load_schema(path: Option<&PathBuf>) -> Result<Schema> {
    let Some(path) = path else {
        return Ok(Schema::default());
    };
    let dat = std::fs::read_to_string(path).with_context(|| format!("reading schema {path:?}"))?;
    let schema = Schema::from_json(&dat).with_context(|| format!("parsing schema {path:?}"))?;
    debug!("using schema from {path:?}");
    Ok(schema)
}

fn open_frames(input: &Path, schema: Schema, resync: bool) -> Result<FrameReader<BufReader<File>>> {
    let file = File::open(input).with_context(|| format!("opening input {input:?}"))?;
    Ok(FrameReader::new(BufReader::new(file), schema).with_resync(resync))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("BEACON_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Decode {
            output,
            precision,
            schema,
            resync,
            all,
            clobber,
            input,
        } => {
            let schema = load_schema(schema.as_ref())?;
            let frames = open_frames(input, schema, *resync)?;
            let opts = decode::Options {
                precision: *precision,
                all: *all,
                clobber: *clobber,
            };
            decode::decode(input, frames, output, &opts)
        }
        Commands::Info {
            input,
            format,
            schema,
            resync,
        } => {
            let schema = load_schema(schema.as_ref())?;
            let frames = open_frames(input, schema, *resync)?;
            info::info(input, frames, format)
        }
        Commands::Schema => {
            serde_json::to_writer_pretty(stdout(), &Schema::default())
                .context("serializing schema")?;
            println!();
            Ok(())
        }
    }
}
