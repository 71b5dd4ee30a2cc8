use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use beacon::export::{write_series, CsvRecord};
use beacon::{FrameReader, Telemetry};
use tempfile::NamedTempFile;
use tracing::{info, warn};

pub const THERMAL_FILE: &str = "thermal_data.csv";
pub const SUN_SENSOR_FILE: &str = "sun_sensor_data.csv";
pub const POWER_FILE: &str = "power_data.csv";
pub const ATTITUDE_FILE: &str = "attitude_data.csv";

pub struct Options {
    pub precision: usize,
    pub all: bool,
    pub clobber: bool,
}

fn outputs(dir: &Path, all: bool) -> Vec<PathBuf> {
    let mut names = vec![THERMAL_FILE, SUN_SENSOR_FILE];
    if all {
        names.extend([POWER_FILE, ATTITUDE_FILE]);
    }
    names.into_iter().map(|n| dir.join(n)).collect()
}

fn stage<T: CsvRecord>(dir: &Path, records: &[T], precision: usize) -> Result<NamedTempFile> {
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {dir:?}"))?;
    write_series(tmp.as_file_mut(), records, precision)?;
    Ok(tmp)
}

pub fn decode<R: Read>(
    input: &Path,
    frames: FrameReader<R>,
    dir: &Path,
    opts: &Options,
) -> Result<()> {
    let paths = outputs(dir, opts.all);
    if !opts.clobber {
        if let Some(existing) = paths.iter().find(|p| p.exists()) {
            bail!("{existing:?} exists; use --clobber");
        }
    }
    std::fs::create_dir_all(dir).with_context(|| format!("creating output dir {dir:?}"))?;

    info!("decoding {input:?}");
    let mut telemetry =
        Telemetry::collect(frames).with_context(|| format!("decoding {input:?}"))?;
    if telemetry.is_empty() {
        bail!("no frames in input");
    }
    info!(
        "decoded {} frames ({} skipped)",
        telemetry.stats.frames, telemetry.stats.skipped
    );

    let summaries = telemetry.compact();
    info!(
        "thermal: {} records, {} duplicates removed",
        summaries.thermal.records, summaries.thermal.duplicates
    );
    info!(
        "sun vector: {} records, {} duplicates removed",
        summaries.sun_vector.records, summaries.sun_vector.duplicates
    );

    // Every series is staged before any output is persisted.
    let mut staged = vec![
        stage(dir, telemetry.thermal.as_slice(), opts.precision)?,
        stage(dir, telemetry.sun_vector.as_slice(), opts.precision)?,
    ];
    if opts.all {
        staged.push(stage(dir, telemetry.power.as_slice(), opts.precision)?);
        staged.push(stage(dir, telemetry.attitude.as_slice(), opts.precision)?);
    }

    persist_all(staged, &paths)
}

/// Move staged files into place. Either every path is written or, on error,
/// none of them is left behind.
fn persist_all(staged: Vec<NamedTempFile>, paths: &[PathBuf]) -> Result<()> {
    if let Some(path) = paths.iter().find(|p| p.exists() && !p.is_file()) {
        bail!("{path:?} exists and is not a regular file");
    }

    let mut saved: Vec<&PathBuf> = Vec::with_capacity(paths.len());
    for (tmp, path) in staged.into_iter().zip(paths) {
        if let Err(err) = tmp.persist(path) {
            for done in saved {
                if let Err(err) = std::fs::remove_file(done) {
                    warn!("failed to remove {done:?}: {err}");
                }
            }
            return Err(err).with_context(|| format!("saving {path:?}"));
        }
        saved.push(path);
    }
    for path in saved {
        info!("saved {path:?}");
    }
    Ok(())
}
