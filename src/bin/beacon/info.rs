use std::io::{stdout, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use beacon::{FrameReader, FrameStats, SeriesSummary, Summaries, Telemetry};
use serde::Serialize;

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    filename: String,
    frames: FrameStats,
    series: Summaries,
}

fn summarize<R: Read>(fpath: &Path, frames: FrameReader<R>) -> Result<Info> {
    let mut telemetry =
        Telemetry::collect(frames).with_context(|| format!("decoding {fpath:?}"))?;
    let series = telemetry.compact();
    Ok(Info {
        filename: fpath.to_string_lossy().to_string(),
        frames: telemetry.stats,
        series,
    })
}

pub fn info<R: Read>(fpath: &Path, frames: FrameReader<R>, format: &Format) -> Result<()> {
    let info = summarize(fpath, frames)?;
    write_info(stdout(), &info, format)
}

fn write_info<W: Write>(mut out: W, info: &Info, format: &Format) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, info).context("serializing to json")?;
            writeln!(out).context("writing to stdout")
        }
        Format::Text => out
            .write_all(render_text(info).as_bytes())
            .context("writing to stdout"),
    }
}

fn render_series(out: &mut String, name: &str, summary: &SeriesSummary) {
    let time = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map_or_else(|| "-".to_string(), |t| t.to_rfc3339())
    };
    out.push_str(&format!(
        "{name:<12}{:>8}{:>12}  {}  {}\n",
        summary.records,
        summary.duplicates,
        time(summary.first),
        time(summary.last),
    ));
}

fn render_text(info: &Info) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", info.filename));
    out.push_str(&"=".repeat(79));
    out.push('\n');
    out.push_str(&format!("Frames:        {}\n", info.frames.frames));
    out.push_str(&format!("Skipped:       {}\n", info.frames.skipped));
    out.push_str(&format!("Bytes skipped: {}\n", info.frames.bytes_skipped));
    out.push('\n');
    out.push_str(&format!(
        "{:<12}{:>8}{:>12}  first / last\n",
        "series", "records", "duplicates"
    ));
    render_series(&mut out, "thermal", &info.series.thermal);
    render_series(&mut out, "sun_vector", &info.series.sun_vector);
    render_series(&mut out, "power", &info.series.power);
    render_series(&mut out, "attitude", &info.series.attitude);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon::{RawFrame, Schema, WireValue};

    #[test]
    fn summary_text() {
        let schema = Schema::default();
        let mut dat = Vec::new();
        for rtc in [0u32, 60, 60] {
            let mut frame = RawFrame::blank(&schema);
            frame.platform.rtc_s = WireValue::from_native(rtc, schema.byte_order);
            dat.extend(frame.encode(&schema));
        }

        let info = summarize(Path::new("dump.bin"), FrameReader::new(&dat[..], schema)).unwrap();
        assert_eq!(info.frames.frames, 3);
        assert_eq!(info.series.thermal.records, 2);

        let text = render_text(&info);
        assert!(text.starts_with("dump.bin\n"));
        assert!(text.contains("Frames:        3\n"));
        assert!(text.contains("1970-01-01T00:01:00+00:00"), "{text}");
    }

    #[test]
    fn json_ends_with_newline() {
        let schema = Schema::default();
        let dat = RawFrame::blank(&schema).encode(&schema);
        let info = summarize(Path::new("dump.bin"), FrameReader::new(&dat[..], schema)).unwrap();

        let mut out = Vec::new();
        write_info(&mut out, &info, &Format::Json).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("}\n"), "{text}");
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["frames"]["frames"], 1);
    }
}
