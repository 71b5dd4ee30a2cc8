use std::io::Read;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::calibration::{
    AttitudeRecord, Calibrated, Calibrator, PowerRecord, SunVectorRecord, ThermalRecord,
};
use crate::collector::{Collector, Growth};
use crate::compact::Timestamped;
use crate::frame::{FrameReader, FrameStats, RawFrame};
use crate::Result;

/// Record count and time coverage of one series.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesSummary {
    pub records: usize,
    /// Records dropped for repeating a timestamp.
    pub duplicates: usize,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
}

impl SeriesSummary {
    fn of<T: Timestamped>(series: &[T], duplicates: usize) -> Self {
        let first = series.iter().map(Timestamped::timestamp).min();
        let last = series.iter().map(Timestamped::timestamp).max();
        SeriesSummary {
            records: series.len(),
            duplicates,
            first: first.and_then(to_datetime),
            last: last.and_then(to_datetime),
        }
    }
}

fn to_datetime(rtc_s: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(i64::from(rtc_s), 0)
}

/// Summaries of every series after compaction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summaries {
    pub thermal: SeriesSummary,
    pub sun_vector: SeriesSummary,
    pub power: SeriesSummary,
    pub attitude: SeriesSummary,
}

/// Every record series collected from a frame stream.
///
/// Each accepted frame contributes exactly one record to each series, so
/// before [Telemetry::compact] all series have the same length as the number
/// of frames.
#[derive(Debug, Default)]
pub struct Telemetry {
    pub thermal: Collector<ThermalRecord>,
    pub sun_vector: Collector<SunVectorRecord>,
    pub power: Collector<PowerRecord>,
    pub attitude: Collector<AttitudeRecord>,
    pub stats: FrameStats,
}

impl Telemetry {
    pub fn with_growth(growth: Growth) -> Self {
        Telemetry {
            thermal: Collector::with_growth(growth),
            sun_vector: Collector::with_growth(growth),
            power: Collector::with_growth(growth),
            attitude: Collector::with_growth(growth),
            stats: FrameStats::default(),
        }
    }

    /// Decode every frame from `frames`, calibrate it and append one record
    /// per series.
    ///
    /// # Errors
    /// The first decode or allocation error. Records collected before it are
    /// discarded along with the rest of the result.
    pub fn collect<R: Read>(frames: FrameReader<R>) -> Result<Self> {
        let mut telemetry = Telemetry::default();
        telemetry.collect_from(frames)?;
        Ok(telemetry)
    }

    /// Like [Telemetry::collect], appending to existing series.
    pub fn collect_from<R: Read>(&mut self, mut frames: FrameReader<R>) -> Result<()> {
        let calibrator = Calibrator::new(frames.schema());
        while let Some(frame) = frames.next_frame()? {
            self.push_frame(&calibrator, &frame)?;
        }
        let stats = frames.stats();
        self.stats.frames += stats.frames;
        self.stats.skipped += stats.skipped;
        self.stats.bytes_skipped += stats.bytes_skipped;
        debug!(
            frames = stats.frames,
            skipped = stats.skipped,
            bytes_skipped = stats.bytes_skipped,
            "collected telemetry"
        );
        Ok(())
    }

    /// Calibrate one frame into every series.
    pub fn push_frame(&mut self, calibrator: &Calibrator, frame: &RawFrame) -> Result<()> {
        push(&mut self.thermal, calibrator, frame)?;
        push(&mut self.sun_vector, calibrator, frame)?;
        push(&mut self.power, calibrator, frame)?;
        push(&mut self.attitude, calibrator, frame)
    }

    /// Number of frames decoded. Unlike the series lengths this does not
    /// change on [Telemetry::compact].
    pub fn frames(&self) -> usize {
        self.stats.frames
    }

    pub fn is_empty(&self) -> bool {
        self.thermal.is_empty()
    }

    /// Sort every series by timestamp and drop repeated timestamps.
    pub fn compact(&mut self) -> Summaries {
        Summaries {
            thermal: compact_series(&mut self.thermal),
            sun_vector: compact_series(&mut self.sun_vector),
            power: compact_series(&mut self.power),
            attitude: compact_series(&mut self.attitude),
        }
    }

    /// Summaries of the series as they stand, without compacting.
    pub fn summaries(&self) -> Summaries {
        Summaries {
            thermal: SeriesSummary::of(self.thermal.as_slice(), 0),
            sun_vector: SeriesSummary::of(self.sun_vector.as_slice(), 0),
            power: SeriesSummary::of(self.power.as_slice(), 0),
            attitude: SeriesSummary::of(self.attitude.as_slice(), 0),
        }
    }
}

fn push<T: Calibrated>(
    series: &mut Collector<T>,
    calibrator: &Calibrator,
    frame: &RawFrame,
) -> Result<()> {
    series.push(T::from_frame(calibrator, frame))
}

fn compact_series<T: Calibrated>(series: &mut Collector<T>) -> SeriesSummary {
    let before = series.len();
    let after = series.compact();
    debug!(series = T::NAME, before, after, "compacted series");
    SeriesSummary::of(series.as_slice(), before - after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::wire::{ByteOrder, WireValue};

    fn stream(schema: &Schema, times: &[u32]) -> Vec<u8> {
        let mut dat = Vec::new();
        for &rtc in times {
            let mut frame = RawFrame::blank(schema);
            frame.platform.rtc_s = WireValue::from_native(rtc, schema.byte_order);
            frame.thermal.cpu_c = WireValue::from_native(rtc as i16, schema.byte_order);
            dat.extend(frame.encode(schema));
        }
        dat
    }

    #[test]
    fn one_record_per_series_per_frame() {
        let schema = Schema::default();
        let dat = stream(&schema, &[100, 50, 100]);

        let telemetry = Telemetry::collect(FrameReader::new(&dat[..], schema)).unwrap();
        assert_eq!(telemetry.frames(), 3);
        assert_eq!(telemetry.sun_vector.len(), 3);
        assert_eq!(telemetry.power.len(), 3);
        assert_eq!(telemetry.attitude.len(), 3);
        assert_eq!(telemetry.stats.frames, 3);
    }

    #[test]
    fn compact_sorts_and_dedups_every_series() {
        let schema = Schema::default();
        let dat = stream(&schema, &[100, 50, 100]);

        let mut telemetry = Telemetry::collect(FrameReader::new(&dat[..], schema)).unwrap();
        let summaries = telemetry.compact();

        let times: Vec<u32> = telemetry.thermal.iter().map(|r| r.rtc_s).collect();
        assert_eq!(times, [50, 100]);
        assert!((telemetry.thermal.as_slice()[0].cpu_c - 0.5).abs() < 1e-9);
        assert_eq!(telemetry.attitude.len(), 2);

        assert_eq!(summaries.thermal.records, 2);
        assert_eq!(summaries.thermal.duplicates, 1);
        assert_eq!(summaries.power, summaries.thermal);
        assert_eq!(summaries.thermal.first, DateTime::from_timestamp(50, 0));
        assert_eq!(summaries.thermal.last, DateTime::from_timestamp(100, 0));
        assert_eq!(telemetry.frames(), 3);
    }

    #[test]
    fn empty_stream_collects_nothing() {
        let schema = Schema::default();
        let dat = [0u8; 16];
        let mut telemetry = Telemetry::collect(FrameReader::new(&dat[..], schema)).unwrap();
        assert!(telemetry.is_empty());
        let summaries = telemetry.compact();
        assert_eq!(summaries.thermal, SeriesSummary::default());
    }

    #[test]
    fn decode_error_aborts_collection() {
        let schema = Schema::default();
        let mut dat = stream(&schema, &[1, 2]);
        dat.truncate(dat.len() - 4);
        assert!(Telemetry::collect(FrameReader::new(&dat[..], schema)).is_err());
    }

    #[test]
    fn little_endian_stream() {
        let schema = Schema::builder().byte_order(ByteOrder::Little).build();
        let dat = stream(&schema, &[7, 3]);
        let mut telemetry = Telemetry::collect(FrameReader::new(&dat[..], schema)).unwrap();
        telemetry.compact();
        let times: Vec<u32> = telemetry.sun_vector.iter().map(|r| r.rtc_s).collect();
        assert_eq!(times, [3, 7]);
    }
}
