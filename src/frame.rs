use std::io::Read;

use serde::Serialize;
use tracing::{debug, warn};

use crate::schema::Schema;
use crate::section::{
    read_section, AocsSection, CdhSection, MemorySection, PayloadSection, PlatformSection,
    PowerSection, Section, ThermalSection,
};
use crate::synchronizer::Synchronizer;
use crate::wire::WireValue;
use crate::{Error, Result};

/// One complete telemetry transmission, every field still in wire byte order.
///
/// A `RawFrame` only ever exists fully populated; the decoder never hands out
/// a partially read frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame {
    pub platform: PlatformSection,
    pub memory: MemorySection,
    pub cdh: CdhSection,
    pub power: PowerSection,
    pub thermal: ThermalSection,
    pub aocs: AocsSection,
    pub payload: PayloadSection,
}

impl RawFrame {
    /// Length of a frame on the wire, marker excluded.
    pub fn wire_len() -> usize {
        PlatformSection::wire_len()
            + MemorySection::wire_len()
            + CdhSection::wire_len()
            + PowerSection::wire_len()
            + ThermalSection::wire_len()
            + AocsSection::wire_len()
            + PayloadSection::wire_len()
    }

    /// A frame whose identifiers match `schema` and whose other fields are zero.
    pub fn blank(schema: &Schema) -> Self {
        RawFrame {
            platform: PlatformSection::blank(schema),
            memory: MemorySection::blank(schema),
            cdh: CdhSection::blank(schema),
            power: PowerSection::blank(schema),
            thermal: ThermalSection::blank(schema),
            aocs: AocsSection::blank(schema),
            payload: PayloadSection::blank(schema),
        }
    }

    /// Timestamp shared by every record derived from this frame.
    pub fn timestamp(&self) -> WireValue<u32> {
        self.platform.rtc_s
    }

    /// Encode the frame, preceded by the schema marker, as it would appear in a stream.
    pub fn encode(&self, schema: &Schema) -> Vec<u8> {
        let mut out = Vec::with_capacity(schema.marker.len() + Self::wire_len());
        out.extend_from_slice(&schema.marker);
        self.platform.write_to(&mut out);
        self.memory.write_to(&mut out);
        self.cdh.write_to(&mut out);
        self.power.write_to(&mut out);
        self.thermal.write_to(&mut out);
        self.aocs.write_to(&mut out);
        self.payload.write_to(&mut out);
        out
    }
}

/// Counters kept while reading frames.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    /// Frames decoded successfully.
    pub frames: usize,
    /// Frames dropped on a schema violation when resynchronizing.
    pub skipped: usize,
    /// Bytes discarded while scanning for markers.
    pub bytes_skipped: usize,
}

/// Pulls [RawFrame]s out of a byte stream.
///
/// Each call to [FrameReader::next_frame] scans for the next marker and then
/// decodes the seven sections in order. By default the first failing section
/// ends the read with an error; see [FrameReader::with_resync] for skipping
/// frames with bad identifiers instead.
///
/// # Example
/// ```
/// use beacon::{FrameReader, RawFrame, Schema};
///
/// let schema = Schema::default();
/// let dat = RawFrame::blank(&schema).encode(&schema);
/// let mut frames = FrameReader::new(&dat[..], schema);
///
/// assert!(frames.next_frame().unwrap().is_some());
/// assert!(frames.next_frame().unwrap().is_none());
/// ```
pub struct FrameReader<R>
where
    R: Read,
{
    sync: Synchronizer<R>,
    schema: Schema,
    resync: bool,
    stats: FrameStats,
    done: bool,
}

impl<R> FrameReader<R>
where
    R: Read,
{
    pub fn new(reader: R, schema: Schema) -> Self {
        FrameReader {
            sync: Synchronizer::new(reader, schema.marker),
            schema,
            resync: false,
            stats: FrameStats::default(),
            done: false,
        }
    }

    /// When enabled, a section identifier mismatch drops the frame and scanning
    /// resumes from the current stream position instead of failing the read.
    ///
    /// This is a departure from the strict behavior where any bad frame is fatal.
    /// Truncated input is fatal either way.
    #[must_use]
    pub fn with_resync(mut self, resync: bool) -> Self {
        self.resync = resync;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Read the next complete frame.
    ///
    /// Returns `Ok(None)` at end of stream.
    ///
    /// # Errors
    /// [Error::SchemaViolation] or [Error::Truncated] from the first section that
    /// fails to decode, or [Error::Io].
    pub fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        loop {
            let Some(loc) = self.sync.scan()? else {
                return Ok(None);
            };
            self.stats.bytes_skipped += loc.skipped;

            match self.decode_sections() {
                Ok(frame) => {
                    self.stats.frames += 1;
                    debug!(
                        offset = loc.offset,
                        rtc_s = frame.timestamp().native(self.schema.byte_order),
                        "decoded frame"
                    );
                    return Ok(Some(frame));
                }
                Err(err @ Error::SchemaViolation { .. }) if self.resync => {
                    self.stats.skipped += 1;
                    warn!(offset = loc.offset, "skipping frame: {err}");
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn decode_sections(&mut self) -> Result<RawFrame> {
        let schema = &self.schema;
        let bytes = self.sync.bytes();
        Ok(RawFrame {
            platform: read_section(bytes, schema)?,
            memory: read_section(bytes, schema)?,
            cdh: read_section(bytes, schema)?,
            power: read_section(bytes, schema)?,
            thermal: read_section(bytes, schema)?,
            aocs: read_section(bytes, schema)?,
            payload: read_section(bytes, schema)?,
        })
    }

    /// Release the reader, returning the underlying byte source.
    pub fn into_inner(self) -> R {
        self.sync.into_inner()
    }
}

/// Iterates over frames until end of stream. The first error is yielded once
/// and ends the iteration.
impl<R> Iterator for FrameReader<R>
where
    R: Read,
{
    type Item = Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Creates an iterator over the frames in `reader`.
///
/// Decoding stops at the first error; see [FrameReader] for more control.
pub fn read_frames<R>(reader: R, schema: Schema) -> impl Iterator<Item = Result<RawFrame>>
where
    R: Read,
{
    FrameReader::new(reader, schema)
}
