use std::io::Read;

use tracing::debug;

use crate::bytes::Bytes;
use crate::Result;

/// A synchronized frame location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loc {
    /// Offset (0-based) of the first byte after the marker.
    pub offset: usize,
    /// Bytes discarded before the marker.
    pub skipped: usize,
}

/// Synchronizer scans a byte stream for a 3-byte frame marker.
///
/// Scanning keeps only a 3-byte sliding window: each byte read shifts the window
/// left by one and becomes its last byte. There is no buffering and no
/// backtracking, so a stream is scanned in a single pass.
pub struct Synchronizer<R>
where
    R: Read,
{
    bytes: Bytes<R>,
    marker: [u8; 3],
    /// Count of markers found so far.
    pub markers_found: usize,
}

impl<R> Synchronizer<R>
where
    R: Read,
{
    pub fn new(reader: R, marker: [u8; 3]) -> Self {
        Synchronizer {
            bytes: Bytes::new(reader),
            marker,
            markers_found: 0,
        }
    }

    /// Consume bytes until the last 3 bytes read equal the marker, leaving the
    /// stream positioned immediately after it.
    ///
    /// Returns `Ok(None)` if the stream ends before a marker is found. That is
    /// final for this stream, all remaining bytes have been consumed.
    ///
    /// # Errors
    /// Any non-EOF I/O error from the underlying reader.
    pub fn scan(&mut self) -> Result<Option<Loc>> {
        let start = self.bytes.offset();
        let mut window = [0u8; 3];
        let mut seen = 0usize;

        loop {
            let Some(b) = self.bytes.next()? else {
                debug!(
                    offset = self.bytes.offset(),
                    discarded = self.bytes.offset() - start,
                    "end of stream while scanning for marker"
                );
                return Ok(None);
            };
            window = [window[1], window[2], b];
            seen += 1;

            if seen >= window.len() && window == self.marker {
                let offset = self.bytes.offset();
                let loc = Loc {
                    offset,
                    skipped: offset - start - window.len(),
                };
                self.markers_found += 1;
                debug!(offset, skipped = loc.skipped, "found marker");
                return Ok(Some(loc));
            }
        }
    }

    pub fn marker(&self) -> [u8; 3] {
        self.marker
    }

    /// Number of bytes consumed from the stream so far.
    pub fn offset(&self) -> usize {
        self.bytes.offset()
    }

    /// The positioned byte source, for reading what follows a marker.
    pub fn bytes(&mut self) -> &mut Bytes<R> {
        &mut self.bytes
    }

    pub fn into_inner(self) -> R {
        self.bytes.into_inner()
    }
}
