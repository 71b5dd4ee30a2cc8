use std::io::{self, ErrorKind, Read};

/// Bytes wraps a reader and keeps track of how many bytes have been consumed,
/// so decoders can report stream offsets.
///
/// End of stream is reported as a value (`None` or a short count) rather than
/// an error so callers can tell it apart from real I/O failures.
pub struct Bytes<R>
where
    R: Read,
{
    reader: R,
    num_read: usize,
    buf: [u8; 1],
}

impl<R> Bytes<R>
where
    R: Read,
{
    pub fn new(reader: R) -> Self {
        Bytes {
            reader,
            num_read: 0,
            buf: [0u8; 1],
        }
    }

    /// Read a single byte, `Ok(None)` at end of stream.
    ///
    /// # Errors
    /// Any non-EOF I/O error.
    pub fn next(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.num_read += 1;
                    return Ok(Some(self.buf[0]));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Fill as much of `buf` as the stream allows, returning the number of bytes
    /// read. A count less than `buf.len()` means the stream ended.
    ///
    /// # Errors
    /// Any non-EOF I/O error.
    pub fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        self.num_read += filled;
        Ok(filled)
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.num_read
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
