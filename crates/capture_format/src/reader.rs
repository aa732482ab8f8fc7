//! PcapReader - reads capture files back record by record

use std::io::{self, Read};

use crate::header::{decode, ByteOrder, GlobalHeader, RecordHeader};
use crate::{PcapError, GLOBAL_HEADER_LEN, RECORD_HEADER_LEN};

/// Largest record accepted regardless of snaplen (libpcap's maximum snaplen)
pub const MAX_RECORD_LEN: u32 = 262_144;

/// A record read back from a capture file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcapRecord {
    /// Timestamp in microseconds
    pub ts_us: u64,
    /// Length on the wire
    pub orig_len: u32,
    /// Captured bytes
    pub payload: Vec<u8>,
}

/// Reader over a capture file in either byte order
pub struct PcapReader<R: Read> {
    inner: R,
    header: GlobalHeader,
    order: ByteOrder,
}

impl<R: Read> PcapReader<R> {
    /// Read and validate the global header
    pub fn new(mut inner: R) -> Result<Self, PcapError> {
        let mut raw = [0u8; GLOBAL_HEADER_LEN];
        inner.read_exact(&mut raw)?;

        let order = ByteOrder::detect([raw[0], raw[1], raw[2], raw[3]])?;
        let header: GlobalHeader = decode(&raw, order)?;

        Ok(Self {
            inner,
            header,
            order,
        })
    }

    pub fn header(&self) -> &GlobalHeader {
        &self.header
    }

    /// Next record, or `None` at a clean end of file
    pub fn next_record(&mut self) -> Result<Option<PcapRecord>, PcapError> {
        let mut raw = [0u8; RECORD_HEADER_LEN];
        if !read_exact_or_eof(&mut self.inner, &mut raw)? {
            return Ok(None);
        }

        let header: RecordHeader = decode(&raw, self.order)?;
        let limit = self.header.snaplen.max(MAX_RECORD_LEN);
        if header.incl_len > limit {
            return Err(PcapError::RecordTooLarge {
                incl_len: header.incl_len,
                limit,
            });
        }

        let mut payload = vec![0u8; header.incl_len as usize];
        self.inner.read_exact(&mut payload)?;

        Ok(Some(PcapRecord {
            ts_us: header.ts_us(self.header.resolution()),
            orig_len: header.orig_len,
            payload,
        }))
    }
}

impl<R: Read> Iterator for PcapReader<R> {
    type Item = Result<PcapRecord, PcapError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Fill `buf` completely, or return `false` if the reader is already at EOF.
///
/// A partially filled buffer is a truncated file and reported as an error.
fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("truncated record header: {filled} of {} bytes", buf.len()),
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}
