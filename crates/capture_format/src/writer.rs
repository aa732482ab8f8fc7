//! PcapWriter - writes the global header once and appends records

use std::io::Write;

use crate::header::{encode, GlobalHeader, RecordHeader, RECORD_HEADER_LEN};
use crate::PcapError;

/// Writer for a single capture file
pub struct PcapWriter<W: Write> {
    inner: W,
    header: GlobalHeader,
    records: u64,
    scratch: Vec<u8>,
}

impl<W: Write> PcapWriter<W> {
    /// Write the global header and return a writer positioned for records
    pub fn new(mut inner: W, header: GlobalHeader) -> Result<Self, PcapError> {
        let mut buf = Vec::with_capacity(crate::GLOBAL_HEADER_LEN);
        encode(&header, &mut buf)?;
        inner.write_all(&buf)?;
        inner.flush()?;

        Ok(Self {
            inner,
            header,
            records: 0,
            scratch: Vec::new(),
        })
    }

    /// Append one record: header then payload, unmodified.
    ///
    /// Header and payload go out in a single `write_all` so a rejected
    /// payload never leaves a dangling record header behind.
    pub fn write_record(&mut self, ts_us: u64, payload: &[u8]) -> Result<(), PcapError> {
        let header = RecordHeader::for_payload(ts_us, payload.len())?;

        self.scratch.clear();
        self.scratch.reserve(RECORD_HEADER_LEN + payload.len());
        encode(&header, &mut self.scratch)?;
        self.scratch.extend_from_slice(payload);

        self.inner.write_all(&self.scratch)?;
        self.records += 1;
        Ok(())
    }

    /// Flush buffered records to the underlying writer
    pub fn flush(&mut self) -> Result<(), PcapError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Header written at the start of the file
    pub fn header(&self) -> &GlobalHeader {
        &self.header
    }

    /// Records appended since the header was written
    pub fn records_written(&self) -> u64 {
        self.records
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(mut self) -> Result<W, PcapError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
