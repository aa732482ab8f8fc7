//! Global and per-record pcap headers

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::PcapError;

/// Magic number for microsecond-resolution files
pub const MAGIC_MICROS: u32 = 0xa1b2_c3d4;
/// Magic number for nanosecond-resolution files
pub const MAGIC_NANOS: u32 = 0xa1b2_3c4d;

pub const VERSION_MAJOR: u16 = 2;
pub const VERSION_MINOR: u16 = 4;

/// Encoded size of [`GlobalHeader`]
pub const GLOBAL_HEADER_LEN: usize = 24;
/// Encoded size of [`RecordHeader`]
pub const RECORD_HEADER_LEN: usize = 16;

const MICROS_PER_SEC: u64 = 1_000_000;

/// File-level header written once at offset 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalHeader {
    pub magic_number: u32,
    pub version_major: u16,
    pub version_minor: u16,
    /// GMT offset in seconds
    pub thiszone: i32,
    /// Timestamp accuracy, always 0 in practice
    pub sigfigs: u32,
    /// Maximum captured length per record
    pub snaplen: u32,
    /// Link-layer header type
    pub network: u32,
}

impl GlobalHeader {
    /// Microsecond-resolution header for the given link type
    pub fn new(network: u32) -> Self {
        Self {
            magic_number: MAGIC_MICROS,
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            thiszone: 0,
            sigfigs: 0,
            snaplen: 65535,
            network,
        }
    }

    pub fn with_snaplen(mut self, snaplen: u32) -> Self {
        self.snaplen = snaplen;
        self
    }

    /// Timestamp resolution implied by the magic number
    pub fn resolution(&self) -> TimestampResolution {
        if self.magic_number == MAGIC_NANOS {
            TimestampResolution::Nanos
        } else {
            TimestampResolution::Micros
        }
    }
}

impl Default for GlobalHeader {
    /// IEEE 802.15.4 frames, the usual payload of simulated radios
    fn default() -> Self {
        Self::new(195)
    }
}

/// Sub-second unit of [`RecordHeader::ts_frac`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampResolution {
    Micros,
    Nanos,
}

/// Per-record header preceding each payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHeader {
    pub ts_sec: u32,
    /// Microseconds or nanoseconds, depending on the file resolution
    pub ts_frac: u32,
    /// Bytes stored in the file
    pub incl_len: u32,
    /// Bytes on the wire
    pub orig_len: u32,
}

impl RecordHeader {
    /// Header for an unmodified payload of `len` bytes at `ts_us`
    pub fn for_payload(ts_us: u64, len: usize) -> Result<Self, PcapError> {
        let len = u32::try_from(len).map_err(|_| PcapError::PayloadTooLarge { len })?;
        let ts_sec = u32::try_from(ts_us / MICROS_PER_SEC)
            .map_err(|_| PcapError::TimestampOutOfRange { ts_us })?;
        Ok(Self {
            ts_sec,
            ts_frac: (ts_us % MICROS_PER_SEC) as u32,
            incl_len: len,
            orig_len: len,
        })
    }

    /// Timestamp in microseconds
    pub fn ts_us(&self, resolution: TimestampResolution) -> u64 {
        let frac = match resolution {
            TimestampResolution::Micros => u64::from(self.ts_frac),
            TimestampResolution::Nanos => u64::from(self.ts_frac) / 1_000,
        };
        u64::from(self.ts_sec) * MICROS_PER_SEC + frac
    }
}

/// Byte order of an existing file, detected from its magic number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Detect byte order from the first four bytes of a file
    pub(crate) fn detect(magic: [u8; 4]) -> Result<Self, PcapError> {
        let le = u32::from_le_bytes(magic);
        if le == MAGIC_MICROS || le == MAGIC_NANOS {
            return Ok(Self::Little);
        }
        let be = u32::from_be_bytes(magic);
        if be == MAGIC_MICROS || be == MAGIC_NANOS {
            return Ok(Self::Big);
        }
        Err(PcapError::BadMagic(le))
    }
}

/// Encode a header the way the writer emits it (little-endian, fixed-width)
pub(crate) fn encode<T: Serialize>(value: &T, out: &mut Vec<u8>) -> Result<(), PcapError> {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .serialize_into(out, value)?;
    Ok(())
}

/// Decode a header from exactly its encoded bytes
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8], order: ByteOrder) -> Result<T, PcapError> {
    let options = bincode::DefaultOptions::new().with_fixint_encoding();
    let value = match order {
        ByteOrder::Little => options.with_little_endian().deserialize(bytes)?,
        ByteOrder::Big => options.with_big_endian().deserialize(bytes)?,
    };
    Ok(value)
}
