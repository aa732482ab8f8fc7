//! Capture format error types

use thiserror::Error;

/// Errors raised while encoding or decoding pcap data
#[derive(Debug, Error)]
pub enum PcapError {
    /// Underlying reader/writer failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Header encoding or decoding failure
    #[error("header codec error: {0}")]
    Codec(String),

    /// File does not start with a known pcap magic number
    #[error("unknown pcap magic number {0:#010x}")]
    BadMagic(u32),

    /// Payload length does not fit the 32-bit length fields
    #[error("payload of {len} bytes exceeds the pcap record limit")]
    PayloadTooLarge { len: usize },

    /// Record header claims more bytes than any sane capture holds
    #[error("record of {incl_len} bytes exceeds the {limit} byte read limit")]
    RecordTooLarge { incl_len: u32, limit: u32 },

    /// Timestamp seconds do not fit the 32-bit seconds field
    #[error("timestamp {ts_us}us is outside the pcap seconds range")]
    TimestampOutOfRange { ts_us: u64 },
}

impl From<bincode::Error> for PcapError {
    fn from(err: bincode::Error) -> Self {
        match *err {
            bincode::ErrorKind::Io(io) => Self::Io(io),
            other => Self::Codec(other.to_string()),
        }
    }
}

impl PcapError {
    /// Convert into an `std::io::Error`, keeping io failures intact
    pub fn into_io(self) -> std::io::Error {
        match self {
            Self::Io(io) => io,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
