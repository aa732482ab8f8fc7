//! # Capture Format
//!
//! Classic libpcap file primitive.
//!
//! Responsibilities:
//! - Write the 24-byte global header once per file
//! - Append records (16-byte record header + raw payload)
//! - Read files back for verification and inspection
//!
//! Headers are fixed-width structs encoded with bincode's fixed-int encoding.
//!
//! # Example
//!
//! ```
//! use capture_format::{GlobalHeader, PcapReader, PcapWriter};
//!
//! let mut writer = PcapWriter::new(Vec::new(), GlobalHeader::default()).unwrap();
//! writer.write_record(1_500_000, &[0x41, 0x88]).unwrap();
//! let bytes = writer.into_inner().unwrap();
//!
//! let records: Vec<_> = PcapReader::new(bytes.as_slice())
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(records[0].ts_us, 1_500_000);
//! assert_eq!(records[0].payload, vec![0x41, 0x88]);
//! ```

mod error;
mod header;
mod reader;
mod writer;

pub use error::PcapError;
pub use header::{
    GlobalHeader, RecordHeader, TimestampResolution, GLOBAL_HEADER_LEN, MAGIC_MICROS,
    MAGIC_NANOS, RECORD_HEADER_LEN,
};
pub use reader::{PcapReader, PcapRecord, MAX_RECORD_LEN};
pub use writer::PcapWriter;
