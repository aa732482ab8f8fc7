//! CaptureSink - one capture file for one viewpoint

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use capture_format::{GlobalHeader, PcapError, PcapWriter};
use contracts::CaptureError;
use tracing::{debug, error, instrument};

use crate::metrics::SinkMetrics;

type FileWriter = PcapWriter<BufWriter<File>>;

/// Owner of a single capture output file.
///
/// `writer` is only ever `Some` when `path` is `Some` and the global header
/// has been written. Each sink fails on its own: nothing here touches any
/// other sink's file.
pub struct CaptureSink {
    name: String,
    header: GlobalHeader,
    path: Option<PathBuf>,
    writer: Option<FileWriter>,
    metrics: SinkMetrics,
}

impl CaptureSink {
    /// Create an inactive sink with no path
    pub fn new(name: impl Into<String>, header: GlobalHeader) -> Self {
        Self {
            name: name.into(),
            header,
            path: None,
            writer: None,
            metrics: SinkMetrics::new(),
        }
    }

    /// Sink name (used for logging/metrics)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last path passed to `open`, even if that open failed
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True when records can be appended
    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }

    /// Create or truncate `path` and write a fresh global header.
    ///
    /// An already active sink is closed first. On failure the sink stays
    /// inactive but remembers `path` so a later `reopen` can retry.
    #[instrument(name = "capture_sink_open", skip(self, path), fields(sink = %self.name))]
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<(), CaptureError> {
        if let Err(e) = self.close() {
            error!(sink = %self.name, error = %e, "Close before open failed");
        }

        let path = path.into();
        let result = Self::create_writer(&path, self.header);
        self.path = Some(path);

        match result {
            Ok(writer) => {
                self.writer = Some(writer);
                self.metrics.reset_records();
                debug!(sink = %self.name, path = ?self.path, "Capture file opened");
                Ok(())
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                Err(self.io_error(e))
            }
        }
    }

    /// Append one record with the payload exactly as given.
    ///
    /// A failed write leaves the sink open; the caller reports and moves on.
    pub fn append(&mut self, payload: &[u8], ts_us: u64) -> Result<(), CaptureError> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(CaptureError::not_open(&self.name));
        };

        let result = writer
            .write_record(ts_us, payload)
            .and_then(|()| writer.flush());

        match result {
            Ok(()) => {
                self.metrics.inc_records();
                Ok(())
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                Err(self.io_error(e))
            }
        }
    }

    /// Close and reopen at the stored path, discarding every record so far.
    ///
    /// When both steps fail the open error is returned and the close error
    /// is logged.
    #[instrument(name = "capture_sink_reopen", skip(self), fields(sink = %self.name))]
    pub fn reopen(&mut self) -> Result<(), CaptureError> {
        let Some(path) = self.path.clone() else {
            return Err(CaptureError::not_configured(&self.name));
        };

        let closed = self.close();
        if let Err(open_err) = self.open(path) {
            if let Err(close_err) = closed {
                error!(sink = %self.name, error = %close_err, "Close before reopen failed");
            }
            return Err(open_err);
        }
        self.metrics.inc_reopen_count();
        closed
    }

    /// Flush and release the file handle; closing twice is a no-op
    pub fn close(&mut self) -> Result<(), CaptureError> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };

        match writer.into_inner() {
            Ok(buffered) => {
                // BufWriter is already flushed; dropping it closes the file
                drop(buffered);
                debug!(sink = %self.name, "Capture file closed");
                Ok(())
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                Err(self.io_error(e))
            }
        }
    }

    fn create_writer(path: &Path, header: GlobalHeader) -> Result<FileWriter, PcapError> {
        let file = File::create(path)?;
        PcapWriter::new(BufWriter::new(file), header)
    }

    fn io_error(&self, e: PcapError) -> CaptureError {
        let path = self.path.clone().unwrap_or_default();
        CaptureError::io(&self.name, path, e.into_io())
    }
}

impl Drop for CaptureSink {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!(sink = %self.name, error = %e, "Close failed on drop");
        }
    }
}
