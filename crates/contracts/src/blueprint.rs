//! RecorderBlueprint - Config Loader output
//!
//! Describes where capture files go, how their headers look, and the
//! simulation the recorder is attached to.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extension appended to every capture file
pub const PCAP_EXTENSION: &str = ".pcap";

/// Path persisted when no output path was ever configured
pub const PLACEHOLDER_CAPTURE_PATH: &str = "determine_file_here.pcap";

/// IEEE 802.15.4 link type, the default for simulated radio frames
pub const DEFAULT_LINK_TYPE: u32 = 195;

/// Default maximum captured length per record
pub const DEFAULT_SNAPLEN: u32 = 65535;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete recorder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Capture output settings
    pub capture: CaptureConfig,

    /// Simulation the recorder observes
    pub simulation: SimulationConfig,
}

/// Capture output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Base output path; a trailing `.pcap` is ignored
    pub base_path: PathBuf,

    /// Link-layer type written into every global header
    #[serde(default = "default_link_type")]
    pub link_type: u32,

    /// Snapshot length written into every global header
    #[serde(default = "default_snaplen")]
    pub snaplen: u32,
}

fn default_link_type() -> u32 {
    DEFAULT_LINK_TYPE
}

fn default_snaplen() -> u32 {
    DEFAULT_SNAPLEN
}

impl CaptureConfig {
    /// Base path with any `.pcap` suffix removed
    pub fn stem(&self) -> PathBuf {
        strip_capture_extension(&self.base_path)
    }
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of nodes; receiver files are created for ids `1..=node_count`
    pub node_count: usize,

    /// Wall-clock microseconds at simulated time zero (0 = decided at startup)
    #[serde(default)]
    pub epoch_us: u64,
}

/// Strip the capture extension from a configured path.
///
/// Everything from the last `.pcap` occurrence onwards is dropped, so
/// `out/run.pcap` and `out/run` name the same capture set.
pub fn strip_capture_extension(path: &Path) -> PathBuf {
    truncate_at_last(path, PCAP_EXTENSION).unwrap_or_else(|| path.to_path_buf())
}

/// Path bytes before the last occurrence of `pattern`, without re-encoding
#[cfg(unix)]
fn truncate_at_last(path: &Path, pattern: &str) -> Option<PathBuf> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let bytes = path.as_os_str().as_bytes();
    let pos = bytes
        .windows(pattern.len())
        .rposition(|window| window == pattern.as_bytes())?;
    Some(PathBuf::from(OsStr::from_bytes(&bytes[..pos])))
}

/// Non-Unicode paths are left untouched off Unix
#[cfg(not(unix))]
fn truncate_at_last(path: &Path, pattern: &str) -> Option<PathBuf> {
    let raw = path.to_str()?;
    let pos = raw.rfind(pattern)?;
    Some(PathBuf::from(&raw[..pos]))
}

/// Sender view path for a base path: `<base>.pcap`
pub fn sender_capture_path(stem: &Path) -> PathBuf {
    let mut raw = stem.as_os_str().to_os_string();
    raw.push(PCAP_EXTENSION);
    PathBuf::from(raw)
}

/// Receiver view path for node `node_id`: `<base>_<id>.pcap`
pub fn receiver_capture_path(stem: &Path, node_id: crate::NodeId) -> PathBuf {
    let mut raw = stem.as_os_str().to_os_string();
    raw.push(format!("_{node_id}{PCAP_EXTENSION}"));
    PathBuf::from(raw)
}
