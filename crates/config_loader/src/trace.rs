//! Transmission trace loading
//!
//! A trace is a JSON-lines file with one `TransmissionEvent` per line.
//! Blank lines and lines starting with `#` are skipped.

use std::io::BufRead;
use std::path::Path;

use contracts::{ContractError, TransmissionEvent};

/// Parse a whole trace from a buffered reader
pub fn read_trace<R: BufRead>(reader: R) -> Result<Vec<TransmissionEvent>, ContractError> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(event) = parse_line(idx + 1, &line)? {
            events.push(event);
        }
    }
    Ok(events)
}

/// Load a trace file from disk
pub fn load_trace(path: &Path) -> Result<Vec<TransmissionEvent>, ContractError> {
    let file = std::fs::File::open(path)?;
    read_trace(std::io::BufReader::new(file))
}

/// Parse one trace line; `line_no` is 1-based and only used for errors
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<TransmissionEvent>, ContractError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| ContractError::trace_parse(line_no, e.to_string()))
}
