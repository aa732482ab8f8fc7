//! `inspect` command implementation.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use capture_format::{GlobalHeader, PcapReader};
use serde::Serialize;
use tracing::info;

use crate::cli::InspectArgs;
use crate::error::CliError;

#[derive(Serialize)]
struct CaptureListing {
    path: String,
    link_type: u32,
    snaplen: u32,
    version: String,
    record_count: usize,
    records: Vec<RecordInfo>,
}

#[derive(Serialize)]
struct RecordInfo {
    index: usize,
    ts_us: u64,
    captured_len: usize,
    orig_len: u32,
}

/// Execute the `inspect` command
pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    info!(capture = %args.capture.display(), "Inspecting capture file");

    if !args.capture.exists() {
        return Err(CliError::capture_not_found(&args.capture).into());
    }

    let listing = list_records(&args.capture, args.limit)?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&listing).context("Failed to serialize listing")?;
        println!("{}", json);
    } else {
        print_listing(&listing);
    }

    Ok(())
}

/// Read every record; `limit` caps how many are kept (0 keeps all)
fn list_records(path: &Path, limit: usize) -> Result<CaptureListing> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = PcapReader::new(BufReader::new(file))
        .with_context(|| format!("{} is not a pcap file", path.display()))?;

    let header: GlobalHeader = *reader.header();
    let mut records = Vec::new();
    let mut record_count = 0;

    while let Some(record) = reader
        .next_record()
        .with_context(|| format!("Corrupt record #{} in {}", record_count, path.display()))?
    {
        if limit == 0 || records.len() < limit {
            records.push(RecordInfo {
                index: record_count,
                ts_us: record.ts_us,
                captured_len: record.payload.len(),
                orig_len: record.orig_len,
            });
        }
        record_count += 1;
    }

    Ok(CaptureListing {
        path: path.display().to_string(),
        link_type: header.network,
        snaplen: header.snaplen,
        version: format!("{}.{}", header.version_major, header.version_minor),
        record_count,
        records,
    })
}

fn print_listing(listing: &CaptureListing) {
    println!("=== {} ===\n", listing.path);
    println!("pcap {} | link type {} | snaplen {}", listing.version, listing.link_type, listing.snaplen);
    println!("Records: {}\n", listing.record_count);

    for record in &listing.records {
        println!(
            "  #{:<6} ts={}us len={}",
            record.index, record.ts_us, record.captured_len
        );
    }

    if listing.records.len() < listing.record_count {
        println!("  ... {} more", listing.record_count - listing.records.len());
    }

    println!();
}
