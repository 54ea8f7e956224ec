//! Turning the shared result map into an ordered match list.
//!
//! Collection is a pure read and can be repeated; persistence writes the
//! results artifact once the pool has been joined.

use crate::error::{PipelineError, Result};
use crate::logging::Logger;
use crate::search::result::{MatchRecord, ResultMap, parse_match_key};
use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// All records in the map, ordered by `(worker_id, seq)` from their keys.
///
/// Keys that do not follow the `match_{worker}_{seq}` scheme sort after
/// the well-formed ones, by key string.
pub fn collect_results(results: &ResultMap) -> Vec<MatchRecord> {
    let mut entries = results.snapshot();
    entries.sort_by(|(a, _), (b, _)| compare_keys(a, b));
    entries.into_iter().map(|(_, record)| record).collect()
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    match (parse_match_key(a), parse_match_key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Log a human-readable summary of `results`.
pub fn print_results(results: &[MatchRecord], logger: &Logger) {
    if results.is_empty() {
        logger.warning("No matches found");
        return;
    }
    logger.info(&format!("Found {} match(es)", results.len()));
    for (i, record) in results.iter().enumerate() {
        logger.info(&format!(
            "  [{}] original: {} | hash: {} | algorithm: {} | worker: {}",
            i + 1,
            record.original,
            record.hash,
            record.algorithm,
            record.worker_id
        ));
    }
}

/// Write the ordered records to `path` as a JSON array and return how many were written.
pub fn persist_results(results: &ResultMap, path: &Path) -> Result<usize> {
    let records = collect_results(results);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &records)
        .map_err(|e| PipelineError::Pipeline(format!("cannot serialize results: {}", e)))?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(records.len())
}
