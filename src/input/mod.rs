//! Candidate ingestion from a line-oriented CSV file.
//!
//! Each non-blank line contributes one candidate: its first
//! delimiter-separated field, trimmed. Lines that fail validation are
//! counted and skipped.

use crate::config::InputConfig;
use crate::error::{PipelineError, Result};
use crate::search::CandidateChunk;
use crate::validation::is_valid_csv_line;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Counters from the most recent read pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStatistics {
    pub total_lines: u64,
    pub valid_lines: u64,
    pub invalid_lines: u64,
    pub chunks_emitted: u64,
}

/// Reads candidates from the configured input file.
#[derive(Debug)]
pub struct Receiver {
    path: PathBuf,
    delimiter: char,
    chunk_size: usize,
    stats: ReceiverStatistics,
}

impl Receiver {
    /// `chunk_size` is clamped to at least 1.
    pub fn new(config: &InputConfig, chunk_size: usize) -> Self {
        Self {
            path: config.csv_path.clone(),
            delimiter: config.csv_delimiter,
            chunk_size: chunk_size.max(1),
            stats: ReceiverStatistics::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the input exists, is a regular file and can be opened.
    pub fn validate_file(&self) -> bool {
        self.path.is_file() && File::open(&self.path).is_ok()
    }

    /// Stream the input as chunks of at most `chunk_size` candidates.
    ///
    /// Statistics are reset and then updated as the iterator advances.
    pub fn read_chunks(&mut self) -> Result<ChunkReader<'_>> {
        let file = File::open(&self.path).map_err(|e| {
            PipelineError::Pipeline(format!("cannot open {}: {}", self.path.display(), e))
        })?;
        self.stats = ReceiverStatistics::default();

        Ok(ChunkReader {
            lines: BufReader::new(file).lines(),
            delimiter: self.delimiter,
            chunk_size: self.chunk_size,
            stats: &mut self.stats,
            done: false,
        })
    }

    /// Every candidate in file order.
    pub fn read_all(&mut self) -> Result<Vec<String>> {
        let mut all = Vec::new();
        for chunk in self.read_chunks()? {
            all.extend(chunk?);
        }
        Ok(all)
    }

    pub fn get_statistics(&self) -> ReceiverStatistics {
        self.stats
    }
}

/// Lazy chunk iterator over the input file.
pub struct ChunkReader<'a> {
    lines: Lines<BufReader<File>>,
    delimiter: char,
    chunk_size: usize,
    stats: &'a mut ReceiverStatistics,
    done: bool,
}

impl ChunkReader<'_> {
    fn parse_line(&self, line: &str) -> Option<String> {
        if !is_valid_csv_line(line, 1, self.delimiter) {
            return None;
        }
        let field = line.split(self.delimiter).next()?.trim();
        (!field.is_empty()).then(|| field.to_string())
    }
}

impl Iterator for ChunkReader<'_> {
    type Item = Result<CandidateChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut chunk = Vec::with_capacity(self.chunk_size);
        while chunk.len() < self.chunk_size {
            match self.lines.next() {
                Some(Ok(line)) => {
                    self.stats.total_lines += 1;
                    match self.parse_line(&line) {
                        Some(candidate) => {
                            self.stats.valid_lines += 1;
                            chunk.push(candidate);
                        }
                        None => self.stats.invalid_lines += 1,
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(PipelineError::Pipeline(format!(
                        "error reading line {}: {}",
                        self.stats.total_lines + 1,
                        e
                    ))));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        if chunk.is_empty() {
            return None;
        }
        self.stats.chunks_emitted += 1;
        Some(Ok(chunk))
    }
}
