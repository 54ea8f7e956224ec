//! Splitting candidate sequences and index ranges into bounded pieces.

use crate::error::{PipelineError, Result};
use std::ops::Range;

/// Split `items` into contiguous slices of at most `size` elements.
///
/// The returned iterator is lazy and `Clone`, so it can be restarted.
pub fn chunk_list<T>(items: &[T], size: usize) -> Result<std::slice::Chunks<'_, T>> {
    if size < 1 {
        return Err(PipelineError::config("chunk_size must be at least 1"));
    }
    Ok(items.chunks(size))
}

/// Half-open intervals covering `[start, end)`, each at most `size` wide.
pub fn chunk_range(start: u64, end: u64, size: u64) -> Result<RangeChunks> {
    if size < 1 {
        return Err(PipelineError::config("chunk_size must be at least 1"));
    }
    Ok(RangeChunks {
        current: start,
        end,
        size,
    })
}

/// Iterator returned by [`chunk_range`]
#[derive(Debug, Clone)]
pub struct RangeChunks {
    current: u64,
    end: u64,
    size: u64,
}

impl Iterator for RangeChunks {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.end {
            return None;
        }
        let chunk_end = self.current.saturating_add(self.size).min(self.end);
        let range = self.current..chunk_end;
        self.current = chunk_end;
        Some(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.current);
        let n = remaining.div_ceil(self.size) as usize;
        (n, Some(n))
    }
}

/// Partition `[0, total)` into at most `workers` contiguous ranges.
///
/// Range sizes differ by at most one; the first `total % workers` ranges
/// get the extra item. Empty partitions are omitted, so fewer than
/// `workers` ranges come back when `total < workers`.
pub fn distribute_work(total: usize, workers: usize) -> Result<Vec<Range<usize>>> {
    if workers < 1 {
        return Err(PipelineError::config("num_workers must be at least 1"));
    }
    if total < 1 {
        return Ok(Vec::new());
    }

    let base = total / workers;
    let remainder = total % workers;

    let mut distribution = Vec::with_capacity(workers.min(total));
    let mut start = 0;
    for i in 0..workers {
        let end = start + base + usize::from(i < remainder);
        if start < end {
            distribution.push(start..end);
        }
        start = end;
    }

    Ok(distribution)
}
