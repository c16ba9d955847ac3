//! Deduplicating ingestor
//!
//! Filters a polled batch against everything the pipeline already holds
//! (pending + displayed) and appends the survivors, in batch order, to the
//! pending queue.

use super::display::DisplayBuffer;
use super::types::TxRecord;
use std::collections::{HashSet, VecDeque};

/// Outcome of a single `ingest` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Records appended to the pending queue
    pub appended: usize,
    /// Records skipped because they are already known (or repeated in the batch)
    pub duplicates: usize,
    /// Records skipped for lacking a hash
    pub rejected: usize,
    /// Watermark after this call
    pub watermark: Option<u64>,
}

/// Append the unseen part of `batch` to `pending`
///
/// Intra-batch repeats keep their first occurrence. When anything is appended,
/// `watermark` moves up to the highest block number in the whole batch.
pub(crate) fn ingest_batch(
    batch: Vec<TxRecord>,
    pending: &mut VecDeque<TxRecord>,
    display: &DisplayBuffer,
    watermark: &mut Option<u64>,
) -> IngestReport {
    let batch_max_block = batch.iter().map(|record| record.block_number).max();

    let mut known: HashSet<String> = pending.iter().map(|record| record.hash.clone()).collect();
    let mut report = IngestReport::default();

    for record in batch {
        if !record.has_identity() {
            log::debug!("Rejecting record without hash (block {})", record.block_number);
            report.rejected += 1;
            continue;
        }

        if display.contains(&record.hash) || !known.insert(record.hash.clone()) {
            report.duplicates += 1;
            continue;
        }

        pending.push_back(record);
        report.appended += 1;
    }

    if report.appended > 0 {
        if let Some(batch_max) = batch_max_block {
            *watermark = Some(watermark.map_or(batch_max, |current| current.max(batch_max)));
        }
    }

    report.watermark = *watermark;
    report
}
