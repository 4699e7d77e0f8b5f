//! Per-key min/mean/max over `key;value` lines.
//!
//! The input is cut into one line-aligned partition per worker, every worker
//! fills a private [`KeyTable`], and the tables are merged and sorted once
//! all workers have joined.

use memmap2::MmapOptions;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

pub mod config;
pub mod error;
pub mod merge;
pub mod parse;
pub mod partition;
pub mod report;
pub mod scan;
pub mod table;
pub mod worker;

pub use config::{Collision, Config, DEFAULT_BOUNDARY_WINDOW, DEFAULT_CAPACITY};
pub use error::{Error, ParseError, Result};
pub use report::{Report, Tenths};
pub use table::{Accumulator, Entry, KeyTable};

/// Aggregates a whole buffer of `key;value\n` lines.
///
/// A failing worker raises a shared stop flag so the others give up at their
/// next line. The first error in partition order that is not
/// [`Error::Cancelled`] is returned.
pub fn aggregate(data: &[u8], config: &Config) -> Result<Report> {
    config.validate()?;

    let ranges = partition::partition(data, config.workers, config.boundary_window)?;
    log::debug!("scanner kernel: {}", scan::kernel().1);

    let stop = AtomicBool::new(false);
    let results: Vec<Result<KeyTable>> = thread::scope(|scope| {
        let stop = &stop;
        let handles: Vec<_> = ranges
            .iter()
            .cloned()
            .enumerate()
            .map(|(id, range)| {
                scope.spawn(move || {
                    let result = worker::process_partition(id, data, range, config, stop);
                    if let Err(e) = &result {
                        if !matches!(e, Error::Cancelled { .. }) {
                            stop.store(true, Ordering::Relaxed);
                        }
                    }
                    result
                })
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(id, handle)| {
                handle.join().unwrap_or_else(|_| {
                    stop.store(true, Ordering::Relaxed);
                    Err(Error::WorkerPanicked { worker: id })
                })
            })
            .collect()
    });

    let mut tables = Vec::with_capacity(results.len());
    let mut cancelled = None;
    for result in results {
        match result {
            Ok(table) => tables.push(table),
            Err(e @ Error::Cancelled { .. }) => {
                cancelled.get_or_insert(e);
            }
            Err(e) => return Err(e),
        }
    }
    if let Some(e) = cancelled {
        return Err(e);
    }

    let base = tables.remove(0);
    let merged = merge::merge(base, tables)?;

    log::info!(
        "aggregated {} bytes with {} workers: {} keys",
        data.len(),
        ranges.len(),
        merged.len()
    );
    Ok(Report::from_table(merged))
}

/// Maps the file at `filename` and renders its report, newline included.
///
/// Keys are copied through byte for byte, so the output is only UTF-8 when
/// the keys are.
pub fn solve<P: AsRef<Path>>(filename: P, config: &Config) -> Result<Vec<u8>> {
    let file = File::open(filename.as_ref())?;
    let size = file.metadata()?.len();

    let report = if size == 0 {
        aggregate(&[], config)?
    } else {
        // SAFETY: the mapping is read-only and the file is not expected to
        // change while it is being aggregated.
        let mapped_file = unsafe { MmapOptions::new().map(&file)? };
        aggregate(&mapped_file, config)?
    };

    let mut out = Vec::new();
    report.write_to(&mut out)?;
    out.push(b'\n');
    Ok(out)
}
