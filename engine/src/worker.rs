use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::parse::{NEWLINE, SEMICOLON, parse_tenths};
use crate::scan::Scanner;
use crate::table::KeyTable;

/// Aggregates the lines of `data[range]` into a fresh table.
///
/// `range` must start at a line start and end just past a newline or at the
/// end of `data`. Offsets in errors are absolute. `stop` is polled once per
/// line; once it is set the worker gives up with [`Error::Cancelled`].
pub fn process_partition(
    id: usize,
    data: &[u8],
    range: Range<usize>,
    config: &Config,
    stop: &AtomicBool,
) -> Result<KeyTable> {
    let mut table = KeyTable::new(config.capacity, config.collision);
    let bytes = &data[..range.end];
    let end = range.end;
    let mut scanner = Scanner::new(data, range.clone(), SEMICOLON, NEWLINE);
    let mut pos = range.start;
    let mut lines = 0usize;

    while pos < end {
        if stop.load(Ordering::Relaxed) {
            log::debug!("worker {id}: stopping at byte {pos}");
            return Err(Error::Cancelled { worker: id });
        }
        let Some(hit) = scanner.next_from(pos) else {
            return Err(Error::MalformedLine { start: pos, end });
        };
        if bytes[hit] != SEMICOLON {
            return Err(Error::MalformedLine {
                start: pos,
                end: hit + 1,
            });
        }

        let (value, next) = parse_tenths(bytes, hit + 1)?;
        table.insert_or_update(&bytes[pos..hit], value)?;
        pos = next;
        lines += 1;
    }

    log::debug!(
        "worker {id}: {} bytes, {lines} lines, {} keys",
        range.len(),
        table.len()
    );
    Ok(table)
}
