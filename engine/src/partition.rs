use std::ops::Range;

use crate::error::{Error, Result};
use crate::parse::NEWLINE;

/// Splits `data` into exactly `workers` contiguous ranges.
///
/// Range `i` ends just past the first newline at or after the even split
/// point `len * i / workers`; the last range runs to the end of `data`.
/// Ranges may be empty when `data` holds fewer lines than workers.
pub fn partition(data: &[u8], workers: usize, window: usize) -> Result<Vec<Range<usize>>> {
    let len = data.len();
    let workers = workers.max(1);
    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0usize;

    for i in 1..workers {
        let split = (len * i / workers).max(start);
        let end = if split >= len {
            len
        } else {
            boundary_after(data, split, window)?
        };
        log::trace!("partition {}: {start}..{end}", i - 1);
        ranges.push(start..end);
        start = end;
    }
    log::trace!("partition {}: {start}..{len}", workers - 1);
    ranges.push(start..len);

    Ok(ranges)
}

/// Offset just past the first newline in `data[from..from + window]`.
fn boundary_after(data: &[u8], from: usize, window: usize) -> Result<usize> {
    let limit = from.saturating_add(window).min(data.len());
    match memchr::memchr(NEWLINE, &data[from..limit]) {
        Some(off) => Ok(from + off + 1),
        // The unterminated last line.
        None if limit == data.len() => Ok(data.len()),
        None => Err(Error::PartitionBoundaryNotFound {
            offset: from,
            window,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &[u8] = b"Hamburg;12.0\nBulawayo;8.9\nPalembang;38.8\nSt. John's;15.2\nCracow;12.6\nBridgetown;26.9\nIstanbul;6.2\nRoseau;34.4\nConakry;31.2\nIstanbul;23.0\n";

    fn check_cover(data: &[u8], ranges: &[Range<usize>], workers: usize) {
        assert_eq!(workers, ranges.len());
        let mut joined = Vec::with_capacity(data.len());
        let mut prev_end = 0;
        for r in ranges {
            assert_eq!(prev_end, r.start, "ranges must be contiguous: {ranges:?}");
            if r.end > r.start && r.end < data.len() {
                assert_eq!(NEWLINE, data[r.end - 1], "range {r:?} splits a line");
            }
            joined.extend_from_slice(&data[r.clone()]);
            prev_end = r.end;
        }
        assert_eq!(data.len(), prev_end);
        assert_eq!(data, &joined[..]);
    }

    #[test]
    fn partitions_cover_input_exactly() {
        for workers in 1..=16 {
            let ranges = partition(INPUT, workers, 64).unwrap();
            check_cover(INPUT, &ranges, workers);
        }
    }

    #[test]
    fn split_inside_a_token_moves_to_next_line() {
        // len 30, split at 15 lands inside "Bbbbbbbbbb".
        let data = b"Aaaa;1.0\nBbbbbbbbbb;2.0\nC;3.0\n";
        let ranges = partition(data, 2, 64).unwrap();
        assert_eq!(vec![0..24, 24..30], ranges);

        // Split at 4 lands inside "1.5".
        let data = b"a;1.5\nb;2.5\n";
        let ranges = partition(data, 3, 64).unwrap();
        check_cover(data, &ranges, 3);
        assert_eq!(0..6, ranges[0]);
    }

    #[test]
    fn more_workers_than_lines() {
        let data = b"x;1.0\n";
        let ranges = partition(data, 8, 64).unwrap();
        check_cover(data, &ranges, 8);
        assert_eq!(1, ranges.iter().filter(|r| !r.is_empty()).count());
    }

    #[test]
    fn unterminated_last_line() {
        let data = b"a;1.0\nbbbbbbbbbbbbbbbb;2.0";
        let ranges = partition(data, 2, 64).unwrap();
        check_cover(data, &ranges, 2);
        assert_eq!(data.len(), ranges[0].end);
    }

    #[test]
    fn empty_input() {
        let ranges = partition(b"", 4, 64).unwrap();
        assert_eq!(vec![0..0, 0..0, 0..0, 0..0], ranges);
    }

    #[test]
    fn line_longer_than_window() {
        let mut data = vec![b'k'; 200];
        data.extend_from_slice(b";1.0\n");
        match partition(&data, 2, 16) {
            Err(Error::PartitionBoundaryNotFound {
                offset: 102,
                window: 16,
            }) => {}
            other => panic!("expected PartitionBoundaryNotFound, got {other:?}"),
        }
    }
}
