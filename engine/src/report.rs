use std::fmt;
use std::io::{self, Write};

use crate::table::{Accumulator, Entry, KeyTable};

/// A value in tenths, printed with exactly one fractional digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenths(pub i64);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{}.{}", abs / 10, abs % 10)
    }
}

/// Merged accumulators in ascending byte order of their keys.
#[derive(Debug, Clone, Default)]
pub struct Report {
    rows: Vec<Entry>,
}

impl Report {
    pub fn from_table(table: KeyTable) -> Self {
        let mut rows: Vec<Entry> = table.into_entries().collect();
        rows.sort_unstable_by(|a, b| a.key.cmp(&b.key));
        debug_assert!(
            rows.windows(2).all(|w| w[0].key < w[1].key),
            "keys must be unique after merge"
        );
        Self { rows }
    }

    pub fn rows(&self) -> &[Entry] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &[u8]) -> Option<&Accumulator> {
        self.rows
            .binary_search_by(|row| (*row.key).cmp(key))
            .ok()
            .map(|idx| &self.rows[idx].stats)
    }

    /// Writes `{key=min/mean/max, ...}` with every key as its raw bytes.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(b"{")?;
        for (idx, row) in self.rows.iter().enumerate() {
            if idx > 0 {
                out.write_all(b", ")?;
            }
            out.write_all(&row.key)?;
            write!(
                out,
                "={}/{}/{}",
                Tenths(row.stats.min as i64),
                Tenths(row.stats.mean_tenths()),
                Tenths(row.stats.max as i64),
            )?;
        }
        out.write_all(b"}")
    }
}

/// `{key=min/mean/max, ...}`. Keys that are not UTF-8 are shown lossily;
/// [`Report::write_to`] keeps their bytes.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, row) in self.rows.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(
                f,
                "{}={}/{}/{}",
                String::from_utf8_lossy(&row.key),
                Tenths(row.stats.min as i64),
                Tenths(row.stats.mean_tenths()),
                Tenths(row.stats.max as i64),
            )?;
        }
        f.write_str("}")
    }
}
