use std::fs::{self, File};
use std::io::BufWriter;
use std::num::ParseIntError;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Writes a synthetic `station;temperature` file.
#[derive(Parser, Debug)]
struct Args {
    /// Number of rows; `_` separators are allowed (1_000_000_000).
    #[arg(value_parser = parse_count)]
    rows: usize,

    #[arg(default_value = "data/measurements.txt")]
    path: PathBuf,

    /// RNG seed; equal seeds give identical files.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn parse_count(s: &str) -> Result<usize, ParseIntError> {
    s.replace('_', "").parse()
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(dir) = args.path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file =
        File::create(&args.path).with_context(|| format!("creating {}", args.path.display()))?;
    let mut out = BufWriter::with_capacity(1 << 20, file);
    generate::write_rows(&mut out, args.rows, args.seed)?;

    println!("wrote {} rows to {}", args.rows, args.path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_separators() {
        let args = Args::try_parse_from(["generate", "1_000_000"]).unwrap();
        assert_eq!(1_000_000, args.rows);
        assert_eq!(PathBuf::from("data/measurements.txt"), args.path);
        assert_eq!(0, args.seed);
    }

    #[test]
    fn path_and_seed() {
        let args = Args::try_parse_from(["generate", "10", "/tmp/m.txt", "--seed", "7"]).unwrap();
        assert_eq!(10, args.rows);
        assert_eq!(PathBuf::from("/tmp/m.txt"), args.path);
        assert_eq!(7, args.seed);
    }

    #[test]
    fn bad_counts_are_rejected() {
        assert!(Args::try_parse_from(["generate"]).is_err());
        assert!(Args::try_parse_from(["generate", "ten"]).is_err());
        assert!(Args::try_parse_from(["generate", "-5"]).is_err());
    }
}
