//! Synthetic measurement files: station names with a mean temperature,
//! values drawn from a normal distribution around it.

use std::io::Write;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

pub const STATIONS: &[(&str, f64)] = &[
    ("Abha", 18.0),
    ("Abidjan", 26.0),
    ("Accra", 26.4),
    ("Addis Ababa", 16.0),
    ("Alexandria", 20.0),
    ("Anchorage", 2.8),
    ("Ashgabat", 17.1),
    ("Baghdad", 22.77),
    ("Bangkok", 28.6),
    ("Belgrade", 12.5),
    ("Bridgetown", 27.0),
    ("Bulawayo", 18.9),
    ("Cairo", 21.4),
    ("Conakry", 26.4),
    ("Cracow", 9.3),
    ("Da Nang", 25.8),
    ("Dikson", -11.1),
    ("Dodoma", 22.7),
    ("Hamburg", 9.7),
    ("Istanbul", 13.9),
    ("Jerusalem", 18.3),
    ("Kuopio", 3.4),
    ("Läsä", 7.2),
    ("Nouadhibou", 21.3),
    ("Palembang", 27.3),
    ("Reykjavík", 4.3),
    ("Roseau", 26.2),
    ("São Paulo", 19.7),
    ("St. John's", 5.0),
    ("Tromsø", 2.9),
    ("Ürümqi", 7.4),
    ("Yakutsk", -8.8),
    ("Zürich", 9.3),
];

/// Writes `rows` lines of `station;value\n` using a seeded generator.
pub fn write_rows<W: Write>(out: &mut W, rows: usize, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let spreads = STATIONS
        .iter()
        .map(|(_, mean)| Normal::new(*mean, 10.0))
        .collect::<Result<Vec<_>, _>>()?;

    for _ in 0..rows {
        let idx = rng.random_range(0..STATIONS.len());
        let tenths = ((spreads[idx].sample(&mut rng) * 10.0).round() as i32).clamp(-999, 999);
        let sign = if tenths < 0 { "-" } else { "" };
        let abs = tenths.abs();
        writeln!(out, "{};{sign}{}.{}", STATIONS[idx].0, abs / 10, abs % 10)?;
    }
    Ok(())
}

/// In-memory variant of [`write_rows`].
pub fn rows(rows: usize, seed: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(rows * 16);
    if let Err(e) = write_rows(&mut out, rows, seed) {
        panic!("generating {rows} rows: {e}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_output_is_reproducible() {
        assert_eq!(rows(500, 9), rows(500, 9));
        assert_ne!(rows(500, 9), rows(500, 10));
    }

    #[test]
    fn every_line_is_well_formed() {
        let data = rows(2_000, 1);
        let text = String::from_utf8(data).unwrap();
        assert_eq!(2_000, text.lines().count());
        for line in text.lines() {
            let (name, value) = line.split_once(';').unwrap();
            assert!(STATIONS.iter().any(|(s, _)| *s == name), "line {line}");
            let (int, frac) = value.trim_start_matches('-').split_once('.').unwrap();
            assert!((1..=2).contains(&int.len()), "line {line}");
            assert_eq!(1, frac.len(), "line {line}");
        }
    }
}
