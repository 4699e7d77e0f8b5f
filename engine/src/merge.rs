use crate::error::Result;
use crate::table::KeyTable;

/// Folds every table of `others` into `base`, slot index by slot index.
///
/// Tables built with the same capacity put a key at the same home slot, so
/// most entries land on an empty or same-key slot at their own index. An
/// entry that finds a different key there (a probed neighbour, or a real
/// collision under `Collision::Reject`) goes through the normal keyed
/// insert, which probes or reports as the table's policy says.
pub fn merge(mut base: KeyTable, mut others: Vec<KeyTable>) -> Result<KeyTable> {
    let slots = others
        .iter()
        .map(KeyTable::capacity)
        .max()
        .unwrap_or(0)
        .max(base.capacity());

    for idx in 0..slots {
        for other in others.iter_mut() {
            if let Some(entry) = other.take(idx) {
                base.absorb_at(idx, entry)?;
            }
        }
    }

    log::debug!(
        "merged {} tables into {} keys",
        others.len() + 1,
        base.len()
    );
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Collision;
    use crate::error::Error;
    use crate::table::Accumulator;

    fn table(collision: Collision, capacity: usize, rows: &[(&str, i32)]) -> KeyTable {
        let mut t = KeyTable::new(capacity, collision);
        for (key, value) in rows {
            t.insert_or_update(key.as_bytes(), *value).unwrap();
        }
        t
    }

    #[test]
    fn disjoint_tables_union_unchanged() {
        let a = table(Collision::Reject, 1024, &[("Abha", 10), ("Abha", 30), ("Baku", -5)]);
        let b = table(Collision::Reject, 1024, &[("Cairo", 250), ("Dakar", 199)]);
        let merged = merge(a, vec![b]).unwrap();

        assert_eq!(4, merged.len());
        assert_eq!(
            Some(&Accumulator {
                min: 10,
                max: 30,
                sum: 40,
                count: 2
            }),
            merged.get(b"Abha")
        );
        assert_eq!(Some(&Accumulator::new(-5)), merged.get(b"Baku"));
        assert_eq!(Some(&Accumulator::new(250)), merged.get(b"Cairo"));
        assert_eq!(Some(&Accumulator::new(199)), merged.get(b"Dakar"));
    }

    #[test]
    fn shared_keys_combine() {
        let a = table(Collision::Probe, 64, &[("x", 10), ("y", -20)]);
        let b = table(Collision::Probe, 64, &[("x", -40), ("x", 5)]);
        let c = table(Collision::Probe, 64, &[("y", 90)]);
        let merged = merge(a, vec![b, c]).unwrap();

        assert_eq!(2, merged.len());
        assert_eq!(
            Some(&Accumulator {
                min: -40,
                max: 10,
                sum: -25,
                count: 3
            }),
            merged.get(b"x")
        );
        assert_eq!(
            Some(&Accumulator {
                min: -20,
                max: 90,
                sum: 70,
                count: 2
            }),
            merged.get(b"y")
        );
    }

    #[test]
    fn empty_base_adopts_entries() {
        let a = KeyTable::new(64, Collision::Reject);
        let b = table(Collision::Reject, 64, &[("solo", 73)]);
        let merged = merge(a, vec![b]).unwrap();
        assert_eq!(Some(&Accumulator::new(73)), merged.get(b"solo"));
    }

    #[test]
    fn probed_keys_do_not_duplicate() {
        // Capacity 2 forces every second key off its home slot, and the two
        // tables insert in opposite orders.
        let a = table(Collision::Probe, 2, &[("p", 1), ("q", 2)]);
        let b = table(Collision::Probe, 2, &[("q", 20), ("p", 10)]);
        let merged = merge(a, vec![b]).unwrap();

        assert_eq!(2, merged.len());
        assert_eq!(11, merged.get(b"p").unwrap().sum);
        assert_eq!(22, merged.get(b"q").unwrap().sum);
    }

    #[test]
    fn index_collision_across_tables_is_reported() {
        let a = table(Collision::Reject, 1, &[("left", 1)]);
        let b = table(Collision::Reject, 1, &[("right", 2)]);
        match merge(a, vec![b]) {
            Err(Error::KeyCollision { slot: 0, .. }) => {}
            other => panic!("expected KeyCollision, got {:?}", other.err()),
        }
    }
}
