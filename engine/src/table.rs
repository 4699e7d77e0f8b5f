//! Fixed-capacity per-worker table of key accumulators.
//!
//! Slots are addressed by `sdbm(key) % capacity`. Every slot stores its key
//! and every lookup compares it, so two keys sharing a home slot are either
//! probed apart ([`Collision::Probe`]) or reported ([`Collision::Reject`]),
//! never folded together.

use crate::config::Collision;
use crate::error::{Error, Result};

/// min/max/sum/count of one key, all in tenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accumulator {
    pub min: i32,
    pub max: i32,
    pub sum: i64,
    pub count: u64,
}

impl Accumulator {
    pub fn new(value: i32) -> Self {
        Self {
            min: value,
            max: value,
            sum: value as i64,
            count: 1,
        }
    }

    #[inline]
    pub fn record(&mut self, value: i32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value as i64;
        self.count += 1;
    }

    pub fn merge(&mut self, other: &Accumulator) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Mean in tenths, rounded half away from zero.
    pub fn mean_tenths(&self) -> i64 {
        let denom = self.count as i64;
        if self.sum >= 0 {
            (self.sum + denom / 2) / denom
        } else {
            -((-self.sum + denom / 2) / denom)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Box<[u8]>,
    pub stats: Accumulator,
}

impl Entry {
    pub fn key_lossy(&self) -> String {
        String::from_utf8_lossy(&self.key).into_owned()
    }
}

/// SDBM string hash: `hash * 65599 + byte` over the key.
#[inline]
pub fn sdbm(key: &[u8]) -> u64 {
    key.iter()
        .fold(0u64, |hash, &c| hash.wrapping_mul(65_599).wrapping_add(c as u64))
}

#[inline]
pub fn home_slot(key: &[u8], capacity: usize) -> usize {
    (sdbm(key) % capacity as u64) as usize
}

enum Lookup {
    Found(usize),
    Vacant(usize),
}

pub struct KeyTable {
    slots: Box<[Option<Entry>]>,
    len: usize,
    collision: Collision,
}

impl KeyTable {
    pub fn new(capacity: usize, collision: Collision) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots: slots.into_boxed_slice(),
            len: 0,
            collision,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slot holding `key`, if any.
    pub fn find(&self, key: &[u8]) -> Option<usize> {
        match self.lookup(key) {
            Ok(Lookup::Found(idx)) => Some(idx),
            _ => None,
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&Accumulator> {
        self.find(key)
            .and_then(|idx| self.slots[idx].as_ref())
            .map(|entry| &entry.stats)
    }

    #[inline]
    pub fn insert_or_update(&mut self, key: &[u8], value: i32) -> Result<()> {
        let idx = match self.lookup(key)? {
            Lookup::Found(idx) => {
                if let Some(entry) = self.slots[idx].as_mut() {
                    entry.stats.record(value);
                }
                return Ok(());
            }
            Lookup::Vacant(idx) => idx,
        };
        self.occupy(
            idx,
            Entry {
                key: key.into(),
                stats: Accumulator::new(value),
            },
        );
        Ok(())
    }

    /// Folds a whole entry from another table into this one.
    pub fn absorb(&mut self, entry: Entry) -> Result<()> {
        match self.lookup(&entry.key)? {
            Lookup::Found(idx) => {
                if let Some(existing) = self.slots[idx].as_mut() {
                    existing.stats.merge(&entry.stats);
                }
            }
            Lookup::Vacant(idx) => self.occupy(idx, entry),
        }
        Ok(())
    }

    /// Like [`absorb`](Self::absorb), but first tries slot `idx`, where the
    /// entry lived in a table of the same capacity.
    pub fn absorb_at(&mut self, idx: usize, entry: Entry) -> Result<()> {
        if let Some(existing) = self.slots.get_mut(idx).and_then(Option::as_mut) {
            if existing.key == entry.key {
                existing.stats.merge(&entry.stats);
                return Ok(());
            }
        }
        self.absorb(entry)
    }

    /// Empties slot `idx` and hands its entry to the caller.
    ///
    /// Only meant for draining a table: a probed key behind the emptied slot
    /// is no longer reachable through [`find`](Self::find).
    pub fn take(&mut self, idx: usize) -> Option<Entry> {
        let entry = self.slots.get_mut(idx)?.take();
        if entry.is_some() {
            self.len -= 1;
        }
        entry
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.slots.iter().flatten()
    }

    pub fn into_entries(self) -> impl Iterator<Item = Entry> {
        self.slots.into_vec().into_iter().flatten()
    }

    fn occupy(&mut self, idx: usize, entry: Entry) {
        let home = home_slot(&entry.key, self.capacity());
        if idx != home {
            log::debug!(
                "key {:?} displaced from slot {home} to {idx}",
                entry.key_lossy()
            );
        }
        self.slots[idx] = Some(entry);
        self.len += 1;
    }

    #[inline]
    fn lookup(&self, key: &[u8]) -> Result<Lookup> {
        let capacity = self.capacity();
        let home = home_slot(key, capacity);
        match self.collision {
            Collision::Reject => match &self.slots[home] {
                None => Ok(Lookup::Vacant(home)),
                Some(entry) if &*entry.key == key => Ok(Lookup::Found(home)),
                Some(entry) => Err(Error::KeyCollision {
                    slot: home,
                    existing: entry.key_lossy(),
                    incoming: String::from_utf8_lossy(key).into_owned(),
                }),
            },
            Collision::Probe => {
                let mut idx = home;
                for _ in 0..capacity {
                    match &self.slots[idx] {
                        None => return Ok(Lookup::Vacant(idx)),
                        Some(entry) if &*entry.key == key => return Ok(Lookup::Found(idx)),
                        Some(_) => {}
                    }
                    idx += 1;
                    if idx == capacity {
                        idx = 0;
                    }
                }
                Err(Error::TableFull { capacity })
            }
        }
    }
}
