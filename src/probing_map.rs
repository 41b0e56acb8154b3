use std::{
    borrow::Borrow,
    collections::hash_map::DefaultHasher,
    fmt::{self, Debug},
    hash::{Hash, Hasher},
    mem,
    slice,
};

use crate::error::KeyNotFound;

/// Number of slots in a map created with [`ProbingMap::new`].
pub const INITIAL_CAPACITY: usize = 16;

/// The largest ratio of live entries to slots a map may have once a public operation returns.
/// Must satisfy `0 < MAX_LOAD_FACTOR < 1`.
pub const MAX_LOAD_FACTOR: f64 = 0.5;

/// A slot of the probing table
#[derive(Debug, Clone)]
enum Slot<K, V> {
    /// Never written since the table was built; ends every probe
    Empty,
    /// Held an entry that has since been removed; probes continue past it
    Tombstone,
    /// Holds a live entry
    Occupied {
        /// The key of the entry
        key: K,
        /// The value associated with the key
        value: V,
    },
}

impl<K, V> Slot<K, V> {
    /// Returns the key of a live entry
    fn key(&self) -> Option<&K> {
        match self {
            Self::Occupied { key, .. } => Some(key),
            Self::Empty | Self::Tombstone => None,
        }
    }

    /// Returns the key and value of a live entry
    fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Self::Occupied { key, value } => Some((key, value)),
            Self::Empty | Self::Tombstone => None,
        }
    }

    /// Takes the key and value out of a live entry
    fn into_entry(self) -> Option<(K, V)> {
        match self {
            Self::Occupied { key, value } => Some((key, value)),
            Self::Empty | Self::Tombstone => None,
        }
    }
}

/// Where a linear probe for a key ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// The key is live in this slot
    Found {
        /// Slot holding the key
        index: usize,
        /// Number of slots stepped over before reaching `index`
        distance: usize,
    },
    /// The key is absent; a new entry for it belongs in this slot
    Vacant {
        /// First `Empty` or `Tombstone` slot on the key's probe path
        index: usize,
    },
    /// The key is absent and no slot is free
    Full,
}

/// Builds a table of `capacity` empty slots
fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    (0..capacity).map(|_| Slot::Empty).collect()
}

/// Computes the hash for a key
fn hash_of<Q: ?Sized + Hash>(key: &Q) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// A hash map using open addressing with linear probing.
///
/// Removed entries leave a tombstone behind so that probe chains running through them stay
/// intact. Tombstones are reused by later inserts that land on them, and dropped whenever the
/// table is rebuilt. The table doubles as soon as an insert pushes the load factor above
/// [`MAX_LOAD_FACTOR`].
///
/// Note: This implementation is not thread-safe.
#[derive(Clone)]
pub struct ProbingMap<K, V> {
    /// The probing table; never empty
    slots: Vec<Slot<K, V>>,
    /// Number of `Occupied` slots
    size: usize,
}

impl<K, V> Default for ProbingMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Debug for ProbingMap<K, V>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Extend<(K, V)> for ProbingMap<K, V>
where
    K: Eq + Hash,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ProbingMap<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V> IntoIterator for &'a ProbingMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> ProbingMap<K, V> {
    /// Creates an empty map with [`INITIAL_CAPACITY`] slots
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Creates an empty map with `capacity` slots (at least one)
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: empty_slots(capacity.max(1)), size: 0 }
    }

    /// Returns the number of live entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the map holds no live entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of slots in the table
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the ratio of live entries to slots
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.slots.len() as f64
    }

    /// Returns an iterator over the live keys in slot order.
    ///
    /// The borrow on the map keeps it from being modified while the iterator is alive.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { slots: self.slots.iter() }
    }

    /// Returns an iterator over the live entries in slot order
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { slots: self.slots.iter() }
    }

    /// Removes every entry and tombstone, keeping the current capacity
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.size = 0;
    }

    /// Returns the slot after `index`, wrapping around to the start of the table
    fn next_index(&self, index: usize) -> usize {
        let next = index.saturating_add(1);
        if next >= self.slots.len() { 0 } else { next }
    }
}

impl<K, V> ProbingMap<K, V>
where
    K: Eq + Hash,
{
    /// Gets the home slot of a key: its hash reduced modulo the capacity
    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    fn home_index<Q: ?Sized + Hash>(&self, key: &Q) -> usize {
        // The hash is unsigned and `slots` is never empty, so the remainder is a valid index.
        (hash_of(key) % self.slots.len() as u64) as usize
    }

    /// Walks the probe path of `key` from its home slot.
    ///
    /// Stops at the slot holding `key` or at the first `Empty` slot. Tombstones are stepped over,
    /// but the first one seen is remembered as the insertion point for an absent key.
    fn probe<Q>(&self, key: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut index = self.home_index(key);
        let mut first_free = None;

        for distance in 0..self.slots.len() {
            match self.slots.get(index) {
                None | Some(Slot::Empty) => {
                    return Probe::Vacant { index: first_free.unwrap_or(index) };
                }
                Some(Slot::Tombstone) => {
                    if first_free.is_none() {
                        first_free = Some(index);
                    }
                }
                Some(Slot::Occupied { key: stored, .. }) => {
                    if stored.borrow() == key {
                        return Probe::Found { index, distance };
                    }
                }
            }
            index = self.next_index(index);
        }

        // Every slot was visited without meeting an `Empty` one
        first_free.map_or(Probe::Full, |index| Probe::Vacant { index })
    }

    /// Returns the slot holding `key`, if it is live
    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.probe(key) {
            Probe::Found { index, .. } => Some(index),
            Probe::Vacant { .. } | Probe::Full => None,
        }
    }

    /// Returns true if `key` has a live entry
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Returns the value associated with `key`
    ///
    /// # Errors
    ///
    /// Returns [`KeyNotFound`] if `key` has no live entry.
    pub fn get<Q>(&self, key: &Q) -> Result<&V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key)
            .and_then(|index| self.slots.get(index))
            .and_then(Slot::entry)
            .map(|(_, value)| value)
            .ok_or(KeyNotFound)
    }

    /// Returns a mutable reference to the value associated with `key`
    ///
    /// # Errors
    ///
    /// Returns [`KeyNotFound`] if `key` has no live entry.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.find(key).ok_or(KeyNotFound)?;
        match self.slots.get_mut(index) {
            Some(Slot::Occupied { value, .. }) => Ok(value),
            _ => Err(KeyNotFound),
        }
    }

    /// Associates `value` with `key`, returning the value it replaces.
    ///
    /// A present key has its value overwritten in place. An absent key takes the first free
    /// slot on its probe path; if that pushes the load factor above [`MAX_LOAD_FACTOR`] the
    /// table is doubled before returning.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let index = loop {
            match self.probe(&key) {
                Probe::Found { index, .. } => {
                    return match self.slots.get_mut(index) {
                        Some(Slot::Occupied { value: stored, .. }) => {
                            Some(mem::replace(stored, value))
                        }
                        _ => None,
                    };
                }
                Probe::Vacant { index } => break index,
                // Unreachable while the load factor stays below one
                Probe::Full => self.grow(),
            }
        };

        self.occupy(index, key, value);

        if self.load_factor() > MAX_LOAD_FACTOR {
            self.grow();
        }

        None
    }

    /// Removes the entry for `key`, leaving a tombstone in its slot, and returns its value
    ///
    /// # Errors
    ///
    /// Returns [`KeyNotFound`] if `key` has no live entry.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.find(key).ok_or(KeyNotFound)?;
        let slot = self.slots.get_mut(index).ok_or(KeyNotFound)?;

        match mem::replace(slot, Slot::Tombstone) {
            Slot::Occupied { value, .. } => {
                self.size = self.size.saturating_sub(1);
                Ok(value)
            }
            other => {
                *slot = other;
                Err(KeyNotFound)
            }
        }
    }

    /// Returns how many slots a lookup of `key` inspects, counting its home slot as one.
    ///
    /// Returns `None` if `key` has no live entry.
    pub fn probe_length<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.probe(key) {
            Probe::Found { distance, .. } => Some(distance.saturating_add(1)),
            Probe::Vacant { .. } | Probe::Full => None,
        }
    }

    /// Stores a new entry in a free slot
    fn occupy(&mut self, index: usize, key: K, value: V) {
        if let Some(slot) = self.slots.get_mut(index) {
            debug_assert!(slot.key().is_none(), "slot {index} is already occupied");
            *slot = Slot::Occupied { key, value };
            self.size = self.size.saturating_add(1);
        }
    }

    /// Doubles the table and re-probes every live entry into it, dropping all tombstones
    fn grow(&mut self) {
        let new_capacity = self.slots.len().saturating_mul(2);
        let old_slots = mem::replace(&mut self.slots, empty_slots(new_capacity));
        let old_size = mem::replace(&mut self.size, 0);

        for (key, value) in old_slots.into_iter().filter_map(Slot::into_entry) {
            if let Probe::Vacant { index } = self.probe(&key) {
                self.occupy(index, key, value);
            }
        }

        debug_assert_eq!(self.size, old_size, "resize must keep every live entry");
    }
}

/// Iterator over the live keys of a [`ProbingMap`]
#[derive(Debug, Clone)]
pub struct Keys<'a, K, V> {
    /// Slots not yet visited
    slots: slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.find_map(Slot::key)
    }
}

/// Iterator over the live entries of a [`ProbingMap`]
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Slots not yet visited
    slots: slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.find_map(Slot::entry)
    }
}
