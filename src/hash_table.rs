//! HashTable: separate chaining over sentinel-headed buckets.
//!
//! Entries live in a slot arena and are threaded into per-bucket chains
//! through their `next` key. Buckets are sentinels: they hold only the key
//! of the first entry in their chain and are never removed.

use crate::element::{element_eq, element_hash, Element, EqFn, HashFn};
use crate::linked_list::LinkedList;
use slotmap::{DefaultKey, SlotMap};

/// Bucket count of a table built with `HashTable::new`.
pub const INITIAL_CAPACITY: usize = 17;

/// Capacity doubles when an insert would push `size / capacity` past this.
pub const LOAD_FACTOR_THRESHOLD: f64 = 1.0;

#[derive(Debug)]
struct Entry {
    key: Element,
    value: Element,
    next: Option<DefaultKey>,
}

#[derive(Copy, Clone, Debug, Default)]
struct Bucket {
    next: Option<DefaultKey>,
}

/// A chain position whose `next` link can be rewritten: either a bucket
/// sentinel or a real entry.
#[derive(Copy, Clone, Debug)]
enum Link {
    Sentinel(usize),
    Entry(DefaultKey),
}

pub struct HashTable {
    buckets: Vec<Bucket>,
    entries: SlotMap<DefaultKey, Entry>,
    size: usize,
    hash_fn: HashFn,
    eq_fn: EqFn,
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new(element_hash, element_eq)
    }
}

/// Iterator over `(&key, &value)` in bucket-then-chain order.
pub struct Iter<'a> {
    table: &'a HashTable,
    bucket: usize,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Element, &'a Element);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.cur {
                let e = &self.table.entries[k];
                self.cur = e.next;
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
            let b = self.table.buckets.get(self.bucket)?;
            self.cur = b.next;
            self.bucket += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl HashTable {
    /// Empty table with `INITIAL_CAPACITY` buckets.
    pub fn new(hash_fn: HashFn, eq_fn: EqFn) -> Self {
        Self::with_capacity(INITIAL_CAPACITY, hash_fn, eq_fn)
    }

    /// Empty table with `capacity` buckets. Zero is allowed; the first
    /// insert grows it.
    pub fn with_capacity(capacity: usize, hash_fn: HashFn, eq_fn: EqFn) -> Self {
        Self {
            buckets: vec![Bucket::default(); capacity],
            entries: SlotMap::with_key(),
            size: 0,
            hash_fn,
            eq_fn,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        if self.buckets.is_empty() {
            return 0.0;
        }
        self.size as f64 / self.buckets.len() as f64
    }

    pub fn hash_fn(&self) -> HashFn {
        self.hash_fn
    }

    pub fn eq_fn(&self) -> EqFn {
        self.eq_fn
    }

    fn bucket_index(&self, key: &Element) -> Option<usize> {
        let cap = self.buckets.len();
        if cap == 0 {
            return None;
        }
        Some(((self.hash_fn)(key) % cap as u64) as usize)
    }

    fn link_next(&self, link: Link) -> Option<DefaultKey> {
        match link {
            Link::Sentinel(b) => self.buckets[b].next,
            Link::Entry(k) => self.entries[k].next,
        }
    }

    fn set_link_next(&mut self, link: Link, next: Option<DefaultKey>) {
        match link {
            Link::Sentinel(b) => self.buckets[b].next = next,
            Link::Entry(k) => self.entries[k].next = next,
        }
    }

    /// Walk the chain of `bucket` and return the link preceding the entry
    /// whose key equals `key`, together with that entry. When no entry
    /// matches, the returned link is the chain's last position.
    fn find_previous(&self, bucket: usize, key: &Element) -> (Link, Option<DefaultKey>) {
        let mut prev = Link::Sentinel(bucket);
        let mut cur = self.buckets[bucket].next;
        while let Some(k) = cur {
            let e = &self.entries[k];
            if (self.eq_fn)(&e.key, key) {
                return (prev, Some(k));
            }
            prev = Link::Entry(k);
            cur = e.next;
        }
        (prev, None)
    }

    fn find(&self, key: &Element) -> Option<DefaultKey> {
        let b = self.bucket_index(key)?;
        self.find_previous(b, key).1
    }

    /// Load check for placing one more entry.
    fn needs_grow(&self) -> bool {
        let cap = self.buckets.len();
        cap == 0 || (self.size + 1) as f64 / cap as f64 > LOAD_FACTOR_THRESHOLD
    }

    /// Rebuild the bucket array at `new_capacity` and relink every entry
    /// into it. Entries stay in the arena; only their links change.
    fn resize(&mut self, new_capacity: usize) {
        tracing::debug!(
            old_capacity = self.buckets.len(),
            new_capacity,
            size = self.size,
            "resizing hash table"
        );
        let mut fresh = vec![Bucket::default(); new_capacity];
        for b in 0..self.buckets.len() {
            let mut cur = self.buckets[b].next;
            while let Some(k) = cur {
                let idx = ((self.hash_fn)(&self.entries[k].key) % new_capacity as u64) as usize;
                let e = &mut self.entries[k];
                cur = e.next;
                e.next = fresh[idx].next;
                fresh[idx].next = Some(k);
            }
        }
        self.buckets = fresh;
    }

    /// Insert or overwrite. A new key is linked right after its bucket's
    /// sentinel; an existing key gets its value replaced in place and the
    /// previous value is returned.
    pub fn insert(&mut self, key: Element, value: Element) -> Option<Element> {
        // Overwrites keep the size, so they never trigger growth.
        if let Some(k) = self.find(&key) {
            let old = std::mem::replace(&mut self.entries[k].value, value);
            return Some(old);
        }
        if self.needs_grow() {
            let new_capacity = (self.buckets.len() * 2).max(1);
            self.resize(new_capacity);
        }
        // capacity is at least one after growth
        let b = self.bucket_index(&key)?;
        let next = self.buckets[b].next;
        let k = self.entries.insert(Entry { key, value, next });
        self.buckets[b].next = Some(k);
        self.size += 1;
        None
    }

    /// Value stored under `key`, if any.
    pub fn lookup(&self, key: &Element) -> Option<&Element> {
        self.find(key).map(|k| &self.entries[k].value)
    }

    /// Mutable access to the value under `key`.
    pub fn lookup_mut(&mut self, key: &Element) -> Option<&mut Element> {
        let k = self.find(key)?;
        Some(&mut self.entries[k].value)
    }

    /// Unlink the entry for `key` and return its value. Absent keys leave
    /// the table untouched. Capacity never shrinks.
    pub fn remove(&mut self, key: &Element) -> Option<Element> {
        let b = self.bucket_index(key)?;
        let (prev, found) = self.find_previous(b, key);
        let k = found?;
        let entry = self.entries.remove(k)?;
        self.set_link_next(prev, entry.next);
        self.size -= 1;
        Some(entry.value)
    }

    pub fn has_key(&self, key: &Element) -> bool {
        self.lookup(key).is_some()
    }

    /// True iff some stored value equals `value` (structural `Element`
    /// equality, independent of the table's key equality).
    pub fn has_value(&self, value: &Element) -> bool {
        self.iter().any(|(_, v)| v == value)
    }

    /// Destroy every entry. Capacity and strategy functions are kept.
    pub fn clear(&mut self) {
        tracing::trace!(size = self.size, capacity = self.buckets.len(), "clearing hash table");
        self.entries.clear();
        for b in self.buckets.iter_mut() {
            b.next = None;
        }
        self.size = 0;
    }

    /// All keys in bucket-then-chain order, as a new list sharing the
    /// table's equality function.
    pub fn keys(&self) -> LinkedList {
        let mut list = LinkedList::new(self.eq_fn);
        list.extend(self.iter().map(|(k, _)| k.clone()));
        list
    }

    /// All values in bucket-then-chain order.
    pub fn values(&self) -> LinkedList {
        let mut list = LinkedList::new(self.eq_fn);
        list.extend(self.iter().map(|(_, v)| v.clone()));
        list
    }

    /// True iff `pred` holds for some entry. Stops at the first match.
    pub fn any<X, P>(&self, mut pred: P, extra: &X) -> bool
    where
        X: ?Sized,
        P: FnMut(&Element, &Element, &X) -> bool,
    {
        self.iter().any(|(k, v)| pred(k, v, extra))
    }

    /// True iff `pred` holds for every entry. Stops at the first failure.
    pub fn all<X, P>(&self, mut pred: P, extra: &X) -> bool
    where
        X: ?Sized,
        P: FnMut(&Element, &Element, &X) -> bool,
    {
        self.iter().all(|(k, v)| pred(k, v, extra))
    }

    /// Call `f` with every key and a mutable reference to its value.
    pub fn apply_to_all<X, F>(&mut self, mut f: F, extra: &X)
    where
        X: ?Sized,
        F: FnMut(&Element, &mut Element, &X),
    {
        for b in 0..self.buckets.len() {
            let mut cur = self.buckets[b].next;
            while let Some(k) = cur {
                let e = &mut self.entries[k];
                f(&e.key, &mut e.value, extra);
                cur = e.next;
            }
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            table: self,
            bucket: 0,
            cur: None,
            remaining: self.size,
        }
    }

    /// Count entries by walking every chain. Agrees with `len()` whenever
    /// the table is consistent.
    pub fn reachable_entries(&self) -> usize {
        let mut n = 0;
        for b in 0..self.buckets.len() {
            let mut link = Link::Sentinel(b);
            while let Some(k) = self.link_next(link) {
                n += 1;
                link = Link::Entry(k);
            }
        }
        n
    }

    #[cfg(test)]
    pub(crate) fn chain_len(&self, bucket: usize) -> usize {
        let mut n = 0;
        let mut cur = self.buckets[bucket].next;
        while let Some(k) = cur {
            n += 1;
            cur = self.entries[k].next;
        }
        n
    }
}

impl<'a> IntoIterator for &'a HashTable {
    type Item = (&'a Element, &'a Element);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl core::fmt::Debug for HashTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{int_eq, int_hash, string_eq, string_sum_hash};
    use std::collections::BTreeSet;

    fn int_table() -> HashTable {
        HashTable::new(int_hash, int_eq)
    }

    fn int(v: i64) -> Element {
        Element::Int(v)
    }

    /// Invariant: a fresh table is empty with the fixed initial capacity.
    #[test]
    fn create_is_empty() {
        let t = int_table();
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
        assert_eq!(t.capacity(), INITIAL_CAPACITY);
        assert_eq!(t.lookup(&int(1)), None);
    }

    /// Invariant: re-inserting a key keeps size and last write wins.
    #[test]
    fn overwrite_keeps_size() {
        let mut t = int_table();
        assert_eq!(t.insert(int(1), Element::str("a")), None);
        assert_eq!(t.insert(int(1), Element::str("b")), Some(Element::str("a")));
        assert_eq!(t.len(), 1);
        assert_eq!(t.lookup(&int(1)), Some(&Element::str("b")));
    }

    /// Invariant: keys sharing a bucket are chained with the newest entry
    /// right after the sentinel, and removing from the middle of the chain
    /// keeps the rest reachable.
    #[test]
    fn same_bucket_chain_and_splice() {
        let mut t = int_table();
        let cap = INITIAL_CAPACITY as i64;
        for i in 0..3 {
            t.insert(int(i * cap), int(i));
        }
        assert_eq!(t.chain_len(0), 3);
        let order: Vec<i64> = t.iter().filter_map(|(k, _)| k.as_int()).collect();
        assert_eq!(order, vec![2 * cap, cap, 0]);

        assert_eq!(t.remove(&int(cap)), Some(int(1)));
        assert_eq!(t.chain_len(0), 2);
        assert_eq!(t.lookup(&int(0)), Some(&int(0)));
        assert_eq!(t.lookup(&int(2 * cap)), Some(&int(2)));
        assert_eq!(t.reachable_entries(), t.len());
    }

    /// Invariant: removing an absent key is a no-op; removing a present key
    /// decrements size by one.
    #[test]
    fn remove_present_and_absent() {
        let mut t = int_table();
        t.insert(int(5), int(50));
        assert_eq!(t.remove(&int(6)), None);
        assert_eq!(t.len(), 1);
        assert_eq!(t.remove(&int(5)), Some(int(50)));
        assert_eq!(t.len(), 0);
        assert!(!t.has_key(&int(5)));
        assert_eq!(t.remove(&int(5)), None);
    }

    /// Invariant: capacity doubles before the insert that would push the
    /// load past 1.0, never after.
    #[test]
    fn growth_happens_before_overflowing_insert() {
        let mut t = int_table();
        for i in 0..INITIAL_CAPACITY as i64 {
            t.insert(int(i), int(i));
        }
        assert_eq!(t.capacity(), INITIAL_CAPACITY);
        assert!((t.load_factor() - 1.0).abs() < f64::EPSILON);
        t.insert(int(100), int(100));
        assert_eq!(t.capacity(), INITIAL_CAPACITY * 2);
        assert_eq!(t.len(), INITIAL_CAPACITY + 1);
        assert_eq!(t.reachable_entries(), t.len());
    }

    /// Invariant: overwriting a key in a full table leaves the load at 1.0,
    /// so capacity and bucket-then-chain order stay the same.
    #[test]
    fn overwrite_in_full_table_does_not_grow() {
        let mut t = int_table();
        for i in 0..INITIAL_CAPACITY as i64 {
            t.insert(int(i), int(i));
        }
        let order_before: Vec<Element> = t.keys().iter().cloned().collect();
        assert_eq!(t.insert(int(0), int(99)), Some(int(0)));
        assert_eq!(t.len(), INITIAL_CAPACITY);
        assert_eq!(t.capacity(), INITIAL_CAPACITY);
        assert_eq!(t.lookup(&int(0)), Some(&int(99)));
        let order_after: Vec<Element> = t.keys().iter().cloned().collect();
        assert_eq!(order_before, order_after);

        // the next new key still grows the table
        t.insert(int(100), int(100));
        assert_eq!(t.capacity(), INITIAL_CAPACITY * 2);
    }

    /// Invariant: resizing is transparent; every key survives many doublings.
    #[test]
    fn many_inserts_survive_resizes() {
        let mut t = int_table();
        let n = 1000;
        for i in 0..n {
            t.insert(int(i), int(i * 2));
        }
        assert_eq!(t.len(), n as usize);
        assert!(t.capacity() >= n as usize);
        assert!(t.load_factor() <= LOAD_FACTOR_THRESHOLD);
        for i in 0..n {
            assert_eq!(t.lookup(&int(i)), Some(&int(i * 2)));
        }
        assert_eq!(t.reachable_entries(), n as usize);
    }

    /// Invariant: a zero-capacity table grows on first insert and tolerates
    /// lookups/removes before that.
    #[test]
    fn zero_capacity_grows() {
        let mut t = HashTable::with_capacity(0, int_hash, int_eq);
        assert_eq!(t.lookup(&int(1)), None);
        assert_eq!(t.remove(&int(1)), None);
        assert_eq!(t.load_factor(), 0.0);
        t.insert(int(1), int(1));
        assert_eq!(t.capacity(), 1);
        t.insert(int(2), int(2));
        assert_eq!(t.capacity(), 2);
        t.insert(int(3), int(3));
        assert_eq!(t.capacity(), 4);
        assert_eq!(t.len(), 3);
        for i in 1..=3 {
            assert!(t.has_key(&int(i)));
        }
    }

    /// Invariant: clear keeps capacity, drops every entry, table reusable.
    #[test]
    fn clear_keeps_capacity() {
        let mut t = int_table();
        for i in 0..40 {
            t.insert(int(i), int(i));
        }
        let cap = t.capacity();
        t.clear();
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
        assert_eq!(t.capacity(), cap);
        assert_eq!(t.reachable_entries(), 0);
        assert_eq!(t.iter().count(), 0);
        t.insert(int(1), int(1));
        assert_eq!(t.lookup(&int(1)), Some(&int(1)));
    }

    /// Invariant: keys/values enumerate each entry exactly once and every
    /// key looks up to a value present in `values()`.
    #[test]
    fn keys_values_round_trip() {
        let mut t = HashTable::new(string_sum_hash, string_eq);
        for name in ["Apple", "Pear", "Plum", "Kiwi", "elppA"] {
            t.insert(Element::str(name), Element::str(&name.to_lowercase()));
        }
        let keys = t.keys();
        let values = t.values();
        assert_eq!(keys.len(), 5);
        assert_eq!(values.len(), 5);
        for k in keys.iter() {
            let v = t.lookup(k).expect("listed key present");
            assert!(values.contains(v));
        }
        let set: BTreeSet<&str> = keys.iter().filter_map(Element::as_str).collect();
        assert_eq!(set.len(), 5);
        // keys list shares the table's equality
        assert!(keys.contains(&Element::str("Kiwi")));
    }

    #[test]
    fn has_value_is_structural() {
        let mut t = int_table();
        t.insert(int(1), Element::str("shelf"));
        t.insert(int(2), int(20));
        assert!(t.has_value(&Element::str("shelf")));
        assert!(t.has_value(&int(20)));
        assert!(!t.has_value(&Element::str("Shelf")));
        assert!(!t.has_value(&Element::Float(20.0)));
    }

    #[test]
    fn quantifiers_short_circuit() {
        let mut t = int_table();
        for i in 0..10 {
            t.insert(int(i), int(i * 2));
        }
        let value_is_double = |k: &Element, v: &Element, _: &()| {
            matches!((k, v), (Element::Int(k), Element::Int(v)) if *v == k * 2)
        };
        assert!(t.all(value_is_double, &()));
        assert!(t.any(|k, _, target: &i64| k.as_int() == Some(*target), &7));
        assert!(!t.any(|k, _, target: &i64| k.as_int() == Some(*target), &70));

        let mut calls = 0;
        assert!(!t.all(
            |_, _, _: &()| {
                calls += 1;
                false
            },
            &()
        ));
        assert_eq!(calls, 1);

        let empty = int_table();
        assert!(empty.all(value_is_double, &()));
        assert!(!empty.any(value_is_double, &()));
    }

    #[test]
    fn apply_to_all_mutates_values_only() {
        let mut t = int_table();
        for i in 0..20 {
            t.insert(int(i), int(i));
        }
        t.apply_to_all(
            |k, v, offset: &i64| {
                if let (Element::Int(k), Element::Int(v)) = (k, v) {
                    *v = *k + *offset;
                }
            },
            &1000,
        );
        assert_eq!(t.len(), 20);
        for i in 0..20 {
            assert_eq!(t.lookup(&int(i)), Some(&int(i + 1000)));
        }
    }

    #[test]
    fn lookup_mut_updates_in_place() {
        let mut t = HashTable::default();
        t.insert(Element::str("stock"), int(1));
        if let Some(Element::Int(v)) = t.lookup_mut(&Element::str("stock")) {
            *v += 4;
        }
        assert_eq!(t.lookup(&Element::str("stock")), Some(&int(5)));
        assert_eq!(t.lookup_mut(&Element::str("none")), None);
    }
}
