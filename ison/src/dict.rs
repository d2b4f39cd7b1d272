// SPDX-License-Identifier: Apache-2.0

//! Fixed-size keyed hash map used for JSON objects.
//!
//! The table has [`BUCKET_COUNT`] buckets and is never resized. A bucket
//! holds a single entry until a second, different key hashes to it; from
//! then on it is a chain scanned linearly. Bucket placement comes from
//! SipHash keyed with a secret, so hostile documents cannot aim every key
//! at one bucket.

use core::hash::Hasher;

use log::debug;
use siphasher::sip128::{Hash128, Hasher128, SipHasher};

use crate::array::Array;
use crate::hash_key::HashKey;
use crate::parse_error::DuplicateKey;
use crate::value::{release, values_equal, Value};

/// Number of buckets in every [`Dict`]. Must be a power of two.
pub const BUCKET_COUNT: usize = 32;

const _: () = assert!(BUCKET_COUNT.is_power_of_two());

struct Entry {
    key: Box<str>,
    value: Value,
}

#[derive(Default)]
enum Bucket {
    #[default]
    Empty,
    Single(Box<Entry>),
    /// Two or more keys sharing the bucket. Never reverts to `Single`.
    Chain(Box<Array<Entry>>),
}

impl Bucket {
    fn entries(&self) -> core::slice::Iter<'_, Entry> {
        match self {
            Bucket::Empty => Default::default(),
            Bucket::Single(entry) => core::slice::from_ref(&**entry).iter(),
            Bucket::Chain(chain) => chain.iter(),
        }
    }
}

/// A JSON object: string keys mapped to [`Value`]s, no ordering guarantee.
///
/// ```
/// use ison::{Dict, Value};
///
/// let mut dict = Dict::new();
/// dict.add("name", "ison").unwrap();
/// assert_eq!(dict.get("name"), Some(&Value::from("ison")));
/// assert!(dict.add("name", "again").is_err());
/// ```
pub struct Dict {
    buckets: Box<[Bucket; BUCKET_COUNT]>,
    hash_key: HashKey,
    len: usize,
}

impl Dict {
    /// Creates an empty map keyed by the process-wide hash key.
    pub fn new() -> Self {
        Self::with_key(HashKey::process())
    }

    /// Creates an empty map keyed by `hash_key` instead of the process key.
    pub fn with_key(hash_key: HashKey) -> Self {
        Self {
            buckets: Box::new(core::array::from_fn(|_| Bucket::Empty)),
            hash_key,
            len: 0,
        }
    }

    /// Stores `value` under an owned copy of `key`.
    ///
    /// Fails without touching the map when `key` is already present; the
    /// rejected value comes back inside the error.
    pub fn add(&mut self, key: &str, value: impl Into<Value>) -> Result<(), DuplicateKey> {
        let value = value.into();
        let index = self.bucket_index(key);
        let bucket = &mut self.buckets[index];

        match bucket {
            Bucket::Empty => *bucket = Bucket::Single(Box::new(Entry::new(key, value))),
            Bucket::Single(existing) if *existing.key == *key => {
                return Err(duplicate(key, value));
            }
            Bucket::Single(_) => {
                if let Bucket::Single(existing) = core::mem::take(bucket) {
                    let mut chain = Array::new();
                    chain.push(*existing);
                    chain.push(Entry::new(key, value));
                    *bucket = Bucket::Chain(Box::new(chain));
                }
            }
            Bucket::Chain(chain) => {
                if chain.iter().any(|entry| *entry.key == *key) {
                    return Err(duplicate(key, value));
                }
                chain.push(Entry::new(key, value));
            }
        }
        self.len += 1;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.buckets[self.bucket_index(key)]
            .entries()
            .find(|entry| *entry.key == *key)
            .map(|entry| &entry.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries in bucket order, which is unrelated to insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.buckets
            .iter()
            .flat_map(Bucket::entries)
            .map(|entry| (&*entry.key, &entry.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Folds the 128-bit SipHash digest of `key` to 64 bits and masks it
    /// down to a bucket index.
    pub(crate) fn bucket_index(&self, key: &str) -> usize {
        let mut hasher = SipHasher::new_with_key(self.hash_key.as_bytes());
        hasher.write(key.as_bytes());
        let Hash128 { h1, h2 } = hasher.finish128();
        ((h1 ^ h2) & (BUCKET_COUNT as u64 - 1)) as usize
    }

    #[cfg(test)]
    pub(crate) fn is_chained(&self, index: usize) -> bool {
        matches!(self.buckets.get(index), Some(Bucket::Chain(_)))
    }

    /// Queues the value pairs stored under matching keys; `false` when the
    /// key sets differ.
    pub(crate) fn pair_values_into<'a>(
        &'a self,
        other: &'a Dict,
        pending: &mut Array<(&'a Value, &'a Value)>,
    ) -> bool {
        if self.len != other.len {
            return false;
        }
        for (key, value) in self.iter() {
            match other.get(key) {
                Some(other_value) => pending.push((value, other_value)),
                None => return false,
            }
        }
        true
    }

    /// Moves every value out onto `pending`, leaving an empty map.
    pub(crate) fn drain_values_into(&mut self, pending: &mut Array<Value>) {
        for bucket in self.buckets.iter_mut() {
            match core::mem::take(bucket) {
                Bucket::Empty => {}
                Bucket::Single(entry) => pending.push(entry.value),
                Bucket::Chain(mut chain) => {
                    for entry in chain.drain() {
                        pending.push(entry.value);
                    }
                }
            }
        }
        self.len = 0;
    }
}

impl Entry {
    fn new(key: &str, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

fn duplicate(key: &str, value: Value) -> DuplicateKey {
    debug!("Duplicate key \"{}\"", key);
    DuplicateKey {
        key: key.to_owned(),
        value,
    }
}

impl Default for Dict {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps are equal when they hold the same keys with equal values,
/// regardless of bucket layout or hash key.
impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = Array::new();
        self.pair_values_into(other, &mut pending) && values_equal(pending)
    }
}

// Keys only; values may nest arbitrarily deep.
impl core::fmt::Debug for Dict {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dict")
            .field("len", &self.len)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Drop for Dict {
    fn drop(&mut self) {
        if self.len == 0 {
            return;
        }
        let mut pending = Array::new();
        self.drain_values_into(&mut pending);
        release(&mut pending);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::List;
    use test_log::test;

    fn fixed_key() -> HashKey {
        HashKey::from_bytes(*b"0123456789abcdef")
    }

    /// Finds two distinct keys that land in the same bucket under `dict`'s key.
    fn colliding_pair(dict: &Dict) -> (String, String) {
        let mut seen: [Option<String>; BUCKET_COUNT] = core::array::from_fn(|_| None);
        for i in 0.. {
            let key = format!("key{i}");
            let index = dict.bucket_index(&key);
            match &seen[index] {
                Some(first) => return (first.clone(), key),
                None => seen[index] = Some(key),
            }
        }
        unreachable!()
    }

    #[test]
    fn test_add_then_get() {
        let mut dict = Dict::with_key(fixed_key());
        assert!(dict.is_empty());
        dict.add("text", "value").unwrap();
        dict.add("number", 1.5).unwrap();
        dict.add("integer", 42).unwrap();
        dict.add("flag", true).unwrap();
        dict.add("nothing", ()).unwrap();
        dict.add("nested", Dict::with_key(fixed_key())).unwrap();
        dict.add("list", List::new()).unwrap();

        assert_eq!(dict.len(), 7);
        assert_eq!(dict.get("text"), Some(&Value::from("value")));
        assert_eq!(dict.get("number"), Some(&Value::Float(1.5)));
        assert_eq!(dict.get("integer"), Some(&Value::Integer(42)));
        assert_eq!(dict.get("flag"), Some(&Value::Boolean(true)));
        assert_eq!(dict.get("nothing"), Some(&Value::Null));
        assert!(dict.get("nested").unwrap().as_dict().unwrap().is_empty());
        assert!(dict.get("list").unwrap().as_list().unwrap().is_empty());
        assert_eq!(dict.get("missing"), None);
    }

    #[test]
    fn test_duplicate_key_leaves_map_untouched() {
        let mut dict = Dict::with_key(fixed_key());
        dict.add("a", 1.0).unwrap();
        let err = dict.add("a", 2.0).unwrap_err();
        assert_eq!(err.key, "a");
        assert_eq!(err.value, Value::Float(2.0));
        assert_eq!(dict.get("a"), Some(&Value::Float(1.0)));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_collision_promotes_to_chain() {
        let mut dict = Dict::with_key(fixed_key());
        let (first, second) = colliding_pair(&dict);
        let index = dict.bucket_index(&first);

        dict.add(&first, "one").unwrap();
        assert!(!dict.is_chained(index));
        dict.add(&second, "two").unwrap();
        assert!(dict.is_chained(index));

        assert_eq!(dict.get(&first), Some(&Value::from("one")));
        assert_eq!(dict.get(&second), Some(&Value::from("two")));

        // Duplicates are still caught once the bucket is a chain.
        assert!(dict.add(&first, "again").is_err());
        assert!(dict.add(&second, "again").is_err());
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_many_keys_fill_chains() {
        let mut dict = Dict::with_key(fixed_key());
        for i in 0..500 {
            dict.add(&format!("k{i}"), i).unwrap();
        }
        assert_eq!(dict.len(), 500);
        for i in 0..500 {
            assert_eq!(dict.get(&format!("k{i}")), Some(&Value::Integer(i)));
        }
        assert_eq!(dict.iter().count(), 500);
        assert!((0..BUCKET_COUNT).all(|index| dict.is_chained(index)));
    }

    #[test]
    fn test_equality_ignores_hash_key() {
        let mut a = Dict::with_key(fixed_key());
        let mut b = Dict::with_key(HashKey::from_bytes([0xAA; 16]));
        for (k, v) in [("x", 1), ("y", 2), ("z", 3)] {
            a.add(k, v).unwrap();
        }
        for (k, v) in [("z", 3), ("x", 1), ("y", 2)] {
            b.add(k, v).unwrap();
        }
        assert_eq!(a, b);
        b.add("w", 4).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_equality_compares_nested_values() {
        let build = |leaf: &str| {
            let mut inner = Dict::with_key(fixed_key());
            inner.add("leaf", leaf).unwrap();
            let mut outer = Dict::with_key(fixed_key());
            outer.add("inner", inner).unwrap();
            outer
        };
        assert_eq!(build("a"), build("a"));
        assert_ne!(build("a"), build("b"));
    }

    #[test]
    fn test_debug_lists_keys_only() {
        let mut dict = Dict::with_key(fixed_key());
        dict.add("only", Dict::with_key(fixed_key())).unwrap();
        assert_eq!(format!("{dict:?}"), r#"Dict { len: 1, keys: ["only"] }"#);
    }

    #[test]
    fn test_keys_are_owned_copies() {
        let mut dict = Dict::with_key(fixed_key());
        let mut key = String::from("temp");
        dict.add(&key, 1).unwrap();
        key.push_str("-changed");
        assert!(dict.contains_key("temp"));
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["temp"]);
    }
}
