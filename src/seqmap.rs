//! Insertion-order-preserving mapping with a typed and an untyped surface.
//!
//! The typed surface is what the model exposes (`Paths`, `Responses`,
//! `definitions`, extensions). The untyped surface lets generic code (the
//! walker, tooling over extensions) treat any parameterization uniformly.
//!
//! An explicit `init` distinguishes the zero value from an explicitly empty
//! map; the distinction is observable when rendering `{}` versus omitting
//! the key entirely.

use std::any::{Any, TypeId};
use std::hash::Hash;

use ahash::AHashMap;

/// Ordered key→value container. Inserts append; re-inserts overwrite in
/// place keeping the original position. Lookups are O(1).
#[derive(Clone, Debug)]
pub struct SequencedMap<K, V> {
    entries: Vec<(K, V)>,
    index: AHashMap<K, usize>,
    initialized: bool,
}

impl<K, V> Default for SequencedMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: AHashMap::new(),
            initialized: false,
        }
    }
}

impl<K: Eq + Hash + Clone, V> SequencedMap<K, V> {
    /// An initialized empty map (serializes as `{}` rather than nothing).
    pub fn new() -> Self {
        let mut map = Self::default();
        map.initialized = true;
        map
    }

    /// Mark the map initialized without inserting anything.
    pub fn init(&mut self) {
        self.initialized = true;
    }

    /// Distinguishes the zero value from an explicitly empty map.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let i = *self.index.get(key)?;
        Some(&mut self.entries[i].1)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or overwrite in place; returns the previous value if any.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.initialized = true;
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove a key, preserving the order of the remaining entries.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let i = self.index.remove(key)?;
        let (_, value) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K, V> IntoIterator for SequencedMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a SequencedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = std::iter::Map<std::slice::Iter<'a, (K, V)>, fn(&'a (K, V)) -> (&'a K, &'a V)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for SequencedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.initialized == other.initialized && self.entries == other.entries
    }
}

/// The untyped surface the generic machinery drives. Keys and values travel
/// as `&dyn Any` / `Box<dyn Any>`; implementations downcast and report a
/// mismatch as `Err` rather than panicking.
pub trait AnySequencedMap {
    fn init_any(&mut self);
    fn is_initialized_any(&self) -> bool;
    fn len_any(&self) -> usize;
    fn get_any(&self, key: &dyn Any) -> Option<&dyn Any>;
    fn set_any(&mut self, key: Box<dyn Any>, value: Box<dyn Any>) -> Result<(), &'static str>;
    fn delete_any(&mut self, key: &dyn Any) -> bool;
    fn keys_any(&self) -> Vec<&dyn Any>;
    /// Entries in insertion order as `(key, value)` pairs.
    fn all_untyped(&self) -> Vec<(&dyn Any, &dyn Any)>;
    fn key_type(&self) -> TypeId;
    fn value_type(&self) -> TypeId;
}

impl<K, V> AnySequencedMap for SequencedMap<K, V>
where
    K: Eq + Hash + Clone + Any,
    V: Any,
{
    fn init_any(&mut self) {
        self.init();
    }

    fn is_initialized_any(&self) -> bool {
        self.is_initialized()
    }

    fn len_any(&self) -> usize {
        self.len()
    }

    fn get_any(&self, key: &dyn Any) -> Option<&dyn Any> {
        let key = key.downcast_ref::<K>()?;
        self.get(key).map(|v| v as &dyn Any)
    }

    fn set_any(&mut self, key: Box<dyn Any>, value: Box<dyn Any>) -> Result<(), &'static str> {
        let key = key.downcast::<K>().map_err(|_| "key type mismatch")?;
        let value = value.downcast::<V>().map_err(|_| "value type mismatch")?;
        self.set(*key, *value);
        Ok(())
    }

    fn delete_any(&mut self, key: &dyn Any) -> bool {
        match key.downcast_ref::<K>() {
            Some(key) => self.delete(key).is_some(),
            None => false,
        }
    }

    fn keys_any(&self) -> Vec<&dyn Any> {
        self.entries.iter().map(|(k, _)| k as &dyn Any).collect()
    }

    fn all_untyped(&self) -> Vec<(&dyn Any, &dyn Any)> {
        self.entries
            .iter()
            .map(|(k, v)| (k as &dyn Any, v as &dyn Any))
            .collect()
    }

    fn key_type(&self) -> TypeId {
        TypeId::of::<K>()
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<V>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_survives_overwrites_and_deletes() {
        let mut map = SequencedMap::new();
        map.set("b", 1);
        map.set("a", 2);
        map.set("c", 3);
        map.set("b", 9);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(map.get(&"b"), Some(&9));
        map.delete(&"a");
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(map.get(&"c"), Some(&3));
    }

    #[test]
    fn zero_value_vs_explicit_empty() {
        let zero: SequencedMap<String, i32> = SequencedMap::default();
        assert!(!zero.is_initialized());
        let empty: SequencedMap<String, i32> = SequencedMap::new();
        assert!(empty.is_initialized());
        assert!(empty.is_empty());
    }

    #[test]
    fn untyped_surface_round_trips() {
        let mut map: SequencedMap<String, i32> = SequencedMap::new();
        let dyn_map: &mut dyn AnySequencedMap = &mut map;
        dyn_map
            .set_any(Box::new("k".to_owned()), Box::new(7i32))
            .unwrap();
        assert_eq!(dyn_map.len_any(), 1);
        let got = dyn_map.get_any(&"k".to_owned()).unwrap();
        assert_eq!(got.downcast_ref::<i32>(), Some(&7));
        assert!(dyn_map.set_any(Box::new(5u8), Box::new(7i32)).is_err());
        assert_eq!(dyn_map.value_type(), TypeId::of::<i32>());
    }
}
