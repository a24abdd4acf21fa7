use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::hash::Hash;

use parking_lot::RwLock;

/// A HashMap that allows sharing of values between threads
///
/// Writers only ever touch the entry for their own key, so concurrent producers working on
/// distinct keys never observe each other. Readers take a snapshot or drain the whole map.
pub struct SharedHashMap<
  K: Send + Eq,
  V: Send,
  H: Send + Default + BuildHasher = xxhash_rust::xxh3::Xxh3Builder,
> {
  inner: RwLock<HashMap<K, V, H>>,
}

impl<K, V, H> Default for SharedHashMap<K, V, H>
where
  K: Send + Eq,
  V: Send,
  H: Send + Default + BuildHasher,
{
  fn default() -> Self {
    Self {
      inner: RwLock::new(HashMap::with_hasher(H::default())),
    }
  }
}

impl<K, V, H> std::fmt::Debug for SharedHashMap<K, V, H>
where
  K: Send + Eq + std::fmt::Debug,
  V: Send + std::fmt::Debug,
  H: Send + Default + BuildHasher,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_map().entries(self.inner.read().iter()).finish()
  }
}

impl<K, V, H> SharedHashMap<K, V, H>
where
  K: Hash + Send + Eq,
  V: Send,
  H: Send + Default + BuildHasher,
{
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get<KR>(&self, key: &KR) -> Option<V>
  where
    KR: ?Sized + Eq + Hash,
    K: Borrow<KR>,
    V: Clone,
  {
    self.inner.read().get(key).cloned()
  }

  pub fn contains_key<KR>(&self, key: &KR) -> bool
  where
    KR: ?Sized + Eq + Hash,
    K: Borrow<KR>,
  {
    self.inner.read().contains_key(key)
  }

  pub fn insert(&self, key: K, value: V) {
    self.inner.write().insert(key, value);
  }

  /// Run `f` against the entry for `key`, creating it with `V::default()` first if missing
  pub fn update<R>(&self, key: K, f: impl FnOnce(&mut V) -> R) -> R
  where
    V: Default,
  {
    let mut map = self.inner.write();
    f(map.entry(key).or_default())
  }

  pub fn len(&self) -> usize {
    self.inner.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.read().is_empty()
  }

  /// Remove and return every entry, leaving the map empty
  pub fn drain(&self) -> Vec<(K, V)> {
    self.inner.write().drain().collect()
  }
}

impl<K, T, H> SharedHashMap<K, Vec<T>, H>
where
  K: Hash + Send + Eq,
  T: Send,
  H: Send + Default + BuildHasher,
{
  /// Make sure a bucket exists for `key` without touching its contents
  pub fn ensure_bucket(&self, key: K) {
    self.update(key, |_| ());
  }

  /// Append `value` to the bucket for `key`
  pub fn append(&self, key: K, value: T) {
    self.update(key, |bucket| bucket.push(value));
  }
}

#[cfg(test)]
mod test {
  use std::sync::Arc;

  use super::*;

  #[test]
  fn test_shared_hash_map() {
    let map = SharedHashMap::<String, String>::new();
    map.insert("key".to_string(), "value".to_string());
    assert_eq!(map.get("key"), Some("value".to_string()));
    assert!(map.contains_key("key"));
    assert!(!map.contains_key("other"));
  }

  #[test]
  fn test_append_into_bucket() {
    let map = SharedHashMap::<String, Vec<u32>>::new();

    map.ensure_bucket("a".to_string());
    assert_eq!(map.get("a"), Some(vec![]));

    map.append("a".to_string(), 1);
    map.append("a".to_string(), 2);
    map.append("b".to_string(), 3);
    map.ensure_bucket("a".to_string());

    assert_eq!(map.get("a"), Some(vec![1, 2]));
    assert_eq!(map.get("b"), Some(vec![3]));
  }

  #[test]
  fn test_drain_empties_the_map() {
    let map = SharedHashMap::<String, Vec<u32>>::new();
    map.append("a".to_string(), 1);
    map.append("b".to_string(), 2);

    let mut drained = map.drain();
    drained.sort();

    assert_eq!(
      drained,
      vec![("a".to_string(), vec![1]), ("b".to_string(), vec![2])]
    );
    assert!(map.is_empty());
    assert!(map.drain().is_empty());
  }

  #[test]
  fn test_concurrent_appends_to_distinct_keys() {
    let map = Arc::new(SharedHashMap::<usize, Vec<usize>>::new());

    let handles = (0..8)
      .map(|key| {
        let map = map.clone();
        std::thread::spawn(move || {
          for value in 0..100 {
            map.append(key, value);
          }
        })
      })
      .collect::<Vec<_>>();

    for handle in handles {
      handle.join().unwrap();
    }

    assert_eq!(map.len(), 8);
    for key in 0..8 {
      assert_eq!(map.get(&key), Some((0..100).collect::<Vec<usize>>()));
    }
  }
}
