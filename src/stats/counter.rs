use std::hash::Hash;

use indexmap::IndexMap;

/// Insertion-ordered multiset.
///
/// `most_common` breaks ties by first insertion, so rankings built from the
/// same input are always identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter<K: Hash + Eq> {
    counts: IndexMap<K, u64>,
}

impl<K: Hash + Eq> Default for Counter<K> {
    fn default() -> Self {
        Self {
            counts: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq> Counter<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        self.add_n(key, 1);
    }

    pub fn add_n(&mut self, key: K, n: u64) {
        *self.counts.entry(key).or_insert(0) += n;
    }

    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Keys and counts in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.counts.iter().map(|(k, n)| (k, *n))
    }

    /// Up to `k` entries, highest count first
    pub fn most_common(&self, k: usize) -> Vec<(&K, u64)> {
        let mut entries: Vec<(&K, u64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(k);
        entries
    }
}

impl<K: Hash + Eq> FromIterator<K> for Counter<K> {
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let mut counter = Self::new();
        for key in iter {
            counter.add(key);
        }
        counter
    }
}

impl<K: Hash + Eq> Extend<K> for Counter<K> {
    fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
        for key in iter {
            self.add(key);
        }
    }
}

/// Number of records minus the number of distinct keys among them
pub fn duplicate_count<R, K, F>(records: &[R], key: F) -> usize
where
    F: Fn(&R) -> K,
    K: Hash + Eq,
{
    let distinct = records.iter().map(key).collect::<Counter<K>>().len();
    records.len() - distinct
}
