//! Category counts with first-discovery ordering.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Occurrence counts per category.
///
/// Categories are kept in the order they were first recorded. Ranking uses a
/// stable sort on that order, so equal counts are broken by first discovery
/// rather than by lexical order.
///
/// # Example
///
/// ```
/// use chatstat::aggregate::FrequencyTable;
///
/// let table: FrequencyTable<&str> = ["jpg", "png", "png", "mov", "jpg"].into_iter().collect();
/// assert_eq!(table.most_frequent(2), vec![("jpg", 2), ("png", 2)]);
/// assert_eq!(table.get("mov"), 1);
/// assert_eq!(table.total(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct FrequencyTable<K> {
    entries: Vec<(K, usize)>,
    index: HashMap<K, usize>,
}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> FrequencyTable<K> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `key`.
    pub fn record(&mut self, key: K) {
        self.record_n(key, 1);
    }

    /// Records `n` occurrences of `key`.
    pub fn record_n(&mut self, key: K, n: usize) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 += n,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, n));
            }
        }
    }

    /// Count for `key`, zero when never recorded.
    pub fn get<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    /// Returns `true` if `key` was recorded at least once.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Number of distinct categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Iterates `(category, count)` in first-discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(key, count)| (key, *count))
    }

    /// Categories in first-discovery order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Top `n` categories by count, descending.
    ///
    /// Ties keep first-discovery order. Asking for more categories than exist
    /// returns all of them.
    pub fn most_frequent(&self, n: usize) -> Vec<(K, usize)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Converts into a plain map, losing discovery order.
    pub fn into_map(self) -> HashMap<K, usize> {
        self.entries.into_iter().collect()
    }
}

// `index` mirrors `entries`, so only the entries are compared.
impl<K: PartialEq> PartialEq for FrequencyTable<K> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq> Eq for FrequencyTable<K> {}

impl<K: Eq + Hash + Clone> FromIterator<K> for FrequencyTable<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut table = Self::new();
        for key in iter {
            table.record(key);
        }
        table
    }
}

impl<K: Eq + Hash + Clone> Extend<K> for FrequencyTable<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.record(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_get() {
        let mut table = FrequencyTable::new();
        table.record("a".to_string());
        table.record("b".to_string());
        table.record("a".to_string());
        assert_eq!(table.get("a"), 2);
        assert_eq!(table.get("b"), 1);
        assert_eq!(table.get("missing"), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.total(), 3);
    }

    #[test]
    fn test_ties_broken_by_discovery_not_lexical() {
        let table: FrequencyTable<&str> = ["zebra", "apple", "zebra", "apple", "mango"]
            .into_iter()
            .collect();
        assert_eq!(
            table.most_frequent(3),
            vec![("zebra", 2), ("apple", 2), ("mango", 1)]
        );
    }

    #[test]
    fn test_most_frequent_more_than_available() {
        let table: FrequencyTable<u8> = [1, 2, 2].into_iter().collect();
        assert_eq!(table.most_frequent(10), vec![(2, 2), (1, 1)]);
        assert!(table.most_frequent(0).is_empty());
    }

    #[test]
    fn test_record_n() {
        let mut table = FrequencyTable::new();
        table.record_n('x', 5);
        table.record_n('y', 7);
        assert_eq!(table.most_frequent(1), vec![('y', 7)]);
    }

    #[test]
    fn test_iter_discovery_order() {
        let table: FrequencyTable<&str> = ["b", "a", "b"].into_iter().collect();
        let keys: Vec<_> = table.keys().copied().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_equality_respects_discovery_order() {
        let a: FrequencyTable<&str> = ["x", "y", "x"].into_iter().collect();
        let b: FrequencyTable<&str> = ["x", "x", "y"].into_iter().collect();
        let c: FrequencyTable<&str> = ["y", "x", "x"].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_empty_table() {
        let table: FrequencyTable<String> = FrequencyTable::new();
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
        assert!(table.most_frequent(3).is_empty());
    }
}
