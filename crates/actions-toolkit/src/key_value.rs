// Key/value input accepted by the pair-oriented operations, and the ordered
// collection it is normalized into.

use std::collections::{BTreeMap, HashMap};

/// Key/value input in either of its two call shapes.
///
/// Every pair-oriented operation (`set_output`, `set_state`,
/// `set_environment_variable`, `append_file_pairs`) accepts
/// `impl Into<KeyValueInput<V>>`, so a single `(key, value)` tuple and any map
/// or list of pairs are both valid arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValueInput<V = String> {
    Single(String, V),
    Many(Vec<(String, V)>),
}

impl<V> KeyValueInput<V> {
    /// Flatten into `(key, value)` pairs in input order. Duplicates are kept.
    pub fn into_entries(self) -> Vec<(String, V)> {
        match self {
            KeyValueInput::Single(key, value) => vec![(key, value)],
            KeyValueInput::Many(pairs) => pairs,
        }
    }
}

impl<K: Into<String>, V> From<(K, V)> for KeyValueInput<V> {
    fn from((key, value): (K, V)) -> Self {
        KeyValueInput::Single(key.into(), value)
    }
}

impl<K: Into<String>, V> From<Vec<(K, V)>> for KeyValueInput<V> {
    fn from(pairs: Vec<(K, V)>) -> Self {
        KeyValueInput::Many(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<K: Into<String>, V, const N: usize> From<[(K, V); N]> for KeyValueInput<V> {
    fn from(pairs: [(K, V); N]) -> Self {
        KeyValueInput::Many(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<K: Into<String>, V> From<HashMap<K, V>> for KeyValueInput<V> {
    fn from(pairs: HashMap<K, V>) -> Self {
        KeyValueInput::Many(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<K: Into<String>, V> From<BTreeMap<K, V>> for KeyValueInput<V> {
    fn from(pairs: BTreeMap<K, V>) -> Self {
        KeyValueInput::Many(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Insertion-ordered map of unique keys.
///
/// Re-inserting a key replaces its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairsCollection {
    entries: Vec<(String, String)>,
}

impl PairsCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PairsCollection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut pairs = PairsCollection::new();
        for (key, value) in iter {
            pairs.insert(key, value);
        }
        pairs
    }
}

impl From<KeyValueInput<String>> for PairsCollection {
    fn from(input: KeyValueInput<String>) -> Self {
        input.into_entries().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_input_from_tuple() {
        let input: KeyValueInput<&str> = ("key", "value").into();
        assert_eq!(input, KeyValueInput::Single("key".to_string(), "value"));
    }

    #[test]
    fn many_input_from_array() {
        let input: KeyValueInput<i32> = [("a", 1), ("b", 2)].into();
        assert_eq!(
            input.into_entries(),
            vec![("a".to_string(), 1), ("b".to_string(), 2)]
        );
    }

    #[test]
    fn btree_map_keeps_key_order() {
        let mut map = BTreeMap::new();
        map.insert("z", "1");
        map.insert("a", "2");
        let keys: Vec<String> = KeyValueInput::from(map)
            .into_entries()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["a", "z"]);
    }

    #[test]
    fn pairs_last_write_wins_in_first_position() {
        let pairs: PairsCollection = vec![("a", "1"), ("b", "2"), ("a", "3")]
            .into_iter()
            .collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs.get("a"), Some("3"));
        let order: Vec<&str> = pairs.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["a", "b"]);
    }
}
