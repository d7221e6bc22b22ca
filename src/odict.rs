use crate::error::Error;
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered mapping of string keys to template values.
///
/// Iteration order is always insertion order. Serializers receive the
/// entries as an explicit sequence and never get the chance to sort them,
/// which is what keeps key order intact across a round trip.
///
/// Construction from an unordered map is rejected because the source has
/// already lost its ordering information; use [`ODict::from_pairs`] or
/// build incrementally with [`ODict::insert`].
#[derive(Debug, Clone, Default)]
pub struct ODict {
    entries: IndexMap<String, Value>,
}

impl ODict {
    pub fn new() -> Self {
        ODict {
            entries: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ODict {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Construct from an explicit sequence of key-value pairs,
    /// preserving the order of the sequence.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        ODict {
            entries: pairs.into_iter().collect(),
        }
    }

    /// Insert a key-value pair. An existing key keeps its original
    /// position; a new key goes to the end.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliberate no-op. Generic serializers sort mapping keys before
    /// emission; calling this must never reorder the entries.
    pub fn sort_keys(&mut self) {}

    /// The single key of a one-entry mapping.
    pub fn sole_key(&self) -> Option<&str> {
        if self.entries.len() == 1 {
            self.entries.keys().next().map(String::as_str)
        } else {
            None
        }
    }
}

impl PartialEq for ODict {
    /// Order-sensitive equality: two documents with the same entries in a
    /// different order are not equal.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl TryFrom<HashMap<String, Value>> for ODict {
    type Error = Error;

    /// Always fails: a `HashMap` has no meaningful order left to preserve.
    fn try_from(_: HashMap<String, Value>) -> Result<Self, Error> {
        Err(Error::InvalidConstruction)
    }
}

impl<'a> IntoIterator for &'a ODict {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for ODict {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, Value)> for ODict {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        ODict::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut case = ODict::new();

        case.insert("one", Value::Long(1));
        case.insert("two", Value::Long(2));

        assert_eq!(case.len(), 2);
        assert_eq!(case.get("one"), Some(&Value::Long(1)));
    }

    #[test]
    fn test_pair_constructor() {
        let case = ODict::from_pairs([
            ("one".to_string(), Value::Long(1)),
            ("two".to_string(), Value::Long(2)),
        ]);

        assert_eq!(case.len(), 2);
        assert_eq!(case.get("one"), Some(&Value::Long(1)));
        assert_eq!(case.get("two"), Some(&Value::Long(2)));
    }

    #[test]
    fn test_ordering() {
        let mut case = ODict::new();

        case.insert("z", Value::Long(1));
        case.insert("a", Value::Long(2));

        assert_eq!(case.keys().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[test]
    fn test_ordering_from_constructor() {
        let case = ODict::from_pairs([
            ("z".to_string(), Value::Long(1)),
            ("a".to_string(), Value::Long(2)),
        ]);

        assert_eq!(case.keys().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[test]
    fn test_constructor_disallows_unordered_map() {
        let mut unordered = HashMap::new();
        unordered.insert("z".to_string(), Value::Long(1));
        unordered.insert("a".to_string(), Value::Long(2));

        assert_eq!(ODict::try_from(unordered), Err(Error::InvalidConstruction));
    }

    #[test]
    fn test_explicit_sorting_is_a_noop() {
        let mut case = ODict::from_pairs([
            ("z".to_string(), Value::Long(1)),
            ("a".to_string(), Value::Long(2)),
        ]);

        case.sort_keys();

        assert_eq!(case.keys().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let ab = ODict::from_pairs([
            ("a".to_string(), Value::Long(1)),
            ("b".to_string(), Value::Long(2)),
        ]);
        let ba = ODict::from_pairs([
            ("b".to_string(), Value::Long(2)),
            ("a".to_string(), Value::Long(1)),
        ]);

        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut case = ODict::new();
        case.insert("z", Value::Long(1));
        case.insert("a", Value::Long(2));
        case.insert("z", Value::Long(3));

        assert_eq!(case.keys().collect::<Vec<_>>(), vec!["z", "a"]);
        assert_eq!(case.get("z"), Some(&Value::Long(3)));
    }
}
