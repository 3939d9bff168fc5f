use crate::cursor::Cursor;
use crate::error::DecodeError;

/// Ordered string key/value pairs attached to a node, layer, material, or renderer setting.
///
/// Order is preserved exactly as stored in the file, and duplicate keys are retained;
/// [`Dict::get()`] returns the first value for a key.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Dict {
    entries: Vec<(String, String)>,
}

impl Dict {
    /// Constructs an empty [`Dict`].
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        let entries = cursor.read_list("dictionary", |cursor| {
            let key = cursor.read_string()?;
            let value = cursor.read_string()?;
            Ok((key, value))
        })?;
        Ok(Self { entries })
    }

    /// Returns the value of the first entry with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the values of all entries with the given key, in order.
    pub fn get_all<'s>(&'s self, key: &'s str) -> impl Iterator<Item = &'s str> + 's {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns all keys in order, including duplicates.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over all entries in order.
    pub fn iter(&self) -> core::slice::Iter<'_, (String, String)> {
        self.entries.iter()
    }

    /// Number of entries, including duplicates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = &'a (String, String);
    type IntoIter = core::slice::Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Dict {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn read_preserves_order_and_duplicates() {
        let mut bytes = Vec::new();
        bytes.extend(3i32.to_le_bytes());
        for s in ["_name", "a", "_hidden", "0", "_name", "b"] {
            bytes.extend(i32::try_from(s.len()).unwrap().to_le_bytes());
            bytes.extend(s.as_bytes());
        }
        let dict = Dict::read(&mut Cursor::new(&bytes)).unwrap();

        assert_eq!(
            dict,
            Dict::from_iter([("_name", "a"), ("_hidden", "0"), ("_name", "b")])
        );
        assert_eq!(dict.get("_name"), Some("a"));
        assert_eq!(dict.get_all("_name").collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(dict.get("_t"), None);
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn read_empty() {
        let dict = Dict::read(&mut Cursor::new(&[0, 0, 0, 0])).unwrap();
        assert!(dict.is_empty());
    }

    #[test]
    fn read_truncated_value() {
        let mut bytes = Vec::new();
        bytes.extend(1i32.to_le_bytes());
        bytes.extend(1i32.to_le_bytes());
        bytes.push(b'k');
        bytes.extend(10i32.to_le_bytes());
        bytes.extend(b"short");
        assert!(Dict::read(&mut Cursor::new(&bytes)).is_err());
    }
}
