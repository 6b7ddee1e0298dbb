use crate::objects::Object;
use indexmap::IndexMap;

/// A PDF dictionary that keeps keys in insertion order.
///
/// Order is what the writer emits, so two dictionaries built by the same
/// sequence of `set` calls serialize identically. Re-setting a key replaces
/// the value but keeps the key's original position. Equality compares the
/// key/value sets and ignores order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    entries: IndexMap<String, Object>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Object>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Object> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Object> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Object> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Object)> {
        self.entries.iter()
    }

    pub fn get_dict(&self, key: &str) -> Option<&Dictionary> {
        self.get(key).and_then(|obj| {
            if let Object::Dictionary(dict) = obj {
                Some(dict)
            } else {
                None
            }
        })
    }

    pub fn get_dict_mut(&mut self, key: &str) -> Option<&mut Dictionary> {
        self.get_mut(key).and_then(|obj| {
            if let Object::Dictionary(dict) = obj {
                Some(dict)
            } else {
                None
            }
        })
    }

    pub fn get_name(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Object::as_name)
    }

    /// Appends to the array stored under `key`, creating it when absent.
    ///
    /// Returns `false` (and leaves the dictionary untouched) if the key holds
    /// something other than an array.
    pub fn push_to_array(&mut self, key: &str, value: impl Into<Object>) -> bool {
        match self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Object::Array(Vec::new()))
        {
            Object::Array(items) => {
                items.push(value.into());
                true
            }
            _ => false,
        }
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<(String, Object)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (String, Object)>>(iter: T) -> Self {
        let mut dict = Dictionary::new();
        for (key, value) in iter {
            dict.set(key, value);
        }
        dict
    }
}

/// Builds a [`Dictionary`] from `key => value` pairs, in order.
///
/// ```
/// use ua_fixtures::{pdf_dict, Object};
///
/// let font = pdf_dict! {
///     "Type" => Object::name("Font"),
///     "Subtype" => Object::name("Type1"),
/// };
/// assert_eq!(font.keys().collect::<Vec<_>>(), vec!["Type", "Subtype"]);
/// ```
#[macro_export]
macro_rules! pdf_dict {
    () => {
        $crate::objects::Dictionary::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut dict = $crate::objects::Dictionary::new();
        $(dict.set($key, $value);)+
        dict
    }};
}
