use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{FieldKind, Tag};

/// Data element values, keyed by tag.
///
/// Iteration follows the canonical tag order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(BTreeMap<Tag, String>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from untyped pairs.
    ///
    /// Pairs whose key is not a known tag are not inserted; they are returned
    /// as they were given.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> (Self, Vec<(String, String)>)
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut result = Self::new();
        let mut unknown = Vec::new();

        for (key, value) in pairs {
            match key.as_ref().trim().parse::<Tag>() {
                Ok(tag) => {
                    result.insert(tag, value);
                }
                Err(_) => unknown.push((key.as_ref().to_owned(), value.into())),
            }
        }

        (result, unknown)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, tag: Tag) -> Option<&str> {
        self.0.get(&tag).map(String::as_str)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains_key(&tag)
    }

    pub fn insert(&mut self, tag: Tag, value: impl Into<String>) -> Option<String> {
        self.0.insert(tag, value.into())
    }

    pub fn remove(&mut self, tag: Tag) -> Option<String> {
        self.0.remove(&tag)
    }

    pub fn with(mut self, tag: Tag, value: impl Into<String>) -> Self {
        self.insert(tag, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tag, &str)> {
        self.0.iter().map(|(tag, value)| (*tag, value.as_str()))
    }

    /// Overlays the non-empty values of `other` onto `self`.
    pub fn merge(&mut self, other: FieldValues) {
        for (tag, value) in other.0 {
            if !value.trim().is_empty() {
                self.0.insert(tag, value);
            }
        }
    }
}

impl FromIterator<(Tag, String)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (Tag, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FieldValues {
    type Item = (Tag, String);
    type IntoIter = std::collections::btree_map::IntoIter<Tag, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Uppercases `value`, drops everything outside printable ASCII and trims.
pub fn sanitize(value: &str) -> String {
    let filtered: String = value
        .chars()
        .filter(|c| (' '..='~').contains(c))
        .map(|c| c.to_ascii_uppercase())
        .collect();

    filtered.trim().to_owned()
}

/// Prepares values coming from the data extraction service for merging into
/// the form.
///
/// Values are sanitized and date elements reduced to their digits. Unknown
/// tags are returned separately.
pub fn sanitize_extracted<K, V>(
    pairs: impl IntoIterator<Item = (K, V)>,
) -> (FieldValues, Vec<(String, String)>)
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let (values, unknown) = FieldValues::from_pairs(
        pairs
            .into_iter()
            .map(|(k, v)| (k, v.as_ref().to_owned())),
    );

    let values = values
        .into_iter()
        .map(|(tag, value)| {
            let mut value = sanitize(&value);
            if tag.spec().kind == FieldKind::Date {
                value.retain(|c| c.is_ascii_digit());
            }
            (tag, value)
        })
        .collect();

    (values, unknown)
}
