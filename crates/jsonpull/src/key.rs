use core::fmt;
use std::sync::Arc;

/// One step in the path from the document root to a token.
///
/// Keys locate a value inside its parent container: a property name inside
/// an object, or a zero-based index inside an array. Name keys are
/// reference-counted so path snapshots and token keys stay cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A property name inside an object.
    Name(Arc<str>),
    /// An element index inside an array.
    Index(usize),
}

impl Key {
    /// Returns the property name if this key is a name, otherwise `None`.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        if let Self::Name(name) = self {
            Some(name)
        } else {
            None
        }
    }

    /// Returns the index if this key is an index, otherwise `None`.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        if let Self::Index(index) = self {
            Some(*index)
        } else {
            None
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.into())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Name(name.into())
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

// On the wire a key is the bare value itself, so a whole path reads as
// `["foo", 0, "bar"]`. Both directions go through a derived untagged
// proxy; an index that does not fit `usize`, or a negative number, matches
// neither wire variant and is rejected.
#[cfg(any(test, feature = "serde"))]
mod serde_impls {
    use std::borrow::Cow;

    use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

    use super::Key;

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Wire<'a> {
        Index(u64),
        Name(Cow<'a, str>),
    }

    impl Serialize for Key {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let wire = match self {
                Key::Name(name) => Wire::Name(Cow::Borrowed(name.as_ref())),
                Key::Index(index) => Wire::Index(*index as u64),
            };
            wire.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Key {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Wire::deserialize(deserializer)? {
                Wire::Index(index) => usize::try_from(index)
                    .map(Key::Index)
                    .map_err(de::Error::custom),
                Wire::Name(name) => Ok(Key::Name(name.as_ref().into())),
            }
        }
    }
}
