//! Immutable text buffer shared between values
//!
//! Literals are stored without allocating. Everything else lives in an `Arc<str>` so copies of
//! a [`DomString`] share one allocation.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

#[derive(Clone)]
enum Repr {
    Static(&'static str),
    Shared(Arc<str>),
}

/// An immutable, cheaply clonable string
#[derive(Clone)]
pub struct DomString(Repr);

impl DomString {
    /// The empty string
    pub const fn new() -> Self {
        DomString(Repr::Static(""))
    }

    /// Wrap a literal without allocating
    pub const fn from_static(text: &'static str) -> Self {
        DomString(Repr::Static(text))
    }

    pub fn as_str(&self) -> &str {
        match &self.0 {
            Repr::Static(s) => s,
            Repr::Shared(s) => s,
        }
    }

    /// True when the text references a literal rather than a shared buffer
    pub fn is_literal(&self) -> bool {
        matches!(self.0, Repr::Static(_))
    }

    /// Concatenate two strings into a new buffer
    pub fn concat(&self, other: &str) -> DomString {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return DomString::from(other);
        }
        let mut text = String::with_capacity(self.len() + other.len());
        text.push_str(self.as_str());
        text.push_str(other);
        DomString::from(text)
    }
}

impl Default for DomString {
    fn default() -> Self {
        DomString::new()
    }
}

impl Deref for DomString {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for DomString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for DomString {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DomString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for DomString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl PartialEq for DomString {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for DomString {}

impl PartialOrd for DomString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DomString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for DomString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl PartialEq<str> for DomString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for DomString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<String> for DomString {
    fn eq(&self, other: &String) -> bool {
        self.as_str() == other.as_str()
    }
}

impl From<&str> for DomString {
    fn from(text: &str) -> Self {
        if text.is_empty() {
            DomString::new()
        } else {
            DomString(Repr::Shared(Arc::from(text)))
        }
    }
}

impl From<&String> for DomString {
    fn from(text: &String) -> Self {
        DomString::from(text.as_str())
    }
}

impl From<String> for DomString {
    fn from(text: String) -> Self {
        if text.is_empty() {
            DomString::new()
        } else {
            DomString(Repr::Shared(Arc::from(text)))
        }
    }
}

impl From<Arc<str>> for DomString {
    fn from(text: Arc<str>) -> Self {
        DomString(Repr::Shared(text))
    }
}

impl From<char> for DomString {
    fn from(c: char) -> Self {
        DomString::from(c.to_string())
    }
}

impl From<DomString> for String {
    fn from(text: DomString) -> Self {
        text.as_str().to_owned()
    }
}
