//! Identifier management using string interning.
//!
//! Node, edge and group ids share one [`Id`] type. Ids are cheap to copy,
//! hash and compare, which keeps the symbol tables of the IR builder and the
//! indexed maps of the model fast.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// The interner is append-only, so sharing it between concurrent parses
/// cannot change the meaning of an already issued [`Id`].
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Interned identifier for diagram elements.
///
/// # Examples
///
/// ```
/// use diagen_core::identifier::Id;
///
/// let api = Id::new("api");
/// let same = Id::new("api");
/// assert_eq!(api, same);
/// assert_eq!(api, "api");
///
/// let edge = Id::from_sequence("e", 3);
/// assert_eq!(edge, "e3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from a string slice, interning it if needed.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates a sequential identifier such as `e1` or `edge-0`.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Text placed before the number.
    /// * `index` - The sequence number.
    pub fn from_sequence(prefix: &str, index: usize) -> Self {
        Self::new(&format!("{prefix}{index}"))
    }

    /// Returns an owned copy of the identifier text.
    pub fn as_string(&self) -> String {
        interner().resolve(self.0).unwrap_or_default().to_string()
    }

    /// Returns `true` if the identifier text contains `ch`.
    pub fn contains(&self, ch: char) -> bool {
        interner()
            .resolve(self.0)
            .is_some_and(|name| name.contains(ch))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.as_string();
        f.write_str(&name)
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<&String> for Id {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        interner().resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}
