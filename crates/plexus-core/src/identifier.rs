//! Cell identifiers backed by string interning.
//!
//! This module provides the [`Id`] type. Ids are cheap to copy and compare,
//! and fresh globally unique ids can be generated with [`Id::generate`].
//!
//! Names live in a process-wide interner and are never freed. Canonical
//! UUID strings are the exception: they are stored inline, so generating
//! ids does not grow the interner.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};
use uuid::{Uuid, fmt::Hyphenated};

/// Global string interner for identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Identifier of a cell, port or listener target.
///
/// # Examples
///
/// ```
/// use plexus_core::identifier::Id;
///
/// let rect_id = Id::new("rect-1");
/// assert_eq!(rect_id, "rect-1");
///
/// let fresh = Id::generate();
/// assert_ne!(fresh, Id::generate());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(Repr);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Repr {
    Interned(DefaultSymbol),
    Uuid(Uuid),
}

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// A lowercase hyphenated UUID is kept inline; any other name is
    /// interned for the lifetime of the process.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        match canonical_uuid(name) {
            Some(uuid) => Self(Repr::Uuid(uuid)),
            None => Self(Repr::Interned(interner().get_or_intern(name))),
        }
    }

    /// Creates a fresh, globally unique identifier (UUID v4).
    ///
    /// Generated ids are not interned and cost no memory once dropped.
    pub fn generate() -> Self {
        Self(Repr::Uuid(Uuid::new_v4()))
    }

    /// Returns the string this identifier was created from.
    pub fn as_string(&self) -> String {
        match self.0 {
            Repr::Interned(symbol) => interner()
                .resolve(symbol)
                .map(str::to_owned)
                .unwrap_or_default(),
            Repr::Uuid(uuid) => uuid.hyphenated().to_string(),
        }
    }
}

/// The UUID `name` spells, when `name` is exactly its lowercase hyphenated
/// form.
fn canonical_uuid(name: &str) -> Option<Uuid> {
    if name.len() != Hyphenated::LENGTH {
        return None;
    }
    let uuid = Uuid::try_parse(name).ok()?;
    let mut buffer = Uuid::encode_buffer();
    let canonical: &str = uuid.hyphenated().encode_lower(&mut buffer);
    (canonical == name).then_some(uuid)
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Repr::Interned(_) => write!(f, "{}", self.as_string()),
            Repr::Uuid(uuid) => write!(f, "{}", uuid.hyphenated()),
        }
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        match self.0 {
            Repr::Interned(symbol) => interner().resolve(symbol) == Some(other),
            Repr::Uuid(uuid) => canonical_uuid(other) == Some(uuid),
        }
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
