//! `Selector` interning for the runtime.
//!
//! Every distinct method name is interned once in a process-wide table, so
//! two selectors with the same name share storage and usually compare by
//! pointer. Equality falls back to the name, so a selector is always equal
//! to any other selector spelled the same way.

use crate::error::{Error, Result};
use fxhash::FxHashSet;
use parking_lot::RwLock;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// Name of the lifecycle hook the runtime calls on every class at load time.
pub const LOAD_HOOK: &str = "load";

/// Global selector table.
static INTERNED: OnceLock<RwLock<FxHashSet<Arc<str>>>> = OnceLock::new();

fn intern(name: &str) -> Arc<str> {
    let table = INTERNED.get_or_init(|| RwLock::new(FxHashSet::default()));

    if let Some(existing) = table.read().get(name) {
        return Arc::clone(existing);
    }

    // Another thread may have interned it between the read and write lock.
    let mut table = table.write();
    if let Some(existing) = table.get(name) {
        return Arc::clone(existing);
    }
    let interned: Arc<str> = Arc::from(name);
    table.insert(Arc::clone(&interned));
    interned
}

/// An interned method name.
///
/// # Example
///
/// ```rust
/// use safecat::Selector;
/// use std::str::FromStr;
///
/// let a = Selector::from_str("sayHi").unwrap();
/// let b = Selector::from_str("sayHi").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.name(), "sayHi");
/// ```
#[derive(Clone)]
pub struct Selector {
    name: Arc<str>,
}

impl Selector {
    /// Returns the selector for the runtime's `load` hook.
    #[must_use]
    pub fn load() -> Self {
        Selector {
            name: intern(LOAD_HOOK),
        }
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of colons in the name, i.e. the argument count the selector
    /// expects (`"setX:y:"` takes two).
    #[must_use]
    pub fn arity(&self) -> usize {
        self.name.matches(':').count()
    }
}

impl FromStr for Selector {
    type Err = Error;

    /// Interns `s` as a selector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelector`] if `s` is empty or contains
    /// whitespace.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(Error::InvalidSelector { name: s.to_string() });
        }
        Ok(Selector { name: intern(s) })
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.name, &other.name) || self.name == other.name
    }
}

impl Eq for Selector {}

impl Hash for Selector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&&*self.name).finish()
    }
}
