//! Error types for `SafeCat`.
//!
//! Every fallible operation in the crate returns [`Result`]. The conflict
//! variant, [`Error::RedefinedMethod`], is the only one a correct program
//! can still hit; the rest report misuse of the host runtime or of the
//! session state machine.

use thiserror::Error;

/// Errors that can occur while declaring, installing or auditing categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A category method collides with a method already defined on a
    /// related class.
    ///
    /// Raised by installation (the target already has the method) and by
    /// the audit (an ancestor or descendant now holds a different
    /// implementation under the same name).
    #[error("Safe category: redefined method '{selector}' found in class '{class}'")]
    RedefinedMethod {
        /// Name of the conflicting method.
        selector: String,
        /// Class the conflicting definition was found in.
        class: String,
    },

    /// `add_method` was asked to add a method the class already declares.
    #[error("method '{selector}' is already defined on class '{class}'")]
    DuplicateMethod {
        /// Name of the duplicated method.
        selector: String,
        /// Class that already owns a method with this name.
        class: String,
    },

    /// Class name already exists in the runtime registry.
    #[error("class '{name}' already exists in registry")]
    ClassAlreadyExists {
        /// The requested class name.
        name: String,
    },

    /// No class with this name is registered.
    #[error("class '{name}' not found")]
    ClassNotFound {
        /// The requested class name.
        name: String,
    },

    /// Selector name is empty or contains whitespace.
    #[error("invalid selector name: {name:?}")]
    InvalidSelector {
        /// The rejected name.
        name: String,
    },

    /// Message send found no method in the class or its ancestors.
    #[error("selector '{selector}' not found in class '{class}' or its superclasses")]
    SelectorNotFound {
        /// The selector that was sent.
        selector: String,
        /// The receiving class.
        class: String,
    },

    /// Message send supplied a different number of arguments than the
    /// selector takes.
    #[error("selector '{selector}' takes {expected} argument(s), got {actual}")]
    ArgumentCount {
        /// The selector that was sent.
        selector: String,
        /// Colons in the selector name.
        expected: usize,
        /// Arguments supplied.
        actual: usize,
    },

    /// A root class tried to declare itself as a category; there is no
    /// superclass to extend.
    #[error("class '{class}' has no superclass to extend")]
    RootClassExtension {
        /// The declaring class.
        class: String,
    },

    /// Session operation called in the wrong lifecycle phase.
    #[error("invalid phase: expected {expected}, found {actual}")]
    InvalidPhase {
        /// Phase the operation requires.
        expected: &'static str,
        /// Phase the session was in.
        actual: &'static str,
    },
}

impl Error {
    /// Returns `true` for the conflict error, the one the safety net exists
    /// to catch.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::RedefinedMethod { .. })
    }
}

/// Result type for `SafeCat` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redefined_method_display() {
        let err = Error::RedefinedMethod {
            selector: "sayHi".to_string(),
            class: "Derived".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Safe category: redefined method 'sayHi' found in class 'Derived'"
        );
        assert!(err.is_conflict());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::ClassNotFound { name: "Nope".into() }.to_string(),
            "class 'Nope' not found"
        );
        assert_eq!(
            Error::InvalidPhase { expected: "installed", actual: "uninstalled" }
                .to_string(),
            "invalid phase: expected installed, found uninstalled"
        );
    }

    #[test]
    fn test_error_equality() {
        let a = Error::DuplicateMethod { selector: "a".into(), class: "A".into() };
        let b = Error::DuplicateMethod { selector: "a".into(), class: "B".into() };
        assert_ne!(a, b);
        assert!(!a.is_conflict());
    }
}
