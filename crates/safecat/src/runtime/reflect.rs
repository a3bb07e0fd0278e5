//! The reflection capability the safe-category core is written against.
//!
//! The installer and auditor never touch [`Runtime`] directly. They only
//! need the six operations of [`Reflect`], so any host that can answer them
//! (a real Objective-C runtime binding, a test double) can be checked.

use crate::error::Result;
use crate::runtime::class::{Class, Method, MethodKind};
use crate::runtime::registry::Runtime;
use crate::runtime::selector::Selector;

/// Host reflection primitives.
///
/// Implementations must enumerate and look up *own* methods only; the core
/// does its own inheritance walking where it needs it.
pub trait Reflect {
    /// Parent of `class`, or `None` for a root class.
    fn superclass(&self, class: Class) -> Option<Class>;

    /// Human-readable name of `class`, used in diagnostics.
    fn class_name(&self, class: Class) -> String;

    /// Every class currently known to the host.
    fn all_classes(&self) -> Vec<Class>;

    /// Methods declared directly on `(class, kind)`.
    fn copy_own_methods(&self, class: Class, kind: MethodKind) -> Vec<Method>;

    /// Own method of `(class, kind)` named `selector`.
    fn lookup_own_method(
        &self,
        class: Class,
        kind: MethodKind,
        selector: &Selector,
    ) -> Option<Method>;

    /// Adds `method` to `(class, kind)`, replacing and returning any own
    /// method with the same selector.
    ///
    /// # Errors
    ///
    /// Returns an error if the host does not know `class`.
    fn add_method_to_class(
        &self,
        class: Class,
        kind: MethodKind,
        method: Method,
    ) -> Result<Option<Method>>;
}

impl Reflect for Runtime {
    fn superclass(&self, class: Class) -> Option<Class> {
        Runtime::superclass(self, class)
    }

    fn class_name(&self, class: Class) -> String {
        self.name(class)
            .unwrap_or_else(|| format!("<unknown class #{}>", class.index()))
    }

    fn all_classes(&self) -> Vec<Class> {
        self.classes()
    }

    fn copy_own_methods(&self, class: Class, kind: MethodKind) -> Vec<Method> {
        self.own_methods(class, kind)
    }

    fn lookup_own_method(
        &self,
        class: Class,
        kind: MethodKind,
        selector: &Selector,
    ) -> Option<Method> {
        self.own_method(class, kind, selector)
    }

    fn add_method_to_class(
        &self,
        class: Class,
        kind: MethodKind,
        method: Method,
    ) -> Result<Option<Method>> {
        self.add_method(class, kind, method)
    }
}
