//! Method-set inspection over a [`Reflect`] host.
//!
//! [`MethodSetInspector`] is the narrow view of a class's method tables the
//! installer and auditor work through. It never removes a method and
//! refuses to add one that would replace an existing own method.

use crate::error::{Error, Result};
use crate::runtime::{Class, Method, MethodKind, Reflect, Selector};

/// Read and append-only access to `(class, kind)` method sets.
pub struct MethodSetInspector<'r, R: Reflect + ?Sized> {
    host: &'r R,
}

impl<R: Reflect + ?Sized> Clone for MethodSetInspector<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Reflect + ?Sized> Copy for MethodSetInspector<'_, R> {}

impl<'r, R: Reflect + ?Sized> MethodSetInspector<'r, R> {
    /// Creates an inspector over `host`.
    pub fn new(host: &'r R) -> Self {
        MethodSetInspector { host }
    }

    /// The underlying host.
    pub fn host(&self) -> &'r R {
        self.host
    }

    /// Methods declared directly on `(class, kind)`; inherited methods are
    /// not included.
    pub fn own_methods(&self, class: Class, kind: MethodKind) -> Vec<Method> {
        self.host.copy_own_methods(class, kind)
    }

    /// Own method of `(class, kind)` named `selector`.
    pub fn own_method(
        &self,
        class: Class,
        kind: MethodKind,
        selector: &Selector,
    ) -> Option<Method> {
        self.host.lookup_own_method(class, kind, selector)
    }

    /// Whether `(class, kind)` itself declares `selector`.
    pub fn has_own_method(
        &self,
        class: Class,
        kind: MethodKind,
        selector: &Selector,
    ) -> bool {
        self.own_method(class, kind, selector).is_some()
    }

    /// Finds `selector` on `class` or its nearest ancestor that has it.
    /// Returns the providing class with the method.
    pub fn lookup_method(
        &self,
        class: Class,
        kind: MethodKind,
        selector: &Selector,
    ) -> Option<(Class, Method)> {
        let mut current = Some(class);
        while let Some(cls) = current {
            if let Some(method) = self.own_method(cls, kind, selector) {
                return Some((cls, method));
            }
            current = self.host.superclass(cls);
        }
        None
    }

    /// Adds `method` to `(class, kind)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateMethod`] if the class already declares a
    /// method with the same selector; the method set is left untouched.
    /// Host errors are propagated.
    pub fn add_method(
        &self,
        class: Class,
        kind: MethodKind,
        method: Method,
    ) -> Result<()> {
        if self.has_own_method(class, kind, &method.selector) {
            return Err(Error::DuplicateMethod {
                selector: method.selector.to_string(),
                class: self.host.class_name(class),
            });
        }
        self.host.add_method_to_class(class, kind, method)?;
        Ok(())
    }

    /// Whether two methods share one implementation.
    pub fn implementations_equal(&self, a: &Method, b: &Method) -> bool {
        a.same_implementation(b)
    }
}
