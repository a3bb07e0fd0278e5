//! Extension declarations and the queue that carries them to the installer.
//!
//! A category is a subclass of the class it extends. From its own `load`
//! hook it declares itself; the declaration pairs the category (source of
//! the methods) with its superclass (the target). Declarations accumulate
//! in a [`DeclarationQueue`] until the installer drains it, so any number of
//! categories can be pending at once.

use crate::error::{Error, Result};
use crate::runtime::{Class, Method, Reflect, Selector, Value};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// An immutable `(source, target)` pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionDeclaration {
    /// Class holding the methods to copy.
    pub source: Class,
    /// Class receiving them.
    pub target: Class,
}

impl ExtensionDeclaration {
    /// Pairs `source` with an explicit `target`.
    #[must_use]
    pub fn new(source: Class, target: Class) -> Self {
        ExtensionDeclaration { source, target }
    }

    /// Declares `source` as a category on its own superclass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RootClassExtension`] if `source` has no superclass.
    pub fn for_category<R: Reflect + ?Sized>(host: &R, source: Class) -> Result<Self> {
        let target = host.superclass(source).ok_or_else(|| Error::RootClassExtension {
            class: host.class_name(source),
        })?;
        Ok(Self::new(source, target))
    }
}

/// Append-only list of pending declarations.
///
/// Cloning a queue yields another handle to the same list.
#[derive(Debug, Clone, Default)]
pub struct DeclarationQueue {
    pending: Arc<Mutex<Vec<ExtensionDeclaration>>>,
}

static GLOBAL_QUEUE: OnceLock<DeclarationQueue> = OnceLock::new();

impl DeclarationQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide queue.
    #[must_use]
    pub fn global() -> &'static DeclarationQueue {
        GLOBAL_QUEUE.get_or_init(DeclarationQueue::new)
    }

    /// Appends a declaration.
    pub fn push(&self, declaration: ExtensionDeclaration) {
        self.pending.lock().push(declaration);
    }

    /// Records `source` as a category on its superclass.
    ///
    /// This is the call a category makes from its `load` hook.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RootClassExtension`] if `source` is a root class.
    pub fn declare<R: Reflect + ?Sized>(
        &self,
        host: &R,
        source: Class,
    ) -> Result<ExtensionDeclaration> {
        let declaration = ExtensionDeclaration::for_category(host, source)?;
        debug!(
            source = %host.class_name(declaration.source),
            target = %host.class_name(declaration.target),
            "declared safe category"
        );
        self.push(declaration);
        Ok(declaration)
    }

    /// A `load` class method that declares its receiver on this queue.
    ///
    /// Add it to a category class under the runtime's lifecycle hook
    /// selector; [`Runtime::run_load_hooks`](crate::runtime::Runtime::run_load_hooks)
    /// then performs the declaration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use safecat::{DeclarationQueue, MethodKind, Runtime};
    ///
    /// let runtime = Runtime::new();
    /// let base = runtime.new_root_class("Base").unwrap();
    /// let loud = runtime.new_class("Loud", base).unwrap();
    ///
    /// let queue = DeclarationQueue::new();
    /// runtime.add_method(loud, MethodKind::Class, queue.load_hook()).unwrap();
    /// runtime.run_load_hooks(&safecat::Selector::load()).unwrap();
    ///
    /// assert_eq!(queue.len(), 1);
    /// ```
    #[must_use]
    pub fn load_hook(&self) -> Method {
        self.load_hook_named(Selector::load())
    }

    /// Like [`load_hook`](Self::load_hook) for a runtime whose lifecycle
    /// hook has a different name.
    #[must_use]
    pub fn load_hook_named(&self, hook: Selector) -> Method {
        let queue = self.clone();
        Method::from_fn(hook, "v@:", move |msg| {
            queue.declare(msg.runtime, msg.receiver)?;
            Ok(Value::Nil)
        })
    }

    /// Removes and returns every pending declaration, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<ExtensionDeclaration> {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Number of pending declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MethodKind, Runtime};

    #[test]
    fn test_declare_targets_superclass() {
        let rt = Runtime::new();
        let base = rt.new_root_class("DeclBase").unwrap();
        let cat = rt.new_class("DeclCategory", base).unwrap();
        let queue = DeclarationQueue::new();

        let decl = queue.declare(&rt, cat).unwrap();
        assert_eq!(decl, ExtensionDeclaration::new(cat, base));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_declare_root_class_fails() {
        let rt = Runtime::new();
        let root = rt.new_root_class("DeclRoot").unwrap();
        let queue = DeclarationQueue::new();

        assert_eq!(
            queue.declare(&rt, root),
            Err(Error::RootClassExtension { class: "DeclRoot".into() })
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_keeps_every_declaration_in_order() {
        let rt = Runtime::new();
        let base = rt.new_root_class("QueueBase").unwrap();
        let first = rt.new_class("QueueFirst", base).unwrap();
        let second = rt.new_class("QueueSecond", base).unwrap();
        let queue = DeclarationQueue::new();

        queue.declare(&rt, first).unwrap();
        queue.declare(&rt, second).unwrap();

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].source, first);
        assert_eq!(drained[1].source, second);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_load_hook_declares_receiver() {
        let rt = Runtime::new();
        let base = rt.new_root_class("HookBase").unwrap();
        let cat = rt.new_class("HookCategory", base).unwrap();
        let queue = DeclarationQueue::new();
        rt.add_method(cat, MethodKind::Class, queue.load_hook()).unwrap();

        assert_eq!(rt.run_load_hooks(&Selector::load()).unwrap(), 1);
        assert_eq!(queue.drain(), vec![ExtensionDeclaration::new(cat, base)]);
    }

    #[test]
    fn test_cloned_queue_shares_list() {
        let rt = Runtime::new();
        let base = rt.new_root_class("ShareBase").unwrap();
        let cat = rt.new_class("ShareCategory", base).unwrap();
        let queue = DeclarationQueue::new();
        let handle = queue.clone();

        handle.declare(&rt, cat).unwrap();
        assert_eq!(queue.len(), 1);
    }
}
