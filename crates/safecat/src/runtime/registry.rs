//! The in-memory class registry.
//!
//! [`Runtime`] owns every class, its superclass link and both method tables.
//! It is the host that safe categories are installed into: classes are
//! registered, `load` hooks run, and messages are dispatched through it.
//!
//! # Thread Safety
//!
//! All state sits behind one `parking_lot::RwLock`. Method bodies are always
//! invoked with the lock released, so a body may freely call back into the
//! runtime (a `load` hook declaring a category does exactly that).

use crate::error::{Error, Result};
use crate::runtime::class::{Class, ClassEntry, Method, MethodKind};
use crate::runtime::message::{Message, Value};
use crate::runtime::selector::Selector;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt;
use tracing::{debug, trace};

#[derive(Default)]
struct RegistryState {
    classes: Vec<ClassEntry>,
    by_name: FxHashMap<String, Class>,
}

impl RegistryState {
    fn entry(&self, class: Class) -> Option<&ClassEntry> {
        self.classes.get(class.index())
    }

    fn entry_mut(&mut self, class: Class) -> Option<&mut ClassEntry> {
        self.classes.get_mut(class.index())
    }
}

/// A dynamic class runtime.
///
/// # Example
///
/// ```rust
/// use safecat::{Method, MethodKind, Runtime, Selector, Value};
/// use std::str::FromStr;
///
/// let runtime = Runtime::new();
/// let base = runtime.new_root_class("Base").unwrap();
/// let speak = Selector::from_str("speak").unwrap();
/// runtime
///     .add_method(base, MethodKind::Instance, Method::from_fn(speak.clone(), "@@:", |_| {
///         Ok(Value::from("hello"))
///     }))
///     .unwrap();
///
/// let derived = runtime.new_class("Derived", base).unwrap();
/// let reply = runtime.send(derived, MethodKind::Instance, &speak, &[]).unwrap();
/// assert_eq!(reply, Value::from("hello"));
/// ```
#[derive(Default)]
pub struct Runtime {
    state: RwLock<RegistryState>,
}

impl Runtime {
    /// Creates an empty runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class with no superclass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassAlreadyExists`] if the name is taken.
    pub fn new_root_class(&self, name: &str) -> Result<Class> {
        self.register(name, None)
    }

    /// Registers a subclass of `superclass`.
    ///
    /// The superclass must already be registered, so the inheritance graph
    /// can never contain a cycle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassAlreadyExists`] if the name is taken, or
    /// [`Error::ClassNotFound`] if `superclass` does not belong to this
    /// runtime.
    pub fn new_class(&self, name: &str, superclass: Class) -> Result<Class> {
        self.register(name, Some(superclass))
    }

    fn register(&self, name: &str, superclass: Option<Class>) -> Result<Class> {
        let mut state = self.state.write();

        if state.by_name.contains_key(name) {
            return Err(Error::ClassAlreadyExists { name: name.to_string() });
        }
        if let Some(parent) = superclass {
            if state.entry(parent).is_none() {
                return Err(Error::ClassNotFound { name: describe(parent) });
            }
        }

        let index = u32::try_from(state.classes.len())
            .map_err(|_| Error::ClassAlreadyExists { name: name.to_string() })?;
        let class = Class(index);
        state.classes.push(ClassEntry::new(name, superclass));
        state.by_name.insert(name.to_string(), class);

        debug!(class = name, superclass = ?superclass, "registered class");
        Ok(class)
    }

    /// Finds a class by name.
    #[must_use]
    pub fn class_from_name(&self, name: &str) -> Option<Class> {
        self.state.read().by_name.get(name).copied()
    }

    /// Returns the class name, or `None` for a foreign handle.
    #[must_use]
    pub fn name(&self, class: Class) -> Option<String> {
        self.state.read().entry(class).map(|e| e.name.clone())
    }

    /// Returns the superclass, if any.
    #[must_use]
    pub fn superclass(&self, class: Class) -> Option<Class> {
        self.state.read().entry(class).and_then(|e| e.superclass)
    }

    /// All registered classes in registration order.
    #[must_use]
    pub fn classes(&self) -> Vec<Class> {
        let count = self.state.read().classes.len();
        (0..count)
            .filter_map(|i| u32::try_from(i).ok())
            .map(Class)
            .collect()
    }

    /// Adds `method` to the class's own `kind` table.
    ///
    /// This is the raw host primitive: a method with the same selector is
    /// replaced in place and returned. Conflict checking is layered on top
    /// by [`MethodSetInspector`](crate::inspector::MethodSetInspector).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassNotFound`] for a foreign handle.
    pub fn add_method(
        &self,
        class: Class,
        kind: MethodKind,
        method: Method,
    ) -> Result<Option<Method>> {
        let mut state = self.state.write();
        let entry = state
            .entry_mut(class)
            .ok_or_else(|| Error::ClassNotFound { name: describe(class) })?;

        trace!(
            class = %entry.name,
            kind = kind.as_str(),
            selector = %method.selector,
            "adding method"
        );
        Ok(entry.methods_mut(kind).insert(method))
    }

    /// Own methods of `(class, kind)`, in insertion order.
    #[must_use]
    pub fn own_methods(&self, class: Class, kind: MethodKind) -> Vec<Method> {
        self.state
            .read()
            .entry(class)
            .map(|e| e.methods(kind).to_vec())
            .unwrap_or_default()
    }

    /// Own method of `(class, kind)` named `selector`.
    #[must_use]
    pub fn own_method(
        &self,
        class: Class,
        kind: MethodKind,
        selector: &Selector,
    ) -> Option<Method> {
        self.state
            .read()
            .entry(class)
            .and_then(|e| e.methods(kind).get(selector).cloned())
    }

    /// Looks up `selector` in `class` and then each superclass.
    ///
    /// Returns the providing class along with the method.
    #[must_use]
    pub fn lookup_method(
        &self,
        class: Class,
        kind: MethodKind,
        selector: &Selector,
    ) -> Option<(Class, Method)> {
        let state = self.state.read();
        let mut current = Some(class);

        while let Some(cls) = current {
            let entry = state.entry(cls)?;
            if let Some(method) = entry.methods(kind).get(selector) {
                return Some((cls, method.clone()));
            }
            current = entry.superclass;
        }

        None
    }

    /// Sends `selector` to `receiver`, dispatching through the inheritance
    /// chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArgumentCount`] if `args` does not match the
    /// selector's arity, [`Error::SelectorNotFound`] if no class in the
    /// chain implements the selector, or whatever the method body returns.
    pub fn send(
        &self,
        receiver: Class,
        kind: MethodKind,
        selector: &Selector,
        args: &[Value],
    ) -> Result<Value> {
        if args.len() != selector.arity() {
            return Err(Error::ArgumentCount {
                selector: selector.to_string(),
                expected: selector.arity(),
                actual: args.len(),
            });
        }

        let (_, method) =
            self.lookup_method(receiver, kind, selector).ok_or_else(|| {
                Error::SelectorNotFound {
                    selector: selector.to_string(),
                    class: self.name(receiver).unwrap_or_else(|| describe(receiver)),
                }
            })?;

        let message = Message {
            runtime: self,
            receiver,
            kind,
            selector,
            args,
        };
        method.imp.call(&message)
    }

    /// Runs the `hook` class method of every class that has not been loaded
    /// yet, in registration order.
    ///
    /// Only a class's *own* hook runs; a subclass without one does not
    /// inherit its parent's. Each class is loaded at most once, so calling
    /// this again after registering more classes loads only the new ones.
    /// Returns the number of hooks invoked.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error a hook reports. The failing
    /// class and those before it stay loaded; classes after it are left
    /// for the next call.
    pub fn run_load_hooks(&self, hook: &Selector) -> Result<usize> {
        let pending: Vec<Class> = {
            let state = self.state.read();
            state
                .classes
                .iter()
                .enumerate()
                .filter(|(_, entry)| !entry.loaded)
                .filter_map(|(index, _)| u32::try_from(index).ok())
                .map(Class)
                .collect()
        };

        let mut invoked = 0;
        for class in pending {
            // Hooks may re-enter the runtime, so the lock is held only
            // while claiming the class.
            let method = {
                let mut state = self.state.write();
                let Some(entry) = state.classes.get_mut(class.index()) else {
                    continue;
                };
                if entry.loaded {
                    continue;
                }
                entry.loaded = true;
                entry.class_methods.get(hook).cloned()
            };
            let Some(method) = method else { continue };

            trace!(class = ?class, hook = %hook, "running load hook");
            let message = Message {
                runtime: self,
                receiver: class,
                kind: MethodKind::Class,
                selector: hook,
                args: &[],
            };
            method.imp.call(&message)?;
            invoked += 1;
        }

        debug!(invoked, "load hooks finished");
        Ok(invoked)
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Runtime")
            .field("class_count", &state.classes.len())
            .finish()
    }
}

fn describe(class: Class) -> String {
    format!("#{}", class.index())
}
