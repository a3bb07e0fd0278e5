//! `Class` handles, methods and per-class method tables.
//!
//! A class owns two independent method namespaces, tagged by
//! [`MethodKind`]: instance methods and class (type-level) methods. Both
//! live on the same class entry; there is no separate metaclass object.

use crate::runtime::message::{Message, Value};
use crate::runtime::selector::Selector;
use crate::error::Result;
use fxhash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Handle to a class registered with a [`Runtime`](crate::runtime::Runtime).
///
/// Handles are plain indices into the registry that created them. They are
/// cheap to copy and never dangle, because classes are never unregistered.
/// Mixing handles between two runtimes is a logic error; lookups on a
/// foreign handle simply find nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Class(pub(crate) u32);

impl Class {
    /// Registry index of this class.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which of a class's two method namespaces a method lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Methods sent to instances (`-method` in Objective-C terms).
    Instance,
    /// Methods sent to the class itself (`+method`).
    Class,
}

impl MethodKind {
    /// Both kinds, type-level first. Installation and audit visit the
    /// namespaces in this order.
    pub const ALL: [MethodKind; 2] = [MethodKind::Class, MethodKind::Instance];

    /// Short name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MethodKind::Instance => "instance",
            MethodKind::Class => "class",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature of a method body.
pub type ImpFn = dyn Fn(&Message<'_>) -> Result<Value> + Send + Sync;

/// Shared handle to a method implementation.
///
/// Two methods are "the same method" for conflict purposes exactly when
/// their `Imp`s point to the same allocation. Cloning an `Imp` keeps its
/// identity; wrapping the same closure twice with [`Imp::new`] does not.
#[derive(Clone)]
pub struct Imp(Arc<ImpFn>);

impl Imp {
    /// Wraps a closure as a method implementation.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Message<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Imp(Arc::new(body))
    }

    /// Invokes the implementation.
    ///
    /// # Errors
    ///
    /// Propagates whatever the method body returns.
    pub fn call(&self, message: &Message<'_>) -> Result<Value> {
        (self.0)(message)
    }

    /// Identity comparison; signatures and behaviour are not considered.
    #[must_use]
    pub fn ptr_eq(&self, other: &Imp) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast::<()>()
    }
}

impl fmt::Debug for Imp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Imp({:p})", self.addr())
    }
}

/// `Method` representation with implementation and type encoding.
#[derive(Clone)]
pub struct Method {
    /// `Method` selector
    pub selector: Selector,
    /// Implementation handle
    pub imp: Imp,
    /// Type encoding string (e.g. "v@:" for void return, id self, SEL _cmd)
    pub types: Arc<str>,
}

impl Method {
    /// Creates a method from its parts.
    #[must_use]
    pub fn new(selector: Selector, types: &str, imp: Imp) -> Self {
        Method {
            selector,
            imp,
            types: Arc::from(types),
        }
    }

    /// Creates a method wrapping `body` in a fresh [`Imp`].
    pub fn from_fn<F>(selector: Selector, types: &str, body: F) -> Self
    where
        F: Fn(&Message<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new(selector, types, Imp::new(body))
    }

    /// Whether both methods share one implementation.
    #[must_use]
    pub fn same_implementation(&self, other: &Method) -> bool {
        self.imp.ptr_eq(&other.imp)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("selector", &self.selector)
            .field("imp", &self.imp)
            .field("types", &&*self.types)
            .finish()
    }
}

/// Own methods of one `(class, kind)` namespace, in insertion order.
#[derive(Default)]
pub(crate) struct MethodTable {
    methods: Vec<Method>,
    index: FxHashMap<Selector, usize>,
}

impl MethodTable {
    pub(crate) fn get(&self, selector: &Selector) -> Option<&Method> {
        self.index.get(selector).map(|&slot| &self.methods[slot])
    }

    /// Inserts `method`, replacing any method with the same selector in
    /// place. Returns the replaced method.
    pub(crate) fn insert(&mut self, method: Method) -> Option<Method> {
        if let Some(&slot) = self.index.get(&method.selector) {
            return Some(std::mem::replace(&mut self.methods[slot], method));
        }
        self.index.insert(method.selector.clone(), self.methods.len());
        self.methods.push(method);
        None
    }

    pub(crate) fn to_vec(&self) -> Vec<Method> {
        self.methods.clone()
    }
}

/// Registry entry for one class.
pub(crate) struct ClassEntry {
    pub(crate) name: String,
    pub(crate) superclass: Option<Class>,
    pub(crate) instance_methods: MethodTable,
    pub(crate) class_methods: MethodTable,
    /// Set once the runtime has run (or skipped) this class's load hook.
    pub(crate) loaded: bool,
}

impl ClassEntry {
    pub(crate) fn new(name: &str, superclass: Option<Class>) -> Self {
        ClassEntry {
            name: name.to_string(),
            superclass,
            instance_methods: MethodTable::default(),
            class_methods: MethodTable::default(),
            loaded: false,
        }
    }

    pub(crate) fn methods(&self, kind: MethodKind) -> &MethodTable {
        match kind {
            MethodKind::Instance => &self.instance_methods,
            MethodKind::Class => &self.class_methods,
        }
    }

    pub(crate) fn methods_mut(&mut self, kind: MethodKind) -> &mut MethodTable {
        match kind {
            MethodKind::Instance => &mut self.instance_methods,
            MethodKind::Class => &mut self.class_methods,
        }
    }
}
