//! `SafeCat`: safe categories for a dynamic class runtime
//!
//! A *category* adds methods to a class its author does not own. Plain
//! categories are dangerous: a category method with the same name as an
//! existing method silently replaces it, and which one wins depends on load
//! order. `SafeCat` installs categories so that this can never go
//! unnoticed:
//!
//! - **Installation** copies a category's methods onto its target and fails
//!   if the target already has any of them
//! - **Audit** runs late in process life and re-checks every ancestor and
//!   descendant of each target, catching conflicts added by categories
//!   installed afterwards
//!
//! The `assertions` feature sets whether the checks are on by default, and
//! `SAFECAT_ASSERTIONS=0|1` overrides that at startup. With the checks off,
//! conflicting methods are installed with last-write-wins.
//!
//! # Architecture
//!
//! - [`runtime`]: The host runtime (classes, method tables, message send,
//!   `load` hooks) and the [`Reflect`] capability trait
//! - [`inspector`]: Own-method queries and checked method addition
//! - [`hierarchy`]: Ancestor and descendant walks
//! - [`declaration`]: Category declarations and the pending queue
//! - [`install`]: The installation algorithm
//! - [`audit`]: The audit algorithm
//! - [`session`]: The install/audit lifecycle and fatal enforcement
//!
//! # Example
//!
//! ```rust
//! use safecat::{Config, DeclarationQueue, Method, MethodKind, Runtime, Selector, Value};
//! use std::str::FromStr;
//!
//! let runtime = Runtime::new();
//! let queue = DeclarationQueue::new();
//!
//! let base = runtime.new_root_class("Base").unwrap();
//! let loud = runtime.new_class("Loud", base).unwrap();
//! let say_hi = Selector::from_str("sayHi").unwrap();
//! runtime
//!     .add_method(loud, MethodKind::Instance, Method::from_fn(say_hi.clone(), "@@:", |_| {
//!         Ok(Value::from("HI!"))
//!     }))
//!     .unwrap();
//! runtime.add_method(loud, MethodKind::Class, queue.load_hook()).unwrap();
//!
//! let mut session = safecat::bootstrap(&runtime, &queue, Config::default()).unwrap();
//! let reply = runtime.send(base, MethodKind::Instance, &say_hi, &[]).unwrap();
//! assert_eq!(reply, Value::from("HI!"));
//!
//! session.audit().unwrap();
//! ```

pub mod audit;
pub mod config;
pub mod declaration;
pub mod error;
pub mod hierarchy;
pub mod inspector;
pub mod install;
pub mod logging;
pub mod runtime;
pub mod session;

// Re-export commonly used types
pub use audit::{AuditReport, ConflictAuditor};
pub use config::{Config, ShadowCheck};
pub use declaration::{DeclarationQueue, ExtensionDeclaration};
pub use error::{Error, Result};
pub use hierarchy::{HierarchySnapshot, HierarchyWalker};
pub use inspector::MethodSetInspector;
pub use install::{InstallReceipt, InstalledMethod, RegistrationEngine};
pub use runtime::{
    Class, Imp, Message, Method, MethodKind, Reflect, Runtime, Selector, Value,
    global_runtime,
};
pub use session::{AuditGuard, Phase, Session, bootstrap, enforce};
