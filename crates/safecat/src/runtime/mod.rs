//! The host runtime safe categories are installed into.
//!
//! This module provides a small dynamic class runtime in the Objective-C
//! mould:
//!
//! - [`selector`]: Selector interning
//! - [`class`]: Class handles, methods, implementation identity
//! - [`message`]: Message arguments and return values
//! - [`registry`]: The class registry, message send and `load` hooks
//! - [`reflect`]: The capability trait the safe-category core depends on
//!
//! # Global Runtime
//!
//! Most programs have exactly one runtime. [`global_runtime`] returns a
//! process-wide instance that is created on first use and lives for the
//! rest of the program. Tests and embedders that want isolation create
//! their own [`Runtime`] instead.

pub mod class;
pub mod message;
pub mod reflect;
pub mod registry;
pub mod selector;

pub use class::{Class, Imp, Method, MethodKind};
pub use message::{Message, Value};
pub use reflect::Reflect;
pub use registry::Runtime;
pub use selector::Selector;

use std::sync::OnceLock;

/// Process-wide runtime.
static GLOBAL_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Returns the process-wide runtime, creating it on first call.
#[must_use]
pub fn global_runtime() -> &'static Runtime {
    GLOBAL_RUNTIME.get_or_init(Runtime::new)
}
