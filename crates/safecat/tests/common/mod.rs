// Common test utilities for integration tests
//
// Shared fixtures for building class hierarchies and categories on a
// private runtime per test.

#![allow(dead_code)]

use safecat::{Class, DeclarationQueue, Method, MethodKind, Runtime, Selector, Value};
use std::str::FromStr;

/// Creates a selector from a string
pub fn sel(name: &str) -> Selector {
    Selector::from_str(name).expect("Failed to create test selector")
}

/// Creates a method that returns nil
pub fn noop_method(name: &str) -> Method {
    Method::from_fn(sel(name), "v@:", |_| Ok(Value::Nil))
}

/// Creates a method that returns a fixed string
pub fn returning_method(name: &str, reply: &'static str) -> Method {
    Method::from_fn(sel(name), "@@:", move |_| Ok(Value::from(reply)))
}

/// Creates a subclass of `target` carrying the given instance and class
/// methods, ready to be declared as a category on `target`.
pub fn category(
    rt: &Runtime,
    name: &str,
    target: Class,
    instance: &[&str],
    class: &[&str],
) -> Class {
    let cls = rt.new_class(name, target).expect("Failed to create category class");
    for m in instance {
        rt.add_method(cls, MethodKind::Instance, noop_method(m)).unwrap();
    }
    for m in class {
        rt.add_method(cls, MethodKind::Class, noop_method(m)).unwrap();
    }
    cls
}

/// Like [`category`], and also gives the class a `load` hook that declares
/// it on `queue`.
pub fn declared_category(
    rt: &Runtime,
    queue: &DeclarationQueue,
    name: &str,
    target: Class,
    instance: &[&str],
) -> Class {
    let cls = category(rt, name, target, instance, &[]);
    rt.add_method(cls, MethodKind::Class, queue.load_hook()).unwrap();
    cls
}

/// Names of the own methods of `(class, kind)`, in insertion order
pub fn own_names(rt: &Runtime, class: Class, kind: MethodKind) -> Vec<String> {
    rt.own_methods(class, kind)
        .iter()
        .map(|m| m.selector.name().to_string())
        .collect()
}
