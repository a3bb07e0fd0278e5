//! End-to-end safe category scenarios
//!
//! Covers the full startup/shutdown sequence:
//! - load hooks declaring categories
//! - installation through `bootstrap`
//! - categories loaded after installation
//! - audit failures and drop-time enforcement
//!
//! Run with: `cargo test --test scenario_test`

mod common;

use common::*;
use safecat::{
    Config, DeclarationQueue, Error, MethodKind, Phase, Runtime, Session, Value,
    bootstrap, global_runtime,
};

fn checked() -> Config {
    Config::default().with_assertions(true)
}

/// `Base` with `speak`, and a `Loud` category declaring `sayHi`, installed.
fn loud_installed<'r>(rt: &'r Runtime, queue: &DeclarationQueue) -> Session<'r, Runtime> {
    let base = rt.new_root_class("Base").unwrap();
    rt.add_method(base, MethodKind::Instance, returning_method("speak", "hello"))
        .unwrap();

    let loud = rt.new_class("Loud", base).unwrap();
    rt.add_method(loud, MethodKind::Instance, returning_method("sayHi", "HI!"))
        .unwrap();
    rt.add_method(loud, MethodKind::Class, queue.load_hook()).unwrap();

    bootstrap(rt, queue, checked()).unwrap()
}

#[test]
fn test_category_methods_visible_on_target() {
    let rt = Runtime::new();
    let queue = DeclarationQueue::new();
    let session = loud_installed(&rt, &queue);
    let base = rt.class_from_name("Base").unwrap();

    assert_eq!(session.phase(), Phase::Installed);
    assert_eq!(own_names(&rt, base, MethodKind::Instance), ["speak", "sayHi"]);
    assert_eq!(
        rt.send(base, MethodKind::Instance, &sel("sayHi"), &[]).unwrap(),
        Value::from("HI!")
    );
    assert_eq!(
        rt.send(base, MethodKind::Instance, &sel("speak"), &[]).unwrap(),
        Value::from("hello")
    );
}

#[test]
fn test_late_category_on_subclass_fails_audit() {
    let rt = Runtime::new();
    let queue = DeclarationQueue::new();
    let mut session = loud_installed(&rt, &queue);
    let base = rt.class_from_name("Base").unwrap();

    // Loaded after installation: Derived : Base, and Quiet declaring its own
    // sayHi on Derived.
    let derived = rt.new_class("Derived", base).unwrap();
    let quiet = rt.new_class("Quiet", derived).unwrap();
    rt.add_method(quiet, MethodKind::Instance, returning_method("sayHi", "hi..."))
        .unwrap();
    rt.add_method(quiet, MethodKind::Class, queue.load_hook()).unwrap();

    let late = bootstrap(&rt, &queue, checked()).unwrap();
    assert_eq!(late.receipts().len(), 1);
    assert_eq!(
        rt.send(derived, MethodKind::Instance, &sel("sayHi"), &[]).unwrap(),
        Value::from("hi...")
    );

    let err = session.audit().unwrap_err();
    assert_eq!(
        err,
        Error::RedefinedMethod { selector: "sayHi".into(), class: "Derived".into() }
    );
    assert_eq!(session.phase(), Phase::Installed);
}

#[test]
fn test_unrelated_late_category_passes_audit() {
    let rt = Runtime::new();
    let queue = DeclarationQueue::new();
    let mut session = loud_installed(&rt, &queue);

    let other = rt.new_root_class("Other").unwrap();
    declared_category(&rt, &queue, "OtherHi", other, &["sayHi"]);
    bootstrap(&rt, &queue, checked()).unwrap();

    let report = session.audit().unwrap();
    assert!(!report.skipped);
    assert_eq!(session.phase(), Phase::Audited);
}

#[test]
fn test_conflicting_category_fails_bootstrap() {
    let rt = Runtime::new();
    let queue = DeclarationQueue::new();
    let base = rt.new_root_class("Base").unwrap();
    rt.add_method(base, MethodKind::Instance, noop_method("speak")).unwrap();
    declared_category(&rt, &queue, "Shadowing", base, &["speak"]);

    let err = bootstrap(&rt, &queue, checked()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Safe category: redefined method 'speak' found in class 'Base'"
    );
}

#[test]
fn test_root_class_declaration_fails_bootstrap() {
    let rt = Runtime::new();
    let queue = DeclarationQueue::new();
    let root = rt.new_root_class("Lonely").unwrap();
    rt.add_method(root, MethodKind::Class, queue.load_hook()).unwrap();

    let err = bootstrap(&rt, &queue, checked()).unwrap_err();
    assert_eq!(err, Error::RootClassExtension { class: "Lonely".into() });
}

#[test]
fn test_failed_load_hook_does_not_drop_later_declarations() {
    let rt = Runtime::new();
    let queue = DeclarationQueue::new();
    let lonely = rt.new_root_class("Lonely").unwrap();
    rt.add_method(lonely, MethodKind::Class, queue.load_hook()).unwrap();
    let base = rt.new_root_class("Base").unwrap();
    declared_category(&rt, &queue, "Loud", base, &["sayHi"]);

    let err = bootstrap(&rt, &queue, checked()).unwrap_err();
    assert_eq!(err, Error::RootClassExtension { class: "Lonely".into() });
    assert!(queue.is_empty());

    let session = bootstrap(&rt, &queue, checked()).unwrap();
    assert_eq!(session.receipts().len(), 1);
    assert_eq!(own_names(&rt, base, MethodKind::Instance), ["sayHi"]);
}

#[test]
fn test_several_categories_in_one_bootstrap() {
    let rt = Runtime::new();
    let queue = DeclarationQueue::new();
    let base = rt.new_root_class("Base").unwrap();
    declared_category(&rt, &queue, "First", base, &["one"]);
    declared_category(&rt, &queue, "Second", base, &["two"]);

    let mut session = bootstrap(&rt, &queue, checked()).unwrap();
    assert_eq!(session.receipts().len(), 2);
    assert_eq!(own_names(&rt, base, MethodKind::Instance), ["one", "two"]);
    session.audit().unwrap();
}

#[test]
fn test_disabled_assertions_second_category_wins() {
    let rt = Runtime::new();
    let queue = DeclarationQueue::new();
    let base = rt.new_root_class("Base").unwrap();
    let first = rt.new_class("First", base).unwrap();
    rt.add_method(first, MethodKind::Instance, returning_method("greet", "first"))
        .unwrap();
    rt.add_method(first, MethodKind::Class, queue.load_hook()).unwrap();
    let second = rt.new_class("Second", base).unwrap();
    rt.add_method(second, MethodKind::Instance, returning_method("greet", "second"))
        .unwrap();
    rt.add_method(second, MethodKind::Class, queue.load_hook()).unwrap();

    let mut session =
        bootstrap(&rt, &queue, Config::default().with_assertions(false)).unwrap();
    assert_eq!(session.receipts()[1].replaced, 1);
    assert_eq!(
        rt.send(base, MethodKind::Instance, &sel("greet"), &[]).unwrap(),
        Value::from("second")
    );
    assert!(session.audit().unwrap().skipped);
}

#[test]
#[should_panic(expected = "Safe category: redefined method 'sayHi' found in class 'Derived'")]
fn test_audit_guard_is_fatal_at_shutdown() {
    let rt = Runtime::new();
    let queue = DeclarationQueue::new();
    let _guard = loud_installed(&rt, &queue).into_guard();
    let base = rt.class_from_name("Base").unwrap();

    let derived = rt.new_class("Derived", base).unwrap();
    rt.add_method(derived, MethodKind::Instance, noop_method("sayHi")).unwrap();
}

#[test]
fn test_audit_guard_silent_without_conflict() {
    let rt = Runtime::new();
    let queue = DeclarationQueue::new();
    let guard = loud_installed(&rt, &queue).into_guard();
    let base = rt.class_from_name("Base").unwrap();
    rt.new_class("Derived", base).unwrap();

    drop(guard);
}

#[test]
fn test_global_runtime_and_queue() {
    let rt = global_runtime();
    let queue = DeclarationQueue::global();
    let base = rt.new_root_class("ScenarioGlobalBase").unwrap();
    let cat = category(rt, "ScenarioGlobalCategory", base, &["globalHi"], &[]);

    queue.declare(rt, cat).unwrap();
    let mut session = Session::new(rt, checked());
    session.install_pending(queue).unwrap();

    assert!(rt.own_method(base, MethodKind::Instance, &sel("globalHi")).is_some());
    session.audit().unwrap();
}
