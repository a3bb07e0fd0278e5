//! The post-hoc conflict audit.
//!
//! Installation can only see classes and categories that exist when it
//! runs. A category installed later on an ancestor or descendant of the
//! same target can still introduce a second implementation under one of
//! our method names. [`ConflictAuditor::audit`] re-walks the target's
//! hierarchy from the live registry and checks that every method recorded
//! in an [`InstallReceipt`] is still the only implementation of its name
//! along that hierarchy.
//!
//! Sibling classes (other subclasses of the target's ancestors) are not
//! inspected; only the target's own dispatch chain and its subclasses are.

use crate::error::{Error, Result};
use crate::hierarchy::HierarchyWalker;
use crate::inspector::MethodSetInspector;
use crate::install::InstallReceipt;
use crate::runtime::{MethodKind, Reflect};
use tracing::{debug, info};

/// Outcome of a successful audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuditReport {
    /// Related classes scanned (target, ancestors, descendants).
    pub classes_scanned: usize,
    /// `(class, method)` pairs examined.
    pub methods_checked: usize,
    /// Related classes that declare one of the names with the same
    /// implementation, e.g. the category class itself.
    pub agreeing: usize,
    /// Set when assertions are disabled and nothing was checked.
    pub skipped: bool,
}

impl AuditReport {
    /// Report for an audit that did not run.
    #[must_use]
    pub fn skipped() -> Self {
        AuditReport {
            skipped: true,
            ..AuditReport::default()
        }
    }

    /// Adds another report's counts into this one.
    pub fn merge(&mut self, other: AuditReport) {
        self.classes_scanned += other.classes_scanned;
        self.methods_checked += other.methods_checked;
        self.agreeing += other.agreeing;
        self.skipped &= other.skipped;
    }
}

/// Re-checks installed categories against their current hierarchy.
pub struct ConflictAuditor<'r, R: Reflect + ?Sized> {
    inspector: MethodSetInspector<'r, R>,
    walker: HierarchyWalker<'r, R>,
}

impl<'r, R: Reflect + ?Sized> ConflictAuditor<'r, R> {
    /// Creates an auditor over `host`.
    pub fn new(host: &'r R) -> Self {
        ConflictAuditor {
            inspector: MethodSetInspector::new(host),
            walker: HierarchyWalker::new(host),
        }
    }

    /// Audits one installed category.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RedefinedMethod`] naming the first related class
    /// whose own method of the same name has a different implementation.
    pub fn audit(&self, receipt: &InstallReceipt) -> Result<AuditReport> {
        let host = self.inspector.host();
        let snapshot = self.walker.snapshot(receipt.target());
        let mut report = AuditReport {
            classes_scanned: snapshot.len(),
            ..AuditReport::default()
        };

        for related in snapshot.related() {
            for kind in MethodKind::ALL {
                for installed in receipt.methods(kind) {
                    report.methods_checked += 1;

                    let Some(found) =
                        self.inspector.own_method(related, kind, &installed.selector)
                    else {
                        continue;
                    };

                    if !self.inspector.implementations_equal(&found, installed) {
                        return Err(Error::RedefinedMethod {
                            selector: installed.selector.to_string(),
                            class: host.class_name(related),
                        });
                    }
                    if related != receipt.target() {
                        report.agreeing += 1;
                    }
                }
            }
        }

        debug!(
            target = %host.class_name(receipt.target()),
            classes = report.classes_scanned,
            methods = report.methods_checked,
            "audited safe category"
        );
        Ok(report)
    }

    /// Audits every receipt, stopping at the first conflict.
    ///
    /// # Errors
    ///
    /// See [`audit`](Self::audit).
    pub fn audit_all<'a, I>(&self, receipts: I) -> Result<AuditReport>
    where
        I: IntoIterator<Item = &'a InstallReceipt>,
    {
        let mut total = AuditReport::default();
        let mut audited = 0usize;
        for receipt in receipts {
            total.merge(self.audit(receipt)?);
            audited += 1;
        }
        info!(categories = audited, classes = total.classes_scanned, "audit passed");
        Ok(total)
    }
}
