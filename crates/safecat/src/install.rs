//! The installation algorithm.
//!
//! [`RegistrationEngine::install`] copies every own method of a category
//! class onto its target, class methods first, then instance methods. The
//! category's own lifecycle hook is never copied. With assertions enabled,
//! a method the target already has is a fatal conflict; methods copied
//! before the conflict stay installed, later ones are not touched.

use crate::config::{Config, ShadowCheck};
use crate::declaration::ExtensionDeclaration;
use crate::error::{Error, Result};
use crate::inspector::MethodSetInspector;
use crate::runtime::{Class, Method, MethodKind, Reflect, Selector};
use tracing::{debug, info, trace, warn};

/// One method the engine put on a target.
#[derive(Debug, Clone)]
pub struct InstalledMethod {
    /// Namespace it was added to.
    pub kind: MethodKind,
    /// The method as installed (same `Imp` as on the source).
    pub method: Method,
}

/// Record of a completed installation, consumed by the auditor.
#[derive(Debug, Clone)]
pub struct InstallReceipt {
    /// The declaration that was installed.
    pub declaration: ExtensionDeclaration,
    /// Installed methods in installation order.
    pub installed: Vec<InstalledMethod>,
    /// Methods that silently replaced an existing one. Always zero when
    /// assertions are enabled.
    pub replaced: usize,
}

impl InstallReceipt {
    /// The class the methods were installed on.
    #[must_use]
    pub fn target(&self) -> Class {
        self.declaration.target
    }

    /// Installed methods of one kind.
    pub fn methods(&self, kind: MethodKind) -> impl Iterator<Item = &Method> + '_ {
        self.installed
            .iter()
            .filter(move |entry| entry.kind == kind)
            .map(|entry| &entry.method)
    }

    /// Number of installed methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.installed.len()
    }

    /// Whether the category contributed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }
}

/// Installs category methods onto their targets.
pub struct RegistrationEngine<'r, R: Reflect + ?Sized> {
    inspector: MethodSetInspector<'r, R>,
    config: Config,
}

impl<'r, R: Reflect + ?Sized> RegistrationEngine<'r, R> {
    /// Creates an engine over `host`.
    pub fn new(host: &'r R, config: Config) -> Self {
        RegistrationEngine {
            inspector: MethodSetInspector::new(host),
            config,
        }
    }

    /// Copies the source's own methods onto the target.
    ///
    /// # Errors
    ///
    /// With assertions enabled, returns [`Error::RedefinedMethod`] naming
    /// the target for the first method it already has. Host errors are
    /// propagated.
    pub fn install(&self, declaration: ExtensionDeclaration) -> Result<InstallReceipt> {
        let host = self.inspector.host();
        let ExtensionDeclaration { source, target } = declaration;
        let mut receipt = InstallReceipt {
            declaration,
            installed: Vec::new(),
            replaced: 0,
        };

        for kind in MethodKind::ALL {
            for method in self.inspector.own_methods(source, kind) {
                if kind == MethodKind::Class && method.selector == self.config.lifecycle_hook {
                    trace!(source = %host.class_name(source), "skipping lifecycle hook");
                    continue;
                }

                if self.config.assertions {
                    self.add_checked(target, kind, &method)?;
                } else if let Some(previous) =
                    host.add_method_to_class(target, kind, method.clone())?
                {
                    if !previous.same_implementation(&method) {
                        receipt.replaced += 1;
                        warn!(
                            class = %host.class_name(target),
                            selector = %method.selector,
                            kind = kind.as_str(),
                            "assertions disabled, replaced existing method"
                        );
                    }
                }

                debug!(
                    class = %host.class_name(target),
                    selector = %method.selector,
                    kind = kind.as_str(),
                    "installed category method"
                );
                receipt.installed.push(InstalledMethod { kind, method });
            }
        }

        info!(
            source = %host.class_name(source),
            target = %host.class_name(target),
            methods = receipt.len(),
            "installed safe category"
        );
        Ok(receipt)
    }

    fn add_checked(&self, target: Class, kind: MethodKind, method: &Method) -> Result<()> {
        if self.already_present(target, kind, &method.selector) {
            return Err(self.redefined(target, &method.selector));
        }

        self.inspector
            .add_method(target, kind, method.clone())
            .map_err(|err| match err {
                Error::DuplicateMethod { .. } => self.redefined(target, &method.selector),
                other => other,
            })
    }

    fn already_present(&self, target: Class, kind: MethodKind, selector: &Selector) -> bool {
        match self.config.shadow_check {
            ShadowCheck::Own => self.inspector.has_own_method(target, kind, selector),
            ShadowCheck::Inherited => {
                self.inspector.lookup_method(target, kind, selector).is_some()
            }
        }
    }

    fn redefined(&self, class: Class, selector: &Selector) -> Error {
        Error::RedefinedMethod {
            selector: selector.to_string(),
            class: self.inspector.host().class_name(class),
        }
    }
}
