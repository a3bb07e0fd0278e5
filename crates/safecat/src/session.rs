//! The install/audit lifecycle.
//!
//! A [`Session`] moves through exactly two transitions:
//!
//! ```text
//! Uninstalled --install_all--> Installed --audit--> Audited
//! ```
//!
//! There is no way back. A failed install leaves the session
//! `Uninstalled` and a failed audit leaves it `Installed`; either failure
//! means two pieces of code claim the same method name on related classes,
//! and the process bootstrap is expected to stop. [`enforce`] is that stop.
//!
//! [`bootstrap`] runs the whole startup half against a [`Runtime`]: load
//! hooks, then installation of everything they declared. [`AuditGuard`]
//! runs the audit half when it is dropped, mirroring a process destructor.

use crate::audit::{AuditReport, ConflictAuditor};
use crate::config::Config;
use crate::declaration::{DeclarationQueue, ExtensionDeclaration};
use crate::error::{Error, Result};
use crate::install::{InstallReceipt, RegistrationEngine};
use crate::runtime::{Reflect, Runtime};
use std::fmt;
use std::ops::Deref;
use tracing::{error, info, warn};

/// Lifecycle phase of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing installed yet.
    Uninstalled,
    /// Every pending declaration was installed.
    Installed,
    /// The audit ran (or was skipped). Terminal.
    Audited,
}

impl Phase {
    /// Lower-case phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Uninstalled => "uninstalled",
            Phase::Installed => "installed",
            Phase::Audited => "audited",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One process's worth of safe-category installation and audit.
pub struct Session<'r, R: Reflect + ?Sized> {
    host: &'r R,
    config: Config,
    phase: Phase,
    receipts: Vec<InstallReceipt>,
}

impl<'r, R: Reflect + ?Sized> Session<'r, R> {
    /// Creates an `Uninstalled` session over `host`.
    pub fn new(host: &'r R, config: Config) -> Self {
        Session {
            host,
            config,
            phase: Phase::Uninstalled,
            receipts: Vec::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Receipts of every installed declaration, in installation order.
    pub fn receipts(&self) -> &[InstallReceipt] {
        &self.receipts
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Error::InvalidPhase {
                expected: expected.as_str(),
                actual: self.phase.as_str(),
            })
        }
    }

    /// Installs each declaration in order, stopping at the first conflict.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPhase`] unless the session is `Uninstalled`,
    /// or the first installation error. Declarations installed before the
    /// error keep their receipts, but the session stays `Uninstalled`.
    pub fn install_all<I>(&mut self, declarations: I) -> Result<&[InstallReceipt]>
    where
        I: IntoIterator<Item = ExtensionDeclaration>,
    {
        self.expect_phase(Phase::Uninstalled)?;

        let engine = RegistrationEngine::new(self.host, self.config.clone());
        for declaration in declarations {
            let receipt = engine.install(declaration)?;
            self.receipts.push(receipt);
        }

        self.phase = Phase::Installed;
        info!(categories = self.receipts.len(), "safe categories installed");
        Ok(self.receipts.as_slice())
    }

    /// Drains `queue` and installs everything in it.
    ///
    /// # Errors
    ///
    /// See [`install_all`](Self::install_all).
    pub fn install_pending(&mut self, queue: &DeclarationQueue) -> Result<&[InstallReceipt]> {
        self.expect_phase(Phase::Uninstalled)?;
        self.install_all(queue.drain())
    }

    /// Audits every installed category against the live hierarchy.
    ///
    /// With assertions disabled the audit is skipped, but the session still
    /// moves to `Audited`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPhase`] unless the session is `Installed`,
    /// or the first conflict found.
    pub fn audit(&mut self) -> Result<AuditReport> {
        self.expect_phase(Phase::Installed)?;

        let report = if self.config.assertions {
            ConflictAuditor::new(self.host).audit_all(&self.receipts)?
        } else {
            info!("assertions disabled, skipping safe category audit");
            AuditReport::skipped()
        };

        self.phase = Phase::Audited;
        Ok(report)
    }

    /// Wraps the session so the audit runs when it goes out of scope.
    pub fn into_guard(self) -> AuditGuard<'r, R> {
        AuditGuard {
            session: Some(self),
        }
    }
}

impl<R: Reflect + ?Sized> fmt::Debug for Session<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase)
            .field("config", &self.config)
            .field("categories", &self.receipts.len())
            .finish()
    }
}

/// Runs load hooks, then installs every category they declared.
///
/// # Errors
///
/// Returns the first error from a load hook or from installation.
pub fn bootstrap<'r>(
    runtime: &'r Runtime,
    queue: &DeclarationQueue,
    config: Config,
) -> Result<Session<'r, Runtime>> {
    runtime.run_load_hooks(&config.lifecycle_hook)?;

    let mut session = Session::new(runtime, config);
    session.install_pending(queue)?;
    Ok(session)
}

/// Treats a safe-category error as fatal.
///
/// Logs the error and panics with its message, e.g.
/// `Safe category: redefined method 'sayHi' found in class 'Derived'`.
///
/// # Panics
///
/// Panics on `Err`.
#[track_caller]
pub fn enforce<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            error!(error = %err, "safe category check failed");
            panic!("{err}");
        }
    }
}

/// Owns a session and audits it on drop.
///
/// A conflict found during the drop-time audit panics via [`enforce`].
/// If the thread is already unwinding the audit is skipped, since a second
/// panic would abort the process and hide the first.
pub struct AuditGuard<'r, R: Reflect + ?Sized> {
    session: Option<Session<'r, R>>,
}

impl<'r, R: Reflect + ?Sized> AuditGuard<'r, R> {
    /// Runs the audit now and returns its result instead of panicking.
    ///
    /// # Errors
    ///
    /// See [`Session::audit`].
    pub fn finish(mut self) -> Result<AuditReport> {
        match self.session.take() {
            Some(mut session) => session.audit(),
            None => Ok(AuditReport::skipped()),
        }
    }

    /// Gives the session back without auditing.
    pub fn disarm(mut self) -> Option<Session<'r, R>> {
        self.session.take()
    }
}

impl<'r, R: Reflect + ?Sized> Deref for AuditGuard<'r, R> {
    type Target = Option<Session<'r, R>>;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl<R: Reflect + ?Sized> Drop for AuditGuard<'_, R> {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if session.phase() != Phase::Installed {
            return;
        }
        if std::thread::panicking() {
            warn!("thread is panicking, skipping safe category audit");
            return;
        }
        enforce(session.audit());
    }
}
