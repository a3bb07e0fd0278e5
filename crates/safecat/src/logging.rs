//! Tracing setup.
//!
//! The crate logs through `tracing` and never installs a subscriber on its
//! own. Binaries that want output call [`init`] once at startup; filtering
//! comes from `SAFECAT_LOG`, falling back to `RUST_LOG`, e.g.
//! `SAFECAT_LOG=safecat=debug`.

use std::sync::Once;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "SAFECAT_LOG";

static TRACING_INIT: Once = Once::new();

/// Installs a formatting subscriber if a filter variable is set.
///
/// Safe to call multiple times. Does nothing if neither `SAFECAT_LOG` nor
/// `RUST_LOG` is set, or if another global subscriber is already in place.
pub fn init() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env());
        let Ok(filter) = filter else {
            return;
        };

        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(filter)
            .try_init();
    });
}
