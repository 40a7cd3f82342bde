//! Process-wide `tracing` subscriber for hosts that do not install their own.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a fmt subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// A second call (or a host that already installed a subscriber) is a no-op.
pub fn init() {
    init_with_default("info");
}

/// Same as [`init`] with a caller-chosen fallback directive.
pub fn init_with_default(directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        init_with_default("debug");
        init();
        tracing::debug!("logging initialised");
    }
}
