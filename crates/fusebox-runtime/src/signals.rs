//! Signal handler overrides around delegated execution
//!
//! Embedding environments (interpreters in particular) often install their
//! own SIGINT/SIGTERM handlers that only set a flag. While a long delegated
//! execution is running nobody checks that flag, so an interrupt would be
//! swallowed. The guard below puts both signals back to default handling for
//! the duration of the execution and restores whatever was there afterwards.
//!
//! The swap is process-wide and uncoordinated between threads: two
//! overlapping invocations can each record the other's `SIG_DFL` as the
//! "previous" handler, in which case the original handler is not restored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// Switch for the signal handler overrides
#[derive(Debug)]
pub struct SignalOverrides {
    enabled: AtomicBool,
}

static GLOBAL_OVERRIDES: OnceLock<Arc<SignalOverrides>> = OnceLock::new();

impl SignalOverrides {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    /// The process-wide switch, enabled until first turned off
    ///
    /// Contexts share it unless built with their own.
    pub fn global() -> Arc<SignalOverrides> {
        Arc::clone(GLOBAL_OVERRIDES.get_or_init(|| Arc::new(SignalOverrides::default())))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Install default handling if enabled; restoration happens on drop
    pub fn acquire(&self) -> Option<SignalOverrideGuard> {
        self.is_enabled().then(SignalOverrideGuard::install)
    }
}

impl Default for SignalOverrides {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Default SIGINT/SIGTERM handling for as long as the guard lives
#[cfg(unix)]
#[derive(Debug)]
pub struct SignalOverrideGuard {
    previous_interrupt: libc::sighandler_t,
    previous_terminate: libc::sighandler_t,
}

#[cfg(unix)]
impl SignalOverrideGuard {
    /// Save the current handlers and install `SIG_DFL` for both signals
    pub fn install() -> Self {
        // SAFETY: SIG_DFL is always a valid disposition for SIGINT/SIGTERM.
        let previous_interrupt = unsafe { libc::signal(libc::SIGINT, libc::SIG_DFL) };
        let previous_terminate = unsafe { libc::signal(libc::SIGTERM, libc::SIG_DFL) };
        trace!("installed default SIGINT/SIGTERM handling");
        Self {
            previous_interrupt,
            previous_terminate,
        }
    }

    fn restore(signal: libc::c_int, previous: libc::sighandler_t) {
        // SIG_DFL is 0, which also covers a null previous handler.
        if previous == libc::SIG_ERR || previous == libc::SIG_DFL {
            return;
        }
        // SAFETY: `previous` was returned by `signal` for this very signal,
        // so it is a disposition the process had installed.
        unsafe {
            libc::signal(signal, previous);
        }
    }
}

#[cfg(unix)]
impl Drop for SignalOverrideGuard {
    fn drop(&mut self) {
        Self::restore(libc::SIGINT, self.previous_interrupt);
        Self::restore(libc::SIGTERM, self.previous_terminate);
        trace!("restored previous SIGINT/SIGTERM handling");
    }
}

/// No signal dispositions to swap on this platform
#[cfg(not(unix))]
#[derive(Debug)]
pub struct SignalOverrideGuard;

#[cfg(not(unix))]
impl SignalOverrideGuard {
    pub fn install() -> Self {
        Self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_overrides_yield_no_guard() {
        let overrides = SignalOverrides::new(false);
        assert!(overrides.acquire().is_none());
    }

    #[test]
    fn test_global_switch_is_shared() {
        let a = SignalOverrides::global();
        let b = SignalOverrides::global();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_toggle() {
        let overrides = SignalOverrides::default();
        assert!(overrides.is_enabled());
        overrides.set_enabled(false);
        assert!(!overrides.is_enabled());
    }
}
