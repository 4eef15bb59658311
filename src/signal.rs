//! Cooperative cancellation of the overlay loop.
//!
//! The console sends SIGUSR1 when the lid is closed. The handler only flips
//! flags; the menu loop notices on its next iteration and the host performs
//! the quick save.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::Result;
use tracing::warn;
#[cfg(unix)]
use anyhow::Context;

#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// True when both tokens share one flag.
    pub fn same_as(&self, other: &StopToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

static SIGNAL_STOP: OnceLock<StopToken> = OnceLock::new();
static QUICK_SAVE: AtomicBool = AtomicBool::new(false);

/// Makes `token` the one SIGUSR1 stops. Returns false when another token
/// was registered earlier; that one keeps receiving the signal.
fn register(token: &StopToken) -> bool {
    let registered = SIGNAL_STOP.get_or_init(|| token.clone());
    if registered.same_as(token) {
        true
    } else {
        warn!("SIGUSR1 already routed to another stop token, keeping the first");
        false
    }
}

/// True once SIGUSR1 has been received.
pub fn quick_save_requested() -> bool {
    QUICK_SAVE.load(Ordering::SeqCst)
}

#[cfg(unix)]
extern "C" fn handle_sigusr1(_sig: libc::c_int) {
    if let Some(token) = SIGNAL_STOP.get() {
        token.request_stop();
    }
    QUICK_SAVE.store(true, Ordering::SeqCst);
}

/// Routes SIGUSR1 to `token`. Only the first token registered is used.
#[cfg(unix)]
pub fn install_sigusr1(token: &StopToken) -> Result<()> {
    register(token);
    let handler = handle_sigusr1 as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // SAFETY: the handler only performs atomic stores.
    let prev = unsafe { libc::signal(libc::SIGUSR1, handler) };
    if prev == libc::SIG_ERR {
        return Err(std::io::Error::last_os_error()).context("installing SIGUSR1 handler");
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn install_sigusr1(token: &StopToken) -> Result<()> {
    register(token);
    tracing::debug!("SIGUSR1 is not available on this platform");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = StopToken::new();
        let other = token.clone();
        assert!(!token.is_stop_requested());
        other.request_stop();
        assert!(token.is_stop_requested());
        token.reset();
        assert!(!other.is_stop_requested());
    }

    #[test]
    fn only_the_first_token_is_registered() {
        register(&StopToken::new());
        let registered = SIGNAL_STOP.get().unwrap().clone();
        assert!(register(&registered.clone()));
        assert!(!register(&StopToken::new()));
        assert!(SIGNAL_STOP.get().unwrap().same_as(&registered));
        assert!(!registered.same_as(&StopToken::new()));
    }

    #[cfg(unix)]
    #[test]
    fn sigusr1_sets_token_and_quick_save() {
        let token = StopToken::new();
        install_sigusr1(&token).unwrap();
        let registered = SIGNAL_STOP.get().unwrap().clone();
        // SAFETY: raising a signal we installed a handler for.
        unsafe {
            libc::raise(libc::SIGUSR1);
        }
        assert!(registered.is_stop_requested());
        assert!(quick_save_requested());
    }
}
