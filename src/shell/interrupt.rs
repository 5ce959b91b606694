//! Ctrl-C handling for the binary.
//!
//! The first interrupt cancels the run at the next step boundary. The step in
//! flight is allowed to finish. A second interrupt exits immediately with 130.

use tracing::{debug, warn};

use crate::runner::CancelToken;

/// Exit status used when a second interrupt arrives.
pub const INTERRUPT_EXIT_CODE: i32 = 130;

/// What to do with an incoming interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// The run was asked to stop at the next step boundary.
    Cancel,
    /// A cancellation was already pending; leave now.
    Exit,
}

/// Apply one interrupt to `token`.
pub fn handle_interrupt(token: &CancelToken) -> InterruptAction {
    if token.is_cancelled() {
        return InterruptAction::Exit;
    }
    token.cancel();
    InterruptAction::Cancel
}

/// Route Ctrl-C (SIGINT/SIGTERM on Unix, console events on Windows) to `token`.
///
/// Only one handler can be installed per process; later calls return `false`
/// and leave the original token in place.
pub fn install_interrupt_handler(token: CancelToken) -> bool {
    let installed = ctrlc::set_handler(move || {
        if handle_interrupt(&token) == InterruptAction::Exit {
            std::process::exit(INTERRUPT_EXIT_CODE);
        }
        warn!("Interrupted; stopping after the current step (Ctrl-C again to exit)");
    });

    match installed {
        Ok(()) => true,
        Err(e) => {
            debug!("Interrupt handler not installed: {}", e);
            false
        }
    }
}
