use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::warn;

/// A cancellation flag shared between a signal listener and the training loop.
///
/// The loop only polls it between batches, so a running step always completes.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// Create an untriggered flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the loop stop
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Listen for Ctrl-C on the current tokio runtime.
    ///
    /// The first signal triggers the flag. A second one exits the process immediately.
    pub fn listen_for_ctrl_c(&self) {
        let interrupt = self.clone();

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("Unable to listen for Ctrl-C, interruption is disabled");
                return;
            }

            interrupt.trigger();

            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Forcefully interrupted");
                std::process::exit(130);
            }
        });
    }
}
