//! Cancellation primitive and a threaded solution stream.

use crate::engine::EquihashEngine;
use crate::error::Error;
use crate::params::Params;
use crate::solver::SolveStatus;
use crate::types::Solution;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Cooperative cancellation flag shared between a solve and its caller.
///
/// The driver polls it at round boundaries only, so cancellation takes
/// effect between rounds and never after a solution has been handed to the
/// sink mid-round.
#[derive(Debug, Default)]
pub struct CancelFlag {
    cancelled: AtomicBool,
}

impl CancelFlag {
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Clear a latched cancellation so the next solve can run.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Run one solve on a worker thread and stream its solutions.
///
/// Solutions arrive in discovery order over a bounded channel. Dropping the
/// stream cancels the solve and joins the worker.
pub struct SolutionStream {
    rx: flume::Receiver<Solution>,
    cancel: Arc<CancelFlag>,
    join: Option<thread::JoinHandle<Result<SolveStatus, Error>>>,
}

impl SolutionStream {
    /// Spawn a solve for (header, nonce) under the given parameter set.
    pub fn spawn(params: Params, header: Vec<u8>, nonce: u32) -> Self {
        let engine = EquihashEngine::new(params);
        let cancel = engine.cancel_handle();
        let (tx, rx) = flume::bounded::<Solution>(16);

        let worker_cancel = cancel.clone();
        let join = thread::spawn(move || {
            let mut sink = |sol: &Solution| {
                // A dropped receiver means nobody wants further results.
                if tx.send(sol.clone()).is_err() {
                    worker_cancel.cancel();
                }
            };
            engine.solve(&header, nonce, &mut sink)
        });

        Self {
            rx,
            cancel,
            join: Some(join),
        }
    }

    /// Blocking receive; `None` once the solve has finished.
    pub fn recv(&self) -> Option<Solution> {
        self.rx.recv().ok()
    }

    /// Receive with a timeout; `None` on timeout or a finished solve.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Solution> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Ask the worker to stop at the next round boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the solve to finish and return its terminal status.
    pub fn join(mut self) -> Result<SolveStatus, Error> {
        let handle = self
            .join
            .take()
            .ok_or_else(|| Error::Internal("stream already joined".into()))?;
        // Drain so the worker is never blocked on a full channel.
        while self.rx.recv().is_ok() {}
        handle
            .join()
            .map_err(|_| Error::Internal("solver thread panicked".into()))?
    }
}

impl Drop for SolutionStream {
    fn drop(&mut self) {
        self.cancel.cancel();
        // Keep draining until the worker hangs up, so it is never stuck on
        // a full channel while we wait for it.
        if let Some(handle) = self.join.take() {
            while self.rx.recv().is_ok() {}
            let _ = handle.join();
        }
    }
}
