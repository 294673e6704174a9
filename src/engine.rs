//! The solve driver.
//!
//! One `solve` call walks Idle → Keyed → Searching, reporting each verified
//! solution synchronously through the caller's [`SolutionSink`], and returns
//! once the search space is exhausted or cancellation is observed. Session
//! state lives on the call stack and is never shared between calls.

use crate::digest::DigestKey;
use crate::encoding::minimal_from_indices;
use crate::error::Error;
use crate::params::Params;
use crate::solver::{SolveSession, SolveStatus};
use crate::stream::CancelFlag;
use crate::types::Solution;
use crate::verify;
use derive_builder::Builder;
use std::collections::HashSet;
use std::sync::Arc;

/// Receives solutions as the driver finds them.
///
/// Replaces the original C function-pointer + `user_data` pair: captured
/// state plays the role of the opaque pointer, so closures implement the
/// trait directly. Reports are synchronous and must not re-enter the solver.
pub trait SolutionSink {
    fn report(&mut self, solution: &Solution);
}

impl<F: FnMut(&Solution)> SolutionSink for F {
    fn report(&mut self, solution: &Solution) {
        self(solution)
    }
}

/// Equihash solve driver for a fixed parameter set.
#[derive(Builder, Clone, Debug)]
#[builder(pattern = "owned")]
pub struct EquihashEngine {
    /// Parameter set every solve on this engine uses.
    pub params: Params,
    /// Cooperative cancellation flag, polled at round boundaries.
    ///
    /// The flag latches: once set it cancels every subsequent solve on
    /// this engine until [`CancelFlag::reset`] clears it (so a request
    /// made before a solve starts still takes effect).
    #[builder(default)]
    pub cancel: Arc<CancelFlag>,
}

impl EquihashEngine {
    /// Engine with a fresh cancellation flag.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            cancel: Arc::new(CancelFlag::new()),
        }
    }

    /// Handle another thread can use to cancel in-flight solves.
    ///
    /// Cancellation latches across solves; call [`CancelFlag::reset`] on
    /// the handle before reusing the engine.
    pub fn cancel_handle(&self) -> Arc<CancelFlag> {
        self.cancel.clone()
    }

    /// Search the full (header, nonce) space and report every solution.
    ///
    /// Each reported [`Solution`] has been re-validated against the same
    /// header and nonce before the sink sees it, duplicates are suppressed,
    /// and the discovery order is deterministic for identical inputs.
    pub fn solve(
        &self,
        header: &[u8],
        nonce: u32,
        sink: &mut dyn SolutionSink,
    ) -> Result<SolveStatus, Error> {
        let key = DigestKey::derive(self.params, header, nonce);
        let params = self.params;
        let mut seen: HashSet<Vec<u8>> = HashSet::new();

        let mut session = SolveSession::new(&key, &self.cancel);
        session.run(|indices| {
            let minimal = minimal_from_indices(params, indices);
            if !seen.insert(minimal.clone()) {
                return Ok(());
            }
            // Never emit anything the verifier would not accept.
            verify::validate_indices(params, &key, indices)
                .map_err(|err| Error::Internal(format!("candidate failed validation: {err}")))?;
            sink.report(&Solution::new(params, minimal));
            Ok(())
        })
    }

    /// Collect all solutions for one (header, nonce) pair.
    pub fn solve_all(&self, header: &[u8], nonce: u32) -> Result<(Vec<Solution>, SolveStatus), Error> {
        let mut solutions = Vec::new();
        let mut sink = |sol: &Solution| solutions.push(sol.clone());
        let status = self.solve(header, nonce, &mut sink)?;
        Ok((solutions, status))
    }
}
