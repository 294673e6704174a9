//! An Equihash proof-of-work solver and verifier.
//!
//! Given a block-header byte sequence and a 32-bit nonce, the solver derives
//! a personalized BLAKE2b digest key, runs the generalized-birthday
//! collision search for the configured `(n, k)` parameter set, and reports
//! every solution it finds, already re-validated, through a caller-supplied
//! [`SolutionSink`]. The compact solution encoding for the default
//! [`Params::EXCC_144_5`] set is exactly 100 bytes.
//!
//! ```no_run
//! use rsequihash::{EquihashEngine, Params, Solution};
//!
//! let engine = EquihashEngine::new(Params::EXCC_144_5);
//! let mut sink = |solution: &Solution| {
//!     println!("found {solution}");
//! };
//! let status = engine.solve(&[0u8; 140], 0, &mut sink)?;
//! assert_eq!(status.code(), 0);
//! # Ok::<(), rsequihash::Error>(())
//! ```
//!
//! Small parameter sets such as `(48, 5)` keep the full search cheap enough
//! for tests; the data model and predicates are identical at every scale.

mod digest;
mod encoding;
mod engine;
mod error;
mod params;
mod solver;
mod stream;
mod types;
mod verify;

pub use digest::DigestKey;
pub use engine::{EquihashEngine, EquihashEngineBuilder, SolutionSink};
pub use error::{Error, VerifyError};
pub use params::Params;
pub use solver::SolveStatus;
pub use stream::{CancelFlag, SolutionStream};
pub use types::Solution;
pub use verify::is_valid_solution;

/// One-shot solve with a fresh engine.
pub fn solve(
    params: Params,
    header: &[u8],
    nonce: u32,
    sink: &mut dyn SolutionSink,
) -> Result<SolveStatus, Error> {
    EquihashEngine::new(params).solve(header, nonce, sink)
}

/// One-shot solve collecting every solution.
pub fn solve_all(
    params: Params,
    header: &[u8],
    nonce: u32,
) -> Result<(Vec<Solution>, SolveStatus), Error> {
    EquihashEngine::new(params).solve_all(header, nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_function_matches_engine() {
        let params = Params::new(48, 5).unwrap();
        let (via_fn, status) = solve_all(params, b"lib test", 2).unwrap();
        let (via_engine, _) = EquihashEngine::new(params)
            .solve_all(b"lib test", 2)
            .unwrap();
        assert_eq!(status, SolveStatus::Exhausted);
        assert_eq!(via_fn, via_engine);
    }

    #[test]
    fn reported_solutions_decode_round_trip() {
        let params = Params::new(48, 5).unwrap();
        for nonce in 0..16 {
            let (solutions, _) = solve_all(params, &[0u8; 140], nonce).unwrap();
            for sol in solutions {
                let rebuilt = Solution::from_bytes(params, sol.as_bytes()).unwrap();
                assert_eq!(rebuilt.indices(), sol.indices());
                assert_eq!(rebuilt, sol);
            }
        }
    }

    #[test]
    fn status_taxonomy_is_distinguishable() {
        let exhausted = SolveStatus::Exhausted.code();
        let cancelled = SolveStatus::Cancelled.code();
        let internal = Error::Internal("x".into()).code();
        assert_eq!(exhausted, 0);
        assert_ne!(exhausted, cancelled);
        assert_ne!(cancelled, internal);
        assert_ne!(exhausted, internal);
    }
}
