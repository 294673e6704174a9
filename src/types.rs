use crate::encoding::{indices_from_minimal, indices_unchecked};
use crate::error::VerifyError;
use crate::params::Params;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One encoded Equihash solution: the compact bit-packed index tuple.
///
/// For the default [`Params::EXCC_144_5`] set this is exactly 100 bytes.
/// A `Solution` handed to a sink is a read-only snapshot; the solver keeps
/// no reference to it after the report returns.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Solution {
    params: Params,
    minimal: Vec<u8>,
}

impl Solution {
    /// Wrap compact bytes produced by the solver. Length is the caller's
    /// responsibility inside the crate.
    pub(crate) fn new(params: Params, minimal: Vec<u8>) -> Self {
        debug_assert_eq!(minimal.len(), params.solution_size());
        Self { params, minimal }
    }

    /// Wrap externally supplied bytes, checking only the length. Use
    /// [`crate::is_valid_solution`] to check the proof itself.
    pub fn from_bytes(params: Params, bytes: &[u8]) -> Result<Self, VerifyError> {
        // Decoding validates the length; the indices are recomputed lazily.
        indices_from_minimal(params, bytes)?;
        Ok(Self {
            params,
            minimal: bytes.to_vec(),
        })
    }

    pub fn params(&self) -> Params {
        self.params
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.minimal
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.minimal
    }

    /// Decode the index tuple (2^k indices, tree order).
    pub fn indices(&self) -> Vec<u32> {
        indices_unchecked(self.params, &self.minimal)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.minimal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_checks_length() {
        let params = Params::EXCC_144_5;
        assert!(Solution::from_bytes(params, &[0u8; 100]).is_ok());
        assert!(matches!(
            Solution::from_bytes(params, &[0u8; 36]),
            Err(VerifyError::InvalidLength {
                got: 36,
                expected: 100
            })
        ));
    }

    #[test]
    fn display_is_hex() {
        let params = Params::new(48, 5).unwrap();
        let sol = Solution::from_bytes(params, &[0xABu8; 36]).unwrap();
        assert_eq!(sol.to_string(), "ab".repeat(36));
    }

    #[test]
    fn serde_round_trip() {
        let params = Params::new(48, 5).unwrap();
        let sol = Solution::from_bytes(params, &[7u8; 36]).unwrap();
        let json = serde_json::to_string(&sol).unwrap();
        let back: Solution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sol);
    }
}
