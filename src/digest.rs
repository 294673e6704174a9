//! Keyed-digest derivation for one solve session.
//!
//! The key is a personalized BLAKE2b state seeded with the header bytes and
//! the little-endian nonce. Each finalization of the state with a block
//! counter yields several n-bit sub-hashes, which is how both the solver and
//! the verifier materialize `H(key, i)`.

use crate::encoding::expand_array;
use crate::params::Params;
use blake2b_simd::{Params as Blake2bParams, State};

const PERSONALIZATION_TAG: &[u8; 8] = b"ZcashPoW";

/// Digest key for one (header, nonce) pair. Immutable for the lifetime of a
/// solve session; deriving it never fails.
#[derive(Clone)]
pub struct DigestKey {
    params: Params,
    state: State,
}

impl DigestKey {
    /// Derive the key. Headers of any length are accepted; a header that
    /// does not match the upstream protocol's layout simply produces
    /// sub-hashes that never validate.
    pub fn derive(params: Params, header: &[u8], nonce: u32) -> Self {
        let mut personal = [0u8; 16];
        personal[..8].copy_from_slice(PERSONALIZATION_TAG);
        personal[8..12].copy_from_slice(&params.n().to_le_bytes());
        personal[12..16].copy_from_slice(&params.k().to_le_bytes());

        let mut state = Blake2bParams::new()
            .hash_length(params.hash_output())
            .personal(&personal)
            .to_state();
        state.update(header);
        state.update(&nonce.to_le_bytes());

        Self { params, state }
    }

    pub fn params(&self) -> Params {
        self.params
    }

    /// Raw digest covering indices `[block * ipho, (block + 1) * ipho)`.
    pub(crate) fn block_hash(&self, block: u32) -> Vec<u8> {
        let mut state = self.state.clone();
        state.update(&block.to_le_bytes());
        state.finalize().as_bytes().to_vec()
    }

    /// The n-bit sub-hash for a single index, expanded so every collision
    /// group is byte aligned.
    pub fn index_hash(&self, index: u32) -> Vec<u8> {
        let ipho = self.params.indices_per_hash_output();
        let digest = self.block_hash(index / ipho);
        let n_bytes = (self.params.n() / 8) as usize;
        let start = (index % ipho) as usize * n_bytes;
        expand_array(
            &digest[start..start + n_bytes],
            self.params.collision_bit_length(),
            0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let params = Params::new(48, 5).unwrap();
        let a = DigestKey::derive(params, b"header", 7);
        let b = DigestKey::derive(params, b"header", 7);
        assert_eq!(a.index_hash(13), b.index_hash(13));
    }

    #[test]
    fn nonce_changes_the_key() {
        let params = Params::new(48, 5).unwrap();
        let a = DigestKey::derive(params, b"header", 0);
        let b = DigestKey::derive(params, b"header", 1);
        assert_ne!(a.index_hash(0), b.index_hash(0));
    }

    #[test]
    fn index_hash_has_expanded_length() {
        let params = Params::EXCC_144_5;
        let key = DigestKey::derive(params, &[0u8; 140], 0);
        // 24-bit groups are already byte aligned at 144,5.
        assert_eq!(key.index_hash(0).len(), params.hash_length());
        assert_eq!(key.block_hash(0).len(), params.hash_output());
    }

    #[test]
    fn indices_within_one_block_differ() {
        let params = Params::new(48, 5).unwrap();
        let key = DigestKey::derive(params, &[0u8; 140], 0);
        assert_ne!(key.index_hash(0), key.index_hash(1));
    }
}
