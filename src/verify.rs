//! Standalone solution validation.
//!
//! Validation recomputes everything from the (header, nonce) pair: the
//! digest key, every leaf sub-hash, the per-round partial collisions, the
//! tree ordering, duplicate freedom, and the full-width XOR. The solve
//! driver runs this same check before every report, so nothing unverified
//! ever reaches a sink.

use crate::digest::DigestKey;
use crate::encoding::indices_from_minimal;
use crate::error::VerifyError;
use crate::params::Params;

/// Check a compact solution against the given header and nonce.
pub fn is_valid_solution(
    params: Params,
    header: &[u8],
    nonce: u32,
    minimal: &[u8],
) -> Result<(), VerifyError> {
    let indices = indices_from_minimal(params, minimal)?;
    let key = DigestKey::derive(params, header, nonce);
    validate_indices(params, &key, &indices)
}

struct Node {
    hash: Vec<u8>,
    indices: Vec<u32>,
}

/// Re-run the collision tree over a decoded tuple.
pub(crate) fn validate_indices(
    params: Params,
    key: &DigestKey,
    indices: &[u32],
) -> Result<(), VerifyError> {
    if indices.len() != params.index_count() {
        return Err(VerifyError::InvalidLength {
            got: indices.len(),
            expected: params.index_count(),
        });
    }
    if indices
        .iter()
        .any(|&i| i as usize >= params.initial_row_count())
    {
        return Err(VerifyError::IndexOutOfRange);
    }

    let cbl = params.collision_byte_length();
    let mut nodes: Vec<Node> = indices
        .iter()
        .map(|&i| Node {
            hash: key.index_hash(i),
            indices: vec![i],
        })
        .collect();

    let mut round = 1usize;
    while nodes.len() > 1 {
        let mut next = Vec::with_capacity(nodes.len() / 2);
        for pair in nodes.chunks_exact(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.hash[..cbl] != b.hash[..cbl] {
                return Err(VerifyError::CollisionMissing(round));
            }
            if a.indices[0] >= b.indices[0] {
                return Err(VerifyError::OutOfOrder);
            }
            if a.indices.iter().any(|i| b.indices.contains(i)) {
                return Err(VerifyError::DuplicateIndices);
            }
            let hash: Vec<u8> = a.hash[cbl..]
                .iter()
                .zip(&b.hash[cbl..])
                .map(|(x, y)| x ^ y)
                .collect();
            let mut merged = Vec::with_capacity(a.indices.len() * 2);
            merged.extend_from_slice(&a.indices);
            merged.extend_from_slice(&b.indices);
            next.push(Node {
                hash,
                indices: merged,
            });
        }
        nodes = next;
        round += 1;
    }

    // After k merges one collision-width block remains; it is the tail of
    // the full-width XOR and must be zero.
    if nodes[0].hash.iter().any(|&byte| byte != 0) {
        return Err(VerifyError::NonZeroRoot);
    }
    Ok(())
}
