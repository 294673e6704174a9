//! Bit-group packing shared by the digest rows and the compact solution
//! encoding.
//!
//! Equihash works on `bit_len`-bit groups that are not byte aligned in
//! general. `expand_array` pads every group out to whole bytes (big-endian
//! within the group) and `compress_array` is its exact inverse. The compact
//! solution form packs each (collision bits + 1)-bit index back-to-back with
//! no padding at all.

use crate::error::VerifyError;
use crate::params::Params;

/// Expand packed `bit_len`-bit groups so each occupies a whole number of
/// bytes, with `byte_pad` extra leading zero bytes per group.
pub(crate) fn expand_array(vin: &[u8], bit_len: usize, byte_pad: usize) -> Vec<u8> {
    debug_assert!(bit_len >= 8);
    debug_assert!(bit_len <= 25);

    let out_width = bit_len.div_ceil(8) + byte_pad;
    let out_len = 8 * out_width * vin.len() / bit_len;
    let bit_len_mask: u32 = (1 << bit_len) - 1;

    let mut vout = vec![0u8; out_len];

    // The low acc_bits bits of acc_value hold a big-endian bit queue.
    let mut acc_bits = 0usize;
    let mut acc_value = 0u32;

    let mut j = 0;
    for b in vin {
        acc_value = (acc_value << 8) | u32::from(*b);
        acc_bits += 8;

        if acc_bits >= bit_len {
            acc_bits -= bit_len;
            for x in byte_pad..out_width {
                vout[j + x] = ((acc_value >> (acc_bits + 8 * (out_width - x - 1)))
                    & ((bit_len_mask >> (8 * (out_width - x - 1))) & 0xFF))
                    as u8;
            }
            j += out_width;
        }
    }

    vout
}

/// Inverse of [`expand_array`]: strip per-group padding and repack the
/// `bit_len`-bit groups contiguously.
pub(crate) fn compress_array(vin: &[u8], bit_len: usize, byte_pad: usize) -> Vec<u8> {
    debug_assert!(bit_len >= 8);
    debug_assert!(bit_len <= 25);

    let in_width = bit_len.div_ceil(8) + byte_pad;
    let out_len = bit_len * vin.len() / (8 * in_width);
    let bit_len_mask: u32 = (1 << bit_len) - 1;

    let mut vout = vec![0u8; out_len];

    let mut acc_bits = 0usize;
    let mut acc_value = 0u32;

    let mut j = 0;
    for out in vout.iter_mut() {
        // Refill the queue whenever fewer than 8 bits remain.
        if acc_bits < 8 {
            acc_value <<= bit_len;
            for x in byte_pad..in_width {
                acc_value |= (u32::from(vin[j + x])
                    & ((bit_len_mask >> (8 * (in_width - x - 1))) & 0xFF))
                    << (8 * (in_width - x - 1));
            }
            j += in_width;
            acc_bits += bit_len;
        }
        acc_bits -= 8;
        *out = ((acc_value >> acc_bits) & 0xFF) as u8;
    }

    vout
}

/// Pack an index tuple into the compact big-endian form. The caller is
/// responsible for `indices.len() == params.index_count()`.
pub(crate) fn minimal_from_indices(params: Params, indices: &[u32]) -> Vec<u8> {
    let index_bits = params.collision_bit_length() + 1;
    let byte_pad = std::mem::size_of::<u32>() - index_bits.div_ceil(8);
    let bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_be_bytes()).collect();
    compress_array(&bytes, index_bits, byte_pad)
}

/// Unpack a compact solution into its index tuple, checking the length.
pub(crate) fn indices_from_minimal(
    params: Params,
    minimal: &[u8],
) -> Result<Vec<u32>, VerifyError> {
    if minimal.len() != params.solution_size() {
        return Err(VerifyError::InvalidLength {
            got: minimal.len(),
            expected: params.solution_size(),
        });
    }
    Ok(indices_unchecked(params, minimal))
}

/// Decode without the length check, for bytes already validated at
/// construction time.
pub(crate) fn indices_unchecked(params: Params, minimal: &[u8]) -> Vec<u32> {
    let index_bits = params.collision_bit_length() + 1;
    let byte_pad = std::mem::size_of::<u32>() - index_bits.div_ceil(8);
    let expanded = expand_array(minimal, index_bits, byte_pad);
    // Big-endian, so lexicographic byte order matches integer order.
    expanded
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
