use crate::error::Error;
use serde::{Deserialize, Serialize};

/// An Equihash parameter set.
///
/// `n` is the bit-width of the per-index sub-hashes, `k` the recursion depth
/// of the generalized-birthday search. Together they fix the difficulty, the
/// memory footprint, and the size of the compact solution encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Params {
    n: u32,
    k: u32,
}

impl Params {
    /// The 144,5 parameter set used by the EXCC chain (and other "Zhash"
    /// deployments). Its compact solutions are exactly 100 bytes.
    pub const EXCC_144_5: Params = Params { n: 144, k: 5 };

    /// Build a parameter set, rejecting combinations the algorithm cannot
    /// support.
    pub fn new(n: u32, k: u32) -> Result<Self, Error> {
        if n < 32 || n > 512 || n % 8 != 0 {
            return Err(Error::InvalidParams(format!(
                "n must be a multiple of 8 in 32..=512, got {n}"
            )));
        }
        if k < 3 || k >= n {
            return Err(Error::InvalidParams(format!(
                "k must be in 3..n, got k={k} n={n}"
            )));
        }
        // Collision groups must tile the n bits exactly, otherwise the
        // trailing n % (k+1) bits escape the XOR predicate entirely.
        if n % (k + 1) != 0 {
            return Err(Error::InvalidParams(format!(
                "n must be divisible by k + 1, got n={n} k={k}"
            )));
        }
        let params = Params { n, k };
        // The bit packing works through a u32 accumulator: groups must be at
        // least a byte wide and index groups (cbl + 1 bits) at most 25 bits.
        let cbl = params.collision_bit_length();
        if !(8..=24).contains(&cbl) {
            return Err(Error::InvalidParams(format!(
                "collision bit length {cbl} outside supported range 8..=24"
            )));
        }
        Ok(params)
    }

    pub const fn n(&self) -> u32 {
        self.n
    }

    pub const fn k(&self) -> u32 {
        self.k
    }

    /// How many n-bit sub-hashes one BLAKE2b invocation yields.
    pub const fn indices_per_hash_output(&self) -> u32 {
        512 / self.n
    }

    /// BLAKE2b digest length in bytes.
    pub const fn hash_output(&self) -> usize {
        (self.indices_per_hash_output() * self.n / 8) as usize
    }

    /// Bits that must collide in each search round.
    pub const fn collision_bit_length(&self) -> usize {
        (self.n / (self.k + 1)) as usize
    }

    /// `collision_bit_length` rounded up to whole bytes.
    pub const fn collision_byte_length(&self) -> usize {
        self.collision_bit_length().div_ceil(8)
    }

    /// Length in bytes of an expanded row hash (each collision group padded
    /// to byte alignment).
    pub const fn hash_length(&self) -> usize {
        (self.k as usize + 1) * self.collision_byte_length()
    }

    /// Number of indices in a full solution tuple (2^k).
    pub const fn index_count(&self) -> usize {
        1 << self.k
    }

    /// Number of rows in the initial table S_0 (2^(collision bits + 1)).
    pub const fn initial_row_count(&self) -> usize {
        1 << (self.collision_bit_length() + 1)
    }

    /// Size in bytes of the compact solution encoding.
    pub const fn solution_size(&self) -> usize {
        self.index_count() * (self.collision_bit_length() + 1) / 8
    }
}
