//! Generalized-birthday collision search.
//!
//! The search builds the initial table S_0 of (index, expanded hash) rows
//! and runs k collision rounds. Rounds 1..k collide on the next
//! `collision_byte_length` bytes of the row hashes; every colliding pair in
//! a group is joined (the search is a multi-way join, not a greedy pick),
//! XOR-ing the hashes and concatenating the index lists with the
//! smaller-leading-index branch first. The final round additionally requires
//! the remaining XOR to be all zero, at which point the 2^k-leaf tuple is
//! emitted.
//!
//! The tables here are plain in-memory vectors; a memory-bound production
//! build would batch rounds through bucketed external sorts, but the row
//! model and the collision predicate are the same either way.

use crate::digest::DigestKey;
use crate::error::Error;
use crate::params::Params;
use crate::stream::CancelFlag;

/// Outcome of a completed search, before error mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SolveStatus {
    /// Search space fully enumerated; all solutions were reported.
    Exhausted,
    /// Cancellation observed at a round boundary; no further reports.
    Cancelled,
}

impl SolveStatus {
    /// Stable integer status code (`OK_EXHAUSTED` = 0, `CANCELLED` = 1;
    /// errors report -1 via [`Error::code`]).
    pub const fn code(self) -> i32 {
        match self {
            SolveStatus::Exhausted => 0,
            SolveStatus::Cancelled => 1,
        }
    }
}

/// One partial tuple: the XOR of its leaves' hashes (already trimmed by the
/// rounds it survived) and the leaf indices in tree order.
struct Row {
    hash: Vec<u8>,
    indices: Vec<u32>,
}

impl Row {
    /// Join two partial tuples, dropping the collided prefix.
    fn join(a: &Row, b: &Row, trim: usize) -> Row {
        let hash: Vec<u8> = a.hash[trim..]
            .iter()
            .zip(&b.hash[trim..])
            .map(|(x, y)| x ^ y)
            .collect();
        let (first, second) = if a.indices[0] < b.indices[0] {
            (a, b)
        } else {
            (b, a)
        };
        let mut indices = Vec::with_capacity(first.indices.len() * 2);
        indices.extend_from_slice(&first.indices);
        indices.extend_from_slice(&second.indices);
        Row { hash, indices }
    }
}

fn distinct_indices(a: &Row, b: &Row) -> bool {
    a.indices
        .iter()
        .all(|i| b.indices.iter().all(|j| i != j))
}

/// Transient state for one solve call. Owned exclusively by that call and
/// dropped on return.
pub(crate) struct SolveSession<'a> {
    key: &'a DigestKey,
    cancel: &'a CancelFlag,
    params: Params,
}

impl<'a> SolveSession<'a> {
    pub(crate) fn new(key: &'a DigestKey, cancel: &'a CancelFlag) -> Self {
        Self {
            key,
            cancel,
            params: key.params(),
        }
    }

    /// Run the full search, handing every full-width collision tuple to
    /// `on_tuple` in discovery order. The closure may fail, which aborts
    /// the search with that error.
    ///
    /// Collision-table growth is fallible and surfaces as
    /// [`Error::ResourceExhausted`]; the small per-row scratch buffers
    /// still allocate infallibly.
    pub(crate) fn run(
        &mut self,
        mut on_tuple: impl FnMut(&[u32]) -> Result<(), Error>,
    ) -> Result<SolveStatus, Error> {
        if self.cancel.is_cancelled() {
            return Ok(SolveStatus::Cancelled);
        }

        let mut rows = self.initial_rows()?;
        let cbl = self.params.collision_byte_length();
        let k = self.params.k();

        for round in 1..=k {
            // Cancellation is only observed between rounds.
            if self.cancel.is_cancelled() {
                return Ok(SolveStatus::Cancelled);
            }

            // Stable order over (hash, indices) keeps group scans, and with
            // them the discovery order, fully deterministic.
            rows.sort_by(|a, b| a.hash.cmp(&b.hash).then_with(|| a.indices.cmp(&b.indices)));

            let final_round = round == k;
            let mut next: Vec<Row> = Vec::new();
            if !final_round {
                next.try_reserve(rows.len())
                    .map_err(|_| Error::ResourceExhausted)?;
            }

            let mut i = 0;
            while i < rows.len() {
                let mut j = i + 1;
                while j < rows.len() && rows[i].hash[..cbl] == rows[j].hash[..cbl] {
                    j += 1;
                }
                // Multi-way join: every pair in the colliding group.
                for a in i..j {
                    for b in (a + 1)..j {
                        if !distinct_indices(&rows[a], &rows[b]) {
                            continue;
                        }
                        let joined = Row::join(&rows[a], &rows[b], cbl);
                        if final_round {
                            // The collided prefix is gone; the rest of the
                            // XOR must vanish too.
                            if joined.hash.iter().all(|&byte| byte == 0) {
                                on_tuple(&joined.indices)?;
                            }
                        } else {
                            // Joins can outnumber the input rows, so the
                            // overflow pushes stay fallible as well.
                            next.try_reserve(1).map_err(|_| Error::ResourceExhausted)?;
                            next.push(joined);
                        }
                    }
                }
                i = j;
            }

            if !final_round {
                rows = next;
            }
        }

        Ok(SolveStatus::Exhausted)
    }

    fn initial_rows(&self) -> Result<Vec<Row>, Error> {
        let count = self.params.initial_row_count();
        let ipho = self.params.indices_per_hash_output();
        let n_bytes = (self.params.n() / 8) as usize;
        let cbl_bits = self.params.collision_bit_length();

        let mut rows = Vec::new();
        rows.try_reserve_exact(count)
            .map_err(|_| Error::ResourceExhausted)?;

        // One finalization per digest block instead of per index.
        let blocks = (count as u32).div_ceil(ipho);
        'outer: for block in 0..blocks {
            let digest = self.key.block_hash(block);
            for slot in 0..ipho {
                let index = block * ipho + slot;
                if index as usize >= count {
                    break 'outer;
                }
                let start = slot as usize * n_bytes;
                rows.push(Row {
                    hash: crate::encoding::expand_array(
                        &digest[start..start + n_bytes],
                        cbl_bits,
                        0,
                    ),
                    indices: vec![index],
                });
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_params() -> Params {
        Params::new(48, 5).unwrap()
    }

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(SolveStatus::Exhausted.code(), 0);
        assert_eq!(SolveStatus::Cancelled.code(), 1);
        assert_eq!(Error::ResourceExhausted.code(), -1);
    }

    #[test]
    fn initial_rows_match_index_hashes() {
        let params = session_params();
        let key = DigestKey::derive(params, b"row test", 0);
        let cancel = CancelFlag::new();
        let session = SolveSession::new(&key, &cancel);
        let rows = session.initial_rows().unwrap();
        assert_eq!(rows.len(), params.initial_row_count());
        // Block-wise generation must agree with the per-index path.
        assert_eq!(rows[0].hash, key.index_hash(0));
        assert_eq!(rows[37].hash, key.index_hash(37));
        assert_eq!(rows[511].hash, key.index_hash(511));
    }

    #[test]
    fn tuples_have_distinct_in_range_indices() {
        let params = session_params();
        let key = DigestKey::derive(params, &[0u8; 140], 0);
        let cancel = CancelFlag::new();
        let mut found = Vec::new();
        let status = SolveSession::new(&key, &cancel)
            .run(|indices| {
                found.push(indices.to_vec());
                Ok(())
            })
            .unwrap();
        assert_eq!(status, SolveStatus::Exhausted);
        for tuple in &found {
            assert_eq!(tuple.len(), params.index_count());
            let mut sorted = tuple.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), tuple.len(), "duplicate index in {tuple:?}");
            assert!(sorted
                .iter()
                .all(|&i| (i as usize) < params.initial_row_count()));
        }
    }

    #[test]
    fn search_is_deterministic() {
        let params = session_params();
        let key = DigestKey::derive(params, b"determinism", 3);
        let cancel = CancelFlag::new();
        let mut first = Vec::new();
        SolveSession::new(&key, &cancel)
            .run(|t| {
                first.push(t.to_vec());
                Ok(())
            })
            .unwrap();
        let mut second = Vec::new();
        SolveSession::new(&key, &cancel)
            .run(|t| {
                second.push(t.to_vec());
                Ok(())
            })
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn pre_set_cancellation_yields_no_tuples() {
        let params = session_params();
        let key = DigestKey::derive(params, b"cancel", 0);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let mut count = 0usize;
        let status = SolveSession::new(&key, &cancel)
            .run(|_| {
                count += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(status, SolveStatus::Cancelled);
        assert_eq!(count, 0);
    }

    #[test]
    fn full_search_completes_across_nonces() {
        // Bucket occupancy fluctuates per nonce, so these searches also
        // drive the table past its initial reservation whenever a round's
        // joins outnumber its input rows.
        let params = session_params();
        let cancel = CancelFlag::new();
        for nonce in 0..32 {
            let key = DigestKey::derive(params, &[0u8; 140], nonce);
            let status = SolveSession::new(&key, &cancel).run(|_| Ok(())).unwrap();
            assert_eq!(status, SolveStatus::Exhausted);
        }
    }

    #[test]
    fn tuple_error_aborts_search() {
        let params = session_params();
        // Scan a few nonces so the search actually reaches a tuple.
        for nonce in 0..32 {
            let key = DigestKey::derive(params, &[0u8; 140], nonce);
            let cancel = CancelFlag::new();
            let result = SolveSession::new(&key, &cancel)
                .run(|_| Err(Error::Internal("stop".into())));
            match result {
                Err(Error::Internal(_)) => return,
                Ok(SolveStatus::Exhausted) => continue,
                other => panic!("unexpected outcome {other:?}"),
            }
        }
        panic!("no tuple found in 32 nonces");
    }
}
