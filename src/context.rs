//! Context object bundling shard geometry and the parity matrix
//!
//! An [`ErasureContext`] is created once per (n, m) geometry and reused
//! for every stripe. It owns the m×n parity matrix F; the field tables
//! are process-wide and shared. Teardown is `Drop`; nothing else may
//! free F. A context is immutable after creation, so distinct stripes
//! can be processed with the same context from different threads as long
//! as each call owns its buffer.

use log::debug;

use crate::codec;
use crate::error::{ErasureError, Result};
use crate::galois;
use crate::matrix::{self, Matrix};

/// Ceiling on n + m: the Vandermonde seed uses the shard index as a
/// field element, so a stripe cannot have more shards than the field
/// has elements.
pub const MAX_SHARDS: usize = galois::FIELD_SIZE;

const MIN_DATA_SHARDS: usize = 2;
const MIN_PARITY_SHARDS: usize = 2;

/// Immutable handle for one erasure-coding geometry
#[derive(Debug)]
pub struct ErasureContext {
    data_shards: usize,
    parity_shards: usize,
    parity_matrix: Matrix,
}

impl ErasureContext {
    /// Build a context for `data_shards` data and `parity_shards` parity
    /// shards.
    ///
    /// Requires at least 2 of each and at most [`MAX_SHARDS`] in total.
    /// Initializes the process-wide field tables on first use and builds
    /// the parity matrix. On failure nothing is left behind.
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
        if data_shards < MIN_DATA_SHARDS
            || parity_shards < MIN_PARITY_SHARDS
            || data_shards + parity_shards > MAX_SHARDS
        {
            return Err(ErasureError::ShardCountOutOfRange {
                data: data_shards,
                parity: parity_shards,
            });
        }

        galois::tables();
        let parity_matrix = matrix::generate_parity_matrix(parity_shards, data_shards)?;
        debug!("erasure context ready: {data_shards} data + {parity_shards} parity shards");

        Ok(ErasureContext {
            data_shards,
            parity_shards,
            parity_matrix,
        })
    }

    #[inline]
    pub fn data_shards(&self) -> usize {
        self.data_shards
    }

    #[inline]
    pub fn parity_shards(&self) -> usize {
        self.parity_shards
    }

    #[inline]
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// The m×n parity matrix F
    #[inline]
    pub fn parity_matrix(&self) -> &Matrix {
        &self.parity_matrix
    }

    /// Total stripe length for a given per-shard length
    #[inline]
    pub fn stripe_len(&self, shard_len: usize) -> usize {
        self.total_shards() * shard_len
    }

    /// Allocate a zeroed stripe buffer for this geometry.
    ///
    /// The shard length is rounded up to the next odd value (odd strides
    /// keep the column walk clear of power-of-two cache aliasing), so the
    /// effective length can exceed the request by one byte. Read it back
    /// from [`StripeBuffer::shard_len`].
    pub fn allocate_stripe(&self, requested_len: usize) -> Result<StripeBuffer> {
        let shard_len = if requested_len % 2 == 0 {
            requested_len + 1
        } else {
            requested_len
        };

        let bytes = self.total_shards() * shard_len;
        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| ErasureError::OutOfMemory { bytes })?;
        data.resize(bytes, 0);

        Ok(StripeBuffer { data, shard_len })
    }

    /// Overwrite the parity slots of `buf` from its data slots.
    pub fn encode(&self, buf: &mut [u8], shard_len: usize) -> Result<()> {
        codec::encode_stripe(buf, shard_len, self)
    }

    /// [`encode`](Self::encode) restricted to the first `work_len` bytes
    /// of each stride-separated shard.
    pub fn encode_prefix(&self, buf: &mut [u8], stride: usize, work_len: usize) -> Result<()> {
        codec::encode_prefix(buf, stride, work_len, self)
    }

    /// Rebuild `recover_count` data shards into slots [n, n+recover_count)
    /// from the sources packed in slots [0, n), as declared by `shard_map`.
    pub fn recover(
        &self,
        buf: &mut [u8],
        shard_len: usize,
        shard_map: &[usize],
        recover_count: usize,
    ) -> Result<()> {
        codec::recover_stripe(buf, shard_len, shard_map, recover_count, self)
    }

    /// [`recover`](Self::recover) restricted to the first `work_len`
    /// bytes of each stride-separated shard.
    pub fn recover_prefix(
        &self,
        buf: &mut [u8],
        stride: usize,
        work_len: usize,
        shard_map: &[usize],
        recover_count: usize,
    ) -> Result<()> {
        codec::recover_prefix(buf, stride, work_len, shard_map, recover_count, self)
    }
}

/// Owned stripe allocation with per-shard views
///
/// Returned by [`ErasureContext::allocate_stripe`]; freed by `Drop`.
pub struct StripeBuffer {
    data: Vec<u8>,
    shard_len: usize,
}

impl StripeBuffer {
    /// The effective per-shard length actually allocated
    #[inline]
    pub fn shard_len(&self) -> usize {
        self.shard_len
    }

    /// Number of shard slots in the buffer
    #[inline]
    pub fn shard_count(&self) -> usize {
        self.data.len() / self.shard_len
    }

    /// Borrow shard `index`
    pub fn shard(&self, index: usize) -> &[u8] {
        let start = index * self.shard_len;
        &self.data[start..start + self.shard_len]
    }

    /// Mutably borrow shard `index`
    pub fn shard_mut(&mut self, index: usize) -> &mut [u8] {
        let start = index * self.shard_len;
        &mut self.data[start..start + self.shard_len]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl std::ops::Deref for StripeBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl std::ops::DerefMut for StripeBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}
