//! Encode and recover kernels for striped shard buffers
//!
//! A stripe is one contiguous region of (n+m)·S bytes with shard i at
//! offset i·S. The kernels treat each byte offset b as an independent
//! column vector across the shards. The loop nesting (byte offset
//! outermost, then (output, input) shard pairs) is part of the output
//! contract: it keeps reads for one column adjacent across shards and
//! the inner XOR free of zero-operand branches, and it must not be
//! reordered in ways that change the produced bytes.
//!
//! The `*_prefix` variants decouple the per-shard stride from the number
//! of bytes actually processed, for callers whose live data occupies
//! only the head of each shard slot. `encode_stripe` and
//! `recover_stripe` are the work-length == stride case.

use crate::context::ErasureContext;
use crate::error::{ErasureError, Result};
use crate::galois;
use crate::matrix::{self, Matrix};

fn check_stripe(buf: &[u8], stride: usize, work_len: usize, total_shards: usize) -> Result<()> {
    if work_len > stride {
        return Err(ErasureError::WorkLengthExceedsStride { work_len, stride });
    }
    let expected = total_shards * stride;
    if buf.len() < expected {
        return Err(ErasureError::StripeTooSmall {
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

/// Compute the m parity shards from the n data shards in place.
///
/// Slots [0, n) must hold valid data; slots [n, n+m) are overwritten.
pub fn encode_stripe(buf: &mut [u8], shard_len: usize, ctx: &ErasureContext) -> Result<()> {
    encode_prefix(buf, shard_len, shard_len, ctx)
}

/// Like [`encode_stripe`], but only the first `work_len` bytes of each
/// stride-separated shard participate.
pub fn encode_prefix(
    buf: &mut [u8],
    stride: usize,
    work_len: usize,
    ctx: &ErasureContext,
) -> Result<()> {
    let n = ctx.data_shards();
    let m = ctx.parity_shards();
    check_stripe(buf, stride, work_len, n + m)?;

    let table = galois::tables();
    let f = ctx.parity_matrix();

    for b in 0..work_len {
        for p in n..n + m {
            buf[p * stride + b] = 0;
        }
        for j in 0..m {
            let row = f.row(j);
            for i in 0..n {
                buf[(n + j) * stride + b] ^=
                    table.mul_row(row[i].value())[buf[i * stride + b] as usize];
            }
        }
    }
    Ok(())
}

/// Reconstruct `recover_count` data shards in place.
///
/// `shard_map` declares, for every slot of the stripe, which logical
/// shard currently occupies it: slots [0, n) are the sources (any n
/// distinct surviving shards), and slots [n, n+recover_count) name the
/// data shards to rebuild there (their current bytes are ignored).
/// Entries past n+recover_count are not read.
///
/// Only data shards can be rebuilt; naming a parity shard as a target is
/// an invalid-argument error and leaves the buffer untouched, as does
/// every other argument failure. A duplicate source entry surfaces as
/// the singular-matrix domain error from elimination, also before any
/// byte is written.
pub fn recover_stripe(
    buf: &mut [u8],
    shard_len: usize,
    shard_map: &[usize],
    recover_count: usize,
    ctx: &ErasureContext,
) -> Result<()> {
    recover_prefix(buf, shard_len, shard_len, shard_map, recover_count, ctx)
}

/// Like [`recover_stripe`], but only the first `work_len` bytes of each
/// stride-separated shard participate.
pub fn recover_prefix(
    buf: &mut [u8],
    stride: usize,
    work_len: usize,
    shard_map: &[usize],
    recover_count: usize,
    ctx: &ErasureContext,
) -> Result<()> {
    let n = ctx.data_shards();
    let m = ctx.parity_shards();
    let total = n + m;
    check_stripe(buf, stride, work_len, total)?;

    if shard_map.len() != total {
        return Err(ErasureError::ShardMapLength {
            expected: total,
            actual: shard_map.len(),
        });
    }
    if recover_count > m {
        return Err(ErasureError::TooManyRecoverTargets {
            requested: recover_count,
            parity: m,
        });
    }
    for &shard in &shard_map[..n + recover_count] {
        if shard >= total {
            return Err(ErasureError::ShardIndexOutOfRange { shard, total });
        }
    }
    for slot in n..n + recover_count {
        let shard = shard_map[slot];
        if shard >= n {
            return Err(ErasureError::RecoverParityShard { slot, shard });
        }
    }

    let a = matrix::generate_encoding_matrix(total, n)?;

    // Gather the rows of A corresponding to the surviving sources
    let mut gathered = Matrix::new(n, n)?;
    for slot in 0..n {
        let src = shard_map[slot];
        for j in 0..n {
            gathered.set(slot, j, a.get(src, j));
        }
    }

    let mut inv = Matrix::new(n, n)?;
    matrix::gaussian_eliminate(&mut gathered, Some(&mut inv))?;

    // Row `shard` of the inverse rebuilds data shard `shard` from the
    // sources packed in slots [0, n)
    let mut coeffs = Matrix::new(recover_count, n)?;
    for t in 0..recover_count {
        let shard = shard_map[n + t];
        for j in 0..n {
            coeffs.set(t, j, inv.get(shard, j));
        }
    }

    let table = galois::tables();
    for b in 0..work_len {
        for t in 0..recover_count {
            buf[(n + t) * stride + b] = 0;
        }
        for t in 0..recover_count {
            let row = coeffs.row(t);
            for i in 0..n {
                buf[(n + t) * stride + b] ^=
                    table.mul_row(row[i].value())[buf[i * stride + b] as usize];
            }
        }
    }
    Ok(())
}
