//! Reed-Solomon erasure coding over GF(2^8) for striped shard buffers
//!
//! A stripe is one contiguous buffer of (n+m)·S bytes: n data shards
//! followed by m parity shards, shard i at byte offset i·S. Encoding
//! fills the parity slots from the data slots; recovery rebuilds up to m
//! lost data shards from any n surviving shards. Everything runs in
//! place on the caller's buffer: no I/O, no threads, no background
//! work.
//!
//! The codec itself never moves shards: recovery expects its n sources
//! packed into the first n slots, declared through a shard map. The
//! [`shuffle`] module codifies that caller-side protocol and
//! [`repair_stripe`] runs the whole lose-compact-recover-restore
//! sequence:
//!
//! ```
//! use shardec::ErasureContext;
//!
//! # fn main() -> shardec::Result<()> {
//! let ctx = ErasureContext::new(4, 2)?;
//! let mut stripe = ctx.allocate_stripe(16)?;
//! let shard_len = stripe.shard_len();
//!
//! for i in 0..4 {
//!     stripe.shard_mut(i).fill(i as u8 + 1);
//! }
//! ctx.encode(&mut stripe, shard_len)?;
//!
//! // Lose data shards 1 and 3, then rebuild them from the survivors
//! let lost: Vec<Vec<u8>> = vec![stripe.shard(1).to_vec(), stripe.shard(3).to_vec()];
//! stripe.shard_mut(1).fill(0);
//! stripe.shard_mut(3).fill(0);
//! shardec::repair_stripe(&ctx, &mut stripe, shard_len, &[1, 3])?;
//!
//! assert_eq!(stripe.shard(1), &lost[0][..]);
//! assert_eq!(stripe.shard(3), &lost[1][..]);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod context;
pub mod error;
pub mod galois;
pub mod matrix;
pub mod shuffle;

pub use context::{ErasureContext, StripeBuffer, MAX_SHARDS};
pub use error::{ErasureError, ErrorKind, Result};
pub use galois::Galois8;
pub use matrix::Matrix;
pub use shuffle::{
    compact_stripe, plan_recovery, repair_stripe, restore_order, RecoveryPlan, ShardMove,
};
