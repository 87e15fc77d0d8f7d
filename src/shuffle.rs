//! Caller-side shard compaction around recovery
//!
//! The recover kernels read their n sources from slots [0, n) and write
//! reconstructed shards starting at slot n; they never move shards
//! themselves. A caller who lost an arbitrary subset of shards therefore
//! compacts survivors into the source slots first. This module codifies
//! that protocol as data plus three in-place steps:
//!
//! 1. [`plan_recovery`] classifies shards and produces a [`RecoveryPlan`]:
//!    the shard map, the number of shards to rebuild, and the minimal
//!    slot moves. Every surviving data shard stays where it is and only
//!    parity survivors are copied into the holes, so the common case of
//!    few losses moves almost nothing.
//! 2. [`compact_stripe`] performs the moves.
//! 3. After [`ErasureContext::recover`], [`restore_order`] copies each
//!    rebuilt shard from its recovery slot back to its logical slot.
//!
//! [`repair_stripe`] runs the whole sequence. Parity slots used as
//! recovery targets hold rebuilt data afterwards, and their parity
//! content is gone either way once the stripe is damaged; re-encode the
//! stripe if the parity shards are still wanted.

use log::debug;
use rustc_hash::FxHashSet;

use crate::context::ErasureContext;
use crate::error::{ErasureError, Result};

/// One slot-to-slot copy of `shard_len` bytes within a stripe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardMove {
    pub from_slot: usize,
    pub to_slot: usize,
}

/// Everything needed to drive one recovery: shard map, rebuild count,
/// and the compaction moves
#[derive(Debug, Clone)]
pub struct RecoveryPlan {
    data_shards: usize,
    shard_map: Vec<usize>,
    recover_count: usize,
    moves: Vec<ShardMove>,
}

impl RecoveryPlan {
    /// The stripe-wide identity map to hand to
    /// [`ErasureContext::recover`]
    pub fn shard_map(&self) -> &[usize] {
        &self.shard_map
    }

    /// How many data shards the plan rebuilds
    pub fn recover_count(&self) -> usize {
        self.recover_count
    }

    /// The compaction copies, all parity-slot → data-slot
    pub fn moves(&self) -> &[ShardMove] {
        &self.moves
    }

    /// True when no data shard was lost and recovery has nothing to do
    pub fn is_noop(&self) -> bool {
        self.recover_count == 0
    }
}

/// Classify a failure pattern and produce the recovery plan.
///
/// `failed` lists the lost shard indices (data or parity, duplicates
/// tolerated). Lost parity shards merely shrink the source pool; only
/// lost data shards are rebuilt. Fails when fewer than n shards survive.
pub fn plan_recovery(ctx: &ErasureContext, failed: &[usize]) -> Result<RecoveryPlan> {
    let n = ctx.data_shards();
    let total = ctx.total_shards();

    for &shard in failed {
        if shard >= total {
            return Err(ErasureError::ShardIndexOutOfRange { shard, total });
        }
    }
    let failed: FxHashSet<usize> = failed.iter().copied().collect();

    let good = total - failed.len();
    if good < n {
        return Err(ErasureError::NotEnoughShards { good, needed: n });
    }

    let holes: Vec<usize> = (0..n).filter(|i| failed.contains(i)).collect();
    let surviving_parity: Vec<usize> = (n..total).filter(|i| !failed.contains(i)).collect();
    // good >= n guarantees surviving_parity covers the holes

    let mut shard_map: Vec<usize> = (0..n).collect();
    let mut moves = Vec::with_capacity(holes.len());
    for (&hole, &parity) in holes.iter().zip(&surviving_parity) {
        shard_map[hole] = parity;
        moves.push(ShardMove {
            from_slot: parity,
            to_slot: hole,
        });
    }

    // Recovery targets, then whatever shards the map has not placed yet
    shard_map.extend_from_slice(&holes);
    let placed: FxHashSet<usize> = shard_map.iter().copied().collect();
    shard_map.extend((0..total).filter(|i| !placed.contains(i)));

    debug!(
        "recovery plan: {} lost, {} data shards to rebuild, {} moves",
        failed.len(),
        holes.len(),
        moves.len()
    );

    Ok(RecoveryPlan {
        data_shards: n,
        shard_map,
        recover_count: holes.len(),
        moves,
    })
}

/// Execute the plan's moves, packing the n sources into slots [0, n).
pub fn compact_stripe(buf: &mut [u8], shard_len: usize, plan: &RecoveryPlan) -> Result<()> {
    check_len(buf, shard_len, plan)?;
    for mv in &plan.moves {
        let src = mv.from_slot * shard_len;
        buf.copy_within(src..src + shard_len, mv.to_slot * shard_len);
    }
    Ok(())
}

/// Copy each rebuilt shard from its recovery slot back to its logical
/// slot, returning the data region to logical order.
pub fn restore_order(buf: &mut [u8], shard_len: usize, plan: &RecoveryPlan) -> Result<()> {
    check_len(buf, shard_len, plan)?;
    let n = plan.data_shards;
    for t in 0..plan.recover_count {
        let shard = plan.shard_map[n + t];
        let src = (n + t) * shard_len;
        buf.copy_within(src..src + shard_len, shard * shard_len);
    }
    Ok(())
}

/// Plan, compact, recover, and restore in one call.
///
/// Returns the plan so callers can inspect what was rebuilt. Lost parity
/// shards are left lost; re-encode to rebuild them.
pub fn repair_stripe(
    ctx: &ErasureContext,
    buf: &mut [u8],
    shard_len: usize,
    failed: &[usize],
) -> Result<RecoveryPlan> {
    let plan = plan_recovery(ctx, failed)?;
    compact_stripe(buf, shard_len, &plan)?;
    if !plan.is_noop() {
        ctx.recover(buf, shard_len, plan.shard_map(), plan.recover_count())?;
        restore_order(buf, shard_len, &plan)?;
    }
    Ok(plan)
}

fn check_len(buf: &[u8], shard_len: usize, plan: &RecoveryPlan) -> Result<()> {
    let expected = plan.shard_map.len() * shard_len;
    if buf.len() < expected {
        return Err(ErasureError::StripeTooSmall {
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}
