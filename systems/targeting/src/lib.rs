#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks the block a shooter fires at next.
//!
//! Every shooter owns a [`ClaimSet`] of blocks it has already aimed at. A
//! search first drops claims that no longer resolve to a live block of the
//! shooter's color, then prefers unclaimed bottom-row blocks and finally
//! falls back to a surviving claim so in-flight shots keep converging after
//! the bottom row shifts.

use std::{collections::BTreeSet, fmt};

use blockfire_core::{BlockColor, BlockId, BlockSnapshot};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Ordered set of blocks claimed by a single shooter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimSet {
    blocks: BTreeSet<BlockId>,
}

impl ClaimSet {
    /// Creates an empty claim set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the block. Returns `false` when it was already claimed.
    pub fn claim(&mut self, block: BlockId) -> bool {
        self.blocks.insert(block)
    }

    /// Drops the claim on the block. Returns `false` when it was not claimed.
    pub fn release(&mut self, block: BlockId) -> bool {
        self.blocks.remove(&block)
    }

    /// Reports whether the block is claimed.
    #[must_use]
    pub fn contains(&self, block: BlockId) -> bool {
        self.blocks.contains(&block)
    }

    /// Removes every claim.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Keeps only the claims the predicate accepts.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(BlockId) -> bool,
    {
        self.blocks.retain(|block| keep(*block));
    }

    /// Iterator over the claimed blocks in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.iter().copied()
    }

    /// Number of claimed blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Reports whether nothing is claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Outcome of a single target search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetDecision {
    /// An unclaimed bottom-row block was claimed.
    Fresh(BlockSnapshot),
    /// No unclaimed block was available; a surviving claim was reused.
    Reclaimed(BlockSnapshot),
    /// Nothing of the shooter's color is reachable.
    NoTarget,
}

impl TargetDecision {
    /// Block the decision points at, if any.
    #[must_use]
    pub fn block(&self) -> Option<BlockSnapshot> {
        match self {
            Self::Fresh(block) | Self::Reclaimed(block) => Some(*block),
            Self::NoTarget => None,
        }
    }
}

/// Target selection policy with an injectable random source for tie-breaks.
pub struct TargetingPolicy<R> {
    rng: R,
    available: Vec<BlockSnapshot>,
    survivors: Vec<BlockSnapshot>,
}

impl TargetingPolicy<ChaCha8Rng> {
    /// Creates a policy backed by a seeded ChaCha generator.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R> TargetingPolicy<R>
where
    R: RngCore,
{
    /// Creates a policy that draws tie-breaks from the provided generator.
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            available: Vec::new(),
            survivors: Vec::new(),
        }
    }

    /// Finds the next target for a shooter of `color`.
    ///
    /// `bottom_row` lists the blocks currently resting on row zero and
    /// `lookup` resolves a claimed block to its live snapshot, returning
    /// `None` once the block has been destroyed. Claims are purged before
    /// the search so stale entries never win.
    pub fn find_target<F>(
        &mut self,
        color: BlockColor,
        claims: &mut ClaimSet,
        bottom_row: &[BlockSnapshot],
        lookup: F,
    ) -> TargetDecision
    where
        F: Fn(BlockId) -> Option<BlockSnapshot>,
    {
        self.survivors.clear();
        claims.retain(|block| match lookup(block) {
            Some(snapshot) if snapshot.color == color => {
                self.survivors.push(snapshot);
                true
            }
            _ => false,
        });

        self.available.clear();
        self.available.extend(
            bottom_row
                .iter()
                .filter(|block| block.color == color && !claims.contains(block.id))
                .copied(),
        );

        if !self.available.is_empty() {
            let pick = self.available[self.rng.gen_range(0..self.available.len())];
            let _ = claims.claim(pick.id);
            return TargetDecision::Fresh(pick);
        }

        if self.survivors.is_empty() {
            return TargetDecision::NoTarget;
        }

        let pick = self.survivors[self.rng.gen_range(0..self.survivors.len())];
        TargetDecision::Reclaimed(pick)
    }
}

impl<R> fmt::Debug for TargetingPolicy<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetingPolicy")
            .field("available", &self.available.len())
            .field("survivors", &self.survivors.len())
            .finish_non_exhaustive()
    }
}
