//! Records kept in storage and the read-only views built from them.

use codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use sp_runtime::{traits::Zero, RuntimeDebug};
use tontine_primitives::{
    current_interval, deadline, points_earned, BlockHeight, PoolId, PoolPhase, Points,
    HUNT_WINDOW_BLOCKS, INITIAL_INTERVAL, POOL_BULLETS,
};

/// Aggregate state of one pool.
#[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct PoolRecord<AccountId, AssetId, Balance> {
    /// Participants ever admitted, never decreases
    pub historical_count: u32,
    /// Participants still alive
    pub active_count: u32,
    /// Block of the join that reached `POOL_MIN_START`
    pub start_block: BlockHeight,
    /// `start_block + START_WAIT_BLOCKS`
    pub game_start_block: BlockHeight,
    pub started: bool,
    /// Successful hunts still allowed
    pub bullets_left: u32,
    /// Stake held for this pool's participants, including rounding dust
    pub total_funds: Balance,
    /// Fixed by the first join
    pub asset: Option<AssetId>,
    /// Sum of the checkpointed points of active participants
    pub total_points: Points,
    /// Set once the sole survivor claims
    pub winner: Option<AccountId>,
}

impl<AccountId, AssetId, Balance: Zero> PoolRecord<AccountId, AssetId, Balance> {
    /// A fresh pool in the collecting phase.
    pub fn open() -> Self {
        Self {
            historical_count: 0,
            active_count: 0,
            start_block: 0,
            game_start_block: 0,
            started: false,
            bullets_left: POOL_BULLETS,
            total_funds: Zero::zero(),
            asset: None,
            total_points: 0,
            winner: None,
        }
    }
}

impl<AccountId, AssetId, Balance> PoolRecord<AccountId, AssetId, Balance> {
    pub fn phase(&self, now: BlockHeight) -> PoolPhase {
        if self.winner.is_some() {
            PoolPhase::Won
        } else if !self.started {
            PoolPhase::Collecting
        } else if now < self.game_start_block {
            PoolPhase::Waiting
        } else {
            PoolPhase::Active
        }
    }

    /// Interval a participant pinging at `at` would get. Full length until the game starts.
    pub fn interval_at(&self, at: BlockHeight) -> u64 {
        if self.started {
            current_interval(self.game_start_block, at)
        } else {
            INITIAL_INTERVAL
        }
    }
}

/// One participant inside one pool.
#[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct PlayerRecord<Balance> {
    pub active: bool,
    pub entry_block: BlockHeight,
    pub last_ping_block: BlockHeight,
    pub points_updated_block: BlockHeight,
    /// Checkpointed score, see [`PlayerRecord::checkpoint`]
    pub points: Points,
    /// Spent on the participant's one hunt, win or lose
    pub used_bullet: bool,
    /// Current claim on the pool funds
    pub stake: Balance,
}

impl<Balance> PlayerRecord<Balance> {
    pub fn admit(now: BlockHeight, stake: Balance, used_bullet: bool) -> Self {
        Self {
            active: true,
            entry_block: now,
            last_ping_block: now,
            points_updated_block: now,
            points: 0,
            used_bullet,
            stake,
        }
    }

    /// Credit the blocks survived since the last checkpoint and move the
    /// checkpoint to `now`. Returns the points credited, which the caller must
    /// add to the pool total. A second call at the same `now` credits nothing.
    pub fn checkpoint(&mut self, now: BlockHeight) -> Points {
        let earned = points_earned(self.points_updated_block, now);
        self.points = self.points.saturating_add(earned);
        self.points_updated_block = now;
        earned
    }

    /// Points the participant would hold if checkpointed at `now`.
    pub fn live_points(&self, now: BlockHeight) -> Points {
        if self.active {
            self.points.saturating_add(points_earned(self.points_updated_block, now))
        } else {
            self.points
        }
    }

    pub fn deadline(&self, game_start: BlockHeight) -> BlockHeight {
        deadline(game_start, self.last_ping_block)
    }
}

/// The single hunt slot of a pool. Kept after resolution with `active = false`.
#[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct HuntRecord<AccountId> {
    pub active: bool,
    pub hunter: AccountId,
    pub target: AccountId,
    pub start_block: BlockHeight,
    /// `RosterIndex` of each side at declaration. A different index at
    /// resolution means that side was eliminated and admitted again.
    pub hunter_slot: u32,
    pub target_slot: u32,
}

impl<AccountId> HuntRecord<AccountId> {
    /// Last block of the escape window `[start_block, start_block + 1]`.
    pub fn window_end(&self) -> BlockHeight {
        self.start_block.saturating_add(HUNT_WINDOW_BLOCKS)
    }
}

#[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo)]
pub struct PoolInfo<AccountId, AssetId, Balance> {
    pub pool_id: PoolId,
    pub phase: PoolPhase,
    pub historical_count: u32,
    pub active_count: u32,
    pub start_block: BlockHeight,
    pub game_start_block: BlockHeight,
    pub started: bool,
    pub bullets_left: u32,
    pub total_funds: Balance,
    pub total_points: Points,
    pub asset: Option<AssetId>,
    pub winner: Option<AccountId>,
    /// Interval granted to a ping made now
    pub current_interval: u64,
    pub hunting_open: bool,
    pub hunt_active: bool,
    pub now: BlockHeight,
}

#[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo)]
pub struct PlayerInfo<Balance> {
    pub active: bool,
    pub stake: Balance,
    /// Live estimate, not checkpointed
    pub points: Points,
    pub entry_block: BlockHeight,
    pub last_ping_block: BlockHeight,
    pub deadline: BlockHeight,
    pub blocks_left: u64,
    pub expired: bool,
    pub used_bullet: bool,
    /// Deadline a ping made now would set
    pub next_deadline: BlockHeight,
    pub next_interval: u64,
    pub now: BlockHeight,
}

#[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo)]
pub struct HuntInfo<AccountId> {
    pub active: bool,
    pub hunter: AccountId,
    pub target: AccountId,
    pub start_block: BlockHeight,
    pub window_end: BlockHeight,
    /// Window closed, `resolve_hunt` may be called
    pub resolvable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_is_idempotent_at_same_block() {
        let mut p = PlayerRecord::<u128>::admit(10, 5, false);
        assert_eq!(p.checkpoint(25), 15);
        assert_eq!(p.points, 15);
        assert_eq!(p.checkpoint(25), 0);
        assert_eq!(p.points, 15);
        assert_eq!(p.points_updated_block, 25);
    }

    #[test]
    fn live_points_freeze_when_inactive() {
        let mut p = PlayerRecord::<u128>::admit(0, 5, false);
        assert_eq!(p.live_points(40), 40);
        p.active = false;
        assert_eq!(p.live_points(40), 0);
    }

    #[test]
    fn phase_follows_flags() {
        let mut pool = PoolRecord::<u64, u32, u128>::open();
        assert_eq!(pool.bullets_left, POOL_BULLETS);
        assert_eq!(pool.phase(1), PoolPhase::Collecting);
        pool.started = true;
        pool.game_start_block = 150;
        assert_eq!(pool.phase(149), PoolPhase::Waiting);
        assert_eq!(pool.phase(150), PoolPhase::Active);
        pool.winner = Some(7);
        assert_eq!(pool.phase(150), PoolPhase::Won);
    }
}
