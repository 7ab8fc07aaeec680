//! Admission, pings and the lazy points checkpoint.

use frame_support::{ensure, traits::Get};
use sp_runtime::{traits::CheckedAdd, DispatchError};
use tontine_primitives::{
    current_interval, BlockHeight, PoolId, POOL_BULLETS, POOL_MAX_HISTORICAL, POOL_MIN_START,
    START_WAIT_BLOCKS,
};

use crate::{pallet::*, types::PlayerRecord, LOG_TARGET};

impl<T: Config> Pallet<T> {
    /// Credit `player` with the blocks survived up to `now` and mirror the
    /// credit in the pool total. Must run before points are read.
    pub(crate) fn checkpoint(pool: &mut PoolOf<T>, player: &mut PlayerOf<T>, now: BlockHeight) {
        let earned = player.checkpoint(now);
        pool.total_points = pool.total_points.saturating_add(earned);
    }

    /// Returns `(pool_id, historical_count)` after admission.
    pub fn do_join(who: T::AccountId, asset: T::AssetId) -> Result<(PoolId, u32), DispatchError> {
        let pool_id = CurrentPoolId::<T>::get();
        let mut pool = Self::pool(pool_id)?;

        ensure!(pool.historical_count < POOL_MAX_HISTORICAL, Error::<T>::PoolFull);
        let previous = Players::<T>::get(pool_id, &who);
        ensure!(
            !previous.as_ref().map_or(false, |p| p.active),
            Error::<T>::AlreadyActive
        );
        if let Some(fixed) = pool.asset {
            ensure!(fixed == asset, Error::<T>::AssetMismatch);
        }

        let stake = T::EntryStake::get();
        Self::collect(asset, &who, stake)?;

        let now = Self::now();
        // a bullet spent in an earlier life stays spent
        let used_bullet = previous.map_or(false, |p| p.used_bullet);
        Players::<T>::insert(pool_id, &who, PlayerRecord::admit(now, stake, used_bullet));

        let slot = pool.historical_count;
        Roster::<T>::insert(pool_id, slot, &who);
        RosterIndex::<T>::insert(pool_id, &who, slot.saturating_add(1));

        if pool.historical_count == 0 {
            pool.asset = Some(asset);
            pool.bullets_left = POOL_BULLETS;
        }
        pool.historical_count = pool.historical_count.saturating_add(1);
        pool.active_count = pool.active_count.saturating_add(1);
        pool.total_funds = pool
            .total_funds
            .checked_add(&stake)
            .ok_or(Error::<T>::Overflow)?;

        if !pool.started && pool.historical_count == POOL_MIN_START {
            pool.started = true;
            pool.start_block = now;
            pool.game_start_block = now.saturating_add(START_WAIT_BLOCKS);
            Self::deposit_event(Event::GameStarted {
                pool_id,
                game_start_block: pool.game_start_block,
            });
            log::info!(
                target: LOG_TARGET,
                "pool {} reached {} players, deadlines enforced from block {}",
                pool_id,
                POOL_MIN_START,
                pool.game_start_block
            );
        }

        let historical_count = pool.historical_count;
        Pools::<T>::insert(pool_id, pool);

        Self::deposit_event(Event::PlayerJoined { pool_id, player: who, historical_count });

        Ok((pool_id, historical_count))
    }

    /// Returns `(next_deadline, next_interval)`.
    ///
    /// The deadline being checked comes from the interval in force at the
    /// previous ping; the new one from the interval in force now.
    pub fn do_ping(who: T::AccountId, pool_id: PoolId) -> Result<(BlockHeight, u64), DispatchError> {
        let mut player = Self::active_player(pool_id, &who)?;
        let mut pool = Self::pool(pool_id)?;
        let now = Self::now();
        Self::ensure_game_started(&pool, now)?;

        Self::checkpoint(&mut pool, &mut player, now);
        ensure!(
            now <= player.deadline(pool.game_start_block),
            Error::<T>::PingWindowExpired
        );

        player.last_ping_block = now;
        let next_interval = current_interval(pool.game_start_block, now);
        let next_deadline = now.saturating_add(next_interval);

        Players::<T>::insert(pool_id, &who, player);
        Pools::<T>::insert(pool_id, pool);

        log::debug!(
            target: LOG_TARGET,
            "pool {} ping at {}, next deadline {}",
            pool_id,
            now,
            next_deadline
        );
        Self::deposit_event(Event::PlayerPinged { pool_id, player: who, next_deadline });

        Ok((next_deadline, next_interval))
    }
}
