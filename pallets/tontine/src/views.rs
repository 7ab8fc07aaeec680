//! Read-only projections for front-ends. Nothing here writes storage.

use tontine_primitives::{hunting_open, PoolId, PoolPhase};

use crate::{
    pallet::*,
    types::{HuntInfo, PlayerInfo, PoolInfo},
};

impl<T: Config> Pallet<T> {
    pub fn pool_info(pool_id: PoolId) -> Option<PoolInfo<T::AccountId, T::AssetId, T::Balance>> {
        let pool = Pools::<T>::get(pool_id)?;
        let now = Self::now();
        Some(PoolInfo {
            pool_id,
            phase: pool.phase(now),
            historical_count: pool.historical_count,
            active_count: pool.active_count,
            start_block: pool.start_block,
            game_start_block: pool.game_start_block,
            started: pool.started,
            bullets_left: pool.bullets_left,
            total_funds: pool.total_funds,
            total_points: pool.total_points,
            asset: pool.asset,
            current_interval: pool.interval_at(now),
            hunting_open: pool.started && hunting_open(pool.game_start_block, now),
            hunt_active: Hunts::<T>::get(pool_id).map_or(false, |h| h.active),
            winner: pool.winner,
            now,
        })
    }

    /// Live view of one participant. Points include blocks not yet checkpointed.
    pub fn player_info(pool_id: PoolId, who: &T::AccountId) -> Option<PlayerInfo<T::Balance>> {
        let player = Players::<T>::get(pool_id, who)?;
        let pool = Pools::<T>::get(pool_id)?;
        let now = Self::now();

        let deadline = player
            .last_ping_block
            .saturating_add(pool.interval_at(player.last_ping_block));
        let next_interval = pool.interval_at(now);
        Some(PlayerInfo {
            active: player.active,
            stake: player.stake,
            points: player.live_points(now),
            entry_block: player.entry_block,
            last_ping_block: player.last_ping_block,
            deadline,
            blocks_left: deadline.saturating_sub(now),
            expired: player.active && pool.phase(now) == PoolPhase::Active && now > deadline,
            used_bullet: player.used_bullet,
            next_deadline: now.saturating_add(next_interval),
            next_interval,
            now,
        })
    }

    pub fn hunt_info(pool_id: PoolId) -> Option<HuntInfo<T::AccountId>> {
        let hunt = Hunts::<T>::get(pool_id)?;
        let window_end = hunt.window_end();
        let resolvable = hunt.active && Self::now() > window_end;
        Some(HuntInfo {
            active: hunt.active,
            window_end,
            resolvable,
            start_block: hunt.start_block,
            hunter: hunt.hunter,
            target: hunt.target,
        })
    }

    pub fn pool_phase(pool_id: PoolId) -> Option<PoolPhase> {
        Pools::<T>::get(pool_id).map(|pool| pool.phase(Self::now()))
    }

    /// Protocol fees retained in the pot for `asset`.
    pub fn protocol_fees(asset: T::AssetId) -> T::Balance {
        ProtocolFees::<T>::get(asset)
    }
}
