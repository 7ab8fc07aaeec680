//! Manual hunts: declaration and resolution after the one-block escape window.

use frame_support::ensure;
use sp_runtime::{
    traits::{SaturatedConversion, Saturating},
    DispatchError,
};
use tontine_primitives::{hunt_penalty, hunting_open, BlockHeight, PoolId};

use crate::{pallet::*, types::HuntRecord, LOG_TARGET};

impl<T: Config> Pallet<T> {
    /// Returns the last block at which the target may still ping.
    pub fn do_declare_hunt(
        hunter: T::AccountId,
        pool_id: PoolId,
        target: T::AccountId,
    ) -> Result<BlockHeight, DispatchError> {
        let hunter_record = Self::active_player(pool_id, &hunter)?;
        let pool = Self::pool(pool_id)?;
        let now = Self::now();
        Self::ensure_game_started(&pool, now)?;

        ensure!(hunting_open(pool.game_start_block, now), Error::<T>::HuntingNotOpen);
        ensure!(pool.bullets_left > 0, Error::<T>::NoBulletsLeft);
        ensure!(!hunter_record.used_bullet, Error::<T>::BulletAlreadyUsed);
        Self::active_player(pool_id, &target)?;
        ensure!(
            !Hunts::<T>::get(pool_id).map_or(false, |h| h.active),
            Error::<T>::HuntAlreadyInProgress
        );
        ensure!(hunter != target, Error::<T>::SelfTarget);

        let hunt = HuntRecord {
            active: true,
            hunter: hunter.clone(),
            target: target.clone(),
            start_block: now,
            hunter_slot: RosterIndex::<T>::get(pool_id, &hunter),
            target_slot: RosterIndex::<T>::get(pool_id, &target),
        };
        let window_end = hunt.window_end();
        Hunts::<T>::insert(pool_id, hunt);

        log::info!(
            target: LOG_TARGET,
            "pool {} hunt declared at {}, escape window ends {}",
            pool_id,
            now,
            window_end
        );
        Self::deposit_event(Event::HuntDeclared { pool_id, hunter, target, window_end });

        Ok(window_end)
    }

    /// Settle the pool's hunt. Returns `true` when the target was eliminated.
    ///
    /// The hunter's bullet is spent whatever the outcome. Only a success
    /// consumes one of the pool's bullets.
    pub fn do_resolve_hunt(pool_id: PoolId) -> Result<bool, DispatchError> {
        let mut hunt = Hunts::<T>::get(pool_id)
            .filter(|h| h.active)
            .ok_or(Error::<T>::NoActiveHunt)?;
        let now = Self::now();
        ensure!(now > hunt.window_end(), Error::<T>::HuntWindowStillOpen);

        hunt.active = false;
        Hunts::<T>::insert(pool_id, hunt.clone());
        let HuntRecord { hunter, target, start_block, hunter_slot, target_slot, .. } = hunt;

        let mut hunter_record = Players::<T>::get(pool_id, &hunter).ok_or(Error::<T>::NotActive)?;
        hunter_record.used_bullet = true;

        // either side eliminated by a timeout since the declaration, whether
        // or not they joined again afterwards
        let same_life = |who: &T::AccountId, slot: u32| RosterIndex::<T>::get(pool_id, who) == slot;
        let hunter_alive = hunter_record.active && same_life(&hunter, hunter_slot);
        let target_record = match Players::<T>::get(pool_id, &target)
            .filter(|p| p.active && same_life(&target, target_slot))
        {
            Some(record) if hunter_alive => record,
            _ => {
                Players::<T>::insert(pool_id, &hunter, hunter_record);
                log::info!(target: LOG_TARGET, "pool {} hunt voided, a side is already gone", pool_id);
                Self::deposit_event(Event::HuntVoided { pool_id, hunter, target });
                return Ok(false);
            },
        };

        // any ping after the declaring block counts as an escape
        if target_record.last_ping_block > start_block {
            let penalty: T::Balance =
                hunt_penalty(hunter_record.stake.saturated_into::<u128>()).saturated_into();
            let mut target_record = target_record;
            hunter_record.stake = hunter_record.stake.saturating_sub(penalty);
            target_record.stake = target_record.stake.saturating_add(penalty);
            Players::<T>::insert(pool_id, &hunter, hunter_record);
            Players::<T>::insert(pool_id, &target, target_record);

            log::info!(target: LOG_TARGET, "pool {} hunt failed, penalty {:?}", pool_id, penalty);
            Self::deposit_event(Event::HuntFailed { pool_id, hunter, target, penalty });
            return Ok(false);
        }

        Players::<T>::insert(pool_id, &hunter, hunter_record);

        let mut pool = Self::pool(pool_id)?;
        pool.bullets_left = pool.bullets_left.saturating_sub(1);
        let reward = Self::liquidate(pool_id, &mut pool, &target, Some(&hunter), now)?;
        Pools::<T>::insert(pool_id, &pool);

        Self::deposit_event(Event::HuntSuccess {
            pool_id,
            hunter,
            target,
            reward,
        });
        Self::check_winner(pool_id, &pool);

        Ok(true)
    }
}
