//! Elimination and the pro-rata split of the eliminated stake.

use frame_support::ensure;
use sp_runtime::{
    traits::{CheckedAdd, CheckedSub, SaturatedConversion, Saturating, Zero},
    DispatchError,
};
use sp_std::vec::Vec;
use tontine_primitives::{pro_rata_share, split_liquidation, BlockHeight, PoolId};

use crate::{pallet::*, LOG_TARGET};

impl<T: Config> Pallet<T> {
    /// Eliminate `target` and split their stake. The caller persists `pool`.
    /// Returns the hunter reward paid.
    ///
    /// Whatever the floor division leaves undistributed stays in
    /// `total_funds` as dust. The hunter reward leaves the pot last.
    pub(crate) fn liquidate(
        pool_id: PoolId,
        pool: &mut PoolOf<T>,
        target: &T::AccountId,
        hunter: Option<&T::AccountId>,
        now: BlockHeight,
    ) -> Result<T::Balance, DispatchError> {
        let asset = Self::pool_asset(pool)?;
        let mut victim = Self::active_player(pool_id, target)?;
        Self::checkpoint(pool, &mut victim, now);

        let stake = victim.stake;
        let split = split_liquidation(stake.saturated_into::<u128>(), hunter.is_some());
        let protocol_fee: T::Balance = split.protocol_fee.saturated_into();
        let hunter_reward: T::Balance = split.hunter_reward.saturated_into();
        let remainder: T::Balance = split.remainder.saturated_into();

        pool.active_count = pool.active_count.saturating_sub(1);
        pool.total_points = pool.total_points.saturating_sub(victim.points);
        victim.active = false;
        victim.points = 0;
        victim.stake = Zero::zero();
        Players::<T>::insert(pool_id, target, victim);

        let distributed = Self::distribute(pool_id, pool, remainder, now);

        let leaving = protocol_fee.checked_add(&hunter_reward).ok_or(Error::<T>::Overflow)?;
        pool.total_funds = pool.total_funds.checked_sub(&leaving).ok_or(Error::<T>::Overflow)?;
        ProtocolFees::<T>::try_mutate(asset, |fees| -> Result<(), DispatchError> {
            *fees = fees.checked_add(&protocol_fee).ok_or(Error::<T>::Overflow)?;
            Ok(())
        })?;

        if let Some(hunter) = hunter {
            if !hunter_reward.is_zero() {
                Self::pay_out(asset, hunter, hunter_reward)?;
            }
        }

        log::info!(
            target: LOG_TARGET,
            "pool {} eliminated a participant: stake {:?}, fee {:?}, reward {:?}, distributed {:?}",
            pool_id,
            stake,
            protocol_fee,
            hunter_reward,
            distributed
        );
        Self::deposit_event(Event::PlayerDied {
            pool_id,
            player: target.clone(),
            stake,
            distributed,
        });

        Ok(hunter_reward)
    }

    /// Credit `amount` to the active participants pro rata to their points.
    ///
    /// Every survivor is checkpointed before the total is read so the shares
    /// never add up to more than `amount`. Only an account's newest roster
    /// slot is credited.
    fn distribute(
        pool_id: PoolId,
        pool: &mut PoolOf<T>,
        amount: T::Balance,
        now: BlockHeight,
    ) -> T::Balance {
        let mut survivors = Vec::new();
        for slot in 0..pool.historical_count {
            let Some(who) = Roster::<T>::get(pool_id, slot) else { continue };
            if RosterIndex::<T>::get(pool_id, &who) != slot.saturating_add(1) {
                continue;
            }
            let Some(mut player) = Players::<T>::get(pool_id, &who).filter(|p| p.active) else {
                continue;
            };
            Self::checkpoint(pool, &mut player, now);
            survivors.push((who, player));
        }

        let total_points = pool.total_points;
        let amount_raw = amount.saturated_into::<u128>();
        let mut distributed = T::Balance::zero();
        for (who, mut player) in survivors {
            let share: T::Balance =
                pro_rata_share(amount_raw, player.points, total_points).saturated_into();
            player.stake = player.stake.saturating_add(share);
            distributed = distributed.saturating_add(share);
            log::debug!(target: LOG_TARGET, "pool {} credited {:?} to a survivor", pool_id, share);
            Players::<T>::insert(pool_id, &who, player);
        }

        distributed
    }

    /// Returns `(winner_found, active_count)`.
    pub fn do_liquidate_inactive(
        pool_id: PoolId,
        target: T::AccountId,
    ) -> Result<(bool, u32), DispatchError> {
        let player = Self::active_player(pool_id, &target)?;
        let mut pool = Self::pool(pool_id)?;
        let now = Self::now();
        Self::ensure_game_started(&pool, now)?;

        ensure!(
            now > player.deadline(pool.game_start_block),
            Error::<T>::DeadlineNotReached
        );
        ensure!(pool.active_count > 1, Error::<T>::LastSurvivor);

        Self::liquidate(pool_id, &mut pool, &target, None, now)?;
        Pools::<T>::insert(pool_id, &pool);

        Ok(Self::check_winner(pool_id, &pool))
    }
}
