//! Pool lifecycle: opening pools, phase preconditions, winner check and payout.

use frame_support::{ensure, traits::Get};
use sp_runtime::{
    traits::{AccountIdConversion, SaturatedConversion, Zero},
    DispatchError, DispatchResult,
};
use tontine_primitives::{BlockHeight, PoolId};

use crate::{
    ledger::AssetLedger,
    pallet::*,
    types::PoolRecord,
    LOG_TARGET,
};

impl<T: Config> Pallet<T> {
    /// Account holding the stakes of every pool.
    pub fn pot_account() -> T::AccountId {
        T::PalletId::get().into_account_truncating()
    }

    pub(crate) fn now() -> BlockHeight {
        frame_system::Pallet::<T>::block_number().saturated_into::<BlockHeight>()
    }

    pub(crate) fn open_pool(pool_id: PoolId) {
        Pools::<T>::insert(pool_id, PoolRecord::open());
        Self::deposit_event(Event::PoolCreated { pool_id });
        log::info!(target: LOG_TARGET, "pool {} open for joins", pool_id);
    }

    pub(crate) fn pool(pool_id: PoolId) -> Result<PoolOf<T>, DispatchError> {
        Pools::<T>::get(pool_id).ok_or_else(|| Error::<T>::UnknownPool.into())
    }

    pub(crate) fn active_player(
        pool_id: PoolId,
        who: &T::AccountId,
    ) -> Result<PlayerOf<T>, DispatchError> {
        Players::<T>::get(pool_id, who)
            .filter(|p| p.active)
            .ok_or_else(|| Error::<T>::NotActive.into())
    }

    /// Pings, hunts and liquidations need the countdown to be over.
    pub(crate) fn ensure_game_started(pool: &PoolOf<T>, now: BlockHeight) -> DispatchResult {
        ensure!(pool.started, Error::<T>::GameNotStarted);
        ensure!(now >= pool.game_start_block, Error::<T>::WaitingPeriodNotOver);
        Ok(())
    }

    /// Asset fixed by the first join. A pool nobody joined has none.
    pub(crate) fn pool_asset(pool: &PoolOf<T>) -> Result<T::AssetId, DispatchError> {
        pool.asset.ok_or_else(|| Error::<T>::UnknownPool.into())
    }

    /// Pull `amount` from `from` into the pot.
    pub(crate) fn collect(asset: T::AssetId, from: &T::AccountId, amount: T::Balance) -> DispatchResult {
        T::Assets::transfer(asset, from, &Self::pot_account(), amount).map_err(|e| {
            log::warn!(target: LOG_TARGET, "stake transfer into the pot rejected: {:?}", e);
            Error::<T>::AssetTransferFailed.into()
        })
    }

    /// Pay `amount` from the pot to `to`.
    pub(crate) fn pay_out(asset: T::AssetId, to: &T::AccountId, amount: T::Balance) -> DispatchResult {
        T::Assets::transfer(asset, &Self::pot_account(), to, amount).map_err(|e| {
            log::warn!(target: LOG_TARGET, "payout from the pot rejected: {:?}", e);
            Error::<T>::AssetTransferFailed.into()
        })
    }

    /// `(winner_found, active_count)` after a liquidation. The survivor still
    /// has to call `claim_win`.
    pub(crate) fn check_winner(pool_id: PoolId, pool: &PoolOf<T>) -> (bool, u32) {
        let winner_found = pool.active_count == 1;
        if winner_found {
            Self::deposit_event(Event::LastSurvivorStanding { pool_id });
            log::info!(target: LOG_TARGET, "pool {} down to its last survivor", pool_id);
        }
        (winner_found, pool.active_count)
    }

    pub fn do_claim_win(who: T::AccountId, pool_id: PoolId) -> Result<T::Balance, DispatchError> {
        let mut player = Self::active_player(pool_id, &who)?;
        let mut pool = Self::pool(pool_id)?;
        ensure!(pool.started && pool.active_count == 1, Error::<T>::GameNotOver);

        let asset = Self::pool_asset(&pool)?;
        let prize = pool.total_funds;

        player.active = false;
        player.points = 0;
        player.stake = Zero::zero();
        Players::<T>::insert(pool_id, &who, player);

        pool.active_count = 0;
        pool.total_funds = Zero::zero();
        pool.total_points = 0;
        pool.winner = Some(who.clone());
        Pools::<T>::insert(pool_id, pool);

        let next = CurrentPoolId::<T>::get().saturating_add(1);
        CurrentPoolId::<T>::put(next);
        Self::open_pool(next);

        if !prize.is_zero() {
            Self::pay_out(asset, &who, prize)?;
        }

        Self::deposit_event(Event::GameWon { pool_id, winner: who, prize });
        log::info!(target: LOG_TARGET, "pool {} won, prize {:?}", pool_id, prize);

        Ok(prize)
    }
}
