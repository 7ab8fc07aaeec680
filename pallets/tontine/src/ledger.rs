//! Asset movements in and out of the pool pot.

use frame_support::traits::{fungibles, tokens::Preservation};
use sp_runtime::DispatchResult;
use sp_std::marker::PhantomData;

/// The only thing the pallet needs from the asset layer: move `amount` of
/// `asset` between two accounts, or fail without moving anything.
pub trait AssetLedger<AccountId, AssetId, Balance> {
    fn transfer(asset: AssetId, from: &AccountId, to: &AccountId, amount: Balance) -> DispatchResult;
}

/// [`AssetLedger`] over any `fungibles` implementation, e.g. `pallet-assets`.
pub struct FungiblesLedger<F>(PhantomData<F>);

impl<AccountId, F>
    AssetLedger<
        AccountId,
        <F as fungibles::Inspect<AccountId>>::AssetId,
        <F as fungibles::Inspect<AccountId>>::Balance,
    > for FungiblesLedger<F>
where
    AccountId: Eq,
    F: fungibles::Mutate<AccountId>,
{
    fn transfer(
        asset: <F as fungibles::Inspect<AccountId>>::AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: <F as fungibles::Inspect<AccountId>>::Balance,
    ) -> DispatchResult {
        <F as fungibles::Mutate<AccountId>>::transfer(
            asset,
            from,
            to,
            amount,
            Preservation::Expendable,
        )
        .map(|_| ())
    }
}
