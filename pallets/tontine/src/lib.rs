//! # Tontine Pallet
//!
//! Survival pools. Every participant locks the same stake in the open pool.
//! The 5th join starts a 24h countdown, after which each participant must
//! ping before a deadline that shrinks day by day. Anyone may eliminate a
//! participant who missed their deadline. Late in the game participants may
//! spend their one bullet on a hunt: the target has one block to ping and
//! escape.
//!
//! ## Money flow:
//! - Join: entry stake moves from the player into the pallet pot
//! - Elimination: 0.3% protocol fee stays in the pot, 10% goes to the hunter
//!   (manual hunts only), the rest is credited to the survivors' stakes in
//!   proportion to their points (blocks survived)
//! - Failed hunt: hunter pays 5% of their stake to the target
//! - Win: the last survivor takes the whole pool and a new pool opens
//!
//! ## Rules:
//! - Max 50 participants ever admitted per pool
//! - 3 successful hunts per pool, 1 bullet per participant
//! - No admin, no governance, no parameter changes

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;

pub mod ledger;
pub mod types;

mod distribution;
mod hunt;
mod players;
mod registry;
mod views;


pub(crate) const LOG_TARGET: &str = "runtime::tontine";

#[frame_support::pallet]
pub mod pallet {
    use frame_support::{pallet_prelude::*, PalletId};
    use frame_system::pallet_prelude::*;
    use sp_runtime::traits::AtLeast32BitUnsigned;
    use tontine_primitives::{BlockHeight, PoolId};

    use crate::ledger::AssetLedger;
    use crate::types::{HuntRecord, PlayerRecord, PoolRecord};

    pub type PoolOf<T> = PoolRecord<
        <T as frame_system::Config>::AccountId,
        <T as Config>::AssetId,
        <T as Config>::Balance,
    >;
    pub type PlayerOf<T> = PlayerRecord<<T as Config>::Balance>;
    pub type HuntOf<T> = HuntRecord<<T as frame_system::Config>::AccountId>;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Identifier of the asset a pool is denominated in
        type AssetId: Member + Parameter + Copy + MaxEncodedLen;

        type Balance: Member
            + Parameter
            + AtLeast32BitUnsigned
            + Default
            + Copy
            + MaxEncodedLen;

        /// Moves stakes in and prizes out of the pot
        type Assets: AssetLedger<Self::AccountId, Self::AssetId, Self::Balance>;

        /// Derives the pot account holding every pool's funds
        #[pallet::constant]
        type PalletId: Get<PalletId>;

        /// Stake locked by every join (10 tokens)
        #[pallet::constant]
        type EntryStake: Get<Self::Balance>;
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// Pool currently accepting joins
    #[pallet::storage]
    #[pallet::getter(fn current_pool_id)]
    pub type CurrentPoolId<T: Config> = StorageValue<_, PoolId, ValueQuery>;

    #[pallet::storage]
    pub type Pools<T: Config> = StorageMap<_, Twox64Concat, PoolId, PoolOf<T>, OptionQuery>;

    #[pallet::storage]
    pub type Players<T: Config> = StorageDoubleMap<
        _,
        Twox64Concat,
        PoolId,
        Blake2_128Concat,
        T::AccountId,
        PlayerOf<T>,
        OptionQuery,
    >;

    /// Append-only list of every admission, slot -> account
    #[pallet::storage]
    pub type Roster<T: Config> =
        StorageDoubleMap<_, Twox64Concat, PoolId, Twox64Concat, u32, T::AccountId, OptionQuery>;

    /// Newest roster slot of an account, stored as slot + 1 (0 = absent)
    #[pallet::storage]
    pub type RosterIndex<T: Config> =
        StorageDoubleMap<_, Twox64Concat, PoolId, Blake2_128Concat, T::AccountId, u32, ValueQuery>;

    /// The hunt slot of each pool, kept after resolution
    #[pallet::storage]
    pub type Hunts<T: Config> = StorageMap<_, Twox64Concat, PoolId, HuntOf<T>, OptionQuery>;

    /// Protocol fees retained in the pot, per asset
    #[pallet::storage]
    pub type ProtocolFees<T: Config> =
        StorageMap<_, Blake2_128Concat, T::AssetId, T::Balance, ValueQuery>;

    #[pallet::genesis_config]
    #[derive(frame_support::DefaultNoBound)]
    pub struct GenesisConfig<T: Config> {
        #[serde(skip)]
        pub _phantom: core::marker::PhantomData<T>,
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            let pool_id = CurrentPoolId::<T>::get();
            if !Pools::<T>::contains_key(pool_id) {
                Pallet::<T>::open_pool(pool_id);
            }
        }
    }

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// A new pool accepts joins
        PoolCreated { pool_id: PoolId },
        PlayerJoined {
            pool_id: PoolId,
            player: T::AccountId,
            historical_count: u32,
        },
        /// 5th participant joined, deadlines enforced from `game_start_block`
        GameStarted {
            pool_id: PoolId,
            game_start_block: BlockHeight,
        },
        PlayerPinged {
            pool_id: PoolId,
            player: T::AccountId,
            next_deadline: BlockHeight,
        },
        /// Target must ping by `window_end` to escape
        HuntDeclared {
            pool_id: PoolId,
            hunter: T::AccountId,
            target: T::AccountId,
            window_end: BlockHeight,
        },
        HuntSuccess {
            pool_id: PoolId,
            hunter: T::AccountId,
            target: T::AccountId,
            reward: T::Balance,
        },
        /// Target escaped, hunter paid `penalty` to the target
        HuntFailed {
            pool_id: PoolId,
            hunter: T::AccountId,
            target: T::AccountId,
            penalty: T::Balance,
        },
        /// Target was already eliminated when the hunt was resolved
        HuntVoided {
            pool_id: PoolId,
            hunter: T::AccountId,
            target: T::AccountId,
        },
        /// Participant eliminated, `distributed` of their `stake` went to survivors
        PlayerDied {
            pool_id: PoolId,
            player: T::AccountId,
            stake: T::Balance,
            distributed: T::Balance,
        },
        /// One participant left, waiting for `claim_win`
        LastSurvivorStanding { pool_id: PoolId },
        GameWon {
            pool_id: PoolId,
            winner: T::AccountId,
            prize: T::Balance,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Pool already admitted 50 participants
        PoolFull,
        /// Already alive in this pool
        AlreadyActive,
        /// Not an active participant of this pool
        NotActive,
        /// Pool has not reached 5 participants yet
        GameNotStarted,
        /// Countdown after the 5th join is still running
        WaitingPeriodNotOver,
        /// Deadline missed, the participant can only be liquidated now
        PingWindowExpired,
        /// Hunting opens after 70% of the acceleration period
        HuntingNotOpen,
        /// Pool used all of its bullets
        NoBulletsLeft,
        /// Participant already used their bullet
        BulletAlreadyUsed,
        /// Another hunt in this pool is unresolved
        HuntAlreadyInProgress,
        /// Cannot hunt yourself
        SelfTarget,
        /// No hunt to resolve in this pool
        NoActiveHunt,
        /// Target can still escape
        HuntWindowStillOpen,
        /// More than one participant alive
        GameNotOver,
        /// Asset layer refused the transfer
        AssetTransferFailed,
        /// Pool id was never opened, or no asset was ever staked in it
        UnknownPool,
        /// Pool is denominated in a different asset
        AssetMismatch,
        /// Target's ping deadline has not passed
        DeadlineNotReached,
        /// The last participant cannot be liquidated, they can only claim
        LastSurvivor,
        /// Fund arithmetic overflow
        Overflow,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Lock the entry stake in the currently open pool.
        ///
        /// The first join fixes the pool's asset; later joins must name the same one.
        #[pallet::call_index(0)]
        #[pallet::weight(Weight::from_parts(60_000_000, 0))]
        pub fn join(origin: OriginFor<T>, asset: T::AssetId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::do_join(who, asset).map(|_| ())
        }

        /// Check in before the deadline and receive a new one.
        #[pallet::call_index(1)]
        #[pallet::weight(Weight::from_parts(30_000_000, 0))]
        pub fn ping(origin: OriginFor<T>, pool_id: PoolId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::do_ping(who, pool_id).map(|_| ())
        }

        /// Spend the caller's bullet on `target`.
        #[pallet::call_index(2)]
        #[pallet::weight(Weight::from_parts(30_000_000, 0))]
        pub fn declare_hunt(
            origin: OriginFor<T>,
            pool_id: PoolId,
            target: T::AccountId,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::do_declare_hunt(who, pool_id, target).map(|_| ())
        }

        /// Settle the pool's hunt once its window closed. Callable by anyone.
        ///
        /// Scans the pool roster (at most 50 entries) on success.
        #[pallet::call_index(3)]
        #[pallet::weight(Weight::from_parts(400_000_000, 0))]
        pub fn resolve_hunt(origin: OriginFor<T>, pool_id: PoolId) -> DispatchResult {
            let _caller = ensure_signed(origin)?;
            Self::do_resolve_hunt(pool_id).map(|_| ())
        }

        /// Eliminate a participant who missed their deadline. Callable by anyone.
        #[pallet::call_index(4)]
        #[pallet::weight(Weight::from_parts(400_000_000, 0))]
        pub fn liquidate_inactive(
            origin: OriginFor<T>,
            pool_id: PoolId,
            target: T::AccountId,
        ) -> DispatchResult {
            let _caller = ensure_signed(origin)?;
            Self::do_liquidate_inactive(pool_id, target).map(|_| ())
        }

        /// Sole survivor takes the pool; the next pool opens.
        #[pallet::call_index(5)]
        #[pallet::weight(Weight::from_parts(60_000_000, 0))]
        pub fn claim_win(origin: OriginFor<T>, pool_id: PoolId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::do_claim_win(who, pool_id).map(|_| ())
        }
    }
}
