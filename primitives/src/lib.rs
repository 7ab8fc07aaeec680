//! Tontine Core Primitives
//!
//! Fixed rules of the survival pools: capacity, waiting period, the shrinking
//! ping schedule, hunting threshold and every basis-point split.
//! Everything here is pure integer math, floor division only.

#![cfg_attr(not(feature = "std"), no_std)]

use codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use sp_runtime::{helpers_128bit::multiply_by_rational_with_rounding, Rounding, RuntimeDebug};

/// Token decimals of the entry asset (8, like BTC)
pub const DECIMALS: u8 = 8;

/// 1 whole token in base units
pub const UNIT: u128 = 100_000_000;

/// Fixed stake every participant locks on join: 10 tokens
pub const ENTRY_STAKE: u128 = 10 * UNIT;

/// Maximum participants ever admitted to one pool
pub const POOL_MAX_HISTORICAL: u32 = 50;

/// The join that brings the pool to this many participants starts the countdown
pub const POOL_MIN_START: u32 = 5;

/// Blocks in one day (10 minute blocks)
pub const DAILY_BLOCKS: u64 = 144;

/// Waiting period between the 5th join and the first enforced deadline: 24h
pub const START_WAIT_BLOCKS: u64 = 144;

/// Ping interval at game start: 7 days
pub const INITIAL_INTERVAL: u64 = 1008;

/// Ping interval floor: ~1 hour
pub const MIN_INTERVAL: u64 = 6;

/// Interval shrink per elapsed day ((1008 - 6) / 42 ≈ 24)
pub const DAILY_REDUCTION: u64 = 24;

/// Days for the interval to reach its floor
pub const TOTAL_ACCEL_DAYS: u64 = 42;

/// Share of the acceleration period that must pass before hunting opens
pub const HUNT_THRESHOLD_PCT: u64 = 70;

/// Blocks the hunt target has to escape
pub const HUNT_WINDOW_BLOCKS: u64 = 1;

/// Successful hunts allowed per pool
pub const POOL_BULLETS: u32 = 3;

/// Protocol fee on every liquidation: 0.3%
pub const PROTOCOL_BPS: u128 = 30;

/// Hunter reward on a manual elimination: 10%
pub const HUNTER_BPS: u128 = 1_000;

/// Penalty a hunter pays the target on a failed hunt: 5%
pub const HUNTER_PENALTY_BPS: u128 = 500;

pub const BPS_BASE: u128 = 10_000;

pub type PoolId = u64;
pub type BlockHeight = u64;
pub type Points = u64;
pub type Balance = u128;

/// Lifecycle of a pool. `Won` is terminal.
#[derive(Encode, Decode, Clone, Copy, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum PoolPhase {
    /// Fewer than `POOL_MIN_START` participants so far
    Collecting,
    /// Countdown running, deadlines not enforced yet
    Waiting,
    /// Pings, hunts and liquidations allowed
    Active,
    /// Sole survivor claimed the pool
    Won,
}

/// How an eliminated stake is carved up.
#[derive(Encode, Decode, Clone, Copy, PartialEq, Eq, RuntimeDebug, TypeInfo, Default)]
pub struct LiquidationSplit {
    pub protocol_fee: Balance,
    pub hunter_reward: Balance,
    /// Left for the survivors
    pub remainder: Balance,
}

pub fn elapsed_days(game_start: BlockHeight, at: BlockHeight) -> u64 {
    at.saturating_sub(game_start) / DAILY_BLOCKS
}

/// Ping interval in force at block `at`.
pub fn current_interval(game_start: BlockHeight, at: BlockHeight) -> u64 {
    if at <= game_start {
        return INITIAL_INTERVAL;
    }
    let reduction = elapsed_days(game_start, at).saturating_mul(DAILY_REDUCTION);
    INITIAL_INTERVAL.saturating_sub(reduction).max(MIN_INTERVAL)
}

/// Last block at which a participant who pinged at `last_ping` may still ping.
pub fn deadline(game_start: BlockHeight, last_ping: BlockHeight) -> BlockHeight {
    last_ping.saturating_add(current_interval(game_start, last_ping))
}

/// 42 * 70 / 100 = 29
pub const fn hunt_threshold_days() -> u64 {
    TOTAL_ACCEL_DAYS * HUNT_THRESHOLD_PCT / 100
}

pub fn hunting_open(game_start: BlockHeight, at: BlockHeight) -> bool {
    if at <= game_start {
        return false;
    }
    elapsed_days(game_start, at) >= hunt_threshold_days()
}

/// Blocks survived since the last checkpoint, never negative.
pub fn points_earned(updated_at: BlockHeight, now: BlockHeight) -> Points {
    now.saturating_sub(updated_at)
}

/// floor(amount * bps / BPS_BASE)
pub fn bps_of(amount: Balance, bps: u128) -> Balance {
    multiply_by_rational_with_rounding(amount, bps, BPS_BASE, Rounding::Down).unwrap_or(0)
}

pub fn protocol_fee(stake: Balance) -> Balance {
    bps_of(stake, PROTOCOL_BPS)
}

pub fn hunter_reward(stake: Balance) -> Balance {
    bps_of(stake, HUNTER_BPS)
}

pub fn hunt_penalty(stake: Balance) -> Balance {
    bps_of(stake, HUNTER_PENALTY_BPS)
}

pub fn split_liquidation(stake: Balance, is_manual: bool) -> LiquidationSplit {
    let protocol_fee = protocol_fee(stake);
    let hunter_reward = if is_manual { hunter_reward(stake) } else { 0 };
    LiquidationSplit {
        protocol_fee,
        hunter_reward,
        remainder: stake.saturating_sub(protocol_fee).saturating_sub(hunter_reward),
    }
}

/// floor(amount * weight / total_weight). Zero when there is no weight at all.
pub fn pro_rata_share(amount: Balance, weight: Points, total_weight: Points) -> Balance {
    if total_weight == 0 {
        return 0;
    }
    multiply_by_rational_with_rounding(
        amount,
        weight as u128,
        total_weight as u128,
        Rounding::Down,
    )
    .unwrap_or(0)
}
