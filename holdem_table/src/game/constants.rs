/// Number of chairs at every table.
pub const MAX_SEATS: usize = 6;

/// Hole cards dealt to each seat per hand.
pub const HOLE_CARDS: usize = 2;

/// Turn countdown, in ticks, at normal table speed.
pub const DEFAULT_COUNTDOWN: u32 = 12;

/// Length of one countdown tick.
pub const TICK_MS: u64 = 1_000;

/// Pause between the small and big blind postings.
pub const ANIMATION_DELAY_MS: u64 = 500;

/// Pause between community-card reveals while the table is locked up.
pub const STREET_DELAY_MS: u64 = 1_000;

/// Pause between enough players sitting down and the first hand.
pub const START_DELAY_MS: u64 = 1_000;

/// Pause between settlement and the next hand.
pub const SETTLE_DELAY_MS: u64 = 3_000;

/// Longest accepted table name.
pub const MAX_TABLE_NAME_LENGTH: usize = 32;
