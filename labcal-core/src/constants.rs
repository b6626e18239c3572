/// Number of day slots in the scheduling grid (one annual cycle).
pub const GRID_DAYS: usize = 365;

pub const DAYS_PER_WEEK: usize = 7;

/// Monthly measurements are spaced four weeks apart.
pub const DAYS_PER_MONTH: usize = 28;

/// Weekday positions (Monday = 0) that no experiment may occupy.
pub const BLOCKED_WEEKDAYS: [usize; 2] = [5, 6];

/// Resolver steps allowed before a schedule is declared infeasible.
pub const DEFAULT_MAX_ITERATIONS: u64 = 1_000_000_000;

/// First Monday of 2018, the default day 0 of the grid.
pub const DEFAULT_EPOCH: &str = "2018-01-01";

/// Seconds to wait for a provider binary before giving up.
pub const PROVIDER_TIMEOUT_SECS: u64 = 30;
