/// One unit of the time display precision, in minutes.
///
/// Time edits are nudged in steps of this size and derived travel times are
/// never allowed to drop below it.
pub const TIME_PRECISION: f64 = 1.0;

/// Length of the repeating timetable cycle, in minutes.
pub const MINUTES_PER_CYCLE: f64 = 60.0;

/// Tolerance for clock-face comparisons (one second).
pub const TIME_TOLERANCE: f64 = 1.0 / 60.0;

/// Travel time assigned to freshly created trainrun sections.
pub const DEFAULT_TRAVEL_TIME: f64 = 1.0;

/// Minimum transfer margin assigned to freshly created nodes, in minutes.
pub const DEFAULT_CONNECTION_TIME: f64 = 2.0;
