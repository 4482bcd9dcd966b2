//! Process-wide logical clock used for dirty tracking

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Next value handed out by [`VersionStamp::now`]. Starts above `NEVER` and
/// is never reset.
static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

/// Monotonic logical timestamp
///
/// Marks when a parameter last changed and when a node was last committed.
/// Only ordering is meaningful; the numeric value is not exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionStamp(u64);

impl VersionStamp {
    /// Stamp that precedes every value returned by [`VersionStamp::now`]
    pub const NEVER: Self = Self(0);

    /// Take a fresh stamp, strictly greater than every stamp taken before it
    /// by any thread
    pub fn now() -> Self {
        Self(NEXT_STAMP.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for VersionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
