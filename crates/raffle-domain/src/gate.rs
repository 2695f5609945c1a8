//! Clock Gate - time-bounded admission for claims
//!
//! Everything here is a pure function of its inputs. The current time is
//! always passed in (or read from an injected [`Clock`]), never fetched
//! implicitly by the decision logic.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A point in time, in milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from milliseconds since the Unix epoch
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds since the Unix epoch
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Add a duration, saturating at the maximum representable timestamp
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Whether claims are accepted at `now`
///
/// The window is half-open: a claim evaluated exactly at the deadline is
/// already too late.
///
/// # Examples
///
/// ```
/// use raffle_domain::gate::is_open;
/// use raffle_domain::Timestamp;
///
/// let deadline = Timestamp::from_millis(1_000);
/// assert!(is_open(Timestamp::from_millis(999), deadline));
/// assert!(!is_open(deadline, deadline));
/// ```
pub fn is_open(now: Timestamp, deadline: Timestamp) -> bool {
    now < deadline
}

/// Time left until the deadline; zero once expired
pub fn time_remaining(now: Timestamp, deadline: Timestamp) -> Duration {
    deadline.saturating_duration_since(now)
}

/// Elapsed fraction of the event window, in `[0.0, 1.0]`
///
/// A degenerate window (deadline at or before opening) counts as fully elapsed.
pub fn progress(opened_at: Timestamp, now: Timestamp, deadline: Timestamp) -> f64 {
    let total = deadline.as_millis().saturating_sub(opened_at.as_millis());
    if total == 0 {
        return 1.0;
    }

    let elapsed = now.as_millis().saturating_sub(opened_at.as_millis());
    (elapsed as f64 / total as f64).clamp(0.0, 1.0)
}

/// A remaining duration broken into whole calendar-style units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    /// Whole days
    pub days: u64,

    /// Hours past the last whole day (0-23)
    pub hours: u64,

    /// Minutes past the last whole hour (0-59)
    pub minutes: u64,

    /// Seconds past the last whole minute (0-59)
    pub seconds: u64,
}

impl Countdown {
    /// Break a duration into days, hours, minutes and seconds (sub-second part dropped)
    pub fn from_remaining(remaining: Duration) -> Self {
        let total = remaining.as_secs();
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }

    /// Countdown between `now` and `deadline`
    pub fn between(now: Timestamp, deadline: Timestamp) -> Self {
        Self::from_remaining(time_remaining(now, deadline))
    }

    /// Whether nothing is left on the clock
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Total whole seconds represented
    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Source of the current time
pub trait Clock: Send + Sync {
    /// The current time
    fn now(&self) -> Timestamp;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // A clock set before 1970 reads as the epoch
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Timestamp::from_millis(millis)
    }
}

/// A clock that only moves when told to
///
/// # Examples
///
/// ```
/// use raffle_domain::{Clock, ManualClock, Timestamp};
/// use std::time::Duration;
///
/// let clock = ManualClock::new(Timestamp::from_millis(0));
/// clock.advance(Duration::from_secs(1));
/// assert_eq!(clock.now(), Timestamp::from_millis(1_000));
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: AtomicU64::new(start.as_millis()),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, now: Timestamp) {
        self.millis.store(now.as_millis(), Ordering::SeqCst);
    }

    /// Move forward by `by`
    pub fn advance(&self, by: Duration) {
        let now = self.now().saturating_add(by);
        self.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::SeqCst))
    }
}
