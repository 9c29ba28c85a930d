//! Request id assignment
//!
//! With a cache configured every request uses id `1`, so identical calls
//! serialize identically and share a cache key. This also means the id is
//! useless for correlating or tracing calls while caching is on.
//!
//! Without a cache the id is the current Unix time in microseconds. Two
//! calls within the same microsecond (or after the clock steps back) get
//! the previous id plus one, so ids from one client never repeat.

use filmtied_core::Id;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Strictly increasing microsecond timestamps
#[derive(Debug, Default)]
pub struct TimestampIds {
    last: AtomicI64,
}

impl TimestampIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn now_micros() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_micros()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }

    /// Next id: the current time, or one past the previous id if the clock
    /// has not moved forward
    pub fn next_id(&self) -> Id {
        let now = Self::now_micros();
        let mut previous = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(previous.saturating_add(1));
            match self.last.compare_exchange_weak(
                previous,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Id(candidate),
                Err(actual) => previous = actual,
            }
        }
    }
}

/// How a client picks request ids
#[derive(Debug)]
pub enum RequestIds {
    /// Always [`Id::CACHED`]
    Pinned,
    /// Strictly increasing timestamps
    Timestamp(TimestampIds),
}

impl RequestIds {
    /// Policy for a client with or without a cache
    pub fn for_cache(cache_enabled: bool) -> Self {
        if cache_enabled {
            RequestIds::Pinned
        } else {
            RequestIds::Timestamp(TimestampIds::new())
        }
    }

    pub fn next_id(&self) -> Id {
        match self {
            RequestIds::Pinned => Id::CACHED,
            RequestIds::Timestamp(ids) => ids.next_id(),
        }
    }
}
