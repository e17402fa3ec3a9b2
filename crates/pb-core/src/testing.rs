//! Fixtures shared by unit tests here and by downstream test crates
//! (enable the `testing` feature).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::models::Post;
use crate::traits::{Clock, RandomSource};

/// A fresh post created at `created_at` with the default one-day vote window
/// and seven-day listing window.
pub fn post_at(id: i64, created_at: DateTime<Utc>) -> Post {
    Post {
        id,
        author_id: 1,
        title: format!("post {id}"),
        content: "content".to_string(),
        image_url: None,
        permit_count: 0,
        reject_count: 0,
        rank_count: 0,
        vote_closed: false,
        listing_closed: false,
        vote_deadline: created_at + Duration::days(1),
        listing_deadline: created_at + Duration::days(7),
        created_at,
    }
}

/// Replays a fixed sequence of picks (wrapping around), each reduced modulo `n`.
pub struct ScriptedRandom {
    script: Vec<usize>,
    offset: usize,
    calls: AtomicUsize,
}

impl ScriptedRandom {
    pub fn new(script: impl IntoIterator<Item = usize>) -> Self {
        let script: Vec<usize> = script.into_iter().collect();
        Self {
            script: if script.is_empty() { vec![0] } else { script },
            offset: 0,
            calls: AtomicUsize::new(0),
        }
    }

    /// Counts up from `seed`: seed, seed + 1, seed + 2, ...
    pub fn cycling(seed: usize) -> Self {
        Self {
            script: Vec::new(),
            offset: seed,
            calls: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn pick(&self, n: usize) -> usize {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let raw = if self.script.is_empty() {
            self.offset + call
        } else {
            self.script[call % self.script.len()]
        };
        raw % n
    }
}

/// A clock that only moves when told to.
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}
