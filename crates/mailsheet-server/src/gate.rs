//! Event gate implementations
//!
//! Both gates hold their state behind a single mutex so that
//! `check_and_mark` is atomic: of two concurrent deliveries of the same
//! event, exactly one passes.

use crate::config::{GateConfig, GateKind};
use mailsheet_domain::EventGate;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock cannot leave a set half-updated
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Remembers every id for the life of the process
#[derive(Debug, Default)]
pub struct InMemoryEventGate {
    seen: Mutex<HashSet<String>>,
}

impl InMemoryEventGate {
    /// Create an empty gate
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventGate for InMemoryEventGate {
    fn seen(&self, id: &str) -> bool {
        lock(&self.seen).contains(id)
    }

    fn mark(&self, id: &str) {
        lock(&self.seen).insert(id.to_string());
    }

    fn check_and_mark(&self, id: &str) -> bool {
        lock(&self.seen).insert(id.to_string())
    }

    fn len(&self) -> usize {
        lock(&self.seen).len()
    }
}

#[derive(Debug, Default)]
struct BoundedState {
    expires: HashMap<String, Instant>,
    /// Insertion order, oldest first
    order: VecDeque<(String, Instant)>,
}

impl BoundedState {
    fn is_live(&self, id: &str, now: Instant) -> bool {
        self.expires.get(id).is_some_and(|exp| *exp > now)
    }

    fn purge(&mut self, now: Instant) {
        while let Some((id, exp)) = self.order.front() {
            if *exp > now {
                break;
            }
            if self.expires.get(id) == Some(exp) {
                self.expires.remove(id);
            }
            self.order.pop_front();
        }
    }

    fn insert(&mut self, id: &str, expires_at: Instant, capacity: usize) {
        self.expires.insert(id.to_string(), expires_at);
        self.order.push_back((id.to_string(), expires_at));

        while self.expires.len() > capacity {
            let Some((oldest, exp)) = self.order.pop_front() else {
                break;
            };
            if self.expires.get(&oldest) == Some(&exp) {
                self.expires.remove(&oldest);
                debug!("Evicted event id {} at capacity {}", oldest, capacity);
            }
        }
    }
}

/// Remembers at most `capacity` ids, each for at most `ttl`
///
/// Expired ids are forgotten; when full, the oldest id is evicted first.
#[derive(Debug)]
pub struct BoundedEventGate {
    capacity: usize,
    ttl: Duration,
    state: Mutex<BoundedState>,
}

impl BoundedEventGate {
    /// Create a gate; a zero capacity is treated as one
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            state: Mutex::new(BoundedState::default()),
        }
    }
}

impl EventGate for BoundedEventGate {
    fn seen(&self, id: &str) -> bool {
        let now = Instant::now();
        let mut state = lock(&self.state);
        state.purge(now);
        state.is_live(id, now)
    }

    fn mark(&self, id: &str) {
        self.check_and_mark(id);
    }

    fn check_and_mark(&self, id: &str) -> bool {
        let now = Instant::now();
        let mut state = lock(&self.state);
        state.purge(now);
        if state.is_live(id, now) {
            return false;
        }
        state.insert(id, now + self.ttl, self.capacity);
        true
    }

    fn len(&self) -> usize {
        let now = Instant::now();
        let mut state = lock(&self.state);
        state.purge(now);
        state.expires.len()
    }
}

/// Build the gate selected by configuration
pub fn build_gate(config: &GateConfig) -> Arc<dyn EventGate> {
    match config.kind {
        GateKind::Unbounded => Arc::new(InMemoryEventGate::new()),
        GateKind::Bounded => Arc::new(BoundedEventGate::new(config.capacity, config.ttl())),
    }
}
