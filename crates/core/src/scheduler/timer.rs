//! Deterministic one-shot timer queue
//!
//! Stands in for the host's timer primitive. Every timed effect registers its
//! timers here under a [`TimerOwner`], which gives each effect a single
//! "cancel everything I own" path and lets callers count live timers per
//! effect. Timers never run code themselves: [`TimerQueue::pop_due`] hands back
//! a [`FiredTimer`] and the engine routes its [`TimerEvent`] to the owner.
//!
//! Ordering is by due time, then by scheduling order, so two timers due at the
//! same millisecond fire in the order they were scheduled.

use crate::core_types::units::Millis;
use crate::particles::trail::TrailKind;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Effect that owns a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerOwner {
    WindDirection,
    Thunder,
    Freeze,
    ThunderFlash,
    PrecipitationTrail,
    CondensationTrail,
    PressPulse,
}

impl TimerOwner {
    /// Every owner, for diagnostics
    pub const ALL: [TimerOwner; 7] = [
        TimerOwner::WindDirection,
        TimerOwner::Thunder,
        TimerOwner::Freeze,
        TimerOwner::ThunderFlash,
        TimerOwner::PrecipitationTrail,
        TimerOwner::CondensationTrail,
        TimerOwner::PressPulse,
    ];
}

/// What should happen when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Pick a new wind direction
    WindShift,
    /// Roll for a thunder strike
    ThunderCheck,
    /// Armed freeze engages
    FreezeEngage,
    /// Frozen cursor thaws
    FreezeRelease,
    /// Flash pulse starts
    FlashOn,
    /// Flash pulse ends
    FlashOff,
    /// Emit one trail particle
    TrailSpawn(TrailKind),
    /// Press pulse ends
    PressRelease,
}

/// A timer taken off the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub owner: TimerOwner,
    /// When the timer was due (not when it was popped)
    pub due: Millis,
    pub event: TimerEvent,
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    owner: TimerOwner,
    due: Millis,
    event: TimerEvent,
}

/// Virtual one-shot timers ordered by due time
#[derive(Debug)]
pub struct TimerQueue {
    /// Host lacks timers: nothing can be scheduled
    enabled: bool,
    next_id: u64,
    entries: FxHashMap<TimerId, TimerEntry>,
    order: BTreeSet<(Millis, TimerId)>,
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TimerQueue {
    /// Create a queue. A disabled queue models a host without timer support.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            next_id: 0,
            entries: FxHashMap::default(),
            order: BTreeSet::new(),
        }
    }

    /// Whether timers can be scheduled at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Schedule a one-shot timer. Returns `None` if the host has no timers.
    pub fn schedule(&mut self, owner: TimerOwner, due: Millis, event: TimerEvent) -> Option<TimerId> {
        if !self.enabled {
            return None;
        }
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, TimerEntry { owner, due, event });
        self.order.insert((due, id));
        Some(id)
    }

    /// Cancel one timer. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.entries.remove(&id) {
            Some(entry) => {
                self.order.remove(&(entry.due, id));
                true
            }
            None => false,
        }
    }

    /// Cancel every timer belonging to `owner`. Returns how many were pending.
    pub fn cancel_owner(&mut self, owner: TimerOwner) -> usize {
        let doomed: Vec<(Millis, TimerId)> = self
            .entries
            .iter()
            .filter(|(_, e)| e.owner == owner)
            .map(|(id, e)| (e.due, *id))
            .collect();
        for key in &doomed {
            self.entries.remove(&key.1);
            self.order.remove(key);
        }
        doomed.len()
    }

    /// Take the earliest timer due at or before `now`
    pub fn pop_due(&mut self, now: Millis) -> Option<FiredTimer> {
        let &(due, id) = self.order.first()?;
        if due > now {
            return None;
        }
        self.order.pop_first();
        let entry = self.entries.remove(&id)?;
        Some(FiredTimer {
            id,
            owner: entry.owner,
            due,
            event: entry.event,
        })
    }

    /// Whether a timer is still pending
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of pending timers for one owner
    pub fn live_count(&self, owner: TimerOwner) -> usize {
        self.entries.values().filter(|e| e.owner == owner).count()
    }

    /// Total number of pending timers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Due time of the next timer, if any
    pub fn next_due(&self) -> Option<Millis> {
        self.order.first().map(|(due, _)| *due)
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
