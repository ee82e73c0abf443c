//! Cursor-local particle trails
//!
//! A trail emitter spawns one particle per interval at the cursor's current
//! position plus a random jitter. The cadence is kept against each timer's due
//! time, so a slow host never stretches it. Particles live in a
//! [`BoundedQueue`]; the oldest is evicted once the capacity is reached.

use super::queue::BoundedQueue;
use super::{ParticleId, ParticleIds};
use crate::config::TrailConfig;
use crate::core_types::units::Millis;
use crate::core_types::vec2::Vec2;
use crate::scheduler::{EffectContext, TimerEvent, TimerOwner};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which trail a particle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrailKind {
    /// Raindrops shed while it rains
    Precipitation,
    /// Sweat beads while it is hot
    Condensation,
}

impl TrailKind {
    /// Timer owner for this trail's spawn timer
    pub fn owner(self) -> TimerOwner {
        match self {
            TrailKind::Precipitation => TimerOwner::PrecipitationTrail,
            TrailKind::Condensation => TimerOwner::CondensationTrail,
        }
    }

    /// Convert from u8 for FFI compatibility
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TrailKind::Precipitation),
            1 => Some(TrailKind::Condensation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailParticle {
    pub id: ParticleId,
    pub kind: TrailKind,
    /// Cursor position at spawn time plus jitter (px)
    pub spawn_position: Vec2,
    pub created_at: Millis,
    /// Rotation in degrees; zero for trails without rotation
    pub rotation_deg: f32,
}

#[derive(Debug, Clone)]
pub struct TrailEmitter {
    kind: TrailKind,
    config: TrailConfig,
    active: bool,
    queue: BoundedQueue<TrailParticle>,
    spawned: u64,
}

impl TrailEmitter {
    pub fn new(kind: TrailKind, config: TrailConfig) -> Self {
        Self {
            kind,
            config,
            active: false,
            queue: BoundedQueue::new(config.capacity),
            spawned: 0,
        }
    }

    /// Follow the trail's gate: arm on a rising edge, tear down on a falling edge
    pub fn sync(&mut self, on: bool, ctx: &mut EffectContext<'_>) {
        match (self.active, on) {
            (false, true) => {
                let owner = self.kind.owner();
                ctx.timers.cancel_owner(owner);
                self.active = ctx
                    .schedule_in(owner, self.config.interval, TimerEvent::TrailSpawn(self.kind))
                    .is_some();
                if self.active {
                    info!(kind = ?self.kind, "Trail started");
                }
            }
            (true, false) => self.deactivate(ctx),
            _ => {}
        }
    }

    /// Cancel the spawn timer and empty the queue
    pub fn deactivate(&mut self, ctx: &mut EffectContext<'_>) {
        ctx.timers.cancel_owner(self.kind.owner());
        if self.active {
            debug!(kind = ?self.kind, dropped = self.queue.len(), "Trail stopped");
        }
        self.active = false;
        self.queue.clear();
    }

    /// Spawn timer fired: emit at `position` and schedule the next spawn
    pub fn on_spawn(
        &mut self,
        ctx: &mut EffectContext<'_>,
        position: Vec2,
        ids: &mut ParticleIds,
    ) -> Option<ParticleId> {
        if !self.active {
            return None;
        }
        ctx.schedule_in(
            self.kind.owner(),
            self.config.interval,
            TimerEvent::TrailSpawn(self.kind),
        );

        let j = self.config.jitter;
        let offset = Vec2::new(
            ctx.rng.random_range(-j..=j),
            ctx.rng.random_range(-j..=j),
        );
        let rotation_deg = if self.config.random_rotation {
            ctx.rng.random_range(0.0..360.0)
        } else {
            0.0
        };

        let id = ids.allocate(ctx.now);
        self.queue.push(TrailParticle {
            id,
            kind: self.kind,
            spawn_position: position + offset,
            created_at: ctx.now,
            rotation_deg,
        });
        self.spawned += 1;
        Some(id)
    }

    pub fn kind(&self) -> TrailKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Live particles, oldest first
    pub fn particles(&self) -> &BoundedQueue<TrailParticle> {
        &self.queue
    }

    /// Total particles emitted, evicted ones included
    pub fn spawned(&self) -> u64 {
        self.spawned
    }
}
