//! Particle systems: cursor trails and screen-wide ambient fields

pub mod ambient;
pub mod queue;
pub mod trail;

pub use ambient::{AmbientKind, AmbientParticle, AmbientPools, AmbientSnapshot};
pub use queue::BoundedQueue;
pub use trail::{TrailEmitter, TrailKind, TrailParticle};

use crate::core_types::units::Millis;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Particle identity: creation time plus a per-engine serial number, so two
/// particles created in the same millisecond never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleId {
    pub stamp: Millis,
    pub serial: u32,
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", *self.stamp, self.serial)
    }
}

/// Hands out [`ParticleId`]s
#[derive(Debug, Default)]
pub struct ParticleIds {
    next_serial: u32,
}

impl ParticleIds {
    pub fn allocate(&mut self, now: Millis) -> ParticleId {
        let serial = self.next_serial;
        self.next_serial = self.next_serial.wrapping_add(1);
        ParticleId { stamp: now, serial }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_millisecond_ids_differ() {
        let mut ids = ParticleIds::default();
        let a = ids.allocate(Millis::new(42));
        let b = ids.allocate(Millis::new(42));
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "42#0");
        assert_eq!(b.to_string(), "42#1");
    }
}
