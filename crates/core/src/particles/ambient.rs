//! Screen-wide ambient particle fields
//!
//! Rain, snow and wind streak fields are generated once per session, when
//! effects first become enabled, and reused from then on. Each particle starts
//! at a negative offset within its animation loop so the field appears already
//! in motion.

use super::{ParticleId, ParticleIds};
use crate::config::{AmbientConfig, SpanRange};
use crate::core_types::units::Millis;
use crate::core_types::weather::EffectConditions;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which ambient field a particle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmbientKind {
    Rain,
    Snow,
    Wind,
}

impl AmbientKind {
    /// Convert from u8 for FFI compatibility
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(AmbientKind::Rain),
            1 => Some(AmbientKind::Snow),
            2 => Some(AmbientKind::Wind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientParticle {
    pub id: ParticleId,
    /// Horizontal (rain, snow) or vertical (wind) offset, percent of the viewport
    pub offset_pct: f32,
    /// Length of one animation loop (s)
    pub duration_s: f32,
    /// Where in its loop the particle starts (s, never positive)
    pub start_offset_s: f32,
    /// Snowflake diameter (px)
    pub size_px: Option<f32>,
}

/// The three fields of one session
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientPools {
    rain: Vec<AmbientParticle>,
    snow: Vec<AmbientParticle>,
    wind: Vec<AmbientParticle>,
}

/// Fields whose condition currently holds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AmbientSnapshot<'a> {
    pub rain: Option<&'a [AmbientParticle]>,
    pub snow: Option<&'a [AmbientParticle]>,
    pub wind: Option<&'a [AmbientParticle]>,
}

impl AmbientSnapshot<'_> {
    /// One field, if visible
    pub fn field(&self, kind: AmbientKind) -> Option<&[AmbientParticle]> {
        match kind {
            AmbientKind::Rain => self.rain,
            AmbientKind::Snow => self.snow,
            AmbientKind::Wind => self.wind,
        }
    }
}

impl AmbientPools {
    /// Generate every field
    pub fn generate<R: Rng + ?Sized>(
        config: &AmbientConfig,
        rng: &mut R,
        ids: &mut ParticleIds,
        now: Millis,
    ) -> Self {
        let mut field = |count: usize, duration: SpanRange, size: Option<SpanRange>| {
            (0..count)
                .map(|_| AmbientParticle {
                    id: ids.allocate(now),
                    offset_pct: rng.random_range(0.0..100.0),
                    duration_s: duration.sample(rng),
                    start_offset_s: -config.start_offset.sample(rng),
                    size_px: size.map(|s| s.sample(rng)),
                })
                .collect::<Vec<_>>()
        };

        let rain = field(config.rain_count, config.rain_duration, None);
        let snow = field(config.snow_count, config.snow_duration, Some(config.snow_size));
        let wind = field(config.wind_count, config.wind_duration, None);
        Self { rain, snow, wind }
    }

    /// Every particle of one field, visible or not
    pub fn pool(&self, kind: AmbientKind) -> &[AmbientParticle] {
        match kind {
            AmbientKind::Rain => &self.rain,
            AmbientKind::Snow => &self.snow,
            AmbientKind::Wind => &self.wind,
        }
    }

    /// Only the fields whose condition holds
    pub fn snapshot(&self, conditions: &EffectConditions) -> AmbientSnapshot<'_> {
        AmbientSnapshot {
            rain: conditions.raining.then_some(self.rain.as_slice()),
            snow: conditions.snowy.then_some(self.snow.as_slice()),
            wind: conditions.wind_streaks().then_some(self.wind.as_slice()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pools() -> AmbientPools {
        let mut rng = StdRng::seed_from_u64(99);
        let mut ids = ParticleIds::default();
        AmbientPools::generate(&AmbientConfig::default(), &mut rng, &mut ids, Millis::new(1))
    }

    #[test]
    fn test_counts_and_ranges() {
        let p = pools();
        assert_eq!(p.pool(AmbientKind::Rain).len(), 300);
        assert_eq!(p.pool(AmbientKind::Snow).len(), 200);
        assert_eq!(p.pool(AmbientKind::Wind).len(), 30);

        for drop in p.pool(AmbientKind::Rain) {
            assert!((0.3..0.5).contains(&drop.duration_s));
            assert!((0.0..100.0).contains(&drop.offset_pct));
            assert!(drop.start_offset_s <= 0.0 && drop.start_offset_s > -2.0);
            assert_eq!(drop.size_px, None);
        }
        for flake in p.pool(AmbientKind::Snow) {
            assert!((2.0..6.0).contains(&flake.duration_s));
            let size = flake.size_px.expect("snowflakes have a size");
            assert!((8.0..16.0).contains(&size));
        }
        for streak in p.pool(AmbientKind::Wind) {
            assert!((0.4..1.4).contains(&streak.duration_s));
        }
    }

    #[test]
    fn test_snapshot_gates_fields() {
        let p = pools();
        let storm = EffectConditions {
            enabled: true,
            raining: true,
            thunder: true,
            ..EffectConditions::default()
        };
        let snap = p.snapshot(&storm);
        assert_eq!(snap.rain.map(<[_]>::len), Some(300));
        assert!(snap.snow.is_none());
        // thunder always brings wind streaks
        assert_eq!(snap.field(AmbientKind::Wind).map(<[_]>::len), Some(30));

        let snow = EffectConditions {
            enabled: true,
            snowy: true,
            ..EffectConditions::default()
        };
        let snap = p.snapshot(&snow);
        assert!(snap.rain.is_none() && snap.wind.is_none());
        assert!(snap.snow.is_some());
    }
}
