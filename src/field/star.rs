use bevy::prelude::*;
use rand::Rng;

use super::config::FieldConfig;

/// A single drifting point of the background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec2,
    /// Rest position the star eases back to once the pointer leaves.
    pub base_position: Vec2,
    pub size: f32,
    /// Leftward drift per frame.
    pub speed: f32,
    /// Not clamped; see [`Star::color`].
    pub opacity: f32,
    pub pulse_speed: f32,
}

impl Star {
    /// A star at a uniformly random point of `[0, bounds.x) x [0, bounds.y)`.
    pub fn random(rng: &mut impl Rng, bounds: Vec2, config: &FieldConfig) -> Self {
        let position = Vec2::new(rng.random::<f32>() * bounds.x, rng.random::<f32>() * bounds.y);
        Self {
            position,
            base_position: position,
            size: rng.random::<f32>() * config.max_star_size,
            speed: rng.random::<f32>() * config.max_drift_speed,
            opacity: rng.random::<f32>(),
            pulse_speed: rng.random::<f32>() * config.max_pulse_speed,
        }
    }

    /// Move left by `speed`. A star that crosses the left edge re-enters at
    /// the right edge at a random height and rests there. Returns whether the
    /// star was recycled.
    pub fn drift(&mut self, bounds: Vec2, rng: &mut impl Rng) -> bool {
        self.position.x -= self.speed;
        if self.position.x >= 0.0 {
            return false;
        }
        self.position = Vec2::new(bounds.x, rng.random::<f32>() * bounds.y);
        self.base_position = self.position;
        true
    }

    /// Push away from `source` when inside the repulsion radius, otherwise
    /// ease back toward the rest position.
    pub fn interact(&mut self, source: Vec2, config: &FieldConfig) {
        match repulsion(source - self.position, config.repulsion_radius, config.repulsion_strength) {
            Some(push) => self.position -= push,
            None => self.position += (self.base_position - self.position) * config.return_rate,
        }
    }

    /// Additive opacity pulse driven by wall-clock milliseconds.
    pub fn pulse(&mut self, now_ms: f64, amplitude: f32) {
        let phase = now_ms * f64::from(self.pulse_speed);
        self.opacity += (phase.sin() * f64::from(amplitude)) as f32;
    }

    /// Fill colour for this frame. Opacity may have drifted outside [0, 1];
    /// the alpha is clamped here the way a canvas clamps `rgba()`.
    pub fn color(&self) -> Color {
        Color::srgba(1.0, 1.0, 1.0, self.opacity.clamp(0.0, 1.0))
    }
}

/// Displacement a source at `offset` (source minus star) applies to a star,
/// to be subtracted from its position. `None` at or beyond `radius`.
///
/// Falls off linearly from `strength` at the source to zero at the radius.
pub fn repulsion(offset: Vec2, radius: f32, strength: f32) -> Option<Vec2> {
    let distance = offset.length();
    if distance >= radius {
        return None;
    }
    let force = (radius - distance) / radius;
    let angle = offset.y.atan2(offset.x);
    Some(Vec2::from_angle(angle) * force * strength)
}
