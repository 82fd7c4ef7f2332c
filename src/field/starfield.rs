use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::FieldConfig;
use super::star::Star;
use super::surface::Surface;

/// Pointer and surface state shared by every star of a field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Raw pointer position, as last reported.
    pub target: Vec2,
    /// Cursor eased toward `target` once per frame.
    pub mouse: Vec2,
    pub size: Vec2,
}

impl Viewport {
    pub fn new(size: Vec2) -> Self {
        Self { size, ..default() }
    }

    pub fn ease_mouse(&mut self, smoothing: f32) {
        self.mouse += (self.target - self.mouse) * smoothing;
    }
}

/// A mounted star field: a fixed set of stars, the viewport they live in and
/// the generator used for recycling.
#[derive(Resource, Debug)]
pub struct StarField {
    stars: Vec<Star>,
    viewport: Viewport,
    config: FieldConfig,
    rng: StdRng,
}

impl StarField {
    pub fn new(config: FieldConfig, size: Vec2) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let stars = (0..config.star_count)
            .map(|_| Star::random(&mut rng, size, &config))
            .collect();
        Self {
            stars,
            viewport: Viewport::new(size),
            config,
            rng,
        }
    }

    /// A field with exactly the given stars. `config.star_count` is ignored.
    pub fn from_stars(config: FieldConfig, size: Vec2, stars: Vec<Star>) -> Self {
        let mut field = Self::new(FieldConfig { star_count: 0, ..config }, size);
        field.config.star_count = stars.len();
        field.stars = stars;
        field
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Record the raw pointer position. No smoothing happens here.
    pub fn set_target(&mut self, target: Vec2) {
        self.viewport.target = target;
    }

    /// Track a new surface size. Existing stars keep their positions.
    pub fn resize(&mut self, size: Vec2) {
        self.viewport.size = size;
    }

    fn repulsion_source(&self) -> Vec2 {
        if self.config.repel_from_smoothed_cursor {
            self.viewport.mouse
        } else {
            self.viewport.target
        }
    }

    /// Advance every star one frame and draw the result.
    ///
    /// `now_ms` is wall-clock time in milliseconds; it only drives the
    /// opacity pulse. Returns the number of constellation lines drawn.
    pub fn step(&mut self, now_ms: f64, surface: &mut impl Surface) -> usize {
        surface.fill_rect(Vec2::ZERO, self.viewport.size, self.config.trail_color());

        self.viewport.ease_mouse(self.config.cursor_smoothing);

        let source = self.repulsion_source();
        let bounds = self.viewport.size;
        for star in &mut self.stars {
            star.drift(bounds, &mut self.rng);
            star.interact(source, &self.config);
            star.pulse(now_ms, self.config.pulse_amplitude);
            surface.fill_circle(star.position, star.size, star.color());
        }

        self.draw_constellations(surface)
    }

    /// Join every pair of stars closer than the link distance.
    pub fn draw_constellations(&self, surface: &mut impl Surface) -> usize {
        let link_distance = self.config.link_distance;
        let mut lines = 0;
        for (i, a) in self.stars.iter().enumerate() {
            for b in &self.stars[i + 1..] {
                let distance = a.position.distance(b.position);
                if distance < link_distance {
                    let alpha = (1.0 - distance / link_distance) * self.config.link_alpha;
                    surface.stroke_line(a.position, b.position, Color::srgba(1.0, 1.0, 1.0, alpha));
                    lines += 1;
                }
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::surface::{DrawCall, DrawList};

    fn seeded(count: usize, size: Vec2) -> StarField {
        let config = FieldConfig {
            star_count: count,
            seed: Some(7),
            ..default()
        };
        StarField::new(config, size)
    }

    fn still_star(x: f32, y: f32) -> Star {
        Star {
            position: Vec2::new(x, y),
            base_position: Vec2::new(x, y),
            size: 0.5,
            speed: 0.0,
            opacity: 0.5,
            pulse_speed: 0.0,
        }
    }

    #[test]
    fn test_mount_scenario_400_by_300() {
        let field = seeded(400, Vec2::new(400.0, 300.0));
        assert_eq!(field.stars().len(), 400);
        for star in field.stars() {
            assert!((0.0..400.0).contains(&star.position.x));
            assert!((0.0..300.0).contains(&star.position.y));
        }
    }

    #[test]
    fn test_same_seed_same_stars() {
        let a = seeded(50, Vec2::new(800.0, 600.0));
        let b = seeded(50, Vec2::new(800.0, 600.0));
        assert_eq!(a.stars(), b.stars());
    }

    #[test]
    fn test_step_draw_order() {
        let mut field = seeded(30, Vec2::new(400.0, 300.0));
        let mut list = DrawList::default();

        let lines = field.step(0.0, &mut list);

        let calls = list.calls();
        assert!(matches!(calls[0], DrawCall::FillRect { origin, size, .. }
            if origin == Vec2::ZERO && size == Vec2::new(400.0, 300.0)));
        assert!(calls[1..=30].iter().all(|c| matches!(c, DrawCall::FillCircle { .. })));
        assert!(calls[31..].iter().all(|c| matches!(c, DrawCall::StrokeLine { .. })));
        assert_eq!(list.line_count(), lines);
    }

    #[test]
    fn test_step_eases_mouse_toward_target() {
        let mut field = seeded(0, Vec2::new(400.0, 300.0));
        field.set_target(Vec2::new(100.0, 50.0));
        let mut list = DrawList::default();

        field.step(0.0, &mut list);
        assert!((field.viewport().mouse - Vec2::new(10.0, 5.0)).length() < 1e-5);

        field.step(0.0, &mut list);
        assert!((field.viewport().mouse - Vec2::new(19.0, 9.5)).length() < 1e-5);
        assert_eq!(field.viewport().target, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_repulsion_uses_raw_target_by_default() {
        let mut field = seeded(0, Vec2::new(1000.0, 1000.0));
        field.stars.push(still_star(500.0, 500.0));
        field.set_target(Vec2::new(550.0, 500.0));

        field.step(0.0, &mut DrawList::default());

        // Raw target is 50 away: pushed left by 2 * 150/200.
        assert!((field.stars()[0].position.x - 498.5).abs() < 1e-4);
    }

    #[test]
    fn test_repulsion_from_smoothed_cursor_when_enabled() {
        let config = FieldConfig {
            star_count: 0,
            seed: Some(1),
            repel_from_smoothed_cursor: true,
            ..default()
        };
        let mut field = StarField::new(config, Vec2::new(1000.0, 1000.0));
        field.stars.push(still_star(500.0, 500.0));
        field.set_target(Vec2::new(550.0, 500.0));

        field.step(0.0, &mut DrawList::default());

        // The eased cursor is still near the origin, far outside the radius.
        assert_eq!(field.stars()[0].position, Vec2::new(500.0, 500.0));
    }

    #[test]
    fn test_recycled_star_rests_at_right_edge() {
        let mut field = seeded(0, Vec2::new(640.0, 480.0));
        let mut star = still_star(0.01, 100.0);
        star.speed = 0.04;
        field.stars.push(star);
        field.set_target(Vec2::new(-5000.0, -5000.0));

        field.step(0.0, &mut DrawList::default());

        let star = field.stars()[0];
        assert_eq!(star.position.x, 640.0);
        assert_eq!(star.base_position, star.position);
    }

    #[test]
    fn test_resize_keeps_star_positions() {
        let mut field = seeded(20, Vec2::new(400.0, 300.0));
        let before: Vec<Vec2> = field.stars().iter().map(|s| s.position).collect();

        field.resize(Vec2::new(1024.0, 768.0));
        field.resize(Vec2::new(1024.0, 768.0));

        assert_eq!(field.viewport().size, Vec2::new(1024.0, 768.0));
        let after: Vec<Vec2> = field.stars().iter().map(|s| s.position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_constellation_threshold_is_strict() {
        let mut field = seeded(0, Vec2::new(400.0, 300.0));
        field.stars.extend([
            still_star(0.0, 0.0),
            still_star(50.0, 0.0),
            still_star(0.0, 49.0),
        ]);
        let mut list = DrawList::default();

        let lines = field.draw_constellations(&mut list);

        // (0,0)-(50,0) is exactly 50 apart and not linked; (50,0)-(0,49) is ~70.
        assert_eq!(lines, 1);
        let DrawCall::StrokeLine { from, to, color } = list.calls()[0] else {
            panic!("expected a line");
        };
        assert_eq!((from, to), (Vec2::new(0.0, 0.0), Vec2::new(0.0, 49.0)));
        assert!((color.alpha() - (1.0 - 49.0 / 50.0) * 0.05).abs() < 1e-6);
    }
}
