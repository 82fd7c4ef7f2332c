use bevy::prelude::*;

/// A 2D drawing target in canvas coordinates: origin at the top-left corner,
/// y growing downward, one unit per logical pixel.
pub trait Surface {
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCall {
    FillRect { origin: Vec2, size: Vec2, color: Color },
    FillCircle { center: Vec2, radius: f32, color: Color },
    StrokeLine { from: Vec2, to: Vec2, color: Color },
}

/// The draw calls of the most recent frame, in issue order.
///
/// The frame loop records into this; presentation replays it onto a real
/// surface. Tests read it directly.
#[derive(Resource, Debug, Default, Clone)]
pub struct DrawList {
    calls: Vec<DrawCall>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn rect_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, DrawCall::FillRect { .. })).count()
    }

    pub fn circle_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, DrawCall::FillCircle { .. })).count()
    }

    pub fn line_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, DrawCall::StrokeLine { .. })).count()
    }

    /// Alpha of the first rectangle fill, i.e. how much of the previous frame
    /// the frame paints over.
    pub fn fill_alpha(&self) -> Option<f32> {
        self.calls.iter().find_map(|c| match c {
            DrawCall::FillRect { color, .. } => Some(color.alpha()),
            _ => None,
        })
    }

    /// Circles and lines of this frame with their alpha scaled by `keep`.
    /// Fills are dropped.
    pub fn faded(&self, keep: f32) -> DrawList {
        let fade = |color: Color| color.with_alpha(color.alpha() * keep);
        let calls = self
            .calls
            .iter()
            .filter_map(|call| match *call {
                DrawCall::FillRect { .. } => None,
                DrawCall::FillCircle { center, radius, color } => {
                    Some(DrawCall::FillCircle { center, radius, color: fade(color) })
                }
                DrawCall::StrokeLine { from, to, color } => {
                    Some(DrawCall::StrokeLine { from, to, color: fade(color) })
                }
            })
            .collect();
        DrawList { calls }
    }

    /// Issue every recorded call, in order, against another surface.
    pub fn replay(&self, surface: &mut impl Surface) {
        for call in &self.calls {
            match *call {
                DrawCall::FillRect { origin, size, color } => surface.fill_rect(origin, size, color),
                DrawCall::FillCircle { center, radius, color } => surface.fill_circle(center, radius, color),
                DrawCall::StrokeLine { from, to, color } => surface.stroke_line(from, to, color),
            }
        }
    }
}

impl Surface for DrawList {
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.calls.push(DrawCall::FillRect { origin, size, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.calls.push(DrawCall::FillCircle { center, radius, color });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.calls.push(DrawCall::StrokeLine { from, to, color });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_preserves_order() {
        let mut list = DrawList::default();
        list.fill_rect(Vec2::ZERO, Vec2::new(10.0, 10.0), Color::BLACK);
        list.fill_circle(Vec2::new(1.0, 2.0), 0.5, Color::WHITE);
        list.stroke_line(Vec2::ZERO, Vec2::ONE, Color::WHITE);

        let mut copy = DrawList::default();
        list.replay(&mut copy);

        assert_eq!(copy.calls(), list.calls());
        assert_eq!((copy.rect_count(), copy.circle_count(), copy.line_count()), (1, 1, 1));
    }

    #[test]
    fn test_faded_scales_alpha_and_drops_fills() {
        let mut list = DrawList::default();
        list.fill_rect(Vec2::ZERO, Vec2::new(10.0, 10.0), Color::srgba(0.0, 0.0, 0.0, 0.9));
        list.fill_circle(Vec2::new(1.0, 2.0), 0.5, Color::srgba(1.0, 1.0, 1.0, 0.5));
        list.stroke_line(Vec2::ZERO, Vec2::ONE, Color::srgba(1.0, 1.0, 1.0, 0.04));

        assert!((list.fill_alpha().unwrap() - 0.9).abs() < 1e-6);

        let faded = list.faded(0.1);
        assert_eq!(faded.rect_count(), 0);
        assert_eq!(faded.fill_alpha(), None);
        let alphas: Vec<f32> = faded
            .calls()
            .iter()
            .map(|c| match *c {
                DrawCall::FillCircle { color, .. } | DrawCall::StrokeLine { color, .. } => color.alpha(),
                DrawCall::FillRect { .. } => unreachable!(),
            })
            .collect();
        assert!((alphas[0] - 0.05).abs() < 1e-6);
        assert!((alphas[1] - 0.004).abs() < 1e-6);
    }

    #[test]
    fn test_clear_empties_list() {
        let mut list = DrawList::default();
        list.fill_circle(Vec2::ZERO, 1.0, Color::WHITE);
        assert!(!list.is_empty());
        list.clear();
        assert!(list.is_empty());
    }
}
