use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::config::DisplaySettings;
use super::lifecycle::FieldSet;
use super::surface::{DrawList, Surface};
use super::FieldState;

/// On-screen presentation of the recorded frame, plus the mount toggle key.
pub struct FieldRenderPlugin;

impl Plugin for FieldRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DisplaySettings>()
            .init_resource::<TrailState>()
            .add_systems(Startup, spawn_backdrop_camera)
            .add_systems(
                Update,
                (
                    toggle_field,
                    apply_line_width,
                    present_frame.after(FieldSet::Animate),
                ),
            );
    }
}

/// Camera that draws the field behind every other camera.
#[derive(Component)]
pub struct BackdropCamera;

/// What the canvas still shows of earlier frames.
///
/// Each frame paints a translucent fill over the last one, so the background
/// converges on the fill colour and the previous frame's stars linger at
/// `1 - fill alpha` of their brightness.
#[derive(Resource, Debug, Clone)]
pub struct TrailState {
    /// Accumulated background, before the display filter.
    pub background: Color,
    pub previous: DrawList,
}

impl Default for TrailState {
    fn default() -> Self {
        Self {
            background: DisplaySettings::default().backdrop,
            previous: DrawList::default(),
        }
    }
}

/// Maps canvas coordinates (top-left origin, y down) onto a 2D camera centred
/// on a surface of `size` (y up).
pub fn canvas_to_world(point: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(point.x - size.x / 2.0, size.y / 2.0 - point.y)
}

/// `over` painted with its own alpha on top of an opaque `base`.
pub fn composite(base: Color, over: Color) -> Color {
    let alpha = over.alpha().clamp(0.0, 1.0);
    let base = base.to_srgba();
    let over = over.to_srgba().with_alpha(1.0);
    Color::from(base.mix(&over, alpha))
}

/// CSS `contrast(c) brightness(b)` on the colour channels; alpha is kept.
pub fn apply_filter(color: Color, contrast: f32, brightness: f32) -> Color {
    let srgba = color.to_srgba();
    let channel = |v: f32| (((v - 0.5) * contrast + 0.5).clamp(0.0, 1.0) * brightness).clamp(0.0, 1.0);
    Color::srgba(channel(srgba.red), channel(srgba.green), channel(srgba.blue), srgba.alpha)
}

fn clamp_alpha(color: Color) -> Color {
    color.with_alpha(color.alpha().clamp(0.0, 1.0))
}

fn spawn_backdrop_camera(mut commands: Commands, settings: Res<DisplaySettings>) {
    commands.spawn((
        Camera2d,
        Camera {
            order: -1,
            clear_color: ClearColorConfig::Custom(apply_filter(
                settings.backdrop,
                settings.contrast,
                settings.brightness,
            )),
            ..default()
        },
        BackdropCamera,
    ));
}

/// Draws canvas-space primitives with gizmos through a camera centred on the
/// window. A full-surface fill is composited into the background colour.
pub struct GizmoSurface<'a, 'w, 's> {
    gizmos: &'a mut Gizmos<'w, 's>,
    size: Vec2,
    background: Color,
    settings: &'a DisplaySettings,
}

impl<'a, 'w, 's> GizmoSurface<'a, 'w, 's> {
    pub fn new(
        gizmos: &'a mut Gizmos<'w, 's>,
        size: Vec2,
        background: Color,
        settings: &'a DisplaySettings,
    ) -> Self {
        Self {
            gizmos,
            size,
            background,
            settings,
        }
    }

    pub fn background(&self) -> Color {
        self.background
    }

    fn paint(&self, color: Color) -> Color {
        apply_filter(clamp_alpha(color), self.settings.contrast, self.settings.brightness)
    }
}

impl Surface for GizmoSurface<'_, '_, '_> {
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        if origin == Vec2::ZERO && size.cmpge(self.size).all() {
            self.background = composite(self.background, color);
            return;
        }
        let center = canvas_to_world(origin + size / 2.0, self.size);
        let color = self.paint(color);
        self.gizmos.rect_2d(center, size, color);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if !self.settings.show_stars {
            return;
        }
        let center = canvas_to_world(center, self.size);
        let color = self.paint(color);
        self.gizmos.circle_2d(center, radius, color);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        if !self.settings.show_constellations {
            return;
        }
        let (from, to) = (canvas_to_world(from, self.size), canvas_to_world(to, self.size));
        let color = self.paint(color);
        self.gizmos.line_2d(from, to, color);
    }
}

/// Replays the last frame, faded, then the current one, and sets the clear colour
pub(super) fn present_frame(
    draw_list: Res<DrawList>,
    settings: Res<DisplaySettings>,
    mut trail: ResMut<TrailState>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<&mut Camera, With<BackdropCamera>>,
    mut gizmos: Gizmos,
) {
    let Ok(window) = windows.single() else { return };
    let Ok(mut camera) = cameras.single_mut() else { return };

    if draw_list.is_empty() {
        // Unmounted: back to the bare backdrop.
        trail.background = settings.backdrop;
        trail.previous.clear();
    } else {
        let size = Vec2::new(window.width(), window.height());
        let keep = 1.0 - draw_list.fill_alpha().unwrap_or(1.0).clamp(0.0, 1.0);
        let mut surface = GizmoSurface::new(&mut gizmos, size, trail.background, &settings);
        trail.previous.faded(keep).replay(&mut surface);
        draw_list.replay(&mut surface);
        trail.background = surface.background();
        trail.previous = draw_list.clone();
    }

    camera.clear_color = ClearColorConfig::Custom(apply_filter(
        trail.background,
        settings.contrast,
        settings.brightness,
    ));
}

/// Applies the configured gizmo line width whenever the settings change
pub(super) fn apply_line_width(settings: Res<DisplaySettings>, mut config_store: ResMut<GizmoConfigStore>) {
    if !settings.is_changed() {
        return;
    }
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = settings.line_width;
}

/// Mounts or unmounts the field when the configured key is pressed
pub(super) fn toggle_field(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<DisplaySettings>,
    state: Res<State<FieldState>>,
    mut next_state: ResMut<NextState<FieldState>>,
) {
    if !keys.just_pressed(settings.key_toggle_field) {
        return;
    }
    let next = match state.get() {
        FieldState::Mounted => FieldState::Unmounted,
        FieldState::Unmounted => FieldState::Mounted,
    };
    info!("Toggling star field: {:?} -> {:?}", state.get(), next);
    next_state.set(next);
}
