use bevy::diagnostic::FrameCount;
use bevy::prelude::*;
use bevy::window::{CursorMoved, PrimaryWindow, WindowResized};
use starfield_macros::profile;

use crate::profile_log;

use super::config::FieldConfig;
use super::starfield::StarField;
use super::surface::DrawList;
use super::FieldState;

/// Ordering of the per-frame work while mounted.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum FieldSet {
    Listen,  // Pointer and resize messages into the viewport
    Animate, // Advance stars and record the frame
}

/// Count of frames the field has animated, across mounts.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct FrameStats {
    pub frames: u64,
    pub last_line_count: usize,
}

/// Mount/unmount and the frame loop. Needs `StatesPlugin`; has no rendering
/// dependency, so it runs headless.
pub struct ParticleFieldPlugin;

impl Plugin for ParticleFieldPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<FieldState>()
            .init_resource::<FieldConfig>()
            .init_resource::<DrawList>()
            .init_resource::<FrameStats>()
            .configure_sets(Update, (FieldSet::Listen, FieldSet::Animate).chain())
            .add_systems(OnEnter(FieldState::Mounted), mount_field)
            .add_systems(OnExit(FieldState::Mounted), unmount_field)
            .add_systems(
                Update,
                (
                    (track_pointer, track_resize).in_set(FieldSet::Listen),
                    animate_field.in_set(FieldSet::Animate),
                )
                    .run_if(in_state(FieldState::Mounted).and(resource_exists::<StarField>)),
            );
    }
}

/// Size the field to the primary window and populate it. Without a window
/// there is nothing to draw into and the field stays absent.
pub(super) fn mount_field(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<FieldConfig>,
) {
    let Ok(window) = windows.single() else {
        debug!("No primary window; star field not mounted");
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    let field = StarField::new(config.clone(), size);
    info!(
        "Star field mounted: {} stars on {}x{} surface",
        field.stars().len(),
        size.x,
        size.y
    );
    commands.insert_resource(field);
}

/// Release the field. Listener and frame systems stop with it.
pub(super) fn unmount_field(mut commands: Commands, mut draw_list: ResMut<DrawList>) {
    commands.remove_resource::<StarField>();
    draw_list.clear();
    info!("Star field unmounted");
}

/// Copies the latest raw pointer position on the primary window into the viewport
pub(super) fn track_pointer(
    mut field: ResMut<StarField>,
    mut cursor_moved: MessageReader<CursorMoved>,
    primary: Query<Entity, With<PrimaryWindow>>,
) {
    let Ok(primary) = primary.single() else { return };
    if let Some(last) = cursor_moved.read().filter(|m| m.window == primary).last() {
        field.set_target(last.position);
    }
}

/// Follows primary window resizes without moving any star
pub(super) fn track_resize(
    mut field: ResMut<StarField>,
    mut resized: MessageReader<WindowResized>,
    primary: Query<Entity, With<PrimaryWindow>>,
) {
    let Ok(primary) = primary.single() else { return };
    for message in resized.read().filter(|m| m.window == primary) {
        let size = Vec2::new(message.width, message.height);
        if field.viewport().size != size {
            debug!("Star field surface resized to {}x{}", size.x, size.y);
        }
        field.resize(size);
    }
}

/// Advances the field one frame and records its draw calls
#[profile(2)]
pub(super) fn animate_field(
    mut field: ResMut<StarField>,
    mut draw_list: ResMut<DrawList>,
    mut stats: ResMut<FrameStats>,
    #[allow(unused_variables)] frame: Res<FrameCount>,
) {
    let now_ms = chrono::Utc::now().timestamp_millis() as f64;

    draw_list.clear();
    let lines = field.step(now_ms, &mut *draw_list);

    stats.frames += 1;
    stats.last_line_count = lines;
    profile_log!(frame, "Star field frame {}: {} constellation lines", stats.frames, lines);
}
