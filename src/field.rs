use bevy::prelude::*;

pub mod config;
pub mod lifecycle;
pub mod render;
pub mod star;
pub mod starfield;
pub mod surface;

use config::FieldConfigPlugin;
use lifecycle::ParticleFieldPlugin;
use render::FieldRenderPlugin;

pub use star::Star;
pub use starfield::{StarField, Viewport};
pub use surface::{DrawCall, DrawList, Surface};

/// Whether the animated background is attached to the window.
///
/// Entering `Mounted` creates the star field and starts its listeners and
/// frame loop; leaving it tears all of them down.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldState {
    #[default]
    Unmounted,
    Mounted,
}

/// Everything the windowed application needs: config files, the field
/// lifecycle and on-screen presentation.
pub struct StarfieldPlugin;

impl Plugin for StarfieldPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((FieldConfigPlugin, ParticleFieldPlugin, FieldRenderPlugin))
            .add_systems(PostStartup, request_mount);
    }
}

fn request_mount(mut next_state: ResMut<NextState<FieldState>>) {
    info!("Mounting star field");
    next_state.set(FieldState::Mounted);
}
