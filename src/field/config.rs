use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};

const FIELD_CONFIG_PATH: &str = "assets/field_config.ron";

/// Static field parameters, read once at startup. Changing these only takes
/// effect on the next mount.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    // Population
    pub star_count: usize,
    pub max_star_size: f32,
    pub max_drift_speed: f32,
    pub max_pulse_speed: f32,
    /// Fixed RNG seed; `None` seeds from the OS on every mount.
    pub seed: Option<u64>,

    // Pointer interaction
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    pub return_rate: f32,
    pub cursor_smoothing: f32,
    /// Repel from the eased cursor instead of the raw pointer position.
    pub repel_from_smoothed_cursor: bool,

    // Appearance
    pub pulse_amplitude: f32,
    pub link_distance: f32,
    pub link_alpha: f32,
    pub trail_rgb: [u8; 3],
    pub trail_alpha: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            star_count: 400,
            max_star_size: 0.8,
            max_drift_speed: 0.05,
            max_pulse_speed: 0.01,
            seed: None,
            repulsion_radius: 200.0,
            repulsion_strength: 2.0,
            return_rate: 0.05,
            cursor_smoothing: 0.1,
            repel_from_smoothed_cursor: false,
            pulse_amplitude: 0.005,
            link_distance: 50.0,
            link_alpha: 0.05,
            trail_rgb: [17, 24, 39],
            trail_alpha: 0.9,
        }
    }
}

impl FieldConfig {
    /// Parse a RON document, falling back to defaults when it is malformed.
    pub fn from_ron_or_default(contents: &str) -> Self {
        match ron::from_str::<FieldConfig>(contents) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to parse field config: {}", e);
                error!("Using default FieldConfig");
                Self::default()
            }
        }
    }

    pub fn trail_color(&self) -> Color {
        let [r, g, b] = self.trail_rgb;
        Color::srgba(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            self.trail_alpha,
        )
    }
}

/// Display settings that can be hot-reloaded while the field is running.
#[derive(Deserialize, Serialize, Asset, TypePath, Clone, Debug)]
pub struct DisplayConfig {
    pub key_toggle_field: KeyCode,
    pub show_stars: bool,
    pub show_constellations: bool,
    pub line_width: f32,
    pub backdrop_rgb: [u8; 3],
    /// CSS-style `contrast()` applied to everything the field draws.
    pub contrast: f32,
    /// CSS-style `brightness()`, applied after contrast.
    pub brightness: f32,
}

#[derive(Resource)]
pub struct DisplayConfigHandle(pub Handle<DisplayConfig>);

/// The display settings currently in effect. Starts at defaults and follows
/// `display_config.ron` once it has loaded.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct DisplaySettings {
    pub key_toggle_field: KeyCode,
    pub show_stars: bool,
    pub show_constellations: bool,
    pub line_width: f32,
    pub backdrop: Color,
    pub contrast: f32,
    pub brightness: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            key_toggle_field: KeyCode::F2,
            show_stars: true,
            show_constellations: true,
            line_width: 1.0,
            backdrop: Color::srgb_u8(0x0f, 0x17, 0x2a),
            contrast: 1.2,
            brightness: 0.8,
        }
    }
}

impl From<&DisplayConfig> for DisplaySettings {
    fn from(config: &DisplayConfig) -> Self {
        let [r, g, b] = config.backdrop_rgb;
        Self {
            key_toggle_field: config.key_toggle_field,
            show_stars: config.show_stars,
            show_constellations: config.show_constellations,
            line_width: config.line_width,
            backdrop: Color::srgb_u8(r, g, b),
            contrast: config.contrast,
            brightness: config.brightness,
        }
    }
}

pub struct FieldConfigPlugin;

impl Plugin for FieldConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<DisplayConfig>::new(&["display_config.ron"]))
            .init_resource::<DisplaySettings>()
            .add_systems(Startup, (load_field_config, setup_display_config).chain())
            .add_systems(Update, apply_display_config);
    }
}

/// Load the static field configuration synchronously so it is in place
/// before the first mount.
fn load_field_config(mut commands: Commands) {
    match std::fs::read_to_string(FIELD_CONFIG_PATH) {
        Ok(contents) => {
            let config = FieldConfig::from_ron_or_default(&contents);
            info!("Loaded field config from {}", FIELD_CONFIG_PATH);
            commands.insert_resource(config);
        }
        Err(e) => {
            error!("Failed to read {}: {}", FIELD_CONFIG_PATH, e);
            error!("Using default FieldConfig");
            commands.insert_resource(FieldConfig::default());
        }
    }
}

/// Starts the asynchronous load of the hot-reloadable display config
fn setup_display_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load("display_config.ron");
    commands.insert_resource(DisplayConfigHandle(handle));
}

/// Copies a loaded, added or edited `DisplayConfig` into `DisplaySettings`
pub(super) fn apply_display_config(
    config_handle: Option<Res<DisplayConfigHandle>>,
    display_configs: Res<Assets<DisplayConfig>>,
    mut settings: ResMut<DisplaySettings>,
    mut events: MessageReader<AssetEvent<DisplayConfig>>,
) {
    let Some(config_handle) = config_handle else { return };
    for event in events.read() {
        let id = config_handle.0.id();
        if event.is_added(id) || event.is_modified(id) || event.is_loaded_with_dependencies(id) {
            if let Some(config) = display_configs.get(&config_handle.0) {
                *settings = DisplaySettings::from(config);
                info!("Applied display config: {:?}", *settings);
            }
        }
    }
}
