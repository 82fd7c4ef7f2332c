use bevy::prelude::*;

use bevy::window::WindowResolution;

use starfield::field::StarfieldPlugin;

use bevy::log::LogPlugin;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILES_KEPT: usize = 25;

/// Log to a timestamped file under `logs/` and to stdout. Returns the file
/// path, or `None` when the directory could not be created and only stdout
/// is in use.
fn setup_logging() -> Option<String> {
    let log_dir = PathBuf::from("logs");
    let file_ok = fs::create_dir_all(&log_dir).is_ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wgpu=error,bevy_render=info,starfield=info"));

    if !file_ok {
        let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
        tracing_subscriber::registry().with(filter).with(stdout_layer).init();
        return None;
    }

    cleanup_old_logs(&log_dir, LOG_FILES_KEPT);

    let now = chrono::Local::now();
    let log_filename = format!("starfield_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path = log_dir.join(&log_filename).to_string_lossy().to_string();

    // One file per run; never rotated.
    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);
    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Some(log_path)
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else { return };
    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .map(|s| s.starts_with("starfield") && s.ends_with(".log"))
                .unwrap_or(false)
        })
        .collect();

    // Oldest first
    log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

    if log_files.len() > keep_count {
        for file in log_files.iter().take(log_files.len() - keep_count) {
            let _ = fs::remove_file(file.path());
        }
    }
}

fn main() {
    match setup_logging() {
        Some(log_file) => info!("Logging to {}", log_file),
        None => warn!("Could not create logs/; logging to stdout only"),
    }

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Starfield".into(),
                        resolution: WindowResolution::new(1280, 720),
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .build()
                .disable::<LogPlugin>(),
        )
        .add_plugins(StarfieldPlugin)
        .run();
}
