// SPDX-License-Identifier: MIT OR Apache-2.0
//! Storyworld Editor - object tree editor for interactive fiction worlds
//!
//! Each world object (actor, item or scenery) is one editable row:
//! - Name and description fields
//! - Kind selection
//! - Delete
//! - Drag and drop to reorder or reparent
//!
//! ## Usage
//!
//! `storyworld_editor [SETTINGS]` reads the RON settings file given, or
//! `storyworld_editor.ron` in the working directory. Missing settings fall
//! back to defaults.

mod app;
mod panels;
mod settings;

use app::EditorApp;
use settings::{EditorSettings, SETTINGS_FILE_NAME};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let settings_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(SETTINGS_FILE_NAME), PathBuf::from);

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["storyworld_editor_app=debug", "wgpu=warn", "naga=warn"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    // Load errors are reported once the subscriber is up
    let settings = EditorSettings::load(&settings_path);
    if let Ok(Some(directive)) = settings.as_ref().map(|s| s.log_filter.as_deref()) {
        match directive.parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring log filter {directive:?}: {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Storyworld Editor v{}", env!("CARGO_PKG_VERSION"));

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let settings = EditorSettings::default();
            match settings.save(&settings_path) {
                Ok(()) => tracing::info!("Wrote default settings to {:?}", settings_path),
                Err(e) => tracing::debug!("Could not write default settings: {}", e),
            }
            settings
        }
        Err(e) => {
            tracing::warn!("Ignoring settings file {:?}: {}", settings_path, e);
            EditorSettings::default()
        }
    };

    if let Err(e) = EditorApp::run(settings) {
        tracing::error!("Editor crashed: {e}");
        std::process::exit(1);
    }
}
