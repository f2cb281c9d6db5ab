mod domain;
mod error;
mod formulas;
mod planner;
mod readiness;
mod server;
mod store;
mod watcher;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::{RwLock, broadcast};

use crate::domain::Profile;
use crate::server::{AppState, WsMessage};
use crate::watcher::{WatchConfig, watch_profile};

/// Readiness-adjusted load planning for strength training sessions.
#[derive(Parser, Debug)]
#[command(name = "loadmaster")]
#[command(about = "Plans workout sessions and prescribes daily training loads")]
#[command(version)]
struct Args {
    /// Path to the JSON profile holding exercises and sessions.
    /// Created with a starter profile if it does not exist.
    /// Can also be set via LOADMASTER_PROFILE environment variable.
    #[arg(value_name = "PROFILE", env = "LOADMASTER_PROFILE")]
    profile: PathBuf,

    /// Port number for the web server.
    /// Can also be set via LOADMASTER_PORT environment variable.
    #[arg(value_name = "PORT", env = "LOADMASTER_PORT", default_value = "8080")]
    port: u16,

    /// Seed a newly created profile with sample exercises and sessions.
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Parse command line arguments
    let args = Args::parse();

    // Load the profile, creating it on first run
    println!("Loading profile from: {}", args.profile.display());
    let profile = store::load_or_init(&args.profile, args.demo)
        .with_context(|| format!("Failed to load profile from {}", args.profile.display()))?;

    // Canonicalize after load_or_init so a freshly created file resolves too
    let profile_path = args
        .profile
        .canonicalize()
        .with_context(|| format!("Failed to resolve path: {}", args.profile.display()))?;

    print_profile_summary(&profile);

    // Create broadcast channel for WebSocket notifications
    let (ws_tx, _) = broadcast::channel::<WsMessage>(16);

    // Build application state
    let state = Arc::new(AppState {
        data: RwLock::new(profile),
        file_path: profile_path.clone(),
        ws_broadcast: ws_tx,
    });

    // Determine static directory (relative to executable or cwd)
    let static_dir = find_static_dir()?;
    println!();
    println!("Static files: {}", static_dir.display());

    // Spawn profile watcher
    let watcher_state = state.clone();
    let watcher_path = profile_path.clone();
    tokio::spawn(async move {
        let config = WatchConfig::default();
        let retry_config = config.clone();

        if let Err(e) = watch_profile(&watcher_path, config, move || {
            let state = watcher_state.clone();
            let config = retry_config.clone();
            tokio::spawn(async move {
                reload_with_retry(&state, &config).await;
            });
        })
        .await
        {
            log::error!("Profile watcher error: {}", e);
        }
    });

    // Start server
    println!();
    println!("Live reload enabled - watching for profile changes");
    server::run_server(state, args.port, static_dir).await?;

    Ok(())
}

/// Prints the startup summary of the loaded profile.
fn print_profile_summary(profile: &Profile) {
    println!();
    println!("=== Profile Summary ===");
    println!();
    println!(
        "Exercises: {} ({} with a recorded 1RM)",
        profile.exercise_count(),
        profile.recorded_count()
    );

    for exercise in profile.exercises() {
        if exercise.one_rm_kg > 0.0 {
            println!("{:20} {:6.1} kg", exercise.name, exercise.one_rm_kg);
        } else {
            println!("{:20} (no 1RM recorded)", exercise.name);
        }
    }

    println!();
    println!("Sessions: {}", profile.session_count());
    for session in profile.sessions() {
        println!(
            "{:30} {:2} exercises",
            session.name,
            session.exercises.len()
        );
    }
}

/// Reloads the profile with retry logic for transient failures.
///
/// Writes through the API also land here via the file watcher; the reload
/// keeps the in-memory profile and the file in sync either way.
async fn reload_with_retry(state: &AppState, config: &WatchConfig) {
    let mut last_error = None;

    for attempt in 0..config.retry_attempts {
        match store::load_profile(&state.file_path) {
            Ok(profile) => {
                let mut data = state.data.write().await;
                *data = profile;
                log::info!(
                    "Profile reloaded: {} exercises, {} sessions",
                    data.exercise_count(),
                    data.session_count()
                );
                drop(data);

                // Notify WebSocket clients
                let _ = state.ws_broadcast.send(WsMessage::DataUpdated);
                return;
            }
            Err(e) => {
                log::warn!("Reload attempt {} failed: {}", attempt + 1, e);
                last_error = Some(e);
                tokio::time::sleep(config.retry_delay).await;
            }
        }
    }

    // All retries failed
    if let Some(e) = last_error {
        log::error!(
            "Failed to reload profile after {} attempts: {}",
            config.retry_attempts,
            e
        );

        // Notify clients of error
        let _ = state
            .ws_broadcast
            .send(WsMessage::Error("Failed to reload profile".into()));
    }
}

/// Finds the static directory for serving frontend files.
fn find_static_dir() -> Result<PathBuf> {
    // Try relative to current working directory
    let cwd_static = PathBuf::from("static");
    if cwd_static.is_dir() {
        return Ok(cwd_static);
    }

    // Try relative to executable
    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let exe_static = exe_dir.join("static");
        if exe_static.is_dir() {
            return Ok(exe_static);
        }
    }

    // Default to cwd/static (will be created)
    Ok(cwd_static)
}
