//! Profile file watching for automatic reload.
//!
//! Watches the profile JSON for modifications (hand edits, sync tools
//! replacing the file) and fires a reload callback once the file has been
//! quiet for a short period, so a burst of writes collapses into a single
//! reload.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::timeout_at;

/// Configuration for profile watching and reload retries.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// How long the file must stay quiet before a reload fires.
    pub quiet_period: Duration,
    /// Number of reload attempts before giving up on a change.
    pub retry_attempts: u32,
    /// Delay between reload attempts.
    pub retry_delay: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(750),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Errors that can occur during profile watching.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Failed to create watcher: {0}")]
    Notify(#[from] notify::Error),

    #[error("Watch path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Event channel closed unexpectedly")]
    ChannelClosed,
}

/// Returns true for event kinds that can change the profile's content.
fn is_content_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Returns true when the event touches the watched file.
fn touches_file(event: &Event, file_name: &OsStr) -> bool {
    event.paths.iter().any(|p| p.file_name() == Some(file_name))
}

/// Watches the profile file and calls `on_change` after each burst of
/// modifications.
///
/// The parent directory is watched non-recursively; watching the file
/// itself breaks when editors or sync tools replace it wholesale. Events
/// for other files in the directory are ignored. A reload only fires once
/// the file has been quiet for `config.quiet_period`, measured from the
/// last relevant event.
///
/// Runs until the watcher fails or the event channel closes.
pub async fn watch_profile<F>(
    path: impl AsRef<Path>,
    config: WatchConfig,
    on_change: F,
) -> Result<(), WatchError>
where
    F: Fn() + Send + Sync + 'static,
{
    let path = path.as_ref();

    if !path.exists() {
        return Err(WatchError::PathNotFound(path.to_path_buf()));
    }

    let canonical = path
        .canonicalize()
        .map_err(|_| WatchError::PathNotFound(path.to_path_buf()))?;
    let watch_dir = canonical.parent().unwrap_or(&canonical).to_path_buf();
    let file_name = canonical
        .file_name()
        .map(|n| n.to_owned())
        .ok_or_else(|| WatchError::PathNotFound(canonical.clone()))?;

    log::info!("Watching profile: {}", canonical.display());
    log::debug!("Watch directory: {}", watch_dir.display());

    let (tx, mut rx) = mpsc::channel::<Event>(64);

    let mut watcher = RecommendedWatcher::new(
        move |result: Result<Event, notify::Error>| {
            if let Ok(event) = result {
                // Non-blocking send; a full channel just drops the event
                let _ = tx.try_send(event);
            }
        },
        notify::Config::default(),
    )?;
    watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

    loop {
        // Wait for the first relevant event of a burst
        let Some(event) = rx.recv().await else {
            return Err(WatchError::ChannelClosed);
        };
        if !(is_content_event(&event.kind) && touches_file(&event, &file_name)) {
            continue;
        }
        log::debug!("Profile event: {:?}", event.kind);

        // Absorb follow-up events until the file has been quiet long enough
        let mut deadline = tokio::time::Instant::now() + config.quiet_period;
        loop {
            match timeout_at(deadline, rx.recv()).await {
                Ok(Some(event)) => {
                    if is_content_event(&event.kind) && touches_file(&event, &file_name) {
                        deadline = tokio::time::Instant::now() + config.quiet_period;
                    }
                }
                Ok(None) => return Err(WatchError::ChannelClosed),
                Err(_) => break,
            }
        }

        log::info!("Profile file changed, triggering reload");
        on_change();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

    #[test]
    fn test_content_event_kinds() {
        assert!(is_content_event(&EventKind::Create(CreateKind::Any)));
        assert!(is_content_event(&EventKind::Modify(ModifyKind::Any)));
        assert!(is_content_event(&EventKind::Remove(RemoveKind::Any)));
        assert!(!is_content_event(&EventKind::Access(AccessKind::Any)));
        assert!(!is_content_event(&EventKind::Any));
    }

    #[test]
    fn test_events_filtered_by_file_name() {
        let event = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/data/profile.json"));

        assert!(touches_file(&event, OsStr::new("profile.json")));
        assert!(!touches_file(&event, OsStr::new("other.json")));
    }

    #[test]
    fn test_event_without_paths_is_ignored() {
        let event = Event::new(EventKind::Modify(ModifyKind::Any));
        assert!(!touches_file(&event, OsStr::new("profile.json")));
    }

    #[test]
    fn test_watch_config_default() {
        let config = WatchConfig::default();
        assert_eq!(config.quiet_period, Duration::from_millis(750));
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_missing_path_is_rejected() {
        let result = watch_profile("/no/such/profile.json", WatchConfig::default(), || {}).await;
        assert!(matches!(result, Err(WatchError::PathNotFound(_))));
    }
}
