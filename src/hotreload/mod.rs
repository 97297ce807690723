//! Hot-reload of the encounter config file.
//!
//! - Uses `notify` for filesystem events on the config directory
//! - Re-validates the file before accepting it
//! - A valid config lands in `ActiveConfig`; the next new game picks it up
//! - An invalid config is reported and the previous one stays active

use bevy::prelude::*;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Mutex;

use crate::config::{ConfigError, EncounterConfig, DEFAULT_CONFIG_PATH};

pub struct HotReloadPlugin {
    pub path: PathBuf,
}

impl Default for HotReloadPlugin {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}

impl Plugin for HotReloadPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(HotReloadState {
            watched_file: Some(self.path.clone()),
            ..default()
        })
        .add_event::<ConfigReloadEvent>()
        .add_systems(Startup, setup_config_watcher)
        .add_systems(Update, process_config_changes);
    }
}

/// Hot-reload state tracking
#[derive(Resource, Default, Debug)]
pub struct HotReloadState {
    pub enabled: bool,
    pub watched_file: Option<PathBuf>,
    pub reload_count: u32,
    pub last_reload_success: bool,
    pub last_reload_time: f64,
    pub last_error: Option<String>,
}

/// Last config that loaded and validated
#[derive(Resource, Debug, Clone)]
pub struct ActiveConfig(pub EncounterConfig);

/// Outcome of one reload. `config` is set exactly when `success` is.
#[derive(Event, Debug, Clone)]
pub struct ConfigReloadEvent {
    pub path: PathBuf,
    pub success: bool,
    pub error: Option<String>,
    pub config: Option<EncounterConfig>,
}

#[derive(Resource)]
struct WatcherResource {
    _watcher: RecommendedWatcher,
    receiver: Mutex<Receiver<notify::Result<Event>>>,
}

fn setup_config_watcher(mut commands: Commands, mut state: ResMut<HotReloadState>) {
    let Some(config_path) = state.watched_file.clone() else {
        return;
    };

    if !config_path.exists() {
        tracing::warn!(path = %config_path.display(), "config file not found, hot-reload disabled");
        state.enabled = false;
        return;
    }

    let (tx, rx) = channel::<notify::Result<Event>>();
    let mut watcher = match notify::recommended_watcher(tx) {
        Ok(w) => w,
        Err(e) => {
            tracing::error!(error = %e, "failed to create file watcher");
            state.enabled = false;
            return;
        }
    };

    let dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if let Err(e) = watcher.watch(dir, RecursiveMode::NonRecursive) {
        tracing::error!(error = %e, "failed to watch config directory");
        state.enabled = false;
        return;
    }

    state.enabled = true;
    commands.insert_resource(WatcherResource {
        _watcher: watcher,
        receiver: Mutex::new(rx),
    });

    tracing::info!(path = %config_path.display(), "hot-reload enabled");
}

fn process_config_changes(
    mut commands: Commands,
    watcher: Option<Res<WatcherResource>>,
    mut state: ResMut<HotReloadState>,
    mut events: EventWriter<ConfigReloadEvent>,
    time: Res<Time>,
) {
    let Some(watcher) = watcher else {
        return;
    };
    let Some(path) = state.watched_file.clone() else {
        return;
    };

    // Coalesce bursts of filesystem events into one reload
    let mut changed = false;
    {
        let Ok(receiver) = watcher.receiver.lock() else {
            tracing::warn!("config watcher channel poisoned");
            return;
        };
        while let Ok(result) = receiver.try_recv() {
            match result {
                Ok(event) => changed |= is_config_modify_event(&event, &path),
                Err(e) => tracing::warn!(error = %e, "file watcher error"),
            }
        }
    }
    if !changed {
        return;
    }

    tracing::info!("config file modified, reloading");
    let outcome = reload_config(&path);
    let event = record_reload(&mut state, &path, time.elapsed_secs_f64(), &outcome);
    if let Ok(config) = outcome {
        commands.insert_resource(ActiveConfig(config));
    }
    events.send(event);
}

/// Update the reload bookkeeping and build the event to broadcast
fn record_reload(
    state: &mut HotReloadState,
    path: &Path,
    now: f64,
    outcome: &Result<EncounterConfig, ConfigError>,
) -> ConfigReloadEvent {
    match outcome {
        Ok(config) => {
            state.reload_count += 1;
            state.last_reload_success = true;
            state.last_reload_time = now;
            state.last_error = None;
            tracing::info!(count = state.reload_count, "config reloaded");
            ConfigReloadEvent {
                path: path.to_path_buf(),
                success: true,
                error: None,
                config: Some(config.clone()),
            }
        }
        Err(e) => {
            let msg = e.to_string();
            state.last_reload_success = false;
            state.last_error = Some(msg.clone());
            tracing::error!(error = %msg, "config reload failed");
            ConfigReloadEvent {
                path: path.to_path_buf(),
                success: false,
                error: Some(msg),
                config: None,
            }
        }
    }
}

fn is_config_modify_event(event: &Event, watched: &Path) -> bool {
    let Some(name) = watched.file_name() else {
        return false;
    };
    let relevant_kind =
        event.kind.is_modify() || matches!(event.kind, notify::EventKind::Create(_));
    relevant_kind && event.paths.iter().any(|p| p.file_name() == Some(name))
}

/// Load and validate the config from disk
pub fn reload_config(path: &Path) -> Result<EncounterConfig, ConfigError> {
    EncounterConfig::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn modify_event(path: &str) -> Event {
        Event {
            kind: notify::EventKind::Modify(notify::event::ModifyKind::Data(
                notify::event::DataChange::Any,
            )),
            paths: vec![PathBuf::from(path)],
            attrs: Default::default(),
        }
    }

    #[test]
    fn test_reload_valid_config() {
        let mut file = Builder::new().suffix(".ron").tempfile().unwrap();
        write!(file, "(seed: 77, boss: (max_health: 300))").unwrap();
        let config = reload_config(file.path()).unwrap();
        assert_eq!(config.seed, 77);
        assert_eq!(config.boss.max_health, 300);
    }

    #[test]
    fn test_reload_rejects_invalid_config() {
        let mut file = Builder::new().suffix(".ron").tempfile().unwrap();
        write!(file, "(grid: (spacing: -1.0))").unwrap();
        assert!(matches!(reload_config(file.path()), Err(ConfigError::Invalid(_))));

        let mut broken = Builder::new().suffix(".json").tempfile().unwrap();
        write!(broken, "{{not json").unwrap();
        assert!(matches!(reload_config(broken.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_record_reload_tracks_outcome() {
        let mut state = HotReloadState::default();
        let path = Path::new("config/encounter.ron");

        let ok = record_reload(&mut state, path, 1.5, &Ok(EncounterConfig::default()));
        assert!(ok.success);
        assert_eq!(ok.config, Some(EncounterConfig::default()));
        assert_eq!(state.reload_count, 1);
        assert!(state.last_reload_success);

        let bad = record_reload(
            &mut state,
            path,
            2.0,
            &Err(ConfigError::Invalid("bad".to_string())),
        );
        assert!(!bad.success);
        assert!(bad.config.is_none());
        assert_eq!(state.reload_count, 1);
        assert!(!state.last_reload_success);
        assert!(state.last_error.as_deref().unwrap().contains("bad"));
    }

    #[test]
    fn test_is_config_modify_event() {
        let watched = Path::new("config/encounter.ron");
        assert!(is_config_modify_event(
            &modify_event("/abs/config/encounter.ron"),
            watched
        ));
        assert!(!is_config_modify_event(&modify_event("config/other.ron"), watched));
    }
}
