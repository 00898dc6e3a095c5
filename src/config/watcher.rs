//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself, so editors
//! that save by writing a temp file and renaming it over the original keep
//! triggering reloads. Events for other files in the directory are ignored,
//! and a reload that parses to the configuration already in effect is not
//! forwarded.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for updates to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let dir = watch_dir(&self.path);
        let mut reload = ReloadFilter::new(self.path.clone(), load_config(&self.path).ok());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Some(config) = reload.on_event(&event) {
                        let _ = tx.send(config);
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Turns raw filesystem events into distinct configuration updates.
struct ReloadFilter {
    path: PathBuf,
    current: Option<GatewayConfig>,
}

impl ReloadFilter {
    fn new(path: PathBuf, current: Option<GatewayConfig>) -> Self {
        Self { path, current }
    }

    fn on_event(&mut self, event: &Event) -> Option<GatewayConfig> {
        if !(event.kind.is_modify() || event.kind.is_create()) {
            return None;
        }
        if !event.paths.iter().any(|p| self.is_target(p)) {
            return None;
        }

        match load_config(&self.path) {
            Ok(config) if self.current.as_ref() == Some(&config) => {
                tracing::debug!(path = ?self.path, "Config unchanged, skipping reload");
                None
            }
            Ok(config) => {
                tracing::info!(path = ?self.path, "Config file change detected, reloading");
                self.current = Some(config.clone());
                Some(config)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                None
            }
        }
    }

    fn is_target(&self, changed: &Path) -> bool {
        changed.file_name().is_some() && changed.file_name() == self.path.file_name()
    }
}
