//! Config file watcher driving downstream hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::RelayConfig;

/// Watches one TOML file and forwards each new, valid [`RelayConfig`].
///
/// Editors often fire several events per save; a config equal to the last
/// one forwarded (or to the file's contents when watching began) is dropped.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RelayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for reloaded configs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RelayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching on notify's background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let mut last = load_config(&path).ok();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let loaded = match load_config(&path) {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::error!(
                                path = ?path,
                                error = %e,
                                "Rejected config change, keeping current configuration"
                            );
                            return;
                        }
                    };

                    if let Some(config) = next_update(&mut last, loaded) {
                        tracing::info!(
                            path = ?path,
                            downstream = %config.downstream.endpoint(),
                            "Config file changed, reloading"
                        );
                        let _ = tx.send(config);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Returns `loaded` if it differs from the last config seen, remembering it.
fn next_update(last: &mut Option<RelayConfig>, loaded: RelayConfig) -> Option<RelayConfig> {
    if last.as_ref() == Some(&loaded) {
        return None;
    }
    *last = Some(loaded.clone());
    Some(loaded)
}
