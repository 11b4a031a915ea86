//! Configuration file watcher for hot-reload support

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::GestureConfig;

/// Delay between a file event and the reload, so partial writes settle
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(100);

/// Watches the gesture config and delivers every valid new version
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<GestureConfig>,
}

impl ConfigWatcher {
    /// Load `config_path` and start watching it
    pub async fn new(config_path: String) -> Result<(Self, Arc<GestureConfig>)> {
        let (tx, rx) = mpsc::channel(10);

        let initial_config = GestureConfig::load(&config_path)
            .await
            .context("Failed to load initial config")?;
        let initial_config = Arc::new(initial_config);

        let config_path_clone = config_path.clone();

        // notify callbacks run on their own OS thread, outside the runtime
        let runtime_handle = tokio::runtime::Handle::current();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        return;
                    }
                    debug!("Config file changed: {:?}", event.paths);

                    let config_path = config_path_clone.clone();
                    let tx = tx.clone();

                    runtime_handle.spawn(async move {
                        tokio::time::sleep(RELOAD_DEBOUNCE).await;

                        match GestureConfig::load(&config_path).await {
                            Ok(new_config) => {
                                info!("Configuration reloaded successfully");
                                if let Err(e) = tx.send(new_config).await {
                                    error!("Failed to send config update: {}", e);
                                }
                            }
                            Err(e) => {
                                warn!("Failed to reload config (keeping old config): {:#}", e);
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("Watch error: {}", e);
                }
            }
        })?;

        watcher
            .watch(Path::new(&config_path), RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config file: {}", config_path))?;

        info!("Config file watcher started for: {}", config_path);

        Ok((
            Self {
                _watcher: watcher,
                rx,
            },
            initial_config,
        ))
    }

    /// Wait for the next valid config
    ///
    /// Returns None once the watcher has shut down.
    pub async fn next_config(&mut self) -> Option<GestureConfig> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_watcher_reloads() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("gestures.yaml");

        fs::write(&config_path, "container_width: 800\ncarousel:\n  slides: 3\n")?;

        let (mut watcher, config) =
            ConfigWatcher::new(config_path.to_string_lossy().to_string()).await?;

        assert_eq!(config.container_width, 800.0);
        assert_eq!(config.carousel.slides, 3);

        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(&config_path, "container_width: 1200\ncarousel:\n  slides: 7\n")?;

        let new_config =
            tokio::time::timeout(Duration::from_secs(2), watcher.next_config()).await?;

        // Some platforms coalesce or drop events for quick rewrites
        if let Some(new_config) = new_config {
            assert_eq!(new_config.container_width, 1200.0);
            assert_eq!(new_config.carousel.slides, 7);
        }

        Ok(())
    }
}
