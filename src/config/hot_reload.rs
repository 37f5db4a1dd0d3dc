//! Hot-reloaded scoring config.
//!
//! On each `current()` call the file's modified time is checked and the
//! config reloaded if it changed. A file that fails to parse or validate
//! keeps the last good config in place.

use super::ScoringConfig;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::SystemTime,
};
use tracing::warn;

#[derive(Debug)]
pub struct HotReloadConfig {
    path: PathBuf,
    inner: RwLock<State>,
}

#[derive(Debug)]
struct State {
    config: Arc<ScoringConfig>,
    last_modified: Option<SystemTime>,
}

impl HotReloadConfig {
    /// Watch `path` (defaults to `config/scoring.toml` if `None`), starting from the seed.
    pub fn new(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(super::DEFAULT_TOML_PATH));
        Self {
            path,
            inner: RwLock::new(State {
                config: Arc::new(ScoringConfig::default()),
                last_modified: None,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Latest config, reloading if the file changed.
    pub fn current(&self) -> Arc<ScoringConfig> {
        let mtime = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(t) => t,
            // Missing file: keep whatever we have.
            Err(_) => return self.snapshot(),
        };

        {
            let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
            if guard.last_modified == Some(mtime) {
                return Arc::clone(&guard.config);
            }
        }

        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        // Double-check in case another reader reloaded first.
        if guard.last_modified != Some(mtime) {
            match ScoringConfig::load_from(&self.path) {
                Ok(cfg) => guard.config = Arc::new(cfg),
                Err(e) => {
                    warn!(target: "config", error = %e, path = %self.path.display(), "config reload failed, keeping previous");
                }
            }
            // Remember the mtime either way so a broken file isn't re-parsed every call.
            guard.last_modified = Some(mtime);
        }
        Arc::clone(&guard.config)
    }

    fn snapshot(&self) -> Arc<ScoringConfig> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io::Write, thread, time::Duration};

    #[test]
    fn loads_and_hot_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scoring.toml");

        {
            let mut f = fs::File::create(&path).unwrap();
            write!(f, "[weights]\nrating = 0.3\n").unwrap();
            f.sync_all().unwrap();
        }

        let hot = HotReloadConfig::new(Some(&path));
        let c1 = hot.current();
        assert!((c1.weights.rating - 0.3).abs() < 1e-9);

        // Ensure different mtime (coarse filesystem granularity).
        thread::sleep(Duration::from_millis(1100));

        {
            let mut f = fs::File::create(&path).unwrap();
            write!(f, "[weights]\nrating = 0.1\n").unwrap();
            f.sync_all().unwrap();
        }

        let c2 = hot.current();
        assert!((c2.weights.rating - 0.1).abs() < 1e-9);
    }

    #[test]
    fn broken_file_keeps_previous_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scoring.toml");
        fs::write(&path, "[tiers]\neconomy_min_value = 0.5\n").unwrap();

        let hot = HotReloadConfig::new(Some(&path));
        assert!((hot.current().tiers.economy_min_value - 0.5).abs() < 1e-9);

        thread::sleep(Duration::from_millis(1100));
        fs::write(&path, "[tiers]\nlower_quantile = 0.9\nupper_quantile = 0.1\n").unwrap();

        assert!((hot.current().tiers.economy_min_value - 0.5).abs() < 1e-9);
    }

    #[test]
    fn missing_file_uses_seed() {
        let hot = HotReloadConfig::new(Some(Path::new("__scoring_config_should_not_exist__.toml")));
        assert_eq!(*hot.current(), ScoringConfig::default());
    }
}
