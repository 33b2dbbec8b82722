use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::history::DEFAULT_RETENTION;
use crate::passage::WhitespaceMode;
use crate::policy::CheatPolicy;
use crate::theme::{CaretStyle, ThemeMode};

const BYTES_PER_MB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub theme: ThemeMode,
    pub caret: CaretStyle,
    pub auto_focus: bool,
    pub file_size_limit_mb: u64,
    pub history_retention: usize,
    pub palette: String,
    pub countdown_secs: u64,
    pub whitespace: WhitespaceMode,
    pub bell: bool,
    pub cheat_min_elapsed_secs: u64,
    pub cheat_max_wpm: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System,
            caret: CaretStyle::Underline,
            auto_focus: true,
            file_size_limit_mb: 1,
            history_retention: DEFAULT_RETENTION,
            palette: "default".to_string(),
            countdown_secs: 3,
            whitespace: WhitespaceMode::Collapse,
            bell: false,
            cheat_min_elapsed_secs: 5,
            cheat_max_wpm: 300,
        }
    }
}

impl Config {
    pub fn file_size_limit_bytes(&self) -> u64 {
        self.file_size_limit_mb.saturating_mul(BYTES_PER_MB)
    }

    pub fn cheat_policy(&self) -> CheatPolicy {
        CheatPolicy::new(
            Duration::from_secs(self.cheat_min_elapsed_secs),
            self.cheat_max_wpm,
        )
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> crate::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no config file, using defaults");
                return Config::default();
            }
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "malformed config, using defaults");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
