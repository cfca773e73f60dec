use crate::app_dirs::AppDirs;
use crate::session::SessionType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// batons per 8-Meter session
    pub standard_target: u32,
    /// throws allowed to clear the pitch
    pub pitch_throw_budget: u32,
    /// kubbs to knock down in an Inkast Blast session
    pub inkast_target: u32,
    pub inkast_field_size: u32,
    pub watch_sync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            standard_target: 30,
            pitch_throw_budget: 21,
            inkast_target: 30,
            inkast_field_size: 10,
            watch_sync: true,
        }
    }
}

impl Config {
    /// `(target, target_score)` for a new session of the given type
    pub fn targets_for(&self, session_type: SessionType) -> (u32, Option<u32>) {
        match session_type {
            SessionType::Standard => (self.standard_target, None),
            SessionType::AroundThePitch => (
                crate::modes::around_the_pitch::PITCH_PIECES,
                Some(self.pitch_throw_budget),
            ),
            SessionType::InkastBlast => (self.inkast_target, Some(self.inkast_field_size)),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("kubb_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}
