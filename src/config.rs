//! Project configuration stored in `.robocli/config.toml`
//!
//! All sections are optional with defaults, so a project without a config
//! file behaves like one with an empty file.

use crate::paths;
use crate::robot::RobotIdentity;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for robocli
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub robot: RobotSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotSection {
    /// Robot name, used to tag generated scenarios
    #[serde(default = "default_name")]
    pub name: String,
    /// Counter artifact handed to the robot project on scenario removal
    #[serde(default = "default_counter")]
    pub counter: String,
    /// Generated robot project directory, relative to the project root
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

fn default_name() -> String {
    "Robot".to_string()
}
fn default_counter() -> String {
    "RobotCounter".to_string()
}
fn default_root() -> PathBuf {
    PathBuf::from("robot")
}

impl Default for RobotSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            counter: default_counter(),
            root: default_root(),
        }
    }
}

impl CliConfig {
    /// Load config from `<project>/.robocli/config.toml`, or defaults if absent
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = paths::config_path(project_root);

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to `<project>/.robocli/config.toml`
    #[cfg(test)]
    pub fn save(&self, project_root: &Path) -> Result<()> {
        let path = paths::config_path(project_root);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Absolute robot project root for a project
    pub fn robot_root(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.robot.root)
    }

    pub fn robot_identity(&self) -> RobotIdentity {
        RobotIdentity {
            name: self.robot.name.clone(),
            counter: self.robot.counter.clone(),
        }
    }
}
