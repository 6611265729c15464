//! Filesystem scaffold of a robot project.
//!
//! Layout (see `paths::robot`):
//! ```text
//! robot/
//! ├── applications/<app>/application.toml
//! ├── applications/<app>/models/<model>.toml
//! ├── scenarios/<scenario>.feature
//! └── <counter>.counter
//! ```

use super::{RobotIdentity, RobotProject};
use crate::paths;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Header line binding a feature file to its application
const APPLICATION_MARKER: &str = "# robocli:application=";

#[derive(Debug, Serialize, Deserialize)]
struct ApplicationManifest {
    name: String,
    url: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelManifest {
    name: String,
    fields: Vec<String>,
    #[serde(default)]
    results: Vec<String>,
}

/// Robot project rooted at a directory
#[derive(Debug, Clone)]
pub struct ScaffoldProject {
    root: PathBuf,
}

impl ScaffoldProject {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn feature_application(path: &Path) -> Option<String> {
        let content = fs::read_to_string(path).ok()?;
        content
            .lines()
            .next()?
            .strip_prefix(APPLICATION_MARKER)
            .map(|s| s.trim().to_string())
    }
}

impl RobotProject for ScaffoldProject {
    fn add_application(&mut self, name: &str, url: &str) -> Result<()> {
        let manifest = ApplicationManifest {
            name: name.to_string(),
            url: url.to_string(),
        };
        write_toml(&paths::robot::application_manifest(&self.root, name), &manifest)
    }

    fn remove_application(&mut self, name: &str) -> Result<()> {
        let bound: Vec<String> = self
            .scenarios()?
            .into_iter()
            .filter(|scenario| {
                Self::feature_application(&paths::robot::scenario_path(&self.root, scenario))
                    .as_deref()
                    == Some(name)
            })
            .collect();
        for scenario in bound {
            remove_file_if_exists(&paths::robot::scenario_path(&self.root, &scenario))?;
        }

        let dir = paths::robot::application_dir(&self.root, name);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", dir.display())),
        }
    }

    fn add_scenario(
        &mut self,
        name: &str,
        description: &str,
        application: &str,
        robot_name: &str,
    ) -> Result<()> {
        let path = paths::robot::scenario_path(&self.root, name);
        let content = format!(
            "{}{}\n@{}\nFeature: {}\n  {}\n",
            APPLICATION_MARKER, application, robot_name, name, description
        );
        write_file(&path, &content)
    }

    fn remove_scenario(&mut self, name: &str, robot: &RobotIdentity) -> Result<()> {
        remove_file_if_exists(&paths::robot::scenario_path(&self.root, name))?;

        let counter = paths::robot::counter_path(&self.root, &robot.counter);
        let content = match fs::read_to_string(&counter) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", counter.display()))
            }
        };
        let kept: String = content
            .lines()
            .filter(|line| line.trim() != name)
            .map(|line| format!("{}\n", line))
            .collect();
        write_file(&counter, &kept)
    }

    fn add_model(
        &mut self,
        application: &str,
        name: &str,
        fields: &[String],
        results: &[String],
    ) -> Result<()> {
        if !paths::robot::application_dir(&self.root, application).is_dir() {
            bail!("Application [{}] is not part of the robot project", application);
        }
        let manifest = ModelManifest {
            name: name.to_string(),
            fields: fields.to_vec(),
            results: results.to_vec(),
        };
        write_toml(&paths::robot::model_path(&self.root, application, name), &manifest)
    }

    fn remove_model(&mut self, application: &str, name: &str) -> Result<()> {
        remove_file_if_exists(&paths::robot::model_path(&self.root, application, name))
    }

    fn applications(&self) -> Result<Vec<String>> {
        let dir = paths::robot::applications_dir(&self.root);
        let mut names = Vec::new();
        for entry in read_dir_or_empty(&dir)? {
            if entry.is_dir() {
                if let Some(name) = entry.file_name() {
                    names.push(name.to_string_lossy().to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn scenarios(&self) -> Result<Vec<String>> {
        list_stems(&paths::robot::scenarios_dir(&self.root), "feature")
    }

    fn applications_with_models(&self) -> Result<Vec<String>> {
        let mut with_models = Vec::new();
        for application in self.applications()? {
            if !self.models(&application)?.is_empty() {
                with_models.push(application);
            }
        }
        Ok(with_models)
    }

    fn models(&self, application: &str) -> Result<Vec<String>> {
        list_stems(&paths::robot::models_dir(&self.root, application), "toml")
    }
}

// =============================================================================
// File helpers
// =============================================================================

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = toml::to_string_pretty(value)?;
    write_file(path, &content)
}

fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

fn read_dir_or_empty(dir: &Path) -> Result<Vec<PathBuf>> {
    match fs::read_dir(dir) {
        Ok(entries) => Ok(entries.filter_map(|e| e.ok()).map(|e| e.path()).collect()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to list {}", dir.display())),
    }
}

fn list_stems(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = read_dir_or_empty(dir)?
        .into_iter()
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == extension))
        .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
        .collect();
    names.sort();
    Ok(names)
}
