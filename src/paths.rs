//! Single source of truth for the robocli filesystem layout.
//!
//! This module defines WHERE data lives. It has no I/O, no validation,
//! no business logic. One file shows the entire filesystem layout.
//!
//! # Project Paths (project/.robocli/)
//!
//! ```text
//! project/.robocli/
//! ├── config.toml              # Robot identity and generated project root
//! ├── applications/            # One descriptor per application
//! │   └── <name>.json
//! └── scenarios/               # One descriptor per scenario
//!     └── <name>.json
//! ```
//!
//! # Robot Paths (project/<robot root>/)
//!
//! ```text
//! robot/
//! ├── applications/<app>/application.toml
//! ├── applications/<app>/models/<model>.toml
//! ├── scenarios/<scenario>.feature
//! └── <counter>.counter
//! ```

use std::path::{Path, PathBuf};

/// Descriptor file extension (without the dot).
pub const DESCRIPTOR_EXTENSION: &str = "json";

/// Descriptor directory: `<project>/.robocli/`
pub fn cli_files_dir(project_root: &Path) -> PathBuf {
    project_root.join(".robocli")
}

/// Project config: `<project>/.robocli/config.toml`
pub fn config_path(project_root: &Path) -> PathBuf {
    cli_files_dir(project_root).join("config.toml")
}

/// Descriptor file name for an entity: `<name>.json`
pub fn descriptor_file_name(name: &str) -> String {
    format!("{}.{}", name, DESCRIPTOR_EXTENSION)
}

/// Descriptor paths relative to a `.robocli/` directory
pub mod descriptors {
    use super::*;

    /// Application descriptors: `.robocli/applications/`
    pub fn applications_dir(cli_files_dir: &Path) -> PathBuf {
        cli_files_dir.join("applications")
    }

    /// Scenario descriptors: `.robocli/scenarios/`
    pub fn scenarios_dir(cli_files_dir: &Path) -> PathBuf {
        cli_files_dir.join("scenarios")
    }
}

/// Generated robot project paths relative to the robot root
pub mod robot {
    use super::*;

    /// All applications: `<robot>/applications/`
    pub fn applications_dir(robot_root: &Path) -> PathBuf {
        robot_root.join("applications")
    }

    /// One application: `<robot>/applications/<app>/`
    pub fn application_dir(robot_root: &Path, application: &str) -> PathBuf {
        applications_dir(robot_root).join(application)
    }

    /// Application manifest: `<robot>/applications/<app>/application.toml`
    pub fn application_manifest(robot_root: &Path, application: &str) -> PathBuf {
        application_dir(robot_root, application).join("application.toml")
    }

    /// Models of an application: `<robot>/applications/<app>/models/`
    pub fn models_dir(robot_root: &Path, application: &str) -> PathBuf {
        application_dir(robot_root, application).join("models")
    }

    /// One model: `<robot>/applications/<app>/models/<model>.toml`
    pub fn model_path(robot_root: &Path, application: &str, model: &str) -> PathBuf {
        models_dir(robot_root, application).join(format!("{}.toml", model))
    }

    /// Scenario features: `<robot>/scenarios/`
    pub fn scenarios_dir(robot_root: &Path) -> PathBuf {
        robot_root.join("scenarios")
    }

    /// One scenario: `<robot>/scenarios/<scenario>.feature`
    pub fn scenario_path(robot_root: &Path, scenario: &str) -> PathBuf {
        scenarios_dir(robot_root).join(format!("{}.feature", scenario))
    }

    /// Counter artifact: `<robot>/<counter>.counter`
    pub fn counter_path(robot_root: &Path, counter: &str) -> PathBuf {
        robot_root.join(format!("{}.counter", counter))
    }
}
