//! Descriptor synchronization - keeps `.robocli/` in line with the store
//!
//! One JSON file per application under `applications/` and one per scenario
//! under `scenarios/`. What happens to a file is decided by the entity's
//! [`Status`](crate::store::Status):
//!
//! | Status      | File present        | File absent          |
//! |-------------|---------------------|----------------------|
//! | `Unchanged` | left alone          | left alone           |
//! | `Create`    | rewritten if stale  | created              |
//! | `Delete`    | removed             | nothing to do        |
//!
//! Failures are per file: a broken descriptor is skipped on load, a failed
//! write is reported and the pass moves on to the next entity.
//!
//! # Example
//!
//! ```no_run
//! use robocli::console::TracingConsole;
//! use robocli::store::Application;
//! use robocli::sync::FileSynchronizer;
//! use std::path::Path;
//!
//! let sync = FileSynchronizer::new(Path::new(".robocli"));
//! let mut store = sync.load_all(&TracingConsole);
//! store.add_application(Application::new("App1", "http://localhost"));
//! let report = sync.persist_all(&mut store, &TracingConsole);
//! assert!(report.failed.is_empty());
//! ```

mod internal;

use crate::console::Console;
use crate::paths;
use crate::store::EntityStore;
use std::path::{Path, PathBuf};

/// Files touched by one persist pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: Vec<PathBuf>,
    pub updated: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    /// Path and error message of every file that could not be handled
    pub failed: Vec<(PathBuf, String)>,
}

impl SyncReport {
    /// Number of files created, rewritten or removed
    pub fn mutations(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted.len()
    }
}

/// Reconciles an [`EntityStore`] with its descriptor directories.
#[derive(Debug, Clone)]
pub struct FileSynchronizer {
    applications_dir: PathBuf,
    scenarios_dir: PathBuf,
}

impl FileSynchronizer {
    /// Synchronizer over a `.robocli/` directory
    pub fn new(cli_files_dir: &Path) -> Self {
        Self {
            applications_dir: paths::descriptors::applications_dir(cli_files_dir),
            scenarios_dir: paths::descriptors::scenarios_dir(cli_files_dir),
        }
    }

    pub fn applications_dir(&self) -> &Path {
        &self.applications_dir
    }

    pub fn scenarios_dir(&self) -> &Path {
        &self.scenarios_dir
    }

    /// Load every descriptor. Missing directories count as empty.
    pub fn load_all(&self, console: &dyn Console) -> EntityStore {
        let applications = internal::load_dir(&self.applications_dir, console);
        let scenarios = internal::load_dir(&self.scenarios_dir, console);
        EntityStore::from_parts(applications, scenarios)
    }

    /// Apply every pending status of the store to disk.
    pub fn persist_all(&self, store: &mut EntityStore, console: &dyn Console) -> SyncReport {
        let mut report = SyncReport::default();
        let (applications, scenarios) = store.entries_mut();
        internal::persist_dir(&self.applications_dir, applications, &mut report, console);
        internal::persist_dir(&self.scenarios_dir, scenarios, &mut report, console);
        report
    }
}
