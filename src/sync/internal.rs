//! Internal implementation for the sync module
//!
//! Generic over [`Descriptor`] so applications and scenarios follow the
//! exact same create / update / delete rules.

use super::SyncReport;
use crate::console::Console;
use crate::paths;
use crate::store::{validate_name, Application, NameError, Scenario, Status};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// An entity persisted as one JSON file named after it.
pub(crate) trait Descriptor: Serialize + DeserializeOwned {
    fn name(&self) -> &str;
    fn status(&self) -> Status;
    fn set_status(&mut self, status: Status);

    /// Every name of the entity that ends up in a path
    fn validate(&self) -> Result<(), NameError> {
        validate_name(self.name())
    }
}

impl Descriptor for Application {
    fn name(&self) -> &str {
        &self.name
    }
    fn status(&self) -> Status {
        self.status
    }
    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
    fn validate(&self) -> Result<(), NameError> {
        validate_name(&self.name)?;
        self.models.iter().try_for_each(|m| validate_name(&m.name))
    }
}

impl Descriptor for Scenario {
    fn name(&self) -> &str {
        &self.name
    }
    fn status(&self) -> Status {
        self.status
    }
    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

/// What a write did to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteOutcome {
    Created,
    Updated,
    AlreadyCurrent,
}

// =============================================================================
// Load
// =============================================================================

/// Parse every file of a descriptor directory, skipping the broken ones.
pub(crate) fn load_dir<T: Descriptor>(dir: &Path, console: &dyn Console) -> Vec<T> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            console.error(&format!("Cannot list {}: {}", dir.display(), e));
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut loaded = Vec::with_capacity(files.len());
    for path in files {
        console.debug(&format!("CLI file [{}] found.", file_label(&path)));
        let descriptor = match read_descriptor::<T>(&path) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                console.error(&format!("Skipping descriptor: {:#}", e));
                continue;
            }
        };
        if let Err(e) = descriptor.validate() {
            console.error(&format!("Skipping descriptor {}: {}", path.display(), e));
            continue;
        }
        let stem = path.file_stem().map(|s| s.to_string_lossy());
        if stem.as_deref() != Some(descriptor.name()) {
            console.warn(&format!(
                "Descriptor [{}] holds entity [{}]; it is written back as [{}].",
                file_label(&path),
                descriptor.name(),
                paths::descriptor_file_name(descriptor.name())
            ));
        }
        loaded.push(descriptor);
    }
    loaded
}

fn read_descriptor<T: Descriptor>(path: &Path) -> Result<T> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

// =============================================================================
// Persist
// =============================================================================

/// Reconcile one descriptor directory with a list of entities.
///
/// Entities handled without error are settled: `Create` becomes
/// `Unchanged`, handled `Delete` tombstones leave the list.
pub(crate) fn persist_dir<T: Descriptor>(
    dir: &Path,
    entities: &mut Vec<T>,
    report: &mut SyncReport,
    console: &dyn Console,
) {
    let mut handled_deletes = HashSet::new();

    for entity in entities.iter_mut() {
        let path = dir.join(paths::descriptor_file_name(entity.name()));
        match entity.status() {
            Status::Unchanged => {}
            Status::Delete => match delete_descriptor(&path) {
                Ok(removed) => {
                    if removed {
                        console.debug(&format!("File [{}] removed with success.", file_label(&path)));
                        report.deleted.push(path);
                    }
                    handled_deletes.insert(entity.name().to_string());
                }
                Err(e) => {
                    console.error(&format!("{:#}", e));
                    report.failed.push((path, format!("{:#}", e)));
                }
            },
            Status::Create => match write_descriptor(dir, &path, entity) {
                Ok(outcome) => {
                    match outcome {
                        WriteOutcome::Created => {
                            console.debug(&format!("File [{}] created with success.", file_label(&path)));
                            report.created.push(path);
                        }
                        WriteOutcome::Updated => {
                            console.debug(&format!("File [{}] updated.", file_label(&path)));
                            report.updated.push(path);
                        }
                        WriteOutcome::AlreadyCurrent => {
                            console.debug(&format!("File [{}] already up to date.", file_label(&path)));
                        }
                    }
                    entity.set_status(Status::Unchanged);
                }
                Err(e) => {
                    console.error(&format!("{:#}", e));
                    report.failed.push((path, format!("{:#}", e)));
                }
            },
        }
    }

    entities.retain(|e| !(e.status() == Status::Delete && handled_deletes.contains(e.name())));
}

/// Create the file if absent, then make its content match the entity.
pub(crate) fn write_descriptor<T: Descriptor>(
    dir: &Path,
    path: &Path,
    entity: &T,
) -> Result<WriteOutcome> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let content = serde_json::to_string_pretty(entity)
        .with_context(|| format!("Failed to serialize {}", entity.name()))?;

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(content.as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            return Ok(WriteOutcome::Created);
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to create {}", path.display()));
        }
    }

    // Existing file: only rewrite when the content differs
    if fs::read_to_string(path).ok().as_deref() == Some(content.as_str()) {
        return Ok(WriteOutcome::AlreadyCurrent);
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(WriteOutcome::Updated)
}

/// Remove a descriptor if present. Returns true when a file was removed.
fn delete_descriptor(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
