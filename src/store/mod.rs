//! In-memory model of the declared robot state.
//!
//! Applications own their models; scenarios reference an application by
//! name. Every entity carries a transient [`Status`] that tells the
//! synchronizer what to do with its descriptor file. Removals leave a
//! `Delete` tombstone behind that is invisible to every lookup and listing,
//! and disappears once the synchronizer has handled it.
//!
//! Pure data: nothing here touches the filesystem.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Entities
// =============================================================================

/// Pending descriptor action for one entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    /// In sync with its descriptor file
    #[default]
    Unchanged,
    /// Descriptor must exist and hold the current content
    Create,
    /// Descriptor must be removed
    Delete,
}

/// Field/result schema bound to one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub results: Vec<String>,
}

impl Model {
    /// Build a model from space-separated field and result lists
    pub fn from_lists(name: impl Into<String>, fields: &str, results: Option<&str>) -> Self {
        Self {
            name: name.into(),
            fields: split_list(fields),
            results: results.map(split_list).unwrap_or_default(),
        }
    }

    /// Fields joined back into the space-separated form
    pub fn fields_list(&self) -> String {
        self.fields.join(" ")
    }

    /// Results joined back into the space-separated form
    pub fn results_list(&self) -> String {
        self.results.join(" ")
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split_whitespace().map(|s| s.to_string()).collect()
}

/// Target system under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub models: Vec<Model>,
    #[serde(skip)]
    pub status: Status,
}

impl Application {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            models: Vec::new(),
            status: Status::Unchanged,
        }
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    fn tombstone(name: &str) -> Self {
        Self {
            status: Status::Delete,
            ..Self::new(name, "")
        }
    }
}

/// Test flow bound to one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub application: String,
    #[serde(skip)]
    pub status: Status,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        application: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            application: application.into(),
            status: Status::Unchanged,
        }
    }

    fn tombstone(name: &str) -> Self {
        Self {
            status: Status::Delete,
            ..Self::new(name, "", "")
        }
    }
}

// =============================================================================
// Name validation
// =============================================================================

/// Why a name cannot become a descriptor file name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name must not be empty")]
    Empty,
    #[error("name '{0}' must not contain path separators")]
    Separator(String),
    #[error("name '{0}' is reserved")]
    Reserved(String),
}

/// Check that a name is usable as an entity key and file name.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.trim().is_empty() {
        return Err(NameError::Empty);
    }
    if name.contains('/') || name.contains('\\') {
        return Err(NameError::Separator(name.to_string()));
    }
    if name == "." || name == ".." {
        return Err(NameError::Reserved(name.to_string()));
    }
    Ok(())
}

// =============================================================================
// Store
// =============================================================================

/// Declared applications and scenarios, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStore {
    applications: Vec<Application>,
    scenarios: Vec<Scenario>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded descriptors.
    ///
    /// Entries keep their status; a later entry with an already-seen name
    /// replaces the earlier one so names stay unique.
    pub fn from_parts(applications: Vec<Application>, scenarios: Vec<Scenario>) -> Self {
        let mut store = Self::new();
        for app in applications {
            upsert(&mut store.applications, app, |a| a.name.as_str());
        }
        for scenario in scenarios {
            upsert(&mut store.scenarios, scenario, |s| s.name.as_str());
        }
        store
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Append the application, or replace the entry with the same name in place.
    pub fn add_application(&mut self, mut app: Application) {
        app.status = Status::Create;
        upsert(&mut self.applications, app, |a| a.name.as_str());
    }

    /// Append the scenario, or replace the entry with the same name in place.
    pub fn add_scenario(&mut self, mut scenario: Scenario) {
        scenario.status = Status::Create;
        upsert(&mut self.scenarios, scenario, |s| s.name.as_str());
    }

    /// Upsert a model inside its application.
    ///
    /// Returns false (and changes nothing) when the application is unknown.
    pub fn add_model(&mut self, application: &str, model: Model) -> bool {
        let Some(app) = self.live_application_mut(application) else {
            return false;
        };
        match app.models.iter_mut().find(|m| m.name == model.name) {
            Some(existing) => *existing = model,
            None => app.models.push(model),
        }
        app.status = Status::Create;
        true
    }

    /// Remove an application entry. Scenarios referencing it are untouched.
    ///
    /// Returns true if a live entry was removed. A tombstone is recorded
    /// either way so a stray descriptor with that name gets deleted.
    pub fn remove_application(&mut self, name: &str) -> bool {
        match self.applications.iter_mut().find(|a| a.name == name) {
            Some(app) => {
                let was_live = app.status != Status::Delete;
                app.status = Status::Delete;
                was_live
            }
            None => {
                self.applications.push(Application::tombstone(name));
                false
            }
        }
    }

    /// Remove a scenario entry; same tombstone rule as applications.
    pub fn remove_scenario(&mut self, name: &str) -> bool {
        match self.scenarios.iter_mut().find(|s| s.name == name) {
            Some(scenario) => {
                let was_live = scenario.status != Status::Delete;
                scenario.status = Status::Delete;
                was_live
            }
            None => {
                self.scenarios.push(Scenario::tombstone(name));
                false
            }
        }
    }

    /// Remove a model from its application, flagging the application for rewrite.
    pub fn remove_model(&mut self, application: &str, model: &str) -> bool {
        let Some(app) = self.live_application_mut(application) else {
            return false;
        };
        let before = app.models.len();
        app.models.retain(|m| m.name != model);
        if app.models.len() == before {
            return false;
        }
        app.status = Status::Create;
        true
    }

    // -------------------------------------------------------------------------
    // Queries (tombstones are invisible)
    // -------------------------------------------------------------------------

    pub fn applications(&self) -> impl Iterator<Item = &Application> {
        self.applications
            .iter()
            .filter(|a| a.status != Status::Delete)
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter().filter(|s| s.status != Status::Delete)
    }

    pub fn application(&self, name: &str) -> Option<&Application> {
        self.applications().find(|a| a.name == name)
    }

    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios().find(|s| s.name == name)
    }

    /// Ordered application names, for 1-based selection menus
    pub fn application_names(&self) -> Vec<String> {
        self.applications().map(|a| a.name.clone()).collect()
    }

    /// Ordered scenario names, for 1-based selection menus
    pub fn scenario_names(&self) -> Vec<String> {
        self.scenarios().map(|s| s.name.clone()).collect()
    }

    /// Names of live scenarios bound to an application
    pub fn scenarios_of(&self, application: &str) -> Vec<String> {
        self.scenarios()
            .filter(|s| s.application == application)
            .map(|s| s.name.clone())
            .collect()
    }

    /// Pending status of an application entry, tombstones included
    pub fn application_status(&self, name: &str) -> Option<Status> {
        self.applications
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.status)
    }

    /// Pending status of a scenario entry, tombstones included
    pub fn scenario_status(&self, name: &str) -> Option<Status> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.status)
    }

    /// True when some entry still waits for synchronization
    pub fn has_pending_changes(&self) -> bool {
        self.applications.iter().any(|a| a.status != Status::Unchanged)
            || self.scenarios.iter().any(|s| s.status != Status::Unchanged)
    }

    /// Every entry including tombstones, for the synchronizer
    pub(crate) fn entries_mut(&mut self) -> (&mut Vec<Application>, &mut Vec<Scenario>) {
        (&mut self.applications, &mut self.scenarios)
    }

    fn live_application_mut(&mut self, name: &str) -> Option<&mut Application> {
        self.applications
            .iter_mut()
            .find(|a| a.name == name && a.status != Status::Delete)
    }
}

fn upsert<T>(entries: &mut Vec<T>, entry: T, key: impl Fn(&T) -> &str) {
    match entries.iter().position(|e| key(e) == key(&entry)) {
        Some(index) => entries[index] = entry,
        None => entries.push(entry),
    }
}
