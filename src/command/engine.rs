//! Feature execution against the robot project and the entity store.

use super::{CommandError, Feature, Outcome, ParameterSource, Parameters};
use crate::console::Console;
use crate::crypto::Cipher;
use crate::robot::{RobotIdentity, RobotProject};
use crate::store::{validate_name, Application, EntityStore, Model, Scenario};

/// Counts of a replay pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub applications: usize,
    pub models: usize,
    pub scenarios: usize,
    /// Entity label and error of every replay that failed
    pub failed: Vec<(String, String)>,
}

/// Turns a feature plus parameters into robot project and store mutations.
pub struct CommandEngine<'a> {
    robot: &'a mut dyn RobotProject,
    cipher: &'a dyn Cipher,
    console: &'a dyn Console,
    identity: RobotIdentity,
}

impl<'a> CommandEngine<'a> {
    pub fn new(
        robot: &'a mut dyn RobotProject,
        cipher: &'a dyn Cipher,
        console: &'a dyn Console,
        identity: RobotIdentity,
    ) -> Self {
        Self {
            robot,
            cipher,
            console,
            identity,
        }
    }

    /// Run one feature. On error nothing was mutated.
    pub fn execute(
        &mut self,
        feature: Feature,
        store: &mut EntityStore,
        params: &Parameters,
        source: &mut dyn ParameterSource,
    ) -> Result<Outcome, CommandError> {
        match feature {
            Feature::AddApplication => self.add_application(store, params, source),
            Feature::AddScenario => self.add_scenario(store, params, source),
            Feature::AddModel => self.add_model(store, params, source),
            Feature::RemoveApplication => self.remove_application(store, params, source),
            Feature::RemoveScenario => self.remove_scenario(store, params, source),
            Feature::RemoveModel => self.remove_model(store, params, source),
            Feature::Encrypt => self.encrypt(params, source),
            Feature::Decrypt => self.decrypt(params, source),
            Feature::Exit => Ok(Outcome::Exit),
        }
    }

    // =========================================================================
    // Add
    // =========================================================================

    fn add_application(
        &mut self,
        store: &mut EntityStore,
        params: &Parameters,
        source: &mut dyn ParameterSource,
    ) -> Result<Outcome, CommandError> {
        let feature = Feature::AddApplication;
        let name = require(&params.application, source, "Enter application name:", feature)?;
        validate_name(&name)?;
        let url = require(&params.url, source, "Enter url:", feature)?;

        self.robot
            .add_application(&name, &url)
            .map_err(CommandError::Robot)?;

        // Re-adding an application updates its url, models stay
        let mut app = Application::new(&name, &url);
        if let Some(existing) = store.application(&name) {
            app.models = existing.models.clone();
        }
        store.add_application(app);

        self.console
            .info(&format!("Application [{}] added with url [{}].", name, url));
        Ok(Outcome::Applied)
    }

    fn add_scenario(
        &mut self,
        store: &mut EntityStore,
        params: &Parameters,
        source: &mut dyn ParameterSource,
    ) -> Result<Outcome, CommandError> {
        let feature = Feature::AddScenario;
        let application = self.resolve_application(&params.application, source, feature)?;
        let name = require(&params.scenario, source, "Enter scenario name:", feature)?;
        validate_name(&name)?;
        let description = require(&params.description, source, "Enter description:", feature)?;

        self.robot
            .add_scenario(&name, &description, &application, &self.identity.name)
            .map_err(CommandError::Robot)?;
        store.add_scenario(Scenario::new(&name, &description, &application));

        self.console.info(&format!(
            "Scenario [{}] added to application [{}].",
            name, application
        ));
        Ok(Outcome::Applied)
    }

    fn add_model(
        &mut self,
        store: &mut EntityStore,
        params: &Parameters,
        source: &mut dyn ParameterSource,
    ) -> Result<Outcome, CommandError> {
        let feature = Feature::AddModel;
        let application = self.resolve_application(&params.application, source, feature)?;
        let name = require(&params.model, source, "Enter model name:", feature)?;
        validate_name(&name)?;
        let fields = require(&params.fields, source, "Enter field list:", feature)?;
        let results = match supplied(&params.results) {
            Some(results) => Some(results),
            None => source
                .ask("Enter result list (optional):")?
                .filter(|r| !r.is_empty()),
        };

        let model = Model::from_lists(&name, &fields, results.as_deref());
        self.robot
            .add_model(&application, &name, &model.fields, &model.results)
            .map_err(CommandError::Robot)?;
        if !store.add_model(&application, model) {
            self.console.warn(&format!(
                "Application [{}] has no descriptor, model [{}] is only in the robot project.",
                application, name
            ));
        }

        self.console.info(&format!(
            "Model [{}] added to application [{}].",
            name, application
        ));
        Ok(Outcome::Applied)
    }

    /// Application for an add: flag value, or 1-based pick in interactive
    /// mode. Either way it must exist in the robot project.
    fn resolve_application(
        &self,
        flag: &Option<String>,
        source: &mut dyn ParameterSource,
        feature: Feature,
    ) -> Result<String, CommandError> {
        let known = self.robot.applications().map_err(CommandError::Robot)?;

        let application = match supplied(flag) {
            Some(application) => application,
            None => {
                if !source.is_interactive() {
                    return Err(CommandError::missing(feature));
                }
                if known.is_empty() {
                    return Err(CommandError::NoApplications);
                }
                source
                    .choose("Enter index application number:", &known)?
                    .ok_or_else(|| CommandError::missing(feature))?
            }
        };

        if known.is_empty() {
            return Err(CommandError::NoApplications);
        }
        if !known.contains(&application) {
            return Err(CommandError::UnknownApplication(application));
        }
        Ok(application)
    }

    // =========================================================================
    // Remove
    // =========================================================================

    fn remove_application(
        &mut self,
        store: &mut EntityStore,
        params: &Parameters,
        source: &mut dyn ParameterSource,
    ) -> Result<Outcome, CommandError> {
        let feature = Feature::RemoveApplication;
        let name = match supplied(&params.application) {
            Some(name) => name,
            None => {
                let known = self.robot.applications().map_err(CommandError::Robot)?;
                pick(source, feature, "Enter index application number:", &known, "applications")?
            }
        };
        validate_name(&name)?;

        self.robot
            .remove_application(&name)
            .map_err(CommandError::Robot)?;
        for scenario in store.scenarios_of(&name) {
            store.remove_scenario(&scenario);
            self.console
                .debug(&format!("Scenario [{}] removed with its application.", scenario));
        }
        store.remove_application(&name);

        self.console.info(&format!("Application [{}] removed.", name));
        Ok(Outcome::Applied)
    }

    fn remove_scenario(
        &mut self,
        store: &mut EntityStore,
        params: &Parameters,
        source: &mut dyn ParameterSource,
    ) -> Result<Outcome, CommandError> {
        let feature = Feature::RemoveScenario;
        let name = match supplied(&params.scenario) {
            Some(name) => name,
            None => {
                let known = self.robot.scenarios().map_err(CommandError::Robot)?;
                pick(source, feature, "Enter index scenario number:", &known, "scenarios")?
            }
        };
        validate_name(&name)?;

        self.robot
            .remove_scenario(&name, &self.identity)
            .map_err(CommandError::Robot)?;
        store.remove_scenario(&name);

        self.console.info(&format!("Scenario [{}] removed.", name));
        Ok(Outcome::Applied)
    }

    fn remove_model(
        &mut self,
        store: &mut EntityStore,
        params: &Parameters,
        source: &mut dyn ParameterSource,
    ) -> Result<Outcome, CommandError> {
        let feature = Feature::RemoveModel;
        let application = match supplied(&params.application) {
            Some(application) => application,
            None => {
                let known = self
                    .robot
                    .applications_with_models()
                    .map_err(CommandError::Robot)?;
                pick(source, feature, "Enter index application number:", &known, "applications")?
            }
        };
        let name = match supplied(&params.model) {
            Some(name) => name,
            None => {
                let known = self
                    .robot
                    .models(&application)
                    .map_err(CommandError::Robot)?;
                pick(source, feature, "Enter index model number:", &known, "models")?
            }
        };
        validate_name(&application)?;
        validate_name(&name)?;

        self.robot
            .remove_model(&application, &name)
            .map_err(CommandError::Robot)?;
        store.remove_model(&application, &name);

        self.console.info(&format!(
            "Model [{}] removed from application [{}].",
            name, application
        ));
        Ok(Outcome::Applied)
    }

    // =========================================================================
    // Crypto
    // =========================================================================

    fn encrypt(
        &mut self,
        params: &Parameters,
        source: &mut dyn ParameterSource,
    ) -> Result<Outcome, CommandError> {
        let feature = Feature::Encrypt;
        let key = require(&params.key, source, "Enter crypto key:", feature)?;
        let data = require(&params.description, source, "Enter data:", feature)?;

        let encrypted = self.cipher.encrypt(&key, &data)?;
        self.console.info(&format!("Encrypted value is {}", encrypted));
        Ok(Outcome::Encrypted(encrypted))
    }

    fn decrypt(
        &mut self,
        params: &Parameters,
        source: &mut dyn ParameterSource,
    ) -> Result<Outcome, CommandError> {
        let feature = Feature::Decrypt;
        let key = require(&params.key, source, "Enter crypto key:", feature)?;
        let data = require(&params.description, source, "Enter data:", feature)?;

        let decrypted = self.cipher.decrypt(&key, &data)?;
        self.console.info(&format!("Decrypted value is {}", decrypted));
        Ok(Outcome::Decrypted(decrypted))
    }

    // =========================================================================
    // Replay
    // =========================================================================

    /// Regenerate robot artifacts from descriptors alone.
    ///
    /// No prompts, no store mutation, no referential check. A failing
    /// entity is reported and the replay moves on.
    pub fn replay(&mut self, store: &EntityStore) -> ReplayReport {
        let mut report = ReplayReport::default();

        for app in store.applications() {
            match self.robot.add_application(&app.name, &app.url) {
                Ok(()) => report.applications += 1,
                Err(e) => {
                    self.replay_failed(&mut report, format!("application {}", app.name), e);
                    continue;
                }
            }
            for model in &app.models {
                match self
                    .robot
                    .add_model(&app.name, &model.name, &model.fields, &model.results)
                {
                    Ok(()) => report.models += 1,
                    Err(e) => self.replay_failed(
                        &mut report,
                        format!("model {}/{}", app.name, model.name),
                        e,
                    ),
                }
            }
        }

        for scenario in store.scenarios() {
            match self.robot.add_scenario(
                &scenario.name,
                &scenario.description,
                &scenario.application,
                &self.identity.name,
            ) {
                Ok(()) => report.scenarios += 1,
                Err(e) => {
                    self.replay_failed(&mut report, format!("scenario {}", scenario.name), e)
                }
            }
        }

        self.console.info(&format!(
            "Robot updated from descriptors: {} application(s), {} model(s), {} scenario(s).",
            report.applications, report.models, report.scenarios
        ));
        report
    }

    fn replay_failed(&self, report: &mut ReplayReport, label: String, error: anyhow::Error) {
        self.console
            .error(&format!("Replay of {} failed: {:#}", label, error));
        report.failed.push((label, format!("{:#}", error)));
    }
}

// =============================================================================
// Resolution helpers
// =============================================================================

/// Flag value, if given and not empty
fn supplied(flag: &Option<String>) -> Option<String> {
    flag.as_deref()
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

/// Flag value, else an answer from the source, else a usage error
fn require(
    flag: &Option<String>,
    source: &mut dyn ParameterSource,
    prompt: &str,
    feature: Feature,
) -> Result<String, CommandError> {
    if let Some(value) = supplied(flag) {
        return Ok(value);
    }
    match source.ask(prompt)? {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CommandError::missing(feature)),
    }
}

/// Interactive 1-based pick among `known`, for values that have no flag
fn pick(
    source: &mut dyn ParameterSource,
    feature: Feature,
    prompt: &str,
    known: &[String],
    what: &'static str,
) -> Result<String, CommandError> {
    if !source.is_interactive() {
        return Err(CommandError::missing(feature));
    }
    if known.is_empty() {
        return Err(CommandError::RobotEmpty(what));
    }
    source
        .choose(prompt, known)?
        .ok_or_else(|| CommandError::missing(feature))
}
