//! Shared fixtures for the integration tests

#![allow(dead_code)]

use anyhow::{bail, Result};
use robocli::robot::{RobotIdentity, RobotProject};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeModel {
    pub fields: Vec<String>,
    pub results: Vec<String>,
}

/// In-memory robot project recording every mutation it receives.
///
/// Like a real robot it does not check scenario applications; the engine
/// is responsible for that in live mode.
#[derive(Debug, Default)]
pub struct FakeRobot {
    pub applications: BTreeMap<String, String>,
    pub models: BTreeMap<String, BTreeMap<String, FakeModel>>,
    pub scenarios: BTreeMap<String, String>,
    pub calls: Vec<String>,
    /// Mutations on this entity name fail
    pub fail_on: Option<String>,
}

impl FakeRobot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_applications(names: &[&str]) -> Self {
        let mut robot = Self::new();
        for name in names {
            robot
                .applications
                .insert(name.to_string(), format!("http://{}", name.to_lowercase()));
        }
        robot
    }

    fn record(&mut self, call: String, name: &str) -> Result<()> {
        self.calls.push(call);
        if self.fail_on.as_deref() == Some(name) {
            bail!("robot refused {}", name);
        }
        Ok(())
    }
}

impl RobotProject for FakeRobot {
    fn add_application(&mut self, name: &str, url: &str) -> Result<()> {
        self.record(format!("add_application {} {}", name, url), name)?;
        self.applications.insert(name.to_string(), url.to_string());
        Ok(())
    }

    fn remove_application(&mut self, name: &str) -> Result<()> {
        self.record(format!("remove_application {}", name), name)?;
        self.applications.remove(name);
        self.models.remove(name);
        self.scenarios.retain(|_, application| application != name);
        Ok(())
    }

    fn add_scenario(
        &mut self,
        name: &str,
        description: &str,
        application: &str,
        robot_name: &str,
    ) -> Result<()> {
        self.record(
            format!("add_scenario {} [{}] {} {}", name, description, application, robot_name),
            name,
        )?;
        self.scenarios.insert(name.to_string(), application.to_string());
        Ok(())
    }

    fn remove_scenario(&mut self, name: &str, robot: &RobotIdentity) -> Result<()> {
        self.record(format!("remove_scenario {} {}", name, robot.counter), name)?;
        self.scenarios.remove(name);
        Ok(())
    }

    fn add_model(
        &mut self,
        application: &str,
        name: &str,
        fields: &[String],
        results: &[String],
    ) -> Result<()> {
        self.record(format!("add_model {} {}", application, name), name)?;
        self.models.entry(application.to_string()).or_default().insert(
            name.to_string(),
            FakeModel {
                fields: fields.to_vec(),
                results: results.to_vec(),
            },
        );
        Ok(())
    }

    fn remove_model(&mut self, application: &str, name: &str) -> Result<()> {
        self.record(format!("remove_model {} {}", application, name), name)?;
        if let Some(models) = self.models.get_mut(application) {
            models.remove(name);
        }
        Ok(())
    }

    fn applications(&self) -> Result<Vec<String>> {
        Ok(self.applications.keys().cloned().collect())
    }

    fn scenarios(&self) -> Result<Vec<String>> {
        Ok(self.scenarios.keys().cloned().collect())
    }

    fn applications_with_models(&self) -> Result<Vec<String>> {
        Ok(self
            .models
            .iter()
            .filter(|(_, models)| !models.is_empty())
            .map(|(application, _)| application.clone())
            .collect())
    }

    fn models(&self, application: &str) -> Result<Vec<String>> {
        Ok(self
            .models
            .get(application)
            .map(|models| models.keys().cloned().collect())
            .unwrap_or_default())
    }
}

pub fn identity() -> RobotIdentity {
    RobotIdentity {
        name: "Bakery".to_string(),
        counter: "BakeryCounter".to_string(),
    }
}
