//! Robot project boundary.
//!
//! The command engine never writes robot artifacts itself; it goes through
//! [`RobotProject`]. [`ScaffoldProject`] is the filesystem implementation
//! used by the binary, tests plug in their own.

mod scaffold;

pub use scaffold::ScaffoldProject;

use anyhow::Result;

/// Robot name and counter artifact, as configured for the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotIdentity {
    pub name: String,
    pub counter: String,
}

/// Mutations and listings of the generated robot project.
pub trait RobotProject {
    fn add_application(&mut self, name: &str, url: &str) -> Result<()>;

    /// Remove an application, its models and the scenarios bound to it
    fn remove_application(&mut self, name: &str) -> Result<()>;

    fn add_scenario(
        &mut self,
        name: &str,
        description: &str,
        application: &str,
        robot_name: &str,
    ) -> Result<()>;

    fn remove_scenario(&mut self, name: &str, robot: &RobotIdentity) -> Result<()>;

    fn add_model(
        &mut self,
        application: &str,
        name: &str,
        fields: &[String],
        results: &[String],
    ) -> Result<()>;

    fn remove_model(&mut self, application: &str, name: &str) -> Result<()>;

    /// Applications known to the robot, sorted
    fn applications(&self) -> Result<Vec<String>>;

    /// Scenarios known to the robot, sorted
    fn scenarios(&self) -> Result<Vec<String>>;

    /// Applications owning at least one model, sorted
    fn applications_with_models(&self) -> Result<Vec<String>>;

    /// Models of one application, sorted
    fn models(&self, application: &str) -> Result<Vec<String>>;
}
