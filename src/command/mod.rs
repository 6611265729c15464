//! Feature dispatch and parameter resolution.
//!
//! Every run boils down to a [`Feature`] plus a partially filled
//! [`Parameters`] table (from flags). The [`CommandEngine`] completes the
//! table through a [`ParameterSource`] (interactive prompts, or nothing at
//! all in flag mode), then mutates the robot project and the entity store.
//!
//! Errors are classified by [`CommandError::is_fatal`]: usage and
//! referential errors abandon one operation, technical errors end the run.

mod engine;
mod params;

pub use engine::{CommandEngine, ReplayReport};
pub use params::{FlagSource, ParameterSource, Prompter};

use crate::crypto::CryptoError;
use crate::store::NameError;
use thiserror::Error;

// =============================================================================
// Features
// =============================================================================

/// Operations offered by the menu and the `-f` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    AddApplication,
    AddScenario,
    AddModel,
    RemoveApplication,
    RemoveScenario,
    RemoveModel,
    Encrypt,
    Decrypt,
    Exit,
}

impl Feature {
    /// Menu order
    pub const ALL: [Feature; 9] = [
        Feature::AddApplication,
        Feature::AddScenario,
        Feature::AddModel,
        Feature::RemoveApplication,
        Feature::RemoveScenario,
        Feature::RemoveModel,
        Feature::Encrypt,
        Feature::Decrypt,
        Feature::Exit,
    ];

    pub fn code(self) -> u8 {
        match self {
            Feature::Exit => 0,
            Feature::AddApplication => 1,
            Feature::AddScenario => 2,
            Feature::AddModel => 3,
            Feature::RemoveApplication => 4,
            Feature::RemoveScenario => 5,
            Feature::RemoveModel => 6,
            Feature::Encrypt => 7,
            Feature::Decrypt => 8,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Feature::AddApplication => "add new application",
            Feature::AddScenario => "add new scenario",
            Feature::AddModel => "add new model",
            Feature::RemoveApplication => "remove application",
            Feature::RemoveScenario => "remove scenario",
            Feature::RemoveModel => "remove model",
            Feature::Encrypt => "encrypt data",
            Feature::Decrypt => "decrypt data",
            Feature::Exit => "exit robocli",
        }
    }

    /// What the feature does and which flags it needs without prompts
    fn usage(self) -> (&'static str, &'static str) {
        match self {
            Feature::AddApplication => ("add an application", "-a and -u"),
            Feature::AddScenario => ("add a scenario", "-a, -s and -d"),
            Feature::AddModel => ("add a model", "-a, -m, -fi and -re (optional)"),
            Feature::RemoveApplication => ("remove an application", "-a"),
            Feature::RemoveScenario => ("remove a scenario", "-s"),
            Feature::RemoveModel => ("remove a model", "-a and -m"),
            Feature::Encrypt => ("encrypt data", "-k and -d"),
            Feature::Decrypt => ("decrypt data", "-k and -d"),
            Feature::Exit => ("exit", "-f 0"),
        }
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// Values supplied on the command line. Empty strings count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    /// `-a`
    pub application: Option<String>,
    /// `-s`
    pub scenario: Option<String>,
    /// `-m`
    pub model: Option<String>,
    /// `-u`
    pub url: Option<String>,
    /// `-d`: scenario description, plaintext or ciphertext
    pub description: Option<String>,
    /// `-fi`: space-separated field names
    pub fields: Option<String>,
    /// `-re`: space-separated result names
    pub results: Option<String>,
    /// `-k`
    pub key: Option<String>,
}

/// Result of one successful feature execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Robot project and store were mutated
    Applied,
    Encrypted(String),
    Decrypted(String),
    Exit,
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("To {action} you need {flags}")]
    MissingParameters {
        action: &'static str,
        flags: &'static str,
    },
    #[error("'{0}' is not a valid index")]
    InvalidSelection(String),
    #[error("Index {selected} is out of range (1 to {max})")]
    SelectionOutOfRange { selected: usize, max: usize },
    #[error("'{0}' is not a feature code")]
    UnknownFeature(String),
    #[error("When interactive mode is off, you need -f")]
    MissingFeature,
    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),
    #[error("Application [{0}] does not exist. You must create an application named [{0}] first.")]
    UnknownApplication(String),
    #[error("You must create an application first.")]
    NoApplications,
    #[error("Your robot does not contain {0}.")]
    RobotEmpty(&'static str),
    #[error("Operator input closed")]
    InputClosed,
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error("Robot project error: {0:#}")]
    Robot(anyhow::Error),
    #[error("Cannot talk to the operator: {0}")]
    Input(#[source] std::io::Error),
}

impl CommandError {
    pub fn missing(feature: Feature) -> Self {
        let (action, flags) = feature.usage();
        CommandError::MissingParameters { action, flags }
    }

    /// Technical errors end the run; everything else abandons one operation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CommandError::Crypto(_) | CommandError::Robot(_) | CommandError::Input(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_codes_round_trip_through_menu() {
        for feature in Feature::ALL {
            assert_eq!(Feature::from_code(feature.code()), Some(feature));
        }
        assert_eq!(Feature::from_code(9), None);
        assert_eq!(Feature::from_code(0), Some(Feature::Exit));
    }

    #[test]
    fn test_missing_parameters_message_names_flags() {
        let err = CommandError::missing(Feature::AddApplication);
        assert_eq!(err.to_string(), "To add an application you need -a and -u");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(CommandError::Crypto(CryptoError::EmptyKey).is_fatal());
        assert!(CommandError::Robot(anyhow::anyhow!("disk full")).is_fatal());
        assert!(!CommandError::UnknownApplication("Foo".into()).is_fatal());
        assert!(!CommandError::SelectionOutOfRange { selected: 4, max: 2 }.is_fatal());
        assert!(!CommandError::InputClosed.is_fatal());
    }
}
