//! Run-level control flow: live mode (menu or single flag-driven pass) and
//! replay mode.

use crate::command::{
    CommandEngine, CommandError, Feature, Outcome, ParameterSource, Parameters, ReplayReport,
};
use crate::console::Console;
use crate::sync::FileSynchronizer;
use std::path::PathBuf;

const SPLASH: &str = r"
            _                    _ _
  _ __ ___ | |__   ___   ___ ___| (_)
 | '__/ _ \| '_ \ / _ \ / __/ _ \ | |
 | | | (_) | |_) | (_) | (_|  __/ | |
 |_|  \___/|_.__/ \___/ \___\___|_|_|
";

/// What a live run did, feature by feature
#[derive(Debug, Default)]
pub struct LiveReport {
    /// Features that completed, with their outcome
    pub completed: Vec<(Feature, Outcome)>,
    /// Messages of operations that were abandoned
    pub rejected: Vec<String>,
    /// Descriptor files that could not be written or removed
    pub unsaved: Vec<PathBuf>,
}

/// Drives the engine against the descriptor directories.
pub struct InteractionLoop<'a> {
    sync: FileSynchronizer,
    engine: CommandEngine<'a>,
    console: &'a dyn Console,
}

impl<'a> InteractionLoop<'a> {
    pub fn new(sync: FileSynchronizer, engine: CommandEngine<'a>, console: &'a dyn Console) -> Self {
        Self {
            sync,
            engine,
            console,
        }
    }

    pub fn splash(&self) {
        self.console.info(SPLASH);
    }

    /// Live mode.
    ///
    /// Interactive: loop on the menu until exit or closed input. A `preset`
    /// feature is offered for confirmation on the first pass only.
    /// Non-interactive: exactly one pass, `preset` is required.
    ///
    /// Only fatal errors end the run with `Err`.
    pub fn run_live(
        &mut self,
        preset: Option<u8>,
        params: &Parameters,
        source: &mut dyn ParameterSource,
    ) -> Result<LiveReport, CommandError> {
        let mut store = self.sync.load_all(self.console);
        let mut report = LiveReport::default();
        let interactive = source.is_interactive();
        let mut preset = preset;

        loop {
            let feature = match self.select_feature(preset.take(), source) {
                Ok(Some(feature)) => feature,
                Ok(None) => break,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    self.reject(&mut report, &e);
                    if interactive {
                        continue;
                    }
                    break;
                }
            };
            if feature == Feature::Exit {
                break;
            }

            match self.engine.execute(feature, &mut store, params, source) {
                Ok(outcome) => {
                    let sync = self.sync.persist_all(&mut store, self.console);
                    if sync.failed.is_empty() {
                        self.console.info("robocli finished with success.");
                    } else {
                        self.console.warn(&format!(
                            "robocli finished, but {} descriptor file(s) are not up to date.",
                            sync.failed.len()
                        ));
                        report.unsaved.extend(sync.failed.into_iter().map(|(path, _)| path));
                    }
                    report.completed.push((feature, outcome));
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => self.reject(&mut report, &e),
            }

            if !interactive {
                break;
            }
        }

        self.console.info("Exit robocli with success.");
        Ok(report)
    }

    /// Replay mode: regenerate the robot project from the descriptors.
    pub fn run_replay(&mut self) -> ReplayReport {
        let store = self.sync.load_all(self.console);
        self.engine.replay(&store)
    }

    /// `Ok(None)` when the operator is gone and the run should end.
    fn select_feature(
        &self,
        preset: Option<u8>,
        source: &mut dyn ParameterSource,
    ) -> Result<Option<Feature>, CommandError> {
        if !source.is_interactive() {
            let code = preset.ok_or(CommandError::MissingFeature)?;
            return Feature::from_code(code)
                .map(Some)
                .ok_or_else(|| CommandError::UnknownFeature(code.to_string()));
        }

        if let Some(feature) = preset.and_then(Feature::from_code) {
            let question = format!("Do you want {}? Y", feature.label());
            match source.confirm(&question) {
                Ok(true) => return Ok(Some(feature)),
                Ok(false) => {}
                Err(CommandError::InputClosed) => return Ok(None),
                Err(e) => return Err(e),
            }
        }

        let entries: Vec<String> = Feature::ALL
            .iter()
            .map(|f| format!("    {} => {}", f.code(), f.label()))
            .collect();
        let answer = match source.pick("What do you want ?", &entries) {
            Ok(Some(answer)) => answer,
            Ok(None) | Err(CommandError::InputClosed) => return Ok(None),
            Err(e) => return Err(e),
        };
        answer
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(Feature::from_code)
            .map(Some)
            .ok_or(CommandError::UnknownFeature(answer))
    }

    fn reject(&self, report: &mut LiveReport, error: &CommandError) {
        let message = error.to_string();
        self.console.error(&message);
        report.rejected.push(message);
    }
}
