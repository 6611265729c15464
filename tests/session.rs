//! Full runs of the interaction loop with scripted operator input

mod common;

use common::{identity, FakeRobot};
use robocli::command::{CommandEngine, Feature, FlagSource, Parameters, Prompter};
use robocli::console::RecordingConsole;
use robocli::crypto::AgeCipher;
use robocli::paths;
use robocli::robot::ScaffoldProject;
use robocli::session::InteractionLoop;
use robocli::store::{Application, Scenario};
use robocli::sync::FileSynchronizer;
use std::io::Cursor;
use tempfile::TempDir;

fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
    Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

fn synchronizer(tmp: &TempDir) -> FileSynchronizer {
    FileSynchronizer::new(&paths::cli_files_dir(tmp.path()))
}

#[test]
fn test_scripted_menu_session() {
    let tmp = TempDir::new().unwrap();
    let console = RecordingConsole::new();
    let cipher = AgeCipher::with_work_factor(2);
    let mut robot = FakeRobot::new();
    let mut source = prompter("1\nShop\nhttp://shop\n2\n1\nBuy\nbuy a cake\n0\n");

    let report = {
        let engine = CommandEngine::new(&mut robot, &cipher, &console, identity());
        let mut session = InteractionLoop::new(synchronizer(&tmp), engine, &console);
        session
            .run_live(None, &Parameters::default(), &mut source)
            .unwrap()
    };

    let features: Vec<Feature> = report.completed.iter().map(|(f, _)| *f).collect();
    assert_eq!(features, vec![Feature::AddApplication, Feature::AddScenario]);
    assert!(report.rejected.is_empty());

    let store = synchronizer(&tmp).load_all(&console);
    assert_eq!(store.application_names(), vec!["Shop"]);
    assert_eq!(store.scenario("Buy").map(|s| s.application.as_str()), Some("Shop"));

    let output = String::from_utf8(source.into_output()).unwrap();
    assert!(output.contains("What do you want ?"));
    assert!(output.contains("    0 => exit robocli"));
    assert!(console.contains("robocli finished with success."));
    assert!(console.contains("Exit robocli with success."));
}

#[test]
fn test_preset_feature_is_confirmed_once() {
    let tmp = TempDir::new().unwrap();
    let console = RecordingConsole::new();
    let cipher = AgeCipher::with_work_factor(2);
    let mut robot = FakeRobot::new();
    let mut source = prompter("Y\nShop\nhttp://shop\n0\n");

    let report = {
        let engine = CommandEngine::new(&mut robot, &cipher, &console, identity());
        let mut session = InteractionLoop::new(synchronizer(&tmp), engine, &console);
        session
            .run_live(Some(1), &Parameters::default(), &mut source)
            .unwrap()
    };

    assert_eq!(report.completed.len(), 1);
    let output = String::from_utf8(source.into_output()).unwrap();
    assert!(output.contains("Do you want add new application? Y"));
    assert_eq!(output.matches("Do you want").count(), 1);
}

#[test]
fn test_declined_preset_falls_back_to_menu() {
    let tmp = TempDir::new().unwrap();
    let console = RecordingConsole::new();
    let cipher = AgeCipher::with_work_factor(2);
    let mut robot = FakeRobot::new();
    let mut source = prompter("n\n0\n");

    let report = {
        let engine = CommandEngine::new(&mut robot, &cipher, &console, identity());
        let mut session = InteractionLoop::new(synchronizer(&tmp), engine, &console);
        session
            .run_live(Some(1), &Parameters::default(), &mut source)
            .unwrap()
    };

    assert!(report.completed.is_empty());
    assert!(robot.calls.is_empty());
}

#[test]
fn test_bad_menu_answers_are_reported_and_loop_continues() {
    let tmp = TempDir::new().unwrap();
    let console = RecordingConsole::new();
    let cipher = AgeCipher::with_work_factor(2);
    let mut robot = FakeRobot::new();
    // unknown code, then add-scenario with no applications, then exit
    let mut source = prompter("42\n2\n0\n");

    let report = {
        let engine = CommandEngine::new(&mut robot, &cipher, &console, identity());
        let mut session = InteractionLoop::new(synchronizer(&tmp), engine, &console);
        session
            .run_live(None, &Parameters::default(), &mut source)
            .unwrap()
    };

    assert_eq!(report.rejected.len(), 2);
    assert!(report.rejected[0].contains("not a feature code"));
    assert_eq!(report.rejected[1], "You must create an application first.");
    assert!(console.contains("Exit robocli with success."));
}

#[test]
fn test_closed_input_ends_session() {
    let tmp = TempDir::new().unwrap();
    let console = RecordingConsole::new();
    let cipher = AgeCipher::with_work_factor(2);
    let mut robot = FakeRobot::new();
    // input ends in the middle of add-application
    let mut source = prompter("1\nShop\n");

    let report = {
        let engine = CommandEngine::new(&mut robot, &cipher, &console, identity());
        let mut session = InteractionLoop::new(synchronizer(&tmp), engine, &console);
        session
            .run_live(None, &Parameters::default(), &mut source)
            .unwrap()
    };

    assert!(report.completed.is_empty());
    assert_eq!(report.rejected, vec!["Operator input closed".to_string()]);
    assert!(robot.calls.is_empty());
}

#[test]
fn test_non_interactive_single_pass() {
    let tmp = TempDir::new().unwrap();
    let console = RecordingConsole::new();
    let cipher = AgeCipher::with_work_factor(2);
    let mut robot = FakeRobot::new();
    let params = Parameters {
        application: Some("Shop".into()),
        url: Some("http://shop".into()),
        ..Default::default()
    };

    let report = {
        let engine = CommandEngine::new(&mut robot, &cipher, &console, identity());
        let mut session = InteractionLoop::new(synchronizer(&tmp), engine, &console);
        session.run_live(Some(1), &params, &mut FlagSource).unwrap()
    };

    assert_eq!(report.completed.len(), 1);
    assert!(synchronizer(&tmp)
        .applications_dir()
        .join(paths::descriptor_file_name("Shop"))
        .exists());
}

#[test]
fn test_non_interactive_without_feature() {
    let tmp = TempDir::new().unwrap();
    let console = RecordingConsole::new();
    let cipher = AgeCipher::with_work_factor(2);
    let mut robot = FakeRobot::new();

    let report = {
        let engine = CommandEngine::new(&mut robot, &cipher, &console, identity());
        let mut session = InteractionLoop::new(synchronizer(&tmp), engine, &console);
        session
            .run_live(None, &Parameters::default(), &mut FlagSource)
            .unwrap()
    };

    assert!(report.completed.is_empty());
    assert_eq!(report.rejected.len(), 1);
    assert!(report.rejected[0].contains("-f"));
}

#[test]
fn test_robot_failure_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let console = RecordingConsole::new();
    let cipher = AgeCipher::with_work_factor(2);
    let mut robot = FakeRobot::new();
    robot.fail_on = Some("Shop".into());
    let params = Parameters {
        application: Some("Shop".into()),
        url: Some("http://shop".into()),
        ..Default::default()
    };

    let err = {
        let engine = CommandEngine::new(&mut robot, &cipher, &console, identity());
        let mut session = InteractionLoop::new(synchronizer(&tmp), engine, &console);
        session.run_live(Some(1), &params, &mut FlagSource).unwrap_err()
    };

    assert!(err.is_fatal());
    assert!(synchronizer(&tmp).load_all(&console).application("Shop").is_none());
}

#[test]
fn test_replay_rebuilds_scaffold_from_descriptors() {
    let tmp = TempDir::new().unwrap();
    let console = RecordingConsole::new();
    let cipher = AgeCipher::with_work_factor(2);

    let sync = synchronizer(&tmp);
    let mut store = sync.load_all(&console);
    let mut shop = Application::new("Shop", "http://shop");
    shop.models.push(robocli::store::Model::from_lists("Cart", "item qty", None));
    store.add_application(shop);
    store.add_scenario(Scenario::new("Buy", "buy a cake", "Shop"));
    sync.persist_all(&mut store, &console);

    let robot_root = tmp.path().join("robot");
    let mut robot = ScaffoldProject::new(&robot_root);
    let report = {
        let engine = CommandEngine::new(&mut robot, &cipher, &console, identity());
        let mut session = InteractionLoop::new(sync, engine, &console);
        session.run_replay()
    };

    assert_eq!((report.applications, report.models, report.scenarios), (1, 1, 1));
    assert!(paths::robot::model_path(&robot_root, "Shop", "Cart").exists());
    let feature = std::fs::read_to_string(paths::robot::scenario_path(&robot_root, "Buy")).unwrap();
    assert!(feature.contains("@Bakery"));
}

#[test]
fn test_unwritable_descriptor_changes_the_footer() {
    let tmp = TempDir::new().unwrap();
    let console = RecordingConsole::new();
    let cipher = AgeCipher::with_work_factor(2);
    let mut robot = FakeRobot::new();
    let sync = synchronizer(&tmp);
    // A plain file where the applications directory should be
    std::fs::create_dir_all(paths::cli_files_dir(tmp.path())).unwrap();
    std::fs::write(sync.applications_dir(), "not a directory").unwrap();

    let params = Parameters {
        application: Some("Shop".into()),
        url: Some("http://shop".into()),
        ..Default::default()
    };
    let report = {
        let engine = CommandEngine::new(&mut robot, &cipher, &console, identity());
        let mut session = InteractionLoop::new(sync, engine, &console);
        session.run_live(Some(1), &params, &mut FlagSource).unwrap()
    };

    assert_eq!(report.completed.len(), 1);
    assert_eq!(report.unsaved.len(), 1);
    assert!(console.contains("1 descriptor file(s) are not up to date"));
    assert!(!console.contains("robocli finished with success."));
}
