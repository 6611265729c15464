use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use robocli::command::{CommandEngine, Feature, FlagSource, Parameters, Prompter, ReplayReport};
use robocli::config::CliConfig;
use robocli::console::{Console, TracingConsole};
use robocli::crypto::{AgeCipher, Cipher};
use robocli::paths;
use robocli::robot::ScaffoldProject;
use robocli::session::{InteractionLoop, LiveReport};
use robocli::sync::FileSynchronizer;

#[derive(Parser, Debug)]
#[command(
    author,
    version = env!("CARGO_PKG_VERSION"),
    about = "Scaffold applications, scenarios and models of a test robot",
    long_about = None,
    disable_help_flag = true
)]
struct Cli {
    /// Log every step, descriptor files included
    #[arg(long)]
    verbose: bool,

    /// Regenerate the robot project from the descriptor files, then exit
    #[arg(long)]
    update: bool,

    /// Prompt for missing values (false: flags only, one pass)
    #[arg(
        long = "interactive-mode",
        action = clap::ArgAction::Set,
        value_parser = parse_lenient_bool,
        default_value = "true"
    )]
    interactive_mode: bool,

    /// Feature code (0 to 8)
    #[arg(short = 'f')]
    feature: Option<u8>,

    /// Scenario name
    #[arg(short = 's', allow_hyphen_values = true)]
    scenario: Option<String>,

    /// Application url
    #[arg(short = 'u', allow_hyphen_values = true)]
    url: Option<String>,

    /// Scenario description, or data to encrypt/decrypt
    #[arg(short = 'd', allow_hyphen_values = true)]
    description: Option<String>,

    /// Application name
    #[arg(short = 'a', allow_hyphen_values = true)]
    application: Option<String>,

    /// Model name
    #[arg(short = 'm', allow_hyphen_values = true)]
    model: Option<String>,

    /// Model fields, space separated
    #[arg(long = "fields", allow_hyphen_values = true)]
    fields: Option<String>,

    /// Model results, space separated
    #[arg(long = "results", allow_hyphen_values = true)]
    results: Option<String>,

    /// Crypto key
    #[arg(short = 'k', allow_hyphen_values = true)]
    key: Option<String>,

    /// Project directory holding .robocli/
    #[arg(long, default_value = ".")]
    project: PathBuf,
}

impl Cli {
    fn parameters(&self) -> Parameters {
        Parameters {
            application: self.application.clone(),
            scenario: self.scenario.clone(),
            model: self.model.clone(),
            url: self.url.clone(),
            description: self.description.clone(),
            fields: self.fields.clone(),
            results: self.results.clone(),
            key: self.key.clone(),
        }
    }
}

fn parse_lenient_bool(value: &str) -> Result<bool, String> {
    Ok(value.eq_ignore_ascii_case("true"))
}

/// Flags whose next argument is a value, legacy spellings included
const VALUE_FLAGS: [&str; 14] = [
    "-f",
    "-s",
    "-u",
    "-d",
    "-a",
    "-m",
    "-k",
    "-fi",
    "-re",
    "-interactiveMode",
    "--fields",
    "--results",
    "--interactive-mode",
    "--project",
];

/// Rewrite the historical single-dash long flags into clap's form.
/// Help flags are dropped; the bool reports a lone help request.
/// Values following a value-taking flag are passed through untouched.
fn normalize_legacy_flags(args: Vec<String>) -> (Vec<String>, bool) {
    let lone_help = args.len() == 2 && matches!(args[1].as_str(), "-h" | "-help" | "--help");
    let mut normalized = Vec::with_capacity(args.len());
    let mut expects_value = false;

    for (index, arg) in args.into_iter().enumerate() {
        if index == 0 || expects_value {
            expects_value = false;
            normalized.push(arg);
            continue;
        }
        expects_value = VALUE_FLAGS.contains(&arg.as_str());
        let flag = match arg.as_str() {
            "-h" | "-help" | "--help" => continue,
            "-interactiveMode" => "--interactive-mode".to_string(),
            "-fi" => "--fields".to_string(),
            "-re" => "--results".to_string(),
            "-verbose" => "--verbose".to_string(),
            "-update" => "--update".to_string(),
            _ => arg,
        };
        normalized.push(flag);
    }
    (normalized, lone_help)
}

fn print_help() -> Result<()> {
    Cli::command().print_help()?;
    println!("\nFeatures (-f):");
    for feature in Feature::ALL {
        println!("    {} => {}", feature.code(), feature.label());
    }
    println!("\nLegacy flags -interactiveMode, -fi and -re are accepted.");
    Ok(())
}

fn main() -> Result<()> {
    let (args, lone_help) = normalize_legacy_flags(std::env::args().collect());
    if lone_help {
        return print_help();
    }
    let cli = Cli::parse_from(args);

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .without_time()
        .init();

    let console = TracingConsole;
    match run(&cli, &console, &AgeCipher::new())? {
        RunSummary::Replay(report) => {
            if !report.failed.is_empty() {
                anyhow::bail!("{} descriptor(s) could not be replayed", report.failed.len());
            }
        }
        RunSummary::Live(report) => console.debug(&format!(
            "{} operation(s) completed, {} abandoned",
            report.completed.len(),
            report.rejected.len()
        )),
    }
    Ok(())
}

/// What one invocation did
#[derive(Debug)]
enum RunSummary {
    Replay(ReplayReport),
    Live(LiveReport),
}

/// Wire the project named by the flags and run the requested mode.
fn run(cli: &Cli, console: &dyn Console, cipher: &dyn Cipher) -> Result<RunSummary> {
    let config = CliConfig::load(&cli.project).context("Failed to load robocli configuration")?;
    let mut robot = ScaffoldProject::new(config.robot_root(&cli.project));
    let sync = FileSynchronizer::new(&paths::cli_files_dir(&cli.project));
    let engine = CommandEngine::new(&mut robot, cipher, console, config.robot_identity());
    let mut session = InteractionLoop::new(sync, engine, console);

    if cli.update {
        return Ok(RunSummary::Replay(session.run_replay()));
    }

    let params = cli.parameters();
    let report = if cli.interactive_mode {
        session.splash();
        session.run_live(cli.feature, &params, &mut Prompter::stdio())?
    } else {
        console.debug(&format!(
            "Command Line: {}",
            std::env::args().skip(1).collect::<Vec<_>>().join(" ")
        ));
        session.run_live(cli.feature, &params, &mut FlagSource)?
    };
    Ok(RunSummary::Live(report))
}
