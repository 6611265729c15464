//! Where missing parameters come from.

use super::CommandError;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// Source of values the command line did not supply.
///
/// `Ok(None)` means "no answer available", which the engine turns into a
/// usage error. The interactive source always answers (or fails on a closed
/// input stream); the flag source never does.
pub trait ParameterSource {
    fn is_interactive(&self) -> bool;

    /// Ask for one line of free text
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, CommandError>;

    /// Show a prompt followed by `entries`, then read one raw answer
    fn pick(&mut self, prompt: &str, entries: &[String]) -> Result<Option<String>, CommandError>;

    /// Pick one of `options` by its 1-based index
    fn choose(&mut self, prompt: &str, options: &[String]) -> Result<Option<String>, CommandError> {
        let entries: Vec<String> = options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("    {}) {}", i + 1, option))
            .collect();
        let Some(answer) = self.pick(prompt, &entries)? else {
            return Ok(None);
        };
        let selected: usize = answer
            .trim()
            .parse()
            .map_err(|_| CommandError::InvalidSelection(answer.clone()))?;
        if selected == 0 || selected > options.len() {
            return Err(CommandError::SelectionOutOfRange {
                selected,
                max: options.len(),
            });
        }
        Ok(Some(options[selected - 1].clone()))
    }

    /// Yes/no question, only `y` (any case) means yes
    fn confirm(&mut self, question: &str) -> Result<bool, CommandError> {
        Ok(self
            .ask(question)?
            .is_some_and(|answer| answer.eq_ignore_ascii_case("y")))
    }
}

// =============================================================================
// Interactive
// =============================================================================

/// Line-reading source: prompts on `output`, answers from `input`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the prompter, returning what was written to the operator
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<String, CommandError> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(CommandError::Input)?;
        if read == 0 {
            return Err(CommandError::InputClosed);
        }
        Ok(line.trim().to_string())
    }

    fn show(&mut self, text: &str) -> Result<(), CommandError> {
        writeln!(self.output, "{}", text).map_err(CommandError::Input)
    }
}

impl Prompter<StdinLock<'static>, Stdout> {
    /// Prompter on the process terminal
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ParameterSource for Prompter<R, W> {
    fn is_interactive(&self) -> bool {
        true
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>, CommandError> {
        write!(self.output, "{} ", prompt).map_err(CommandError::Input)?;
        self.output.flush().map_err(CommandError::Input)?;
        self.read_line().map(Some)
    }

    fn pick(&mut self, prompt: &str, entries: &[String]) -> Result<Option<String>, CommandError> {
        self.show(prompt)?;
        for entry in entries {
            self.show(entry)?;
        }
        self.output.flush().map_err(CommandError::Input)?;
        self.read_line().map(Some)
    }
}

// =============================================================================
// Flags only
// =============================================================================

/// Non-interactive source: whatever the flags did not give stays missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlagSource;

impl ParameterSource for FlagSource {
    fn is_interactive(&self) -> bool {
        false
    }

    fn ask(&mut self, _prompt: &str) -> Result<Option<String>, CommandError> {
        Ok(None)
    }

    fn pick(&mut self, _prompt: &str, _entries: &[String]) -> Result<Option<String>, CommandError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn options() -> Vec<String> {
        vec!["Shop".to_string(), "Admin".to_string()]
    }

    #[test]
    fn test_ask_trims_and_prompts() {
        let mut source = prompter("  Shop  \n");
        assert_eq!(source.ask("Enter application name:").unwrap(), Some("Shop".into()));
        let output = String::from_utf8(source.into_output()).unwrap();
        assert!(output.contains("Enter application name:"));
    }

    #[test]
    fn test_choose_is_one_based() {
        let mut source = prompter("2\n");
        assert_eq!(
            source.choose("Enter index application number:", &options()).unwrap(),
            Some("Admin".into())
        );
        let output = String::from_utf8(source.into_output()).unwrap();
        assert!(output.contains("    1) Shop"));
        assert!(output.contains("    2) Admin"));
    }

    #[test]
    fn test_choose_rejects_out_of_range_and_garbage() {
        let mut source = prompter("3\n0\nabc\n");
        assert!(matches!(
            source.choose("pick", &options()),
            Err(CommandError::SelectionOutOfRange { selected: 3, max: 2 })
        ));
        assert!(matches!(
            source.choose("pick", &options()),
            Err(CommandError::SelectionOutOfRange { selected: 0, .. })
        ));
        assert!(matches!(
            source.choose("pick", &options()),
            Err(CommandError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_closed_input() {
        let mut source = prompter("");
        assert!(matches!(source.ask("name"), Err(CommandError::InputClosed)));
    }

    #[test]
    fn test_confirm() {
        let mut source = prompter("Y\nno\n");
        assert!(source.confirm("Do you want add new application?").unwrap());
        assert!(!source.confirm("Do you want add new application?").unwrap());
    }

    #[test]
    fn test_flag_source_never_answers() {
        let mut source = FlagSource;
        assert!(!source.is_interactive());
        assert_eq!(source.ask("name").unwrap(), None);
        assert_eq!(source.choose("pick", &options()).unwrap(), None);
        assert!(!source.confirm("sure?").unwrap());
    }
}
