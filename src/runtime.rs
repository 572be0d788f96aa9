use log::warn;
use std::collections::VecDeque;
use std::io::BufRead;
use std::str::FromStr;

use crate::store::SessionStore;
use crate::summary::SessionSummary;
use crate::throws::Outcome;
use crate::tracker::{SessionTracker, TrackerEvent};

/// One user action during a practice session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PracticeCommand {
    Throw(Outcome),
    Undo,
    Save,
    Discard,
    Quit,
}

impl FromStr for PracticeCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "u" | "undo" => Ok(PracticeCommand::Undo),
            "s" | "save" => Ok(PracticeCommand::Save),
            "d" | "discard" => Ok(PracticeCommand::Discard),
            "q" | "quit" => Ok(PracticeCommand::Quit),
            other => other
                .parse::<Outcome>()
                .map(PracticeCommand::Throw)
                .map_err(|_| format!("unknown command '{other}'")),
        }
    }
}

/// Source of practice commands (stdin, a script, ...)
pub trait CommandSource {
    /// Next command, or None once input is exhausted
    fn next_command(&mut self) -> Option<PracticeCommand>;
}

/// Expands one input token into commands. A run of single-letter commands
/// such as `hhbm` yields one command per letter.
pub fn parse_token(token: &str) -> Result<Vec<PracticeCommand>, String> {
    match token.parse::<PracticeCommand>() {
        Ok(cmd) => Ok(vec![cmd]),
        Err(_) if token.chars().all(|c| "hbmusdq".contains(c.to_ascii_lowercase())) => token
            .chars()
            .map(|c| c.to_string().parse())
            .collect(),
        Err(e) => Err(e),
    }
}

/// Splits a line of input on whitespace and commas
fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
}

/// Reads commands line by line from any buffered reader.
///
/// Unknown tokens and undecodable bytes are skipped with a warning so a bad
/// keystroke never ends the session.
pub struct LineCommandSource<R: BufRead> {
    reader: R,
    pending: VecDeque<PracticeCommand>,
}

impl<R: BufRead> LineCommandSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }
}

impl<R: BufRead> CommandSource for LineCommandSource<R> {
    fn next_command(&mut self) -> Option<PracticeCommand> {
        loop {
            if let Some(cmd) = self.pending.pop_front() {
                return Some(cmd);
            }
            let mut buf = Vec::new();
            match self.reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    warn!("stopped reading commands: {e}");
                    return None;
                }
            }
            let line = String::from_utf8_lossy(&buf);
            for token in tokens(&line) {
                match parse_token(token) {
                    Ok(cmds) => self.pending.extend(cmds),
                    Err(e) => warn!("{e}"),
                }
            }
        }
    }
}

/// Pre-parsed commands, e.g. from `record hhbm hhhh ...`
#[derive(Debug, Clone)]
pub struct ScriptCommandSource {
    commands: VecDeque<PracticeCommand>,
}

impl ScriptCommandSource {
    pub fn new(commands: impl IntoIterator<Item = PracticeCommand>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }

    /// Parses a throw script, rejecting it whole if any token is unknown
    pub fn parse(script: &str) -> Result<Self, String> {
        let mut commands = Vec::new();
        for token in tokens(script) {
            commands.extend(parse_token(token)?);
        }
        Ok(Self::new(commands))
    }

    pub fn followed_by(mut self, command: PracticeCommand) -> Self {
        self.commands.push_back(command);
        self
    }
}

impl CommandSource for ScriptCommandSource {
    fn next_command(&mut self) -> Option<PracticeCommand> {
        self.commands.pop_front()
    }
}

/// How a practice run ended
#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    Saved(SessionSummary),
    Discarded,
    /// Input ended or the user quit with the session unsaved
    Abandoned,
}

/// Something worth telling the user while a session runs
#[derive(Clone, Debug, PartialEq)]
pub enum RunReport<'a> {
    Event(&'a TrackerEvent),
    SaveFailed(String),
}

/// Drives a tracker from a command source, one command at a time
pub struct Runner<C: CommandSource> {
    source: C,
}

impl<C: CommandSource> Runner<C> {
    pub fn new(source: C) -> Self {
        Self { source }
    }

    /// Runs until the session is saved, discarded, or input ends.
    ///
    /// A failed save is reported and the loop keeps going so it can be retried.
    pub fn run(
        &mut self,
        tracker: &mut SessionTracker,
        store: &dyn SessionStore,
        mut report: impl FnMut(&SessionTracker, RunReport),
    ) -> RunOutcome {
        while let Some(command) = self.source.next_command() {
            let event = match command {
                PracticeCommand::Throw(outcome) => tracker.record_throw(outcome),
                PracticeCommand::Undo => tracker.undo_last_throw(),
                PracticeCommand::Discard => {
                    tracker.discard_session();
                    return RunOutcome::Discarded;
                }
                PracticeCommand::Quit => return RunOutcome::Abandoned,
                PracticeCommand::Save => match tracker.save(store) {
                    Ok(Some(summary)) => return RunOutcome::Saved(summary),
                    Ok(None) => TrackerEvent::Ignored,
                    Err(e) => {
                        report(tracker, RunReport::SaveFailed(e.to_string()));
                        continue;
                    }
                },
            };
            report(tracker, RunReport::Event(&event));
        }
        RunOutcome::Abandoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::StaticSettings;
    use crate::store::SqliteSessionStore;
    use crate::tracker::SessionState;
    use assert_matches::assert_matches;

    fn started() -> SessionTracker {
        let mut tracker = SessionTracker::new(&StaticSettings::default());
        tracker.setup_new_session();
        tracker
    }

    #[test]
    fn parse_commands() {
        assert_eq!("h".parse(), Ok(PracticeCommand::Throw(Outcome::InHole)));
        assert_eq!("Undo".parse(), Ok(PracticeCommand::Undo));
        assert_eq!("s".parse(), Ok(PracticeCommand::Save));
        assert!("zz".parse::<PracticeCommand>().is_err());
    }

    #[test]
    fn script_splits_letter_runs() {
        let mut source = ScriptCommandSource::parse("hhbm, miss u\nboard").unwrap();
        let mut commands = Vec::new();
        while let Some(c) = source.next_command() {
            commands.push(c);
        }
        assert_eq!(
            commands,
            vec![
                PracticeCommand::Throw(Outcome::InHole),
                PracticeCommand::Throw(Outcome::InHole),
                PracticeCommand::Throw(Outcome::OnBoard),
                PracticeCommand::Throw(Outcome::Miss),
                PracticeCommand::Throw(Outcome::Miss),
                PracticeCommand::Undo,
                PracticeCommand::Throw(Outcome::OnBoard),
            ]
        );
    }

    #[test]
    fn script_rejects_garbage() {
        assert!(ScriptCommandSource::parse("hhxz").is_err());
    }

    #[test]
    fn line_source_skips_bad_tokens() {
        let input = "h b\nnope m\n\nq\n";
        let mut source = LineCommandSource::new(input.as_bytes());
        assert_eq!(source.next_command(), Some(PracticeCommand::Throw(Outcome::InHole)));
        assert_eq!(source.next_command(), Some(PracticeCommand::Throw(Outcome::OnBoard)));
        assert_eq!(source.next_command(), Some(PracticeCommand::Throw(Outcome::Miss)));
        assert_eq!(source.next_command(), Some(PracticeCommand::Quit));
        assert_eq!(source.next_command(), None);
    }

    #[test]
    fn line_source_splits_letter_runs_like_scripts() {
        let mut source = LineCommandSource::new("hhbm, u\n".as_bytes());
        let mut commands = Vec::new();
        while let Some(c) = source.next_command() {
            commands.push(c);
        }
        let mut script = ScriptCommandSource::parse("hhbm, u").unwrap();
        let mut expected = Vec::new();
        while let Some(c) = script.next_command() {
            expected.push(c);
        }
        assert_eq!(commands, expected);
        assert_eq!(commands.len(), 5);
    }

    #[test]
    fn line_source_skips_undecodable_lines() {
        let input: &[u8] = b"h h\n\xff\xfe\nb\n";
        let mut source = LineCommandSource::new(input);
        assert_eq!(source.next_command(), Some(PracticeCommand::Throw(Outcome::InHole)));
        assert_eq!(source.next_command(), Some(PracticeCommand::Throw(Outcome::InHole)));
        assert_eq!(source.next_command(), Some(PracticeCommand::Throw(Outcome::OnBoard)));
        assert_eq!(source.next_command(), None);
    }

    #[test]
    fn run_saves_after_garbage_bytes() {
        let store = SqliteSessionStore::in_memory().unwrap();
        let mut tracker = started();
        let input: &[u8] = b"h h h h\nh h h h\n\xff\xfe\nb b b b\ns\n";
        let mut runner = Runner::new(LineCommandSource::new(input));

        let outcome = runner.run(&mut tracker, &store, |_, _| {});

        assert_matches!(outcome, RunOutcome::Saved(ref s) if s.points_per_round == 28.0 / 3.0);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn run_saves_full_session() {
        let store = SqliteSessionStore::in_memory().unwrap();
        let mut tracker = started();
        let script = format!("{} s", "hhbm ".repeat(10));
        let mut runner = Runner::new(ScriptCommandSource::parse(&script).unwrap());

        let mut events = 0;
        let outcome = runner.run(&mut tracker, &store, |_, _| events += 1);

        assert_matches!(outcome, RunOutcome::Saved(ref s) if s.points_per_round == 7.0);
        assert_eq!(events, 40);
        assert_eq!(tracker.state(), SessionState::Ready);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn run_reports_completion_and_undo() {
        let store = SqliteSessionStore::in_memory().unwrap();
        let mut tracker = started();
        let script = format!("{} u h q", "hhhh ".repeat(10));
        let mut runner = Runner::new(ScriptCommandSource::parse(&script).unwrap());

        let mut completions = 0;
        let mut undos = 0;
        let outcome = runner.run(&mut tracker, &store, |_, report| match report {
            RunReport::Event(TrackerEvent::SessionComplete) => completions += 1,
            RunReport::Event(TrackerEvent::Undone(_)) => undos += 1,
            _ => {}
        });

        assert_eq!(outcome, RunOutcome::Abandoned);
        assert_eq!((completions, undos), (2, 1));
        assert_eq!(tracker.state(), SessionState::Completed);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn run_discard() {
        let store = SqliteSessionStore::in_memory().unwrap();
        let mut tracker = started();
        let mut runner = Runner::new(ScriptCommandSource::parse("h h d h").unwrap());
        assert_eq!(runner.run(&mut tracker, &store, |_, _| {}), RunOutcome::Discarded);
        assert_eq!(tracker.state(), SessionState::Ready);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn run_ends_when_input_ends() {
        let store = SqliteSessionStore::in_memory().unwrap();
        let mut tracker = started();
        let mut runner = Runner::new(LineCommandSource::new("h b m".as_bytes()));
        assert_eq!(runner.run(&mut tracker, &store, |_, _| {}), RunOutcome::Abandoned);
        assert_eq!(tracker.history().len(), 3);
    }
}
