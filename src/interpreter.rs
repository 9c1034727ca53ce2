use crate::command::{Command, Context, Outcome};
use crate::error::{CommandError, Result};
use crate::external::ExternalLauncher;
use crate::lexer;
use crate::metrics::{SysinfoMetrics, SystemMetrics};
use crate::session::Session;
use std::collections::HashMap;

/// Tokenizes command lines and dispatches them to built-in or external commands.
///
/// The interpreter owns a [`Session`] and a registry of [`Command`]s keyed by
/// exact, case-sensitive name. Names without an entry go to the
/// [`ExternalLauncher`]. See [`Default`] for the built-ins included out of
/// the box.
///
/// Example
/// ```
/// use terminal_commands::{Interpreter, Outcome};
/// let mut sh = Interpreter::default();
/// sh.execute("pwd");
/// assert_eq!(sh.execute("history"), Outcome::text("pwd\nhistory"));
/// ```
pub struct Interpreter {
    session: Session,
    commands: HashMap<&'static str, Box<dyn Command>>,
    fallback: ExternalLauncher,
    metrics: Box<dyn SystemMetrics>,
}

impl Interpreter {
    /// Create an interpreter with an empty registry.
    pub fn new(session: Session, metrics: Box<dyn SystemMetrics>) -> Self {
        Self {
            session,
            commands: HashMap::new(),
            fallback: ExternalLauncher,
            metrics,
        }
    }

    /// Create an interpreter with every built-in registered.
    pub fn with_builtins(session: Session, metrics: Box<dyn SystemMetrics>) -> Self {
        let mut interpreter = Self::new(session, metrics);
        for cmd in crate::builtin::builtins() {
            interpreter.register(cmd);
        }
        interpreter
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name(), cmd);
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Run one command line.
    ///
    /// Every non-empty line is recorded in the session history before it
    /// runs, whether it succeeds or not. Failures come back as text prefixed
    /// with the command name; only a line that cannot be tokenized yields
    /// `Error: <detail>`.
    pub fn execute(&mut self, line: &str) -> Outcome {
        let line = line.trim();
        if line.is_empty() {
            return Outcome::text("");
        }
        self.session.history.push(line);

        let tokens = match lexer::split_into_tokens(line) {
            Ok(tokens) => tokens,
            Err(e) => return Outcome::text(format!("Error: {}", CommandError::from(e))),
        };
        let Some((name, args)) = tokens.split_first() else {
            return Outcome::text("");
        };

        match self.dispatch(name, args) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("{name} failed: {e}");
                Outcome::text(format!("{name}: {e}"))
            }
        }
    }

    /// Write an edited file sent back by a client.
    ///
    /// This is not reachable by typing a command line and is not recorded in
    /// the history.
    pub fn save(&mut self, filename: &str, payload: &str) -> Outcome {
        match crate::editor::save(filename, payload, &self.session) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("save of {filename} failed: {e}");
                Outcome::text(format!("save: {e}"))
            }
        }
    }

    fn dispatch(&mut self, name: &str, args: &[String]) -> Result<Outcome> {
        match self.commands.get(name) {
            Some(cmd) => {
                log::debug!("builtin {name} {args:?}");
                let mut ctx = Context {
                    session: &mut self.session,
                    metrics: self.metrics.as_mut(),
                };
                cmd.execute(args, &mut ctx)
            }
            None => self.fallback.launch(name, args, &self.session),
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter in the process working directory with all
    /// built-ins and `sysinfo` backed metrics.
    fn default() -> Self {
        Self::with_builtins(Session::new(), Box::new(SysinfoMetrics::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::tests::FakeMetrics;
    use crate::editor::encode_payload;
    use tempfile::TempDir;

    fn interpreter() -> (TempDir, Interpreter) {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = Session::with_dir(dir.path());
        let sh = Interpreter::with_builtins(session, Box::new(FakeMetrics { processes: 3 }));
        (dir, sh)
    }

    fn text(outcome: Outcome) -> String {
        match outcome {
            Outcome::Text { text } => text,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_line_is_not_recorded() {
        let (_dir, mut sh) = interpreter();
        assert_eq!(sh.execute("   "), Outcome::text(""));
        assert!(sh.session().history.is_empty());
    }

    #[test]
    fn test_every_line_recorded_once() {
        let (_dir, mut sh) = interpreter();
        sh.execute("  pwd  ");
        sh.execute("cat missing");
        sh.execute("echo 'unterminated");
        sh.execute("history");
        assert_eq!(
            sh.session().history.recent(10),
            ["pwd", "cat missing", "echo 'unterminated", "history"]
        );
    }

    #[test]
    fn test_history_shows_last_twenty() {
        let (_dir, mut sh) = interpreter();
        for i in 0..24 {
            sh.execute(&format!("pwd {i}"));
        }
        let out = text(sh.execute("history"));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 20);
        assert_eq!(lines[0], "pwd 5");
        assert_eq!(lines[18], "pwd 23");
        assert_eq!(lines[19], "history");
    }

    #[test]
    fn test_mkdir_then_rmdir_restores_listing() {
        let (_dir, mut sh) = interpreter();
        sh.execute("touch existing");
        let before = sh.execute("ls");
        assert_eq!(sh.execute("mkdir x"), Outcome::text("Created directory x"));
        assert_eq!(sh.execute("rmdir x"), Outcome::text("Removed directory x"));
        assert_eq!(sh.execute("ls"), before);
    }

    #[test]
    fn test_touch_then_cat_is_empty() {
        let (_dir, mut sh) = interpreter();
        sh.execute("touch f");
        assert_eq!(sh.execute("cat f"), Outcome::text(""));
    }

    #[test]
    fn test_edit_round_trip() {
        let (_dir, mut sh) = interpreter();
        assert_eq!(
            sh.execute("vim f"),
            Outcome::OpenEditor {
                filename: "f".into(),
                content: String::new()
            }
        );
        let saved = sh.save("f", &encode_payload("hello\nworld"));
        assert_eq!(saved, Outcome::text("Saved file f"));
        assert_eq!(sh.execute("cat f"), Outcome::text("hello\nworld"));
    }

    #[test]
    fn test_save_is_not_a_command() {
        let (_dir, mut sh) = interpreter();
        sh.execute("touch f");
        let before = sh.session().history.len();
        let out = text(sh.save("f", "!!!"));
        assert!(out.starts_with("save: cannot decode payload"));
        assert_eq!(sh.session().history.len(), before);
        assert_eq!(sh.execute("cat f"), Outcome::text(""));

        let out = text(sh.execute(&format!("__save__ f {}", encode_payload("x"))));
        assert_eq!(out, "__save__: command not found");
        assert_eq!(sh.execute("cat f"), Outcome::text(""));
    }

    #[test]
    fn test_errors_are_prefixed_with_command() {
        let (_dir, mut sh) = interpreter();
        assert_eq!(
            sh.execute("ls missing_dir"),
            Outcome::text("ls: cannot access 'missing_dir': No such file or directory")
        );
        assert_eq!(sh.execute("cd"), Outcome::text("cd: missing operand"));
        assert_eq!(
            sh.execute("chmod abc f"),
            Outcome::text("chmod: invalid mode: 'abc'")
        );
    }

    #[test]
    fn test_malformed_input() {
        let (_dir, mut sh) = interpreter();
        assert_eq!(
            sh.execute("cat \"unterminated"),
            Outcome::text("Error: No closing quotation")
        );
    }

    #[test]
    fn test_quoted_paths() {
        let (dir, mut sh) = interpreter();
        sh.execute("mkdir \"my dir\"");
        assert!(dir.path().join("my dir").is_dir());
        sh.execute("touch 'my dir/a b.txt'");
        assert_eq!(sh.execute("ls 'my dir'"), Outcome::text("a b.txt"));
    }

    #[test]
    fn test_dispatch_is_case_sensitive() {
        let (_dir, mut sh) = interpreter();
        let out = text(sh.execute("PWD_not_a_builtin"));
        assert_eq!(out, "PWD_not_a_builtin: command not found");
    }

    #[test]
    fn test_unknown_command_goes_external() {
        let (_dir, mut sh) = interpreter();
        assert_eq!(
            sh.execute("foobar --x"),
            Outcome::text("foobar: command not found")
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_external_output_is_verbatim() {
        let (_dir, mut sh) = interpreter();
        assert_eq!(
            sh.execute("echo 'a  b' c"),
            Outcome::text("a  b c\n")
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_external_follows_cd() {
        let (dir, mut sh) = interpreter();
        sh.execute("mkdir sub");
        sh.execute("touch sub/inside");
        sh.execute("cd sub");
        assert_eq!(sh.execute("ls"), Outcome::text("inside"));
        assert!(dir.path().join("sub").is_dir());
        assert_eq!(sh.execute("/bin/ls"), Outcome::text("inside\n"));
    }

    #[test]
    fn test_metrics_and_clear() {
        let (_dir, mut sh) = interpreter();
        assert_eq!(sh.execute("cpu"), Outcome::text("CPU Usage: 12.5%"));
        assert_eq!(
            sh.execute("ps"),
            Outcome::text("     1  proc1\n     2  proc2\n     3  proc3")
        );
        assert_eq!(sh.execute("clear"), Outcome::ClearScreen);
    }

    #[test]
    fn test_register_replaces_builtin() {
        struct Loud;
        impl Command for Loud {
            fn name(&self) -> &'static str {
                "pwd"
            }
            fn execute(&self, _args: &[String], _ctx: &mut Context<'_>) -> Result<Outcome> {
                Ok(Outcome::text("HERE"))
            }
        }
        let (_dir, mut sh) = interpreter();
        sh.register(Box::new(Loud));
        assert_eq!(sh.execute("pwd"), Outcome::text("HERE"));
    }
}
