//! Local interactive loop.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context as _;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};

use crate::command::Outcome;
use crate::editor::encode_payload;
use crate::lexer;
use crate::suggest::SuggestionIndex;
use crate::terminal::Terminal;

/// Tab completion backed by the suggestion dictionary.
struct SuggestionHelper {
    index: SuggestionIndex,
}

impl Completer for SuggestionHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = self
            .index
            .suggest(&line[..pos])
            .into_iter()
            .map(|s| Pair {
                display: s.clone(),
                replacement: s,
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for SuggestionHelper {
    type Hint = String;
}

impl Highlighter for SuggestionHelper {}

impl Validator for SuggestionHelper {}

impl Helper for SuggestionHelper {}

/// Read lines until `exit`, `quit`, Ctrl-C or Ctrl-D.
pub fn repl(terminal: &mut Terminal) -> rustyline::Result<()> {
    let mut rl: Editor<SuggestionHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(SuggestionHelper {
        index: terminal.suggestions().clone(),
    }));

    loop {
        let prompt = format!("{}$ ", terminal.cwd().display());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if matches!(line, "exit" | "quit") {
                    break;
                }
                rl.add_history_entry(line)?;
                let response = terminal.run(line);
                present(terminal, response.output);
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("Exiting...");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

fn present(terminal: &mut Terminal, outcome: Outcome) {
    match outcome {
        Outcome::Text { text } => {
            if text.ends_with('\n') || text.is_empty() {
                print!("{text}");
            } else {
                println!("{text}");
            }
        }
        Outcome::ClearScreen => {
            print!("\x1b[2J\x1b[H");
            let _ = std::io::stdout().flush();
        }
        Outcome::OpenEditor { filename, content } => match edit_locally(&filename, &content) {
            Ok(edited) => {
                let response = terminal.save(&filename, &encode_payload(&edited));
                present(terminal, response.output);
            }
            Err(e) => println!("vim: {e:#}"),
        },
    }
}

/// Let `$EDITOR` (or `vi`) edit a scratch copy and return the result.
fn edit_locally(filename: &str, content: &str) -> anyhow::Result<String> {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let argv = lexer::split_into_tokens(&editor).context("can't parse $EDITOR")?;
    let (program, extra) = argv.split_first().context("$EDITOR is empty")?;

    let suffix = Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let mut scratch = tempfile::Builder::new()
        .prefix("edit-")
        .suffix(&suffix)
        .tempfile()
        .context("can't create scratch file")?;
    scratch.write_all(content.as_bytes())?;
    scratch.flush()?;

    let status = std::process::Command::new(program)
        .args(extra)
        .arg(scratch.path())
        .status()
        .with_context(|| format!("can't start {program}"))?;
    if !status.success() {
        anyhow::bail!("{program} exited with {status}, changes discarded");
    }
    fs::read_to_string(scratch.path()).context("can't read edited file")
}
