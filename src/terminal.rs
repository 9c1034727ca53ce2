//! Request/response front end over the interpreter.
//!
//! Mirrors what a transport layer exposes: run a line, save an edited file,
//! ask for suggestions. Each call returns a [`Response`] carrying the
//! session directory next to the outcome; wrapping it for the wire is left
//! to the caller.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::command::Outcome;
use crate::dictionary::Dictionaries;
use crate::interpreter::Interpreter;
use crate::suggest::SuggestionIndex;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub output: Outcome,
    pub cwd: PathBuf,
}

pub struct Terminal {
    interpreter: Interpreter,
    dictionaries: Dictionaries,
    rewrite: bool,
}

impl Terminal {
    pub fn new(interpreter: Interpreter, dictionaries: Dictionaries) -> Self {
        Self {
            interpreter,
            dictionaries,
            rewrite: true,
        }
    }

    /// Turn natural-language rewriting on or off.
    pub fn set_rewrite(&mut self, enabled: bool) {
        self.rewrite = enabled;
    }

    pub fn cwd(&self) -> &Path {
        &self.interpreter.session().current_dir
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn suggestions(&self) -> &SuggestionIndex {
        &self.dictionaries.suggestions
    }

    /// Handle one submitted line.
    ///
    /// `man` lines are answered from the manual and never reach the
    /// interpreter. Anything else may be rewritten first; the history then
    /// records the line that actually ran.
    pub fn run(&mut self, input: &str) -> Response {
        let input = input.trim();
        if input.is_empty() {
            return self.respond(Outcome::text("No command provided"));
        }

        if let Some(page) = self.dictionaries.manual.query(input) {
            return self.respond(Outcome::text(page));
        }

        let rewritten = if self.rewrite {
            self.dictionaries.phrases.rewrite(input)
        } else {
            None
        };
        let line = rewritten.unwrap_or(input).to_string();
        let output = self.interpreter.execute(&line);
        self.respond(output)
    }

    /// Second half of the edit protocol, see [`Interpreter::save`].
    pub fn save(&mut self, filename: &str, payload: &str) -> Response {
        let output = self.interpreter.save(filename, payload);
        self.respond(output)
    }

    pub fn suggest(&self, typed: &str) -> Vec<String> {
        self.dictionaries.suggestions.suggest(typed)
    }

    fn respond(&self, output: Outcome) -> Response {
        Response {
            output,
            cwd: self.cwd().to_path_buf(),
        }
    }
}
