//! A small command interpretation engine.
//!
//! Single command lines (filesystem operations, system monitoring queries,
//! or any external program) are tokenized, dispatched and answered with one
//! [`Outcome`]. The engine is built from a few pieces:
//!
//! - [`Interpreter`] owns a [`Session`] (working directory, environment,
//!   history) and a registry of built-in [`Command`]s; unknown names are run
//!   as external programs.
//! - [`Terminal`] is the request/response front end: `man` pages, natural
//!   language rewriting, suggestions and the save half of the edit protocol.
//! - [`repl`] drives a [`Terminal`] interactively.
//!
//! Nothing here sandboxes anything: commands run with the privileges of the
//! hosting process.

mod builtin;
pub mod command;
pub mod dictionary;
pub mod editor;
pub mod error;
mod external;
pub mod history;
mod interpreter;
pub mod lexer;
pub mod manual;
pub mod metrics;
mod repl;
pub mod rewrite;
pub mod session;
pub mod suggest;
mod terminal;

pub use command::{Command, Context, Outcome};
pub use dictionary::Dictionaries;
pub use error::CommandError;
pub use external::ExternalLauncher;
pub use interpreter::Interpreter;
pub use repl::repl;
pub use session::Session;
pub use terminal::{Response, Terminal};
