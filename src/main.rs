use std::path::PathBuf;

use argh::FromArgs;
use terminal_commands::{Dictionaries, Interpreter, Terminal, repl};

#[derive(FromArgs)]
/// Run filesystem and system commands, typed or phrased in plain words.
struct Options {
    #[argh(option, default = "PathBuf::from(\"data\")")]
    /// directory holding nl_to_command.json, command_suggestions.json and command_manual.json
    data_dir: PathBuf,

    #[argh(option, short = 'c')]
    /// run a single command line, print the result and exit
    command: Option<String>,

    #[argh(switch)]
    /// with --command, print the whole response as JSON
    json: bool,

    #[argh(switch)]
    /// do not rewrite natural-language phrases into commands
    no_rewrite: bool,

    #[argh(switch, short = 'v')]
    /// log what the interpreter is doing
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let options: Options = argh::from_env();

    let level = if options.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let dictionaries = Dictionaries::load(&options.data_dir)?;
    let mut terminal = Terminal::new(Interpreter::default(), dictionaries);
    terminal.set_rewrite(!options.no_rewrite);

    match options.command {
        Some(line) => {
            let response = terminal.run(&line);
            if options.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.output.to_legacy_string());
            }
        }
        None => repl(&mut terminal)?,
    }
    Ok(())
}
