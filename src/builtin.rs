//! Built-in commands known to the interpreter at compile time.
//!
//! Every built-in runs in-process against the session directory. OS errors
//! are classified into [`CommandError`] right where they happen.

use crate::command::{Command, Context, Outcome};
use crate::error::{CommandError, Result};
use crate::history::DEFAULT_VIEW;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Maximum number of processes listed by `ps`.
pub const PS_LIMIT: usize = 15;

/// All built-ins in registration order.
pub(crate) fn builtins() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(Pwd),
        Box::new(Ls),
        Box::new(Cd),
        Box::new(Mkdir),
        Box::new(Rmdir),
        Box::new(Touch),
        Box::new(Rm),
        Box::new(Cp),
        Box::new(Mv),
        Box::new(Rename),
        Box::new(Cat),
        Box::new(Vim),
        Box::new(Chmod),
        Box::new(Cpu),
        Box::new(Mem),
        Box::new(Ps),
        Box::new(HistoryCmd),
        Box::new(Clear),
    ]
}

fn operand(args: &[String], idx: usize) -> Result<&str> {
    args.get(idx)
        .map(String::as_str)
        .ok_or(CommandError::MissingOperand)
}

fn require_exists(path: &Path, shown: &str) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(()),
        Err(e) => Err(CommandError::from_io(e, shown)),
    }
}

/// Print the session's working directory.
pub struct Pwd;

impl Command for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn execute(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        Ok(Outcome::text(ctx.session.current_dir.display().to_string()))
    }
}

/// List a directory, sorted by name. Lists the last argument, `.` by default.
pub struct Ls;

impl Command for Ls {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let shown = args.last().map(String::as_str).unwrap_or(".");
        let dir = ctx.session.resolve(shown);
        let mut names = fs::read_dir(&dir)
            .and_then(|entries| {
                entries
                    .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
                    .collect::<io::Result<Vec<String>>>()
            })
            .map_err(|e| CommandError::from_io(e, shown))?;
        names.sort();
        Ok(Outcome::text(names.join("\n")))
    }
}

/// Change the session's working directory.
pub struct Cd;

impl Command for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let target = operand(args, 0)?;
        let canonical = fs::canonicalize(ctx.session.resolve(target))
            .map_err(|e| CommandError::from_io(e, target))?;
        if !canonical.is_dir() {
            let err = io::Error::new(io::ErrorKind::NotADirectory, "Not a directory");
            return Err(CommandError::from_io(err, target));
        }
        ctx.session.current_dir = canonical;
        Ok(Outcome::text(format!(
            "Changed directory to {}",
            ctx.session.current_dir.display()
        )))
    }
}

/// Create a directory and any missing parents.
pub struct Mkdir;

impl Command for Mkdir {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let path = operand(args, 0)?;
        fs::create_dir_all(ctx.session.resolve(path)).map_err(|e| CommandError::from_io(e, path))?;
        Ok(Outcome::text(format!("Created directory {path}")))
    }
}

/// Remove an empty directory.
pub struct Rmdir;

impl Command for Rmdir {
    fn name(&self) -> &'static str {
        "rmdir"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let path = operand(args, 0)?;
        fs::remove_dir(ctx.session.resolve(path)).map_err(|e| CommandError::from_io(e, path))?;
        Ok(Outcome::text(format!("Removed directory {path}")))
    }
}

/// Create an empty file; an existing one is left alone.
pub struct Touch;

impl Command for Touch {
    fn name(&self) -> &'static str {
        "touch"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let path = operand(args, 0)?;
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(ctx.session.resolve(path))
            .map_err(|e| CommandError::from_io(e, path))?;
        Ok(Outcome::text(format!("Created file {path}")))
    }
}

/// Remove the last argument, recursively when it is a directory.
///
/// Leading arguments such as `-rf` are accepted and ignored.
pub struct Rm;

impl Command for Rm {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let target = args.last().ok_or(CommandError::MissingOperand)?;
        let path = ctx.session.resolve(target);
        let meta = fs::symlink_metadata(&path).map_err(|e| CommandError::from_io(e, target))?;
        let removed = if meta.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| CommandError::from_io(e, target))?;
        Ok(Outcome::text(format!("Removed {target}")))
    }
}

/// Copy a file, or a directory tree merging into `dest`.
pub struct Cp;

impl Command for Cp {
    fn name(&self) -> &'static str {
        "cp"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let (src, dest) = (operand(args, 0)?, operand(args, 1)?);
        let src_path = ctx.session.resolve(src);
        let dest_path = ctx.session.resolve(dest);
        require_exists(&src_path, src)?;
        if src_path.is_dir() {
            if lies_within(&dest_path, &src_path) {
                return Err(CommandError::IntoItself {
                    src: src.to_string(),
                    dest: dest.to_string(),
                });
            }
            copy_recursively(&src_path, &dest_path, Path::new(src), Path::new(dest))?;
        } else {
            let (dest_path, shown_dest) = match src_path.file_name() {
                Some(base) if dest_path.is_dir() => {
                    (dest_path.join(base), Path::new(dest).join(base))
                }
                _ => (dest_path, PathBuf::from(dest)),
            };
            copy_file(&src_path, &dest_path, Path::new(src), &shown_dest)?;
        }
        Ok(Outcome::text(format!("Copied {src} -> {dest}")))
    }
}

/// Copy the tree under `src` into `dest`, creating it when missing.
///
/// `shown_src` and `shown_dest` are the paths as the user typed them and only
/// appear in errors. The entries of `src` are read before `dest` is created.
fn copy_recursively(src: &Path, dest: &Path, shown_src: &Path, shown_dest: &Path) -> Result<()> {
    let entries = fs::read_dir(src)
        .and_then(|dir| dir.collect::<io::Result<Vec<_>>>())
        .map_err(|e| CommandError::from_io(e, shown_src))?;
    fs::create_dir_all(dest).map_err(|e| CommandError::from_io(e, shown_dest))?;
    for entry in entries {
        let name = entry.file_name();
        let (from, to) = (shown_src.join(&name), shown_dest.join(&name));
        let file_type = entry.file_type().map_err(|e| CommandError::from_io(e, &from))?;
        if file_type.is_dir() {
            copy_recursively(&entry.path(), &dest.join(&name), &from, &to)?;
        } else {
            copy_file(&entry.path(), &dest.join(&name), &from, &to)?;
        }
    }
    Ok(())
}

/// `fs::copy` with the failure blamed on the side that caused it.
fn copy_file(src: &Path, dest: &Path, shown_src: &Path, shown_dest: &Path) -> Result<()> {
    fs::copy(src, dest).map(drop).map_err(|e| {
        let shown = if fs::File::open(src).is_err() { shown_src } else { shown_dest };
        CommandError::from_io(e, shown)
    })
}

/// Whether `path`, which may not exist yet, is `root` or lies below it.
fn lies_within(path: &Path, root: &Path) -> bool {
    let Ok(root) = fs::canonicalize(root) else {
        return false;
    };
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            let full = missing.iter().rev().fold(canonical, |acc, name| acc.join(name));
            return full.starts_with(&root);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return false,
        }
    }
}

/// Move a file or directory, into `dest` when that is an existing directory.
///
/// An entry of the same name already inside `dest` is never replaced.
pub struct Mv;

impl Command for Mv {
    fn name(&self) -> &'static str {
        "mv"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let (src, dest) = (operand(args, 0)?, operand(args, 1)?);
        let src_path = ctx.session.resolve(src);
        let mut dest_path = ctx.session.resolve(dest);
        let mut shown_dest = PathBuf::from(dest);
        require_exists(&src_path, src)?;
        if let Some(base) = src_path.file_name() {
            if dest_path.is_dir() {
                dest_path = dest_path.join(base);
                shown_dest = shown_dest.join(base);
                if fs::symlink_metadata(&dest_path).is_ok() {
                    return Err(CommandError::AlreadyExists(shown_dest.display().to_string()));
                }
            }
        }

        match fs::rename(&src_path, &dest_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                log::debug!("{} is on another device, copying instead", dest_path.display());
                if src_path.is_dir() {
                    copy_recursively(&src_path, &dest_path, Path::new(src), &shown_dest)?;
                    fs::remove_dir_all(&src_path).map_err(|e| CommandError::from_io(e, src))?;
                } else {
                    copy_file(&src_path, &dest_path, Path::new(src), &shown_dest)?;
                    fs::remove_file(&src_path).map_err(|e| CommandError::from_io(e, src))?;
                }
            }
            Err(e) => return Err(CommandError::from_io(e, &shown_dest)),
        }
        Ok(Outcome::text(format!("Moved {src} -> {dest}")))
    }
}

/// Plain rename, no directory handling.
pub struct Rename;

impl Command for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let (from, to) = (operand(args, 0)?, operand(args, 1)?);
        let from_path = ctx.session.resolve(from);
        require_exists(&from_path, from)?;
        fs::rename(&from_path, ctx.session.resolve(to)).map_err(|e| CommandError::from_io(e, to))?;
        Ok(Outcome::text(format!("Renamed {from} -> {to}")))
    }
}

/// Print a whole file.
pub struct Cat;

impl Command for Cat {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let path = operand(args, 0)?;
        let content = fs::read_to_string(ctx.session.resolve(path))
            .map_err(|e| CommandError::from_io(e, path))?;
        Ok(Outcome::text(content))
    }
}

/// First half of the edit protocol: hand the file content to the client.
///
/// The file is created empty when missing. Nothing is remembered here; the
/// client sends the edited text back through
/// [`Interpreter::save`](crate::Interpreter::save).
pub struct Vim;

impl Command for Vim {
    fn name(&self) -> &'static str {
        "vim"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let filename = operand(args, 0)?;
        let path = ctx.session.resolve(filename);
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| CommandError::from_io(e, filename))?;
        let content = fs::read_to_string(&path).map_err(|e| CommandError::from_io(e, filename))?;
        Ok(Outcome::OpenEditor {
            filename: filename.to_string(),
            content,
        })
    }
}

/// Set permission bits from an octal mode, e.g. `chmod 644 notes.txt`.
pub struct Chmod;

impl Command for Chmod {
    fn name(&self) -> &'static str {
        "chmod"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let (mode_arg, target) = (operand(args, 0)?, operand(args, 1)?);
        let mode = parse_mode(mode_arg)?;
        let path = ctx.session.resolve(target);
        let mut perms = fs::metadata(&path)
            .map_err(|e| CommandError::from_io(e, target))?
            .permissions();
        apply_mode(&mut perms, mode);
        fs::set_permissions(&path, perms).map_err(|e| CommandError::from_io(e, target))?;
        Ok(Outcome::text(format!(
            "Changed permissions of {target} to {mode_arg}"
        )))
    }
}

fn parse_mode(mode: &str) -> Result<u32> {
    let valid = (1..=4).contains(&mode.len()) && mode.chars().all(|c| ('0'..='7').contains(&c));
    if !valid {
        return Err(CommandError::InvalidMode(mode.to_string()));
    }
    u32::from_str_radix(mode, 8).map_err(|_| CommandError::InvalidMode(mode.to_string()))
}

#[cfg(unix)]
fn apply_mode(perms: &mut fs::Permissions, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    perms.set_mode(mode);
}

#[cfg(not(unix))]
fn apply_mode(perms: &mut fs::Permissions, mode: u32) {
    perms.set_readonly(mode & 0o200 == 0);
}

pub struct Cpu;

impl Command for Cpu {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn execute(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let percent = ctx.metrics.cpu_percent();
        Ok(Outcome::text(format!("CPU Usage: {percent:.1}%")))
    }
}

pub struct Mem;

impl Command for Mem {
    fn name(&self) -> &'static str {
        "mem"
    }

    fn execute(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        const MB: u64 = 1024 * 1024;
        let mem = ctx.metrics.virtual_memory();
        Ok(Outcome::text(format!(
            "Memory Usage: {:.1}% ({}MB / {}MB)",
            mem.percent,
            mem.used_bytes / MB,
            mem.total_bytes / MB
        )))
    }
}

/// First [`PS_LIMIT`] processes as the metrics source yields them.
pub struct Ps;

impl Command for Ps {
    fn name(&self) -> &'static str {
        "ps"
    }

    fn execute(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        let lines: Vec<String> = ctx
            .metrics
            .process_list()
            .into_iter()
            .take(PS_LIMIT)
            .map(|p| format!("{:>6}  {}", p.pid, p.name))
            .collect();
        Ok(Outcome::text(lines.join("\n")))
    }
}

pub struct HistoryCmd;

impl Command for HistoryCmd {
    fn name(&self) -> &'static str {
        "history"
    }

    fn execute(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<Outcome> {
        Ok(Outcome::text(ctx.session.history.recent(DEFAULT_VIEW).join("\n")))
    }
}

pub struct Clear;

impl Command for Clear {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn execute(&self, _args: &[String], _ctx: &mut Context<'_>) -> Result<Outcome> {
        Ok(Outcome::ClearScreen)
    }
}
