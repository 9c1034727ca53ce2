use crate::command::Outcome;
use crate::error::{CommandError, Result};
use crate::session::Session;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

/// Runs programs that are not built-ins.
///
/// This is the registry's default case: every name without a dispatch entry
/// ends up here. Arguments are passed as a discrete vector, never through a
/// shell.
#[derive(Debug, Default)]
pub struct ExternalLauncher;

impl ExternalLauncher {
    /// Spawn `name` with `args`, wait for it and return what it printed.
    ///
    /// Standard output wins if it is non-empty, otherwise standard error is
    /// returned. A silent program that exits with a failure status is
    /// reported as [`CommandError::ExternalProcessFailure`].
    pub fn launch(&self, name: &str, args: &[String], session: &Session) -> Result<Outcome> {
        let search_paths = session.get_var("PATH").unwrap_or_default();
        let executable = find_command_path(
            OsStr::new(&search_paths),
            &session.current_dir,
            Path::new(name),
        )
        .ok_or(CommandError::CommandNotFound)?;

        log::debug!("spawning {} {:?}", executable.display(), args);
        let output = std::process::Command::new(executable.as_os_str())
            .args(args)
            .stdin(Stdio::null())
            .envs(session.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&session.current_dir)
            .output()
            .map_err(|e| CommandError::ExternalProcessFailure(e.to_string()))?;

        let text = if !output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stdout).into_owned()
        } else {
            String::from_utf8_lossy(&output.stderr).into_owned()
        };

        if text.is_empty() && !output.status.success() {
            return Err(CommandError::ExternalProcessFailure(format!(
                "exited with status {}",
                exit_code(output.status)
            )));
        }
        Ok(Outcome::text(text))
    }
}

fn exit_code(exit_status: ExitStatus) -> i32 {
    match exit_status.code() {
        Some(x) => x,
        None => terminated_by_signal(exit_status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/sh`) or `./`-prefixed:
///   returns `cwd` joined with it if that exists.
/// - Single path component (no separators): search each directory in
///   `search_paths` (PATH) and return the first existing match.
/// - Empty path: returns `None`.
pub fn find_command_path<'a>(
    search_paths: &OsStr,
    cwd: &Path,
    path: &'a Path,
) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        // Empty path -> not found
        (None, None) => None,
        (Some(std::path::Component::Normal(x)), None) => {
            find_in_path(search_paths, x).map(Cow::Owned)
        }
        _ => {
            let joined = cwd.join(path);
            find_by_path(&joined).map(|p| Cow::Owned(p.to_path_buf()))
        }
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.is_file() { Some(path) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[cfg(unix)]
    fn osstr(s: &str) -> &OsStr {
        OsStr::new(s)
    }

    fn session_in(dir: &Path) -> Session {
        Session::with_dir(dir)
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_true() {
        let path = Path::new("/bin/sh");
        let res = find_command_path(osstr("/bin"), Path::new("/"), path);
        let found = res.expect("Expected to find /bin/sh via absolute path");
        assert_eq!(found.as_ref(), path);
    }

    #[test]
    #[cfg(unix)]
    fn absolute_nonexisting() {
        let path = Path::new("/bin/nonexisting");
        let res = find_command_path(osstr("/bin"), Path::new("/"), path);
        assert!(res.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn single_component_found_in_path() {
        let res = find_command_path(osstr("/bin"), Path::new("/"), Path::new("sh"));
        let found = res.expect("Expected to find 'sh' in /bin via PATH search");
        assert!(found.as_ref().starts_with("/bin"));
        assert!(found.as_ref().ends_with("sh"));
    }

    #[test]
    #[cfg(unix)]
    fn single_component_not_found_in_path() {
        let res = find_command_path(osstr("/bin"), Path::new("/"), Path::new("nonexisting"));
        assert!(res.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn relative_paths_resolve_against_session_dir() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(tmp.path().join("bin")).expect("create bin dir");
        File::create(tmp.path().join("bin").join("tool")).expect("touch bin/tool");
        File::create(tmp.path().join("foo")).expect("touch foo");

        let nested = find_command_path(osstr("/does/not/matter"), tmp.path(), Path::new("bin/tool"));
        assert_eq!(nested.unwrap().as_ref(), tmp.path().join("bin/tool"));

        let dotted = find_command_path(osstr("/bin"), tmp.path(), Path::new("./foo"));
        assert_eq!(dotted.unwrap().as_ref(), tmp.path().join("./foo"));
    }

    #[test]
    fn empty_path_is_none() {
        let res = find_command_path(OsStr::new("/bin"), Path::new("/"), Path::new(""));
        assert!(res.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn launch_captures_stdout() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let args = vec!["hello".to_string(), "two words".to_string()];
        let out = ExternalLauncher
            .launch("echo", &args, &session_in(tmp.path()))
            .expect("echo runs");
        assert_eq!(out, Outcome::text("hello two words\n"));
    }

    #[test]
    #[cfg(unix)]
    fn launch_runs_in_session_dir() {
        let tmp = tempfile::tempdir().expect("tempdir");
        File::create(tmp.path().join("marker.txt")).expect("touch");
        let out = ExternalLauncher
            .launch("ls", &[], &session_in(tmp.path()))
            .expect("ls runs");
        assert_eq!(out, Outcome::text("marker.txt\n"));
    }

    #[test]
    #[cfg(unix)]
    fn launch_falls_back_to_stderr() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let args = vec!["-c".to_string(), "echo oops >&2; exit 3".to_string()];
        let out = ExternalLauncher
            .launch("sh", &args, &session_in(tmp.path()))
            .expect("stderr is captured");
        assert_eq!(out, Outcome::text("oops\n"));
    }

    #[test]
    #[cfg(unix)]
    fn launch_silent_failure() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let err = ExternalLauncher
            .launch("false", &[], &session_in(tmp.path()))
            .unwrap_err();
        assert_eq!(err.to_string(), "exited with status 1");
    }

    #[test]
    fn launch_missing_program() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let err = ExternalLauncher
            .launch("foobar_no_such_program", &["--x".into()], &session_in(tmp.path()))
            .unwrap_err();
        assert!(matches!(err, CommandError::CommandNotFound));
    }
}
