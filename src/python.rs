use crate::env::Environment;
use anyhow::{Context, Result, anyhow};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Where the chosen interpreter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterSource {
    /// The interpreter inside the virtual environment next to the launcher.
    Venv,
    /// A generically named interpreter resolved through PATH.
    System,
}

impl std::fmt::Display for InterpreterSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpreterSource::Venv => write!(f, "virtual environment"),
            InterpreterSource::System => write!(f, "system"),
        }
    }
}

/// A Python interpreter chosen for this run.
///
/// Exactly one interpreter is chosen per run; the choice is made once by
/// [`select`] and never revisited. For [`InterpreterSource::System`] the path
/// is the bare fallback name and is only resolved against PATH when the
/// interpreter is actually invoked.
#[derive(Debug, Clone)]
pub struct Interpreter {
    pub path: PathBuf,
    pub source: InterpreterSource,
}

impl Interpreter {
    /// Run the interpreter's identity probe (`--version`).
    ///
    /// Returns the version line on success. Fails when the interpreter
    /// cannot be found, cannot be spawned, or the probe exits unsuccessfully.
    pub fn probe(&self, env: &Environment) -> Result<String> {
        let resolved = self.resolve(env)?;
        tracing::debug!(interpreter = %resolved.display(), "probing interpreter");

        let mut cmd = Command::new(resolved.as_os_str());
        cmd.arg("--version");
        env.configure(&mut cmd);
        let output = cmd
            .output()
            .with_context(|| format!("failed to invoke {}", resolved.display()))?;
        if !output.status.success() {
            return Err(anyhow!(
                "{} --version exited with {}",
                resolved.display(),
                output.status
            ));
        }

        // Older CPython prints the version banner to stderr.
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&banner).trim().to_string())
    }

    /// Resolve the interpreter to a concrete on-disk path.
    ///
    /// A venv interpreter already is one; a system interpreter is searched
    /// for in the environment's PATH.
    fn resolve(&self, env: &Environment) -> Result<Cow<'_, Path>> {
        match self.source {
            InterpreterSource::Venv => Ok(Cow::Borrowed(self.path.as_path())),
            InterpreterSource::System => {
                let search_paths = env
                    .get_var("PATH")
                    .ok_or_else(|| anyhow!("PATH is not set"))?;
                find_on_path(OsStr::new(&search_paths), &self.path)
                    .map(Cow::Owned)
                    .ok_or_else(|| {
                        anyhow!("{} not found on PATH", self.path.display())
                    })
            }
        }
    }
}

/// Choose the interpreter for this run.
///
/// Prefers the interpreter binary inside `venv_dir` under `root` if it exists
/// on disk; otherwise falls back to the generic `fallback` name, which is
/// expected to be resolvable through PATH. The fallback is not validated
/// here — that is the probe's job.
pub fn select(root: &Path, venv_dir: &str, fallback: &str) -> Interpreter {
    let candidate = venv_interpreter(root, venv_dir);
    if candidate.is_file() {
        tracing::debug!(path = %candidate.display(), "found venv interpreter");
        Interpreter {
            path: candidate,
            source: InterpreterSource::Venv,
        }
    } else {
        tracing::debug!(fallback, "no venv interpreter, using fallback");
        Interpreter {
            path: PathBuf::from(fallback),
            source: InterpreterSource::System,
        }
    }
}

/// Platform-specific location of the interpreter inside a virtual environment.
#[cfg(windows)]
pub fn venv_interpreter(root: &Path, venv_dir: &str) -> PathBuf {
    root.join(venv_dir).join("Scripts").join("python.exe")
}

/// Platform-specific location of the interpreter inside a virtual environment.
#[cfg(not(windows))]
pub fn venv_interpreter(root: &Path, venv_dir: &str) -> PathBuf {
    root.join(venv_dir).join("bin").join("python")
}

/// Search each directory in `search_paths` (PATH) for `name` and return the
/// first existing match. Names with path separators are returned as-is if
/// they exist; an empty name resolves to nothing.
pub fn find_on_path(search_paths: &OsStr, name: &Path) -> Option<PathBuf> {
    if name.as_os_str().is_empty() {
        return None;
    }
    let mut components = name.components();
    components.next();
    if name.is_absolute() || components.next().is_some() {
        // Explicit path, nothing to search for.
        return name.exists().then(|| name.to_path_buf());
    }
    for dir in std::env::split_paths(search_paths) {
        let candidate = dir.join(name);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use std::fs;
    use std::fs::File;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("python_tests_{}_{}", std::process::id(), tag));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[cfg(unix)]
    fn touch_venv_python(root: &Path) -> PathBuf {
        let bin = root.join("venv").join("bin");
        fs::create_dir_all(&bin).expect("create venv bin dir");
        let python = bin.join("python");
        File::create(&python).expect("touch venv python");
        python
    }

    #[test]
    #[cfg(unix)]
    fn venv_interpreter_preferred_when_present() {
        let root = scratch_dir("venv_present");
        let expected = touch_venv_python(&root);

        let interp = select(&root, "venv", "python");
        assert_eq!(interp.source, InterpreterSource::Venv);
        assert_eq!(interp.path, expected);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn fallback_used_when_no_venv() {
        let root = scratch_dir("no_venv");

        let interp = select(&root, "venv", "python");
        assert_eq!(interp.source, InterpreterSource::System);
        assert_eq!(interp.path, PathBuf::from("python"));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    #[cfg(unix)]
    fn custom_venv_dir_name_respected() {
        let root = scratch_dir("custom_venv");
        let bin = root.join(".venv").join("bin");
        fs::create_dir_all(&bin).expect("create .venv bin dir");
        File::create(bin.join("python")).expect("touch python");

        let interp = select(&root, ".venv", "python");
        assert_eq!(interp.source, InterpreterSource::Venv);
        assert!(interp.path.starts_with(root.join(".venv")));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    #[cfg(unix)]
    fn find_on_path_single_component() {
        let found = find_on_path(OsStr::new("/bin"), Path::new("sh"))
            .expect("expected to find 'sh' in /bin");
        assert!(found.starts_with("/bin"));
        assert!(found.ends_with("sh"));
    }

    #[test]
    #[cfg(unix)]
    fn find_on_path_missing_name() {
        let found = find_on_path(OsStr::new("/bin"), Path::new("no_such_interpreter_xyz"));
        assert!(found.is_none());
    }

    #[test]
    fn find_on_path_empty_name() {
        assert!(find_on_path(OsStr::new("/bin"), Path::new("")).is_none());
    }

    #[test]
    #[cfg(unix)]
    fn probe_fails_for_missing_binary() {
        let root = scratch_dir("probe_missing");
        let interp = Interpreter {
            path: root.join("nope"),
            source: InterpreterSource::Venv,
        };
        let env = Environment::capture(&root);

        assert!(interp.probe(&env).is_err());

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    #[cfg(unix)]
    fn probe_reports_version_of_fake_interpreter() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let root = scratch_dir("probe_fake");
        let bin = root.join("venv").join("bin");
        fs::create_dir_all(&bin).expect("create venv bin dir");
        let python = bin.join("python");
        let mut f = File::create(&python).expect("create fake python");
        writeln!(f, "#!/bin/sh\necho Python 3.12.0").expect("write script");
        drop(f);
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).expect("chmod");

        let interp = select(&root, "venv", "python");
        let env = Environment::capture(&root);
        let version = interp.probe(&env).expect("probe should succeed");
        assert_eq!(version, "Python 3.12.0");

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    #[cfg(unix)]
    fn probe_resolves_system_interpreter_through_path_var() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let root = scratch_dir("probe_system");
        let python = root.join("python");
        let mut f = File::create(&python).expect("create fake python");
        writeln!(f, "#!/bin/sh\necho Python 3.11.9").expect("write script");
        drop(f);
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).expect("chmod");

        let interp = Interpreter {
            path: PathBuf::from("python"),
            source: InterpreterSource::System,
        };
        let mut env = Environment::capture(&root);
        env.set_var("PATH", root.to_string_lossy());

        let version = interp.probe(&env).expect("probe should succeed");
        assert_eq!(version, "Python 3.11.9");

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    #[cfg(unix)]
    fn probe_fails_when_fallback_not_on_path() {
        let root = scratch_dir("probe_no_path");
        let interp = Interpreter {
            path: PathBuf::from("no_such_interpreter_xyz"),
            source: InterpreterSource::System,
        };
        let mut env = Environment::capture(&root);
        env.set_var("PATH", root.to_string_lossy());

        let err = interp.probe(&env).unwrap_err();
        assert!(err.to_string().contains("not found on PATH"));

        let _ = fs::remove_dir_all(root);
    }
}
