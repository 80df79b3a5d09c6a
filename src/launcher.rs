use crate::env::Environment;
use crate::python::{self, Interpreter};
use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use std::process::ExitStatus;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Everything resolved before the target is allowed to run: the chosen
/// interpreter, its reported version, and the entry-point path.
#[derive(Debug)]
pub struct Prepared {
    pub interpreter: Interpreter,
    pub version: String,
    pub entry: PathBuf,
}

/// Sequences one launch: check the entry point, pick and probe an
/// interpreter, export the module search path, run the target to completion.
///
/// The sequence is strictly linear and every failure is terminal; there are
/// no retries. [`Launcher::prepare`] performs the fail-fast checks without
/// starting the child, so a caller can print its banner in between.
///
/// Example
/// ```no_run
/// use pylaunch::Launcher;
/// let mut launcher = Launcher::new("/opt/myapp");
/// let prepared = launcher.prepare().unwrap();
/// let code = launcher.launch(&prepared).unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Launcher {
    root: PathBuf,
    entry: String,
    venv_dir: String,
    fallback: String,
    env: Environment,
}

impl Launcher {
    /// Create a launcher rooted at `root` with the conventional layout:
    /// entry point `app.py`, virtual environment `venv`, fallback
    /// interpreter `python`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let env = Environment::capture(&root);
        Self {
            root,
            entry: "app.py".to_string(),
            venv_dir: "venv".to_string(),
            fallback: "python".to_string(),
            env,
        }
    }

    /// Override the entry-point filename, relative to the root.
    pub fn entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    /// Override the virtual-environment directory name under the root.
    pub fn venv_dir(mut self, venv_dir: impl Into<String>) -> Self {
        self.venv_dir = venv_dir.into();
        self
    }

    /// Override the fallback interpreter name.
    pub fn fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// The resolved launch root.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// The environment snapshot the child will receive.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Directory containing the launcher executable itself; the default
    /// launch root when none is given on the command line.
    pub fn exe_dir() -> Result<PathBuf> {
        let exe = std::env::current_exe().context("cannot locate launcher executable")?;
        let dir = exe
            .parent()
            .ok_or_else(|| anyhow!("launcher executable has no parent directory"))?;
        Ok(dir.to_path_buf())
    }

    /// Run the fail-fast checks: entry point on disk, interpreter chosen and
    /// probed, search path exported. The target is not started.
    ///
    /// After `prepare` returns Ok, `PYTHONPATH` in [`Launcher::env`] equals
    /// the launch root.
    pub fn prepare(&mut self) -> Result<Prepared> {
        let entry = self.root.join(&self.entry);
        if !entry.is_file() {
            return Err(anyhow!("entry point not found: {}", entry.display()));
        }

        let interpreter = python::select(&self.root, &self.venv_dir, &self.fallback);
        let version = interpreter
            .probe(&self.env)
            .with_context(|| format!("interpreter {} is not usable", interpreter.path.display()))?;
        tracing::debug!(interpreter = %interpreter.path.display(), %version, "probe ok");

        self.env.export_search_path(&self.root);

        Ok(Prepared {
            interpreter,
            version,
            entry,
        })
    }

    /// Invoke the interpreter with the entry point as its only argument and
    /// wait for it to finish. Standard streams are inherited unmodified.
    pub fn launch(&mut self, prepared: &Prepared) -> Result<ExitCode> {
        let mut cmd = std::process::Command::new(&prepared.interpreter.path);
        cmd.arg(&prepared.entry);
        self.env.configure(&mut cmd);

        tracing::debug!(entry = %prepared.entry.display(), "starting application");
        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to start {}", prepared.interpreter.path.display()))?;
        let exit_status = child.wait()?;
        match exit_status.code() {
            Some(x) => Ok(x),
            None => Ok(terminated_by_signal(exit_status)),
        }
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
