use std::collections::HashMap;
use std::env as stdenv;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Snapshot of the process environment that will be handed to the child.
///
/// The environment contains:
/// - `vars`: a map of environment variables visible to the launched program.
/// - `current_dir`: the working directory the child process starts in.
///
/// The launcher mutates only this snapshot, never the launcher process's own
/// environment, so the exported search path is scoped to the child's
/// process tree.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, PYTHONPATH).
    pub vars: HashMap<String, String>,
    /// The working directory for the child process.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state into a new `Environment` rooted at
    /// the given directory.
    ///
    /// Variables are copied from `std::env::vars()`; `current_dir` is set to
    /// `root` rather than the launcher's own working directory, since the
    /// child is always run from the launch root.
    pub fn capture(root: impl Into<PathBuf>) -> Self {
        let mut vars = HashMap::new();
        for (k, v) in stdenv::vars() {
            vars.insert(k, v);
        }
        Self {
            vars,
            current_dir: root.into(),
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Point the Python module search path at `root` so the entry point can
    /// import sibling modules.
    pub fn export_search_path(&mut self, root: &Path) {
        self.set_var("PYTHONPATH", root.to_string_lossy());
    }

    /// Apply this snapshot to a [`Command`] about to be spawned.
    pub fn configure(&self, cmd: &mut Command) {
        cmd.envs(self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&self.current_dir);
    }
}
