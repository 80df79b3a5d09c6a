//! A tiny launcher for a Python application.
//!
//! This crate locates a Python interpreter — preferring a virtual environment
//! that sits next to the launcher, falling back to the system interpreter —
//! exports the module search path, and runs a single entry-point script to
//! completion, relaying the child's exit status. It is intentionally small:
//! a faithful stand-in for the `run the app` script that usually ships beside
//! a Python codebase, with fail-fast diagnostics added.
//!
//! The main entry point is [`Launcher`], which sequences the filesystem
//! checks and the subprocess invocation. The public modules [`env`] and
//! [`python`] expose the process-environment snapshot handed to the child and
//! the interpreter discovery logic.

pub mod env;
mod launcher;
pub mod pause;
pub mod python;

/// Just a convenient re-export of the launch sequencer.
///
/// See [`Launcher`] for the high-level API and examples.
pub use launcher::{ExitCode, Launcher, Prepared};
