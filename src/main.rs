use argh::FromArgs;
use pylaunch::{ExitCode, Launcher, pause};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(FromArgs)]
/// Launch the Python application next to this executable, preferring its
/// virtual environment over the system interpreter.
struct LaunchArgs {
    #[argh(positional)]
    /// launch root; defaults to the directory containing this executable.
    root: Option<PathBuf>,

    #[argh(option, default = "String::from(\"app.py\")")]
    /// entry-point filename relative to the root.
    entry: String,

    #[argh(option, default = "String::from(\"venv\")")]
    /// virtual-environment directory name under the root.
    venv: String,

    #[argh(option, default = "String::from(\"python\")")]
    /// interpreter name to fall back to when no virtual environment exists.
    python: String,

    #[argh(switch)]
    /// do not wait for acknowledgment on failure (for scripted use).
    no_pause: bool,
}

fn main() {
    init_logging();
    let args: LaunchArgs = argh::from_env();
    std::process::exit(run(args));
}

fn run(args: LaunchArgs) -> ExitCode {
    let root = match args.root {
        Some(root) => root,
        None => match Launcher::exe_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("{e:#}");
                return 1;
            }
        },
    };

    let mut launcher = Launcher::new(root)
        .entry(args.entry)
        .venv_dir(args.venv)
        .fallback(args.python);

    let prepared = match launcher.prepare() {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("{e:#}");
            if !args.no_pause {
                pause::wait_for_ack();
            }
            return 1;
        }
    };

    println!("launch root: {}", launcher.root().display());
    println!(
        "interpreter: {} ({}, {})",
        prepared.interpreter.path.display(),
        prepared.interpreter.source,
        prepared.version
    );

    match launcher.launch(&prepared) {
        Ok(0) => 0,
        Ok(code) => {
            println!("application exited with status {code}");
            if !args.no_pause {
                pause::wait_for_ack();
            }
            code
        }
        Err(e) => {
            eprintln!("{e:#}");
            if !args.no_pause {
                pause::wait_for_ack();
            }
            1
        }
    }
}

/// Stderr logging, `RUST_LOG` controlled, default `info`.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
