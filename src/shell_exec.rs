//! Shell command execution with a launcher-safe environment.
//!
//! Commands run through `sh -c` with `HOME` set explicitly and a fixed list
//! of common binary directories prepended to `PATH`. Launcher hosts often
//! start background processes with a minimal environment that misses
//! user-installed tools like `git` and `ghq`; the prefix list makes them
//! findable anyway.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, bail};

/// Hard ceiling for a single subprocess invocation.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(15);

/// Directories prepended to `PATH`, highest precedence first.
/// `~/.local/bin` is resolved against the home directory at call time.
const PATH_ADDITIONS: &[&str] = &[
    "/opt/homebrew/bin",
    "/opt/homebrew/sbin",
    "/usr/local/bin",
    "/usr/bin",
    "/bin",
];

/// Run a shell command line and return its trimmed stdout.
///
/// Fails on non-zero exit (embedding captured stderr) and on timeout
/// ([`COMMAND_TIMEOUT`]). Errors are never swallowed here; callers decide
/// what a failure means.
pub fn run(command: &str, cwd: Option<&Path>) -> anyhow::Result<String> {
    run_with_timeout(command, cwd, COMMAND_TIMEOUT)
}

/// [`run`] with an explicit timeout.
pub fn run_with_timeout(
    command: &str,
    cwd: Option<&Path>,
    timeout: Duration,
) -> anyhow::Result<String> {
    log::debug!("sh -c {command:?} (cwd: {cwd:?})");

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    if let Some(home) = home::home_dir() {
        cmd.env("PATH", augmented_path(&home));
        cmd.env("HOME", home);
    }

    let output = run_with_timeout_impl(&mut cmd, timeout)
        .with_context(|| format!("failed to run: {command}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "command failed ({}): {command}\n{}",
            output.status,
            stderr.trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// `PATH` with the fixed prefix directories (and `~/.local/bin`) in front of
/// whatever the host environment provides.
fn augmented_path(home: &Path) -> OsString {
    let mut dirs: Vec<PathBuf> = vec![home.join(".local").join("bin")];
    dirs.extend(PATH_ADDITIONS.iter().map(PathBuf::from));
    if let Some(existing) = std::env::var_os("PATH") {
        dirs.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(dirs)
        .unwrap_or_else(|_| std::env::var_os("PATH").unwrap_or_default())
}

/// Spawn the process, capture stdout/stderr on background threads, and wait
/// with a deadline. Reading on separate threads prevents deadlock when a
/// pipe buffer fills up. On timeout the process is killed and reaped.
fn run_with_timeout_impl(
    cmd: &mut Command,
    timeout: Duration,
) -> std::io::Result<std::process::Output> {
    use std::io::{ErrorKind, Read};
    use std::process::Stdio;
    use std::time::Instant;

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let mut stdout_handle = child.stdout.take();
    let mut stderr_handle = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(ref mut handle) = stdout_handle {
            let _ = handle.read_to_end(&mut buf);
        }
        buf
    });

    let stderr_thread = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(ref mut handle) = stderr_handle {
            let _ = handle.read_to_end(&mut buf);
        }
        buf
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();

                    // Reader threads see EOF after the kill
                    let _ = stdout_thread.join();
                    let _ = stderr_thread.join();

                    return Err(std::io::Error::new(
                        ErrorKind::TimedOut,
                        "command timed out",
                    ));
                }
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    };

    let stdout = stdout_thread.join().unwrap_or_default();
    let stderr = stderr_thread.join().unwrap_or_default();

    Ok(std::process::Output {
        status,
        stdout,
        stderr,
    })
}
