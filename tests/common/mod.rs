//! Shared helpers for tests that run the `drove` binary

use std::path::PathBuf;

/// Cached binary path for the drove CLI to avoid repeated lookups
#[allow(deprecated)]
pub static DROVE_BIN: std::sync::LazyLock<PathBuf> =
    std::sync::LazyLock::new(|| assert_cmd::cargo::cargo_bin("drove"));

/// Command for the drove binary that never picks up the user's `~/.drove`
pub fn drove_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(&*DROVE_BIN);
    cmd.env("DROVE_CONFIG", "/nonexistent/drove-test-config")
        .env_remove("DROVE_LOG")
        .env_remove("DROVE_LOG_FILE");
    cmd
}
