use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs the `git` executable found on `PATH`.
#[derive(Debug, Clone)]
pub struct Git {
    bin: PathBuf,
}

impl Git {
    pub fn locate() -> Result<Self, String> {
        which::which("git")
            .map(|bin| Git { bin })
            .map_err(|e| format!("git executable not found on PATH: {}", e))
    }

    /// Runs `git -C <dir> <args...>` and returns its stdout.
    pub fn run(&self, dir: &Path, args: &[&str]) -> Result<String, String> {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("-C").arg(dir).args(args);
        self.exec(cmd, &format!("git {}", args.join(" ")))
    }

    /// Shallow, single-branch clone of `remote` at `branch` into `dest`.
    pub fn clone_shallow(&self, remote: &str, branch: &str, dest: &Path) -> Result<(), String> {
        let mut cmd = Command::new(&self.bin);
        cmd.args([
            "clone",
            "--depth",
            "1",
            "--single-branch",
            "--branch",
            branch,
            remote,
        ])
        .arg(dest);
        self.exec(cmd, &format!("git clone {} {}", remote, dest.display()))
            .map(|_| ())
    }

    fn exec(&self, mut cmd: Command, label: &str) -> Result<String, String> {
        let output = cmd
            .output()
            .map_err(|e| format!("Failed to run {}: {}", label, e))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} failed ({}): {}",
                label,
                output.status,
                stderr.trim()
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
