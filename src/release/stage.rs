use crate::addon::manifest;
use crate::builder::dist;
use crate::config::PackConfig;
use crate::release::git::Git;
use crate::types::addon::AddonManifest;
use crate::utils::{fs as ufs, spinner};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StagedRelease {
    pub addon: AddonManifest,
    pub checkout: PathBuf,
    pub destination: PathBuf,
    pub cloned: bool,
    pub pruned: Vec<String>,
    /// `git status --short` lines for the addon directory, when staging ran.
    pub changes: Vec<String>,
}

/// Stages the addon into `<repo-plugins>/<addon-id>/` on the release branch.
///
/// ### Parameters
/// - `addon_dir`: The addon root
/// - `config`: The resolved configuration (release section included)
///
pub fn prepare_release(addon_dir: &Path, config: &PackConfig) -> Result<StagedRelease, String> {
    let manifest_path = config.manifest_path(addon_dir);
    let addon = spinner::run_step(
        &format!("Reading manifest {}", manifest_path.display()),
        |m: &AddonManifest| format!("Addon {} v{}", m.id, m.version),
        || manifest::read_manifest(&manifest_path),
    )?;
    dist::ensure_paths_exist(addon_dir, &config.files)?;

    let git = Git::locate()?;
    let checkout = config.repo_plugins_path(addon_dir);
    let branch = config.release.branch.as_str();

    let cloned = spinner::run_step(
        &format!("Preparing checkout {}", checkout.display()),
        |cloned: &bool| {
            if *cloned {
                format!("Cloned {} ({})", config.release.remote, branch)
            } else {
                format!("Using existing checkout {}", checkout.display())
            }
        },
        || ensure_checkout(&git, &checkout, &config.release.remote, branch),
    )?;

    spinner::run_unit_step(
        &format!("Resetting checkout to {}", branch),
        &format!("Checkout on {}", branch),
        || {
            git.run(&checkout, &["checkout", branch])?;
            git.run(&checkout, &["reset", "--hard"])?;
            Ok(())
        },
    )?;

    let destination = checkout.join(&addon.id);
    spinner::run_unit_step(
        &format!("Copying addon into {}", destination.display()),
        "Addon copied",
        || copy_addon(addon_dir, &config.files, &destination),
    )?;

    let pruned = prune(&destination, &config.release.prune)?;

    let changes = if config.release.stage {
        spinner::run_step(
            "Staging changes",
            |lines: &Vec<String>| format!("{} change(s) staged", lines.len()),
            || {
                git.run(&checkout, &["add", "--all", "--", addon.id.as_str()])?;
                let status = git.run(&checkout, &["status", "--short", "--", addon.id.as_str()])?;
                Ok(status
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(|l| l.to_string())
                    .collect())
            },
        )?
    } else {
        Vec::new()
    };

    Ok(StagedRelease {
        addon,
        checkout,
        destination,
        cloned,
        pruned,
        changes,
    })
}

/// Clones the checkout when it is absent. Returns whether a clone happened.
fn ensure_checkout(git: &Git, checkout: &Path, remote: &str, branch: &str) -> Result<bool, String> {
    if !checkout.exists() {
        if let Some(parent) = checkout.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        git.clone_shallow(remote, branch, checkout)?;
        return Ok(true);
    }
    if !checkout.join(".git").exists() {
        return Err(format!(
            "{} exists but is not a git checkout",
            checkout.display()
        ));
    }
    Ok(false)
}

/// Replaces `destination` with a fresh copy of the configured paths.
fn copy_addon(addon_dir: &Path, files: &[String], destination: &Path) -> Result<(), String> {
    ufs::remove_path(destination)?;
    fs::create_dir_all(destination)
        .map_err(|e| format!("Failed to create {}: {}", destination.display(), e))?;

    let mut options = fs_extra::dir::CopyOptions::new();
    options.overwrite = true;

    for f in files {
        let src = addon_dir.join(f);
        let target_parent = match Path::new(f).parent() {
            Some(p) if !p.as_os_str().is_empty() => destination.join(p),
            _ => destination.to_path_buf(),
        };
        fs::create_dir_all(&target_parent)
            .map_err(|e| format!("Failed to create {}: {}", target_parent.display(), e))?;
        fs_extra::copy_items(&[&src], &target_parent, &options)
            .map_err(|e| format!("Failed to copy {}: {}", src.display(), e))?;
    }
    Ok(())
}

/// Deletes unwanted paths from the staged copy; absent ones are skipped.
fn prune(destination: &Path, paths: &[String]) -> Result<Vec<String>, String> {
    let mut removed = Vec::new();
    for p in paths {
        if ufs::remove_path(&destination.join(p))? {
            removed.push(p.clone());
        }
    }
    Ok(removed)
}
