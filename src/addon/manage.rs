use crate::addon::manifest;
use crate::config::PackConfig;
use crate::utils::logger::{LogLevel, Logger};
use crate::utils::semver;
use std::fs;
use std::path::Path;

/// Logs the addon identity, its archive name and the configured file list.
///
/// ### Parameters
/// - `addon_dir`: The addon root
/// - `config`: The resolved configuration
///
pub fn show_info(addon_dir: &Path, config: &PackConfig) -> Result<(), String> {
    let addon = manifest::read_manifest(&config.manifest_path(addon_dir))?;
    let logger = Logger::new();

    logger.log_message(LogLevel::Info, &format!("Addon   : {}", addon.id));
    logger.log_message(LogLevel::Info, &format!("Version : {}", addon.version));
    logger.log_message(LogLevel::Info, &format!("Archive : {}", addon.archive_name()));

    let files: Vec<String> = config
        .files
        .iter()
        .map(|f| {
            if addon_dir.join(f).exists() {
                f.clone()
            } else {
                format!("{} (missing)", f)
            }
        })
        .collect();
    logger.log_message_with_trace(
        LogLevel::Info,
        "Files:",
        files.iter().map(|s| s.as_str()).collect(),
    );
    if !config.exclude.is_empty() {
        logger.log_message(
            LogLevel::Info,
            &format!("Exclude : {}", config.exclude.join(", ")),
        );
    }
    logger.log_message(
        LogLevel::Info,
        &format!(
            "Release : {} @ {}",
            config.repo_plugins_path(addon_dir).display(),
            config.release.branch
        ),
    );
    Ok(())
}

/// Bumps the `version` attribute of the addon manifest in place.
///
/// ### Parameters
/// - `addon_dir`: The addon root
/// - `config`: The resolved configuration
/// - `bump`: One of "major", "minor", "patch"
///
pub fn bump_version(addon_dir: &Path, config: &PackConfig, bump: &str) -> Result<String, String> {
    let path = config.manifest_path(addon_dir);
    let current = manifest::read_manifest(&path)?;
    let new_version = semver::compute_bump(&current.version, bump)?;

    // Edit the text rather than re-serializing so formatting survives.
    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let updated = manifest::write_version(&content, &new_version)?;
    fs::write(&path, updated).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;

    Logger::new().log_message(
        LogLevel::Success,
        &format!("{} {} -> {}", current.id, current.version, new_version),
    );
    Ok(new_version)
}
