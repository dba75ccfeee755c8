use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "kodipack.toml";

pub const DEFAULT_MANIFEST: &str = "addon.xml";
pub const DEFAULT_FILES: &[&str] = &["addon.xml", "main.py", "LICENSE.txt", "resources"];
pub const DEFAULT_EXCLUDE: &[&str] = &["*.pyc"];
pub const DEFAULT_REPO_PLUGINS: &str = "../repo-plugins";
pub const DEFAULT_RELEASE_BRANCH: &str = "nexus";
pub const DEFAULT_REMOTE: &str = "https://github.com/xbmc/repo-plugins.git";
pub const DEFAULT_PRUNE: &[&str] = &["resources/lib/__pycache__", "resources/screenshots"];

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PackageSection {
    #[serde(default)]
    manifest: Option<String>,
    #[serde(default)]
    files: Option<Vec<String>>,
    #[serde(default)]
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ReleaseSection {
    #[serde(default)]
    repo_plugins: Option<String>,
    #[serde(default)]
    branch: Option<String>,
    #[serde(default)]
    remote: Option<String>,
    #[serde(default)]
    prune: Option<Vec<String>>,
    #[serde(default)]
    stage: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    #[serde(default)]
    package: PackageSection,
    #[serde(default)]
    release: ReleaseSection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseConfig {
    pub repo_plugins: PathBuf,
    pub branch: String,
    pub remote: String,
    pub prune: Vec<String>,
    pub stage: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackConfig {
    pub manifest: PathBuf,
    pub files: Vec<String>,
    pub exclude: Vec<String>,
    pub release: ReleaseConfig,
}

impl Default for PackConfig {
    fn default() -> Self {
        PackConfig {
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            files: to_owned_list(DEFAULT_FILES),
            exclude: to_owned_list(DEFAULT_EXCLUDE),
            release: ReleaseConfig {
                repo_plugins: PathBuf::from(DEFAULT_REPO_PLUGINS),
                branch: DEFAULT_RELEASE_BRANCH.to_string(),
                remote: DEFAULT_REMOTE.to_string(),
                prune: to_owned_list(DEFAULT_PRUNE),
                stage: true,
            },
        }
    }
}

/// Values coming from the command line or the environment. `None` leaves the
/// file or default value in place.
#[derive(Debug, Clone, Default)]
pub struct ReleaseOverrides {
    pub repo_plugins: Option<PathBuf>,
    pub branch: Option<String>,
    pub remote: Option<String>,
    pub no_stage: bool,
}

impl PackConfig {
    /// Loads the configuration for the addon at `addon_dir`.
    ///
    /// ### Parameters
    /// - `addon_dir`: The addon root (where `addon.xml` lives)
    /// - `explicit`: A config file given on the command line; it must exist
    ///
    pub fn load(addon_dir: &Path, explicit: Option<&Path>) -> Result<Self, String> {
        let path = match explicit {
            Some(p) => {
                let p = if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    addon_dir.join(p)
                };
                if !p.is_file() {
                    return Err(format!("Config file not found: {}", p.display()));
                }
                Some(p)
            }
            None => {
                let p = addon_dir.join(CONFIG_FILE);
                if p.is_file() { Some(p) } else { None }
            }
        };

        match path {
            Some(p) => {
                let txt = fs::read_to_string(&p)
                    .map_err(|e| format!("Failed to read {}: {}", p.display(), e))?;
                Self::from_toml_str(&txt)
                    .map_err(|e| format!("Invalid config {}: {}", p.display(), e))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(txt: &str) -> Result<Self, String> {
        let doc: ConfigToml = toml::from_str(txt).map_err(|e| e.to_string())?;
        let mut cfg = Self::default();

        if let Some(m) = doc.package.manifest {
            cfg.manifest = PathBuf::from(m);
        }
        if let Some(files) = doc.package.files {
            if files.is_empty() {
                return Err("[package].files must list at least one path".into());
            }
            cfg.files = files;
        }
        if let Some(exclude) = doc.package.exclude {
            cfg.exclude = exclude;
        }
        for f in &cfg.files {
            validate_relative(f, "[package].files")?;
        }
        for pattern in &cfg.exclude {
            glob::Pattern::new(pattern)
                .map_err(|e| format!("Invalid exclude pattern '{}': {}", pattern, e))?;
        }

        let r = doc.release;
        if let Some(dir) = r.repo_plugins {
            cfg.release.repo_plugins = PathBuf::from(dir);
        }
        if let Some(branch) = r.branch {
            cfg.release.branch = branch;
        }
        if let Some(remote) = r.remote {
            cfg.release.remote = remote;
        }
        if let Some(prune) = r.prune {
            cfg.release.prune = prune;
        }
        if let Some(stage) = r.stage {
            cfg.release.stage = stage;
        }
        for p in &cfg.release.prune {
            validate_relative(p, "[release].prune")?;
        }
        if cfg.release.branch.trim().is_empty() {
            return Err("[release].branch must not be empty".into());
        }

        Ok(cfg)
    }

    pub fn apply_overrides(&mut self, overrides: ReleaseOverrides) {
        if let Some(dir) = overrides.repo_plugins {
            self.release.repo_plugins = dir;
        }
        if let Some(branch) = overrides.branch.filter(|b| !b.trim().is_empty()) {
            self.release.branch = branch;
        }
        if let Some(remote) = overrides.remote {
            self.release.remote = remote;
        }
        if overrides.no_stage {
            self.release.stage = false;
        }
    }

    pub fn manifest_path(&self, addon_dir: &Path) -> PathBuf {
        addon_dir.join(&self.manifest)
    }

    pub fn repo_plugins_path(&self, addon_dir: &Path) -> PathBuf {
        if self.release.repo_plugins.is_absolute() {
            self.release.repo_plugins.clone()
        } else {
            addon_dir.join(&self.release.repo_plugins)
        }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Configured paths are addon-relative and may not climb out of the addon.
fn validate_relative(p: &str, field: &str) -> Result<(), String> {
    let path = Path::new(p);
    if p.trim().is_empty() {
        return Err(format!("{} contains an empty path", field));
    }
    if path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(format!(
            "{} entry '{}' must be relative to the addon directory",
            field, p
        ));
    }
    Ok(())
}
