use crate::addon::manifest;
use crate::config::PackConfig;
use crate::types::addon::AddonManifest;
use crate::utils::{fs as ufs, spinner};
use glob::{MatchOptions, Pattern};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A file selected for the archive: where it is on disk and its path inside
/// the addon directory.
#[derive(Debug, Clone, PartialEq)]
pub struct PackEntry {
    pub source: PathBuf,
    pub relative: String,
}

/// Builds `<addon-id>-<version>.zip` in `addon_dir`.
///
/// ### Parameters
/// - `addon_dir`: The addon root
/// - `config`: The resolved packaging configuration
///
pub fn build_dist(addon_dir: &Path, config: &PackConfig) -> Result<PathBuf, String> {
    let manifest_path = config.manifest_path(addon_dir);
    let addon: AddonManifest = spinner::run_step(
        &format!("Reading manifest {}", manifest_path.display()),
        |m: &AddonManifest| format!("Addon {} v{}", m.id, m.version),
        || manifest::read_manifest(&manifest_path),
    )?;

    let entries = spinner::run_step(
        "Collecting addon files",
        |e: &Vec<PackEntry>| format!("{} file(s) selected", e.len()),
        || collect_entries(addon_dir, &config.files, &config.exclude),
    )?;

    let out_file = addon_dir.join(addon.archive_name());
    spinner::run_unit_step(
        &format!("Writing {}", addon.archive_name()),
        "Archive created",
        || write_archive(&out_file, &addon.id, &entries),
    )?;

    Ok(out_file)
}

/// Fails with every missing path listed when any configured path is absent.
pub fn ensure_paths_exist(addon_dir: &Path, files: &[String]) -> Result<(), String> {
    let missing: Vec<&str> = files
        .iter()
        .filter(|f| !addon_dir.join(f.as_str()).exists())
        .map(|f| f.as_str())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "Missing addon path(s) in {}: {}",
            addon_dir.display(),
            missing.join(", ")
        ))
    }
}

/// Expands the configured file list into sorted archive entries.
pub fn collect_entries(
    addon_dir: &Path,
    files: &[String],
    exclude: &[String],
) -> Result<Vec<PackEntry>, String> {
    ensure_paths_exist(addon_dir, files)?;

    let patterns = compile_patterns(exclude)?;
    let mut entries: Vec<PackEntry> = Vec::new();
    for f in files {
        let src = addon_dir.join(f);
        let candidates = if src.is_dir() {
            ufs::walk_files(&src)?
        } else {
            vec![src]
        };
        for p in candidates {
            let rel = ufs::path_relative_to(&p, addon_dir)
                .map(ufs::to_unix_string)
                .ok_or_else(|| format!("{} is outside {}", p.display(), addon_dir.display()))?;
            if is_excluded(&rel, &patterns) {
                continue;
            }
            entries.push(PackEntry {
                source: p,
                relative: rel,
            });
        }
    }

    entries.sort_by(|a, b| a.relative.cmp(&b.relative));
    entries.dedup_by(|a, b| a.relative == b.relative);
    Ok(entries)
}

fn compile_patterns(exclude: &[String]) -> Result<Vec<Pattern>, String> {
    exclude
        .iter()
        .map(|p| Pattern::new(p).map_err(|e| format!("Invalid exclude pattern '{}': {}", p, e)))
        .collect()
}

/// A pattern excludes a file when it matches either the file name or the
/// addon-relative path.
pub fn is_excluded(relative: &str, patterns: &[Pattern]) -> bool {
    let opts = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let name = relative.rsplit('/').next().unwrap_or(relative);
    patterns
        .iter()
        .any(|p| p.matches_with(name, opts) || p.matches_with(relative, opts))
}

/// Writes the archive next to its final name and renames it into place, so a
/// failed build never leaves a truncated zip behind.
fn write_archive(out_file: &Path, addon_id: &str, entries: &[PackEntry]) -> Result<(), String> {
    let partial = out_file.with_extension("zip.partial");
    let result = write_zip(&partial, addon_id, entries).and_then(|_| {
        fs::rename(&partial, out_file).map_err(|e| {
            format!(
                "Failed to move archive into place at {}: {}",
                out_file.display(),
                e
            )
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn write_zip(path: &Path, addon_id: &str, entries: &[PackEntry]) -> Result<(), String> {
    let file = fs::File::create(path)
        .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
    let mut zip = zip::ZipWriter::new(file);
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in entries {
        let zip_path = format!("{}/{}", addon_id, entry.relative);
        let data = fs::read(&entry.source)
            .map_err(|e| format!("Failed to read {}: {}", entry.source.display(), e))?;
        let options = match unix_mode(&entry.source) {
            Some(mode) => options.unix_permissions(mode),
            None => options,
        };
        zip.start_file(zip_path.clone(), options)
            .map_err(|e| format!("Failed to add {}: {}", zip_path, e))?;
        zip.write_all(&data)
            .map_err(|e| format!("Failed to write {}: {}", zip_path, e))?;
    }

    zip.finish()
        .map_err(|e| format!("Failed to finalize zip: {}", e))?;
    Ok(())
}

#[cfg(unix)]
fn unix_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).ok().map(|m| m.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn unix_mode(_path: &Path) -> Option<u32> {
    None
}
