use std::fs;
use std::path::{Path, PathBuf};

/// Deletes every `*.zip` file directly inside `dir` and returns what was removed.
///
/// Subdirectories are not descended into and directories named `*.zip` are left alone.
pub fn clean_archives(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let rd = fs::read_dir(dir)
        .map_err(|e| format!("Failed to list {}: {}", dir.display(), e))?;

    let mut targets: Vec<PathBuf> = Vec::new();
    for entry in rd.flatten() {
        let p = entry.path();
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let is_zip = p
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("zip"))
            .unwrap_or(false);
        if is_file && is_zip {
            targets.push(p);
        }
    }
    targets.sort();

    for p in &targets {
        fs::remove_file(p).map_err(|e| format!("Failed to remove {}: {}", p.display(), e))?;
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_all_and_only_zip_files() {
        let tmp = tempfile::tempdir().unwrap();
        let d = tmp.path();
        fs::write(d.join("a-1.0.0.zip"), "x").unwrap();
        fs::write(d.join("B.ZIP"), "x").unwrap();
        fs::write(d.join("addon.xml"), "x").unwrap();
        fs::write(d.join("notes.zip.txt"), "x").unwrap();
        fs::create_dir_all(d.join("sub")).unwrap();
        fs::write(d.join("sub/nested.zip"), "x").unwrap();
        fs::create_dir_all(d.join("folder.zip")).unwrap();

        let removed = clean_archives(d).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!d.join("a-1.0.0.zip").exists());
        assert!(!d.join("B.ZIP").exists());
        assert!(d.join("addon.xml").exists());
        assert!(d.join("notes.zip.txt").exists());
        assert!(d.join("sub/nested.zip").exists());
        assert!(d.join("folder.zip").is_dir());
    }

    #[test]
    fn empty_directory_is_fine() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(clean_archives(tmp.path()).unwrap().is_empty());
    }
}
