use crate::utils::fs::human_size;
use crate::utils::logger::{LogLevel, Logger};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveSummary {
    pub name: String,
    pub size: u64,
    pub sha256: String,
    pub entries: usize,
}

pub fn summarize_archive(path: &Path) -> Result<ArchiveSummary, String> {
    let meta = fs::metadata(path).map_err(|e| format!("Failed to stat archive: {}", e))?;

    let mut f = fs::File::open(path).map_err(|e| format!("Failed to open archive: {}", e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = f
            .read(&mut buf)
            .map_err(|e| format!("Failed to read archive for sha: {}", e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let entries = fs::File::open(path)
        .map_err(|e| format!("Failed to open archive: {}", e))
        .and_then(|f| zip::ZipArchive::new(f).map_err(|e| format!("Invalid zip archive: {}", e)))?
        .len();

    Ok(ArchiveSummary {
        name: path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string(),
        size: meta.len(),
        sha256: hex::encode(hasher.finalize()),
        entries,
    })
}

pub fn print_archive_summary(path: &Path) -> Result<(), String> {
    let summary = summarize_archive(path)?;
    let lines = [
        format!("Path    : {}", path.display()),
        format!("Size    : {}", human_size(summary.size)),
        format!("Entries : {}", summary.entries),
        format!("SHA-256 : {}", summary.sha256),
    ];
    let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
    Logger::new().log_message_with_trace(LogLevel::Info, &format!("📦 {}", summary.name), refs);
    Ok(())
}
