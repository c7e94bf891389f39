use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

fn backup_prefix(save_path: &Path) -> String {
    let name = save_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}.backup.", name)
}

/// `<save_path>.backup.<timestamp>` next to the save file.
pub fn create_backup_path(save_path: &Path, now: DateTime<Utc>) -> PathBuf {
    let filename = format!(
        "{}{}",
        backup_prefix(save_path),
        now.format("%Y-%m-%d_%H-%M-%S%.3f")
    );
    save_path.with_file_name(filename)
}

/// `<save_path>.corrupt.<timestamp>`, where an unreadable save is moved aside.
pub fn create_quarantine_path(save_path: &Path, now: DateTime<Utc>) -> PathBuf {
    let name = save_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    save_path.with_file_name(format!("{}.corrupt.{}", name, now.format("%Y%m%d_%H%M%S")))
}

/// Backups of `save_path`, newest first.
pub fn list_backups(save_path: &Path) -> Vec<PathBuf> {
    let dir = match save_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let prefix = backup_prefix(save_path);

    let mut backups: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|s| s.to_str())
                .map(|s| s.starts_with(&prefix))
                .unwrap_or(false);
            if !matches {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                if let Ok(modified) = metadata.modified() {
                    let datetime: DateTime<Utc> = modified.into();
                    backups.push((path, datetime));
                }
            }
        }
    }

    // Names embed the timestamp, so they break ties between equal mtimes.
    backups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
    backups.into_iter().map(|(path, _)| path).collect()
}

pub fn cleanup_old_backups(save_path: &Path, keep_last_n: usize) -> std::io::Result<()> {
    for path in list_backups(save_path).iter().skip(keep_last_n) {
        log::info!("Deleting old backup: {:?}", path);
        let _ = fs::remove_file(path);
    }
    Ok(())
}
