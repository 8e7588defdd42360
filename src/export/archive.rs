use anyhow::{Context, Result};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

enum Entry {
    Dir(String),
    File(String, Vec<u8>),
}

/// Zip everything under `dir`, with entry names relative to it.
///
/// Subdirectories become `name/` entries, so empty ones survive. Entries are
/// sorted by name.
pub async fn zip_directory(dir: &Path) -> Result<Vec<u8>> {
    let entries = collect_entries(dir).await?;

    tokio::task::spawn_blocking(move || write_zip(entries))
        .await
        .context("Archive task failed")?
}

async fn collect_entries(root: &Path) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut read_dir = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("Failed to read {}", dir.display()))?;

        while let Some(item) = read_dir.next_entry().await? {
            let path = item.path();
            let name = entry_name(root, &path)?;

            if item.file_type().await?.is_dir() {
                entries.push(Entry::Dir(format!("{}/", name)));
                pending.push(path);
            } else {
                let data = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                entries.push(Entry::File(name, data));
            }
        }
    }

    entries.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(entries)
}

/// Path of `path` below `root`, with forward slashes
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;

    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

fn write_zip(entries: Vec<Entry>) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for entry in entries {
        match entry {
            Entry::Dir(name) => zip.add_directory(name, options)?,
            Entry::File(name, data) => {
                zip.start_file(name, options)?;
                zip.write_all(&data)?;
            }
        }
    }

    Ok(zip.finish()?.into_inner())
}

impl Entry {
    fn name(&self) -> &str {
        match self {
            Entry::Dir(name) | Entry::File(name, _) => name,
        }
    }
}
