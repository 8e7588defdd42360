use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::info;

/// File extensions the transcription API accepts
pub const TRANSCRIBABLE_EXTENSIONS: [&str; 10] = [
    "flac", "m4a", "mp3", "mp4", "mpeg", "mpga", "oga", "ogg", "wav", "webm",
];

/// EBML header that starts every WebM/Matroska file
const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// Extension to store an upload under, from its MIME type.
///
/// Unknown types fall back to the original file's extension, then to
/// `webm` (what browsers record).
pub fn extension_for_upload(mime: &str, original_name: &str) -> String {
    let known = match mime {
        "audio/webm" | "audio/webm;codecs=opus" => Some("webm"),
        "audio/ogg" => Some("ogg"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/wav" | "audio/x-wav" => Some("wav"),
        "audio/mp4" | "video/mp4" => Some("mp4"),
        "audio/flac" => Some("flac"),
        "audio/m4a" => Some("m4a"),
        _ => None,
    };

    if let Some(ext) = known {
        return ext.to_string();
    }

    extension_of(Path::new(original_name)).unwrap_or_else(|| "webm".to_string())
}

/// Lowercased extension of `path`, if it has a non-empty one
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// MIME type to report for a stored audio file
pub fn mime_for_path(path: &Path) -> &'static str {
    match extension_of(path).as_deref() {
        Some("webm") => "audio/webm",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("mp3") | Some("mpga") | Some("mpeg") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("mp4") => "audio/mp4",
        Some("m4a") => "audio/m4a",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Format to convert an unsupported file into, when a common one exists
pub fn suggest_conversion(extension: &str) -> Option<&'static str> {
    match extension.to_lowercase().as_str() {
        "aac" | "wma" => Some("mp3"),
        "aiff" | "au" | "ra" => Some("wav"),
        "m4v" | "mov" | "avi" => Some("mp4"),
        _ => None,
    }
}

/// Check that `path` has an extension the transcription API accepts.
///
/// The error message names the supported formats and, when one is known,
/// the format to convert to.
pub fn validate_transcribable(path: &Path) -> Result<(), String> {
    let ext = extension_of(path).unwrap_or_default();
    if TRANSCRIBABLE_EXTENSIONS.contains(&ext.as_str()) {
        return Ok(());
    }

    let supported = TRANSCRIBABLE_EXTENSIONS
        .iter()
        .map(|e| e.to_uppercase())
        .collect::<Vec<_>>()
        .join(", ");

    let mut message = format!(
        "Invalid file format: {}. Supported formats: {}",
        ext.to_uppercase(),
        supported
    );
    if let Some(target) = suggest_conversion(&ext) {
        message.push_str(&format!(". Try converting to {} format.", target.to_uppercase()));
    }

    Err(message)
}

/// Rename a `.dat` upload that is really WebM to `.webm`.
///
/// Returns the path to use from now on: the renamed file, or `path`
/// unchanged when it is not a WebM `.dat` file.
pub async fn normalize_container(path: &Path) -> Result<PathBuf> {
    if extension_of(path).as_deref() != Some("dat") {
        return Ok(path.to_path_buf());
    }

    let mut header = [0u8; 4];
    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let is_webm = match file.read_exact(&mut header).await {
        Ok(_) => header == EBML_MAGIC,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => false,
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    drop(file);

    if !is_webm {
        return Ok(path.to_path_buf());
    }

    let renamed = path.with_extension("webm");
    tokio::fs::rename(path, &renamed)
        .await
        .with_context(|| format!("Failed to rename {}", path.display()))?;

    info!("Converted .dat file to .webm: {} -> {}", path.display(), renamed.display());
    Ok(renamed)
}
