use super::error::{IoContext, StoreError, StoreResult};
use crate::audio::{extension_for_upload, mime_for_path};
use crate::session::{
    short_hex, AudioFileInfo, MeetingId, MeetingSnapshot, MeetingState, MeetingSummary,
};
use chrono::{DateTime, Local, Utc};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

const STATE_FILE: &str = "meeting_state.json";
const AGENDA_FILE: &str = "agenda.md";
const TRANSCRIPT_FILE: &str = "transcript.txt";
const FILLED_FILE: &str = "filled.md";
const CHAT_FILE: &str = "chat_dialog.json";
const ERROR_FILE: &str = "error.txt";
const AUDIO_DIR: &str = "audio";
const VERSIONS_DIR: &str = "versions";

/// Longest upstream body kept in an error log entry
const MAX_LOGGED_RAW: usize = 500;

/// Filesystem store for meetings.
///
/// Layout: `<root>/meetings/<meeting-id>/` with the state file, agenda,
/// transcript, filled document, chat dialog, error log, `audio/` uploads
/// and `versions/` backups. Every write replaces the whole file.
#[derive(Debug, Clone)]
pub struct MeetingStore {
    root: PathBuf,
    max_upload_bytes: u64,
}

impl MeetingStore {
    pub fn new(root: impl Into<PathBuf>, max_upload_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_upload_bytes,
        }
    }

    /// Create the storage root if needed
    pub async fn init(&self) -> StoreResult<()> {
        let meetings = self.meetings_root();
        fs::create_dir_all(&meetings)
            .await
            .io_context(|| format!("Failed to create {}", meetings.display()))?;
        info!("Meeting storage at {}", meetings.display());
        Ok(())
    }

    pub fn meetings_root(&self) -> PathBuf {
        self.root.join("meetings")
    }

    pub fn meeting_dir(&self, id: &MeetingId) -> PathBuf {
        self.meetings_root().join(id.as_str())
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Whether a meeting directory exists
    pub async fn exists(&self, id: &MeetingId) -> bool {
        fs::metadata(self.meeting_dir(id))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn ensure_meeting_dir(&self, id: &MeetingId) -> StoreResult<PathBuf> {
        let dir = self.meeting_dir(id);
        for sub in [AUDIO_DIR, VERSIONS_DIR] {
            let path = dir.join(sub);
            fs::create_dir_all(&path)
                .await
                .io_context(|| format!("Failed to create {}", path.display()))?;
        }
        Ok(dir)
    }

    // ------------------------------------------------------------------
    // Meeting lifecycle
    // ------------------------------------------------------------------

    /// Create a meeting with a generated id and an initial state file
    pub async fn create_meeting(&self) -> StoreResult<MeetingState> {
        let id = MeetingId::generate();
        self.ensure_meeting_dir(&id).await?;

        let state = MeetingState::new(id.clone());
        self.write_state(&id, &state).await?;

        info!("Created meeting {}", id);
        Ok(state)
    }

    /// Read the state file
    pub async fn load_state(&self, id: &MeetingId) -> StoreResult<MeetingState> {
        let path = self.meeting_dir(id).join(STATE_FILE);
        let raw = read_optional(&path)
            .await?
            .ok_or_else(|| StoreError::MeetingNotFound(id.clone()))?;

        serde_json::from_str(&raw).map_err(|source| StoreError::CorruptState {
            meeting: id.clone(),
            source,
        })
    }

    /// Overwrite the state file, stamping `last_saved`.
    ///
    /// The meeting directory is created when missing.
    pub async fn save_state(
        &self,
        id: &MeetingId,
        mut state: MeetingState,
    ) -> StoreResult<MeetingState> {
        self.ensure_meeting_dir(id).await?;
        state.meeting_id = id.clone();
        state.last_saved = Some(Utc::now());
        self.write_state(id, &state).await?;
        Ok(state)
    }

    async fn write_state(&self, id: &MeetingId, state: &MeetingState) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(state).map_err(|source| {
            StoreError::CorruptState {
                meeting: id.clone(),
                source,
            }
        })?;
        write_file(&self.meeting_dir(id).join(STATE_FILE), json.as_bytes()).await
    }

    /// State plus the contents of the per-meeting files
    pub async fn load_meeting(&self, id: &MeetingId) -> StoreResult<MeetingSnapshot> {
        let mut state = self.load_state(id).await.inspect_err(|e| {
            if !matches!(e, StoreError::MeetingNotFound(_)) {
                error!("Failed to load meeting {}: {}", id, e);
            }
        })?;

        state.agenda = self.read_agenda(id).await?.unwrap_or_default();
        state.transcript = self.read_transcript(id).await?.unwrap_or_default();
        state.filled = self.read_filled(id).await?.unwrap_or_default();

        let chat_dialog = self.read_chat(id).await?.unwrap_or_default();
        let uploaded = self.list_audio_files(id).await?.into_iter().next();

        Ok(MeetingSnapshot {
            state,
            chat_dialog,
            uploaded,
        })
    }

    /// Summaries of every meeting with a state file, newest-modified first
    pub async fn list_meetings(&self) -> StoreResult<Vec<MeetingSummary>> {
        let root = self.meetings_root();
        let mut entries = match fs::read_dir(&root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    context: format!("Failed to list {}", root.display()),
                    source: e,
                })
            }
        };

        let mut meetings = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .io_context(|| format!("Failed to list {}", root.display()))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let Ok(id) = MeetingId::parse(name) else {
                continue;
            };

            match self.summarize(&id).await {
                Ok(Some(summary)) => meetings.push(summary),
                Ok(None) => {}
                Err(e) => warn!("Skipping meeting {}: {}", id, e),
            }
        }

        meetings.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(meetings)
    }

    async fn summarize(&self, id: &MeetingId) -> StoreResult<Option<MeetingSummary>> {
        let dir = self.meeting_dir(id);
        let state_path = dir.join(STATE_FILE);

        let metadata = match fs::metadata(&state_path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Io {
                    context: format!("Failed to stat {}", state_path.display()),
                    source: e,
                })
            }
        };

        let state = self.load_state(id).await?;
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or(state.created);

        Ok(Some(MeetingSummary {
            id: id.clone(),
            created: state.created,
            modified,
            current_step: state.current_step,
            has_transcript: is_file(&dir.join(TRANSCRIPT_FILE)).await,
            has_filled: is_file(&dir.join(FILLED_FILE)).await,
            has_agenda: is_file(&dir.join(AGENDA_FILE)).await,
            has_audio: !self.list_audio_files(id).await?.is_empty(),
        }))
    }

    /// Move a meeting to a new id and record the rename in its state
    pub async fn rename_meeting(&self, old: &MeetingId, new: &MeetingId) -> StoreResult<()> {
        let old_dir = self.meeting_dir(old);
        let new_dir = self.meeting_dir(new);

        if !self.exists(old).await {
            return Err(StoreError::MeetingNotFound(old.clone()));
        }
        if self.exists(new).await {
            return Err(StoreError::AlreadyExists(new.clone()));
        }

        fs::rename(&old_dir, &new_dir)
            .await
            .io_context(|| format!("Failed to rename meeting {} to {}", old, new))?;

        match self.load_state(new).await {
            Ok(mut state) => {
                state.meeting_id = new.clone();
                state.old_meeting_id = Some(old.clone());
                state.renamed = Some(Utc::now());
                self.write_state(new, &state).await?;
            }
            Err(StoreError::MeetingNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        info!("Renamed meeting: {} -> {}", old, new);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    pub async fn save_agenda(&self, id: &MeetingId, content: &str) -> StoreResult<()> {
        let dir = self.ensure_meeting_dir(id).await?;
        write_file(&dir.join(AGENDA_FILE), content.as_bytes()).await?;
        info!("Saved agenda for {}", id);
        Ok(())
    }

    pub async fn read_agenda(&self, id: &MeetingId) -> StoreResult<Option<String>> {
        read_optional(&self.meeting_dir(id).join(AGENDA_FILE)).await
    }

    pub async fn save_chat(&self, id: &MeetingId, content: &str) -> StoreResult<()> {
        let dir = self.ensure_meeting_dir(id).await?;
        write_file(&dir.join(CHAT_FILE), content.as_bytes()).await
    }

    pub async fn read_chat(&self, id: &MeetingId) -> StoreResult<Option<String>> {
        read_optional(&self.meeting_dir(id).join(CHAT_FILE)).await
    }

    pub async fn read_transcript(&self, id: &MeetingId) -> StoreResult<Option<String>> {
        read_optional(&self.meeting_dir(id).join(TRANSCRIPT_FILE)).await
    }

    /// Overwrite the transcript, keeping the previous one under `versions/`
    pub async fn save_transcript(&self, id: &MeetingId, content: &str) -> StoreResult<()> {
        let dir = self.ensure_meeting_dir(id).await?;
        let path = dir.join(TRANSCRIPT_FILE);
        self.backup(&path, &dir, "transcript", "txt").await?;
        write_file(&path, content.as_bytes()).await?;
        info!("Saved transcript for {} ({} bytes)", id, content.len());
        Ok(())
    }

    /// Store a fresh transcription and return the full transcript.
    ///
    /// With `append`, an existing transcript is kept and the new text follows
    /// a separator naming `source`; otherwise the transcript is replaced.
    pub async fn record_transcription(
        &self,
        id: &MeetingId,
        source: &str,
        text: &str,
        append: bool,
    ) -> StoreResult<String> {
        let dir = self.ensure_meeting_dir(id).await?;
        let path = dir.join(TRANSCRIPT_FILE);

        let combined = match (append, read_optional(&path).await?) {
            (true, Some(existing)) => format!(
                "{}\n\n--- Transkribering från: {} ---\n\n{}",
                existing, source, text
            ),
            _ => text.to_string(),
        };

        write_file(&path, combined.as_bytes()).await?;
        Ok(combined)
    }

    pub async fn read_filled(&self, id: &MeetingId) -> StoreResult<Option<String>> {
        read_optional(&self.meeting_dir(id).join(FILLED_FILE)).await
    }

    /// Overwrite the filled document, keeping the previous one under `versions/`
    pub async fn save_filled(&self, id: &MeetingId, content: &str) -> StoreResult<()> {
        let dir = self.ensure_meeting_dir(id).await?;
        let path = dir.join(FILLED_FILE);
        self.backup(&path, &dir, "filled", "md").await?;
        write_file(&path, content.as_bytes()).await
    }

    async fn backup(&self, path: &Path, dir: &Path, stem: &str, ext: &str) -> StoreResult<()> {
        if !is_file(path).await {
            return Ok(());
        }

        let target = dir.join(VERSIONS_DIR).join(format!(
            "{}_{}.{}",
            stem,
            Local::now().format("%Y%m%d_%H%M%S"),
            ext
        ));
        fs::copy(path, &target)
            .await
            .io_context(|| format!("Failed to back up {}", path.display()))?;
        info!("Backed up {} to {}", path.display(), target.display());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Audio
    // ------------------------------------------------------------------

    /// Save an uploaded audio file under a generated name
    pub async fn store_audio(
        &self,
        id: &MeetingId,
        data: &[u8],
        mime: &str,
        original_name: &str,
    ) -> StoreResult<AudioFileInfo> {
        let size = data.len() as u64;
        if size > self.max_upload_bytes {
            return Err(StoreError::TooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }

        let dir = self.ensure_meeting_dir(id).await?;
        let ext = extension_for_upload(mime, original_name);
        let filename = format!(
            "audio_{}_{}.{}",
            Local::now().format("%Y%m%d_%H%M%S"),
            short_hex(),
            ext
        );
        let path = dir.join(AUDIO_DIR).join(&filename);

        write_file(&path, data).await?;
        info!(
            "Upload for {}: {} ({} bytes, mime={:?}, original={:?})",
            id, filename, size, mime, original_name
        );

        audio_info(&path).await
    }

    /// Stored audio files, sorted by name
    pub async fn list_audio_files(&self, id: &MeetingId) -> StoreResult<Vec<AudioFileInfo>> {
        let audio_dir = self.meeting_dir(id).join(AUDIO_DIR);
        let mut entries = match fs::read_dir(&audio_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    context: format!("Failed to list {}", audio_dir.display()),
                    source: e,
                })
            }
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .io_context(|| format!("Failed to list {}", audio_dir.display()))?
        {
            let path = entry.path();
            if is_file(&path).await {
                files.push(audio_info(&path).await?);
            }
        }

        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(files)
    }

    /// Path of a stored audio file.
    ///
    /// `filename` must be a bare file name; anything that could leave the
    /// meeting's audio directory is rejected.
    pub async fn audio_path(&self, id: &MeetingId, filename: &str) -> StoreResult<PathBuf> {
        validate_file_name(filename)?;

        let path = self.meeting_dir(id).join(AUDIO_DIR).join(filename);
        if !is_file(&path).await {
            return Err(StoreError::FileNotFound(format!(
                "Audio file not found: {}",
                filename
            )));
        }
        Ok(path)
    }

    // ------------------------------------------------------------------
    // Error log
    // ------------------------------------------------------------------

    /// Append `[timestamp] message | Context: {...}` to the meeting's error log
    pub async fn log_error(
        &self,
        id: &MeetingId,
        message: &str,
        context: Option<Value>,
    ) -> StoreResult<()> {
        error!("Meeting {} error: {}", id, message);

        let dir = self.ensure_meeting_dir(id).await?;
        let path = dir.join(ERROR_FILE);

        let context = context
            .map(truncate_raw)
            .filter(|c| c.as_object().map_or(true, |o| !o.is_empty()))
            .map(|c| format!(" | Context: {}", c))
            .unwrap_or_default();
        let entry = format!(
            "[{}] {}{}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message,
            context
        );

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .io_context(|| format!("Failed to open {}", path.display()))?;
        file.write_all(entry.as_bytes())
            .await
            .io_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub async fn read_error_log(&self, id: &MeetingId) -> StoreResult<Option<String>> {
        read_optional(&self.meeting_dir(id).join(ERROR_FILE)).await
    }
}

fn validate_file_name(filename: &str) -> StoreResult<()> {
    let valid = !filename.is_empty()
        && !filename.starts_with('.')
        && !filename.contains(['/', '\\'])
        && !filename.contains("..");
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidFileName(filename.to_string()))
    }
}

/// Cut a `raw` upstream body in the context down to its first characters
fn truncate_raw(mut context: Value) -> Value {
    if let Some(raw) = context.get_mut("raw") {
        if let Some(text) = raw.as_str() {
            *raw = Value::String(text.chars().take(MAX_LOGGED_RAW).collect());
        }
    }
    context
}

async fn audio_info(path: &Path) -> StoreResult<AudioFileInfo> {
    let metadata = fs::metadata(path)
        .await
        .io_context(|| format!("Failed to stat {}", path.display()))?;
    let uploaded = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    Ok(AudioFileInfo {
        path: path.display().to_string(),
        filename: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        size: metadata.len(),
        mime: mime_for_path(path).to_string(),
        uploaded,
    })
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

async fn read_optional(path: &Path) -> StoreResult<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Io {
            context: format!("Failed to read {}", path.display()),
            source: e,
        }),
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> StoreResult<()> {
    fs::write(path, contents)
        .await
        .io_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_cannot_escape() {
        assert!(validate_file_name("audio_1.webm").is_ok());
        assert!(validate_file_name("../state.json").is_err());
        assert!(validate_file_name("sub/file.wav").is_err());
        assert!(validate_file_name(".hidden").is_err());
        assert!(validate_file_name("").is_err());
    }

    #[test]
    fn raw_context_is_truncated() {
        let long = "x".repeat(2000);
        let context = truncate_raw(serde_json::json!({ "status": 500, "raw": long }));
        assert_eq!(context["raw"].as_str().map(str::len), Some(MAX_LOGGED_RAW));
        assert_eq!(context["status"], 500);
    }
}
