// Integration tests for the filesystem meeting store

use anyhow::Result;
use meeting_assistant::session::{MeetingId, WizardStep};
use meeting_assistant::storage::{MeetingStore, StoreError};
use serde_json::json;
use tempfile::TempDir;

const LIMIT: u64 = 1024;

async fn new_store() -> Result<(TempDir, MeetingStore)> {
    let dir = TempDir::new()?;
    let store = MeetingStore::new(dir.path(), LIMIT);
    store.init().await?;
    Ok((dir, store))
}

fn file_names(dir: &std::path::Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<_>>()?;
    names.sort();
    Ok(names)
}

#[tokio::test]
async fn test_create_and_load_meeting() -> Result<()> {
    let (_dir, store) = new_store().await?;

    let state = store.create_meeting().await?;
    assert!(state.meeting_id.as_str().starts_with("meeting_"));
    assert_eq!(state.current_step, WizardStep::Agenda);

    let dir = store.meeting_dir(&state.meeting_id);
    assert!(dir.join("meeting_state.json").is_file());
    assert!(dir.join("audio").is_dir());
    assert!(dir.join("versions").is_dir());

    let snapshot = store.load_meeting(&state.meeting_id).await?;
    assert_eq!(snapshot.state.meeting_id, state.meeting_id);
    assert!(snapshot.state.agenda.is_empty());
    assert!(snapshot.chat_dialog.is_empty());
    assert!(snapshot.uploaded.is_none());

    Ok(())
}

#[tokio::test]
async fn test_load_unknown_meeting() -> Result<()> {
    let (_dir, store) = new_store().await?;
    let id = MeetingId::parse("missing")?;

    let err = store.load_meeting(&id).await.unwrap_err();
    assert!(matches!(err, StoreError::MeetingNotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_snapshot_merges_documents() -> Result<()> {
    let (_dir, store) = new_store().await?;
    let id = store.create_meeting().await?.meeting_id;

    store.save_agenda(&id, "# Agenda\n# Mall").await?;
    store.save_transcript(&id, "hej hej").await?;
    store.save_filled(&id, "## Beslut\n- Ja").await?;
    store.save_chat(&id, r#"{"messages":[]}"#).await?;
    store.store_audio(&id, b"RIFF", "audio/wav", "möte.wav").await?;

    let snapshot = store.load_meeting(&id).await?;
    assert_eq!(snapshot.state.agenda, "# Agenda\n# Mall");
    assert_eq!(snapshot.state.transcript, "hej hej");
    assert_eq!(snapshot.state.filled, "## Beslut\n- Ja");
    assert_eq!(snapshot.chat_dialog, r#"{"messages":[]}"#);

    let uploaded = snapshot.uploaded.expect("audio file listed");
    assert!(uploaded.filename.ends_with(".wav"));
    assert_eq!(uploaded.size, 4);
    Ok(())
}

#[tokio::test]
async fn test_save_state_stamps_last_saved() -> Result<()> {
    let (_dir, store) = new_store().await?;
    let mut state = store.create_meeting().await?;
    assert!(state.last_saved.is_none());

    state.current_step = WizardStep::Transcribe;
    state.settings.llm_model = Some("gpt-4o".to_string());
    let id = state.meeting_id.clone();
    store.save_state(&id, state).await?;

    let loaded = store.load_state(&id).await?;
    assert_eq!(loaded.current_step, WizardStep::Transcribe);
    assert_eq!(loaded.settings.llm_model.as_deref(), Some("gpt-4o"));
    assert!(loaded.last_saved.is_some());
    Ok(())
}

#[tokio::test]
async fn test_corrupt_state_is_reported() -> Result<()> {
    let (_dir, store) = new_store().await?;
    let id = store.create_meeting().await?.meeting_id;
    tokio::fs::write(store.meeting_dir(&id).join("meeting_state.json"), "{not json").await?;

    let err = store.load_state(&id).await.unwrap_err();
    assert!(matches!(err, StoreError::CorruptState { .. }));
    Ok(())
}

#[tokio::test]
async fn test_list_meetings_newest_first() -> Result<()> {
    let (_dir, store) = new_store().await?;
    assert!(store.list_meetings().await?.is_empty());

    let older = store.create_meeting().await?;
    // Modification times need to differ
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let newer = store.create_meeting().await?;
    store.save_transcript(&newer.meeting_id, "text").await?;

    // A stray directory without state is skipped
    tokio::fs::create_dir_all(store.meetings_root().join("stray")).await?;

    let meetings = store.list_meetings().await?;
    let ids: Vec<&MeetingId> = meetings.iter().map(|m| &m.id).collect();
    assert_eq!(ids, [&newer.meeting_id, &older.meeting_id]);
    assert!(meetings[0].has_transcript);
    assert!(!meetings[1].has_transcript);
    assert!(!meetings[0].has_audio);
    Ok(())
}

#[tokio::test]
async fn test_rename_meeting() -> Result<()> {
    let (_dir, store) = new_store().await?;
    let old = store.create_meeting().await?.meeting_id;
    store.save_agenda(&old, "# Agenda").await?;

    let new = MeetingId::parse("styrgrupp-2025")?;
    store.rename_meeting(&old, &new).await?;

    assert!(!store.exists(&old).await);
    let state = store.load_state(&new).await?;
    assert_eq!(state.meeting_id, new);
    assert_eq!(state.old_meeting_id.as_ref(), Some(&old));
    assert!(state.renamed.is_some());
    assert_eq!(store.read_agenda(&new).await?.as_deref(), Some("# Agenda"));
    Ok(())
}

#[tokio::test]
async fn test_rename_conflicts() -> Result<()> {
    let (_dir, store) = new_store().await?;
    let first = store.create_meeting().await?.meeting_id;
    let second = store.create_meeting().await?.meeting_id;

    let err = store.rename_meeting(&first, &second).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));

    let missing = MeetingId::parse("missing")?;
    let err = store
        .rename_meeting(&missing, &MeetingId::parse("other")?)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::MeetingNotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_transcript_versions() -> Result<()> {
    let (_dir, store) = new_store().await?;
    let id = store.create_meeting().await?.meeting_id;
    let versions = store.meeting_dir(&id).join("versions");

    store.save_transcript(&id, "first").await?;
    assert!(file_names(&versions)?.is_empty());

    store.save_transcript(&id, "second").await?;
    let backups = file_names(&versions)?;
    assert_eq!(backups.len(), 1);
    assert!(backups[0].starts_with("transcript_") && backups[0].ends_with(".txt"));
    assert_eq!(std::fs::read_to_string(versions.join(&backups[0]))?, "first");
    assert_eq!(store.read_transcript(&id).await?.as_deref(), Some("second"));
    Ok(())
}

#[tokio::test]
async fn test_filled_versions() -> Result<()> {
    let (_dir, store) = new_store().await?;
    let id = store.create_meeting().await?.meeting_id;
    let versions = store.meeting_dir(&id).join("versions");

    store.save_filled(&id, "v1").await?;
    store.save_filled(&id, "v2").await?;

    let backups = file_names(&versions)?;
    assert_eq!(backups.len(), 1);
    assert!(backups[0].starts_with("filled_") && backups[0].ends_with(".md"));
    assert_eq!(store.read_filled(&id).await?.as_deref(), Some("v2"));
    Ok(())
}

#[tokio::test]
async fn test_record_transcription_append_and_replace() -> Result<()> {
    let (_dir, store) = new_store().await?;
    let id = store.create_meeting().await?.meeting_id;

    // Append with nothing stored yet behaves like replace
    let text = store.record_transcription(&id, "a.webm", "ett", true).await?;
    assert_eq!(text, "ett");

    let text = store.record_transcription(&id, "b.webm", "två", true).await?;
    assert_eq!(text, "ett\n\n--- Transkribering från: b.webm ---\n\ntvå");

    let text = store.record_transcription(&id, "c.webm", "tre", false).await?;
    assert_eq!(text, "tre");
    assert_eq!(store.read_transcript(&id).await?.as_deref(), Some("tre"));
    Ok(())
}

#[tokio::test]
async fn test_store_audio_naming_and_limits() -> Result<()> {
    let (_dir, store) = new_store().await?;
    let id = store.create_meeting().await?.meeting_id;

    let webm = store.store_audio(&id, b"webm", "audio/webm;codecs=opus", "").await?;
    assert!(webm.filename.starts_with("audio_"));
    assert!(webm.filename.ends_with(".webm"));
    assert_eq!(webm.mime, "audio/webm");

    let m4a = store.store_audio(&id, b"m4a", "", "inspelning.m4a").await?;
    assert!(m4a.filename.ends_with(".m4a"));

    let unknown = store.store_audio(&id, b"???", "", "").await?;
    assert!(unknown.filename.ends_with(".webm"));

    let too_big = vec![0u8; (LIMIT + 1) as usize];
    let err = store.store_audio(&id, &too_big, "audio/wav", "x.wav").await.unwrap_err();
    assert!(matches!(err, StoreError::TooLarge { limit: LIMIT, .. }));

    assert_eq!(store.list_audio_files(&id).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_audio_path_rejects_traversal() -> Result<()> {
    let (_dir, store) = new_store().await?;
    let id = store.create_meeting().await?.meeting_id;
    let stored = store.store_audio(&id, b"data", "audio/mpeg", "").await?;

    let path = store.audio_path(&id, &stored.filename).await?;
    assert!(path.ends_with(&stored.filename));

    for bad in ["../meeting_state.json", "audio/../../x", ".hidden", ""] {
        let err = store.audio_path(&id, bad).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidFileName(_)), "{bad:?}");
    }

    let err = store.audio_path(&id, "audio_missing.webm").await.unwrap_err();
    assert!(matches!(err, StoreError::FileNotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_error_log_format() -> Result<()> {
    let (_dir, store) = new_store().await?;
    let id = store.create_meeting().await?.meeting_id;
    assert!(store.read_error_log(&id).await?.is_none());

    store.log_error(&id, "First failure", None).await?;
    store
        .log_error(
            &id,
            "Transcription failed",
            Some(json!({ "status": 500, "raw": "x".repeat(900) })),
        )
        .await?;

    let log = store.read_error_log(&id).await?.expect("log written");
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);

    // [YYYY-MM-DD HH:MM:SS] message
    assert!(lines[0].starts_with('['));
    assert_eq!(&lines[0][20..], "] First failure");
    assert!(lines[1].contains("] Transcription failed | Context: {"));
    assert!(lines[1].contains(&format!("\"raw\":\"{}\"", "x".repeat(500))));
    assert!(!lines[1].contains(&"x".repeat(501)));
    Ok(())
}
