use std::sync::Arc;

use rfe_core::mock::{CallKind, MockRemote};
use rfe_core::{Entry, RemoteFs, UploadFile};
use rfe_ops::{
    ClipboardSlot, DragPayload, OpsError, SharePanel, SkipKind, UndoSlot, UploadEvent,
    UploadProgress, create_file, drop_on, move_batch, rename, start_upload,
};

fn dir(path: &str) -> Entry {
    Entry::from_path(path)
}

#[tokio::test]
async fn test_drop_onto_self_or_descendant_issues_no_moves() {
    let remote = MockRemote::new();
    let mut undo = UndoSlot::new();

    let mut payload = DragPayload::new();
    payload.begin(vec![r"C:\Data".into()]);
    let batch = drop_on(&remote, &mut payload, &dir(r"C:\data"), &mut undo)
        .await
        .unwrap();
    assert_eq!(batch.skipped[0].kind, SkipKind::SameFile);

    payload.begin(vec![r"C:\Data".into()]);
    let batch = drop_on(&remote, &mut payload, &dir(r"C:\Data\Sub"), &mut undo)
        .await
        .unwrap();
    assert_eq!(batch.skipped[0].kind, SkipKind::SourceIsAncestor);

    assert_eq!(remote.count(CallKind::Move), 0);
    assert!(undo.is_empty());
    assert!(!payload.is_active());
}

#[tokio::test]
async fn test_drop_on_file_is_noop() {
    let remote = MockRemote::new();
    let mut undo = UndoSlot::new();
    let mut payload = DragPayload::new();
    payload.begin(vec![r"C:\a.txt".into()]);

    let target = Entry::file("b.txt", r"C:\b.txt", 1);
    assert!(drop_on(&remote, &mut payload, &target, &mut undo).await.is_none());
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn test_batch_moves_in_order_and_last_token_wins() {
    let remote = MockRemote::new();
    let mut undo = UndoSlot::new();
    let sources: Vec<String> = vec![r"C:\a".into(), r"C:\b".into(), r"C:\c".into()];

    let batch = move_batch(&remote, &sources, r"C:\dest", &mut undo).await;

    assert!(batch.is_success());
    assert_eq!(batch.moved.len(), 3);
    let moved: Vec<_> = remote
        .calls_of(CallKind::Move)
        .into_iter()
        .map(|c| c.path)
        .collect();
    assert_eq!(moved, sources);
    assert_eq!(undo.token(), Some("undo-3"));
}

#[tokio::test]
async fn test_batch_skips_guarded_sources_but_moves_the_rest() {
    let remote = MockRemote::new();
    let mut undo = UndoSlot::new();
    let sources: Vec<String> = vec![r"C:\dest".into(), r"C:\x.txt".into()];

    let batch = move_batch(&remote, &sources, r"C:\Dest", &mut undo).await;

    assert_eq!(batch.skipped.len(), 1);
    assert_eq!(batch.moved.len(), 1);
    assert_eq!(remote.count(CallKind::Move), 1);
}

#[tokio::test]
async fn test_batch_stops_at_first_failure() {
    let remote = MockRemote::new().fail(CallKind::Move, r"C:\b");
    let mut undo = UndoSlot::new();
    let sources: Vec<String> = vec![r"C:\a".into(), r"C:\b".into(), r"C:\c".into()];

    let batch = move_batch(&remote, &sources, r"C:\dest", &mut undo).await;

    assert!(!batch.is_success());
    assert_eq!(batch.moved.len(), 1);
    assert_eq!(batch.failed.as_ref().map(|(s, _)| s.as_str()), Some(r"C:\b"));
    assert_eq!(batch.moved_from, vec![r"C:\a".to_string()]);
    assert_eq!(remote.count(CallKind::Move), 2);
    assert_eq!(undo.token(), Some("undo-1"));
}

#[tokio::test]
async fn test_undo_without_token_is_noop() {
    let remote = MockRemote::new();
    let mut undo = UndoSlot::new();
    assert!(!undo.apply(&remote).await.unwrap());
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn test_undo_after_move_issues_one_call_and_clears() {
    let remote = MockRemote::new();
    let mut undo = UndoSlot::new();
    move_batch(&remote, &[r"C:\a".to_string()], r"C:\dest", &mut undo).await;

    assert!(undo.apply(&remote).await.unwrap());
    assert!(undo.is_empty());
    let calls = remote.calls_of(CallKind::Undo);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, "undo-1");

    assert!(!undo.apply(&remote).await.unwrap());
    assert_eq!(remote.count(CallKind::Undo), 1);
}

#[tokio::test]
async fn test_failed_undo_still_clears_token() {
    let remote = MockRemote::new().fail_every(CallKind::Undo);
    let mut undo = UndoSlot::new();
    undo.store(Some("t".into()));

    assert!(undo.apply(&remote).await.is_err());
    assert!(undo.is_empty());
}

#[tokio::test]
async fn test_move_without_token_clears_undo() {
    let mut undo = UndoSlot::new();
    let issuing = MockRemote::new();
    move_batch(&issuing, &[r"C:\a".to_string()], r"C:\dest", &mut undo).await;
    assert_eq!(undo.token(), Some("undo-1"));

    let silent = MockRemote::new().without_undo_tokens();
    let batch = move_batch(&silent, &[r"C:\b".to_string()], r"C:\dest", &mut undo).await;
    assert_eq!(batch.moved.len(), 1);
    assert_eq!(undo.token(), None);

    assert!(!undo.apply(&silent).await.unwrap());
    assert_eq!(silent.count(CallKind::Undo), 0);
}

#[tokio::test]
async fn test_fully_guarded_batch_keeps_undo() {
    let remote = MockRemote::new();
    let mut undo = UndoSlot::new();
    undo.store(Some("earlier".into()));

    let batch = move_batch(&remote, &[r"C:\dest".to_string()], r"C:\dest", &mut undo).await;
    assert_eq!(batch.skipped.len(), 1);
    assert_eq!(remote.count(CallKind::Move), 0);
    assert_eq!(undo.token(), Some("earlier"));
}

#[tokio::test]
async fn test_cut_paste_without_token_clears_undo() {
    let remote = MockRemote::new().without_undo_tokens();
    let mut undo = UndoSlot::new();
    undo.store(Some("earlier".into()));

    let mut clipboard = ClipboardSlot::new();
    clipboard.cut(Entry::file("b.txt", r"C:\b.txt", 1));
    clipboard.paste_here(&remote, r"C:\dest", &mut undo).await.unwrap();
    assert!(undo.is_empty());
}

#[tokio::test]
async fn test_paste_copy_and_cut() {
    let remote = MockRemote::new();
    let mut undo = UndoSlot::new();
    let mut clipboard = ClipboardSlot::new();

    clipboard.copy(Entry::file("a.txt", r"C:\a.txt", 1));
    clipboard.paste_here(&remote, r"C:\dest", &mut undo).await.unwrap();
    assert_eq!(remote.count(CallKind::Copy), 1);
    assert!(clipboard.is_empty());
    assert!(undo.is_empty());

    clipboard.cut(Entry::file("b.txt", r"C:\b.txt", 1));
    clipboard.paste_here(&remote, r"C:\dest", &mut undo).await.unwrap();
    assert_eq!(remote.count(CallKind::Move), 1);
    assert!(clipboard.is_empty());
    assert_eq!(undo.token(), Some("undo-1"));
}

#[tokio::test]
async fn test_paste_failure_clears_slot() {
    let remote = MockRemote::new().fail(CallKind::Copy, r"C:\a.txt");
    let mut undo = UndoSlot::new();
    let mut clipboard = ClipboardSlot::new();
    clipboard.copy(Entry::file("a.txt", r"C:\a.txt", 1));

    let result = clipboard.paste_here(&remote, r"C:\dest", &mut undo).await;
    assert!(matches!(result, Err(OpsError::Remote(_))));
    assert!(clipboard.is_empty());
}

#[tokio::test]
async fn test_paste_with_empty_clipboard_is_noop() {
    let remote = MockRemote::new();
    let mut undo = UndoSlot::new();
    let mut clipboard = ClipboardSlot::new();
    let outcome = clipboard.paste_here(&remote, r"C:\dest", &mut undo).await.unwrap();
    assert!(outcome.is_none());
    assert!(remote.calls().is_empty());
}

#[test]
fn test_later_stage_overwrites_clipboard() {
    let mut clipboard = ClipboardSlot::new();
    clipboard.copy(Entry::file("a.txt", r"C:\a.txt", 1));
    clipboard.cut(Entry::file("b.txt", r"C:\b.txt", 1));
    assert_eq!(clipboard.entry().map(|e| e.path.as_str()), Some(r"C:\b.txt"));
    assert_eq!(clipboard.mode().map(|m| m.to_string()).as_deref(), Some("cut"));
}

#[tokio::test]
async fn test_upload_aborts_after_first_failure() {
    let mock = Arc::new(MockRemote::new().fail(CallKind::Upload, r"C:\up\f2.txt"));
    let remote: Arc<dyn RemoteFs> = mock.clone();
    let files = vec![
        UploadFile::new("f1.txt", b"one".to_vec()),
        UploadFile::new("f2.txt", b"two".to_vec()),
        UploadFile::new("f3.txt", b"three".to_vec()),
    ];

    let mut rx = start_upload(remote, r"C:\up".into(), files);
    let mut progress = UploadProgress::default();
    let mut started = Vec::new();
    while let Some(event) = rx.recv().await {
        if let UploadEvent::Started { name, .. } = &event {
            started.push(name.clone());
        }
        progress.apply(&event);
    }

    assert_eq!(started, vec!["f1.txt", "f2.txt"]);
    assert_eq!(mock.count(CallKind::Upload), 2);
    let complete = progress.complete.unwrap();
    assert_eq!(complete.succeeded, 1);
    assert!(matches!(
        complete.error,
        Some(OpsError::Upload { ref name, .. }) if name == "f2.txt"
    ));
    assert!(!progress.active);
}

#[tokio::test]
async fn test_upload_success_reports_full_progress() {
    let remote: Arc<dyn RemoteFs> = Arc::new(MockRemote::new());
    let files = vec![UploadFile::new("a.bin", vec![1u8; 8]).with_rel_path("Folder/a.bin")];

    let mut rx = start_upload(remote, r"C:\up".into(), files);
    let mut progress = UploadProgress::default();
    while let Some(event) = rx.recv().await {
        progress.apply(&event);
    }

    assert_eq!(progress.percent, 100);
    assert_eq!(progress.files_completed, 1);
    assert!(progress.complete.unwrap().is_success());
}

#[tokio::test]
async fn test_rename_skips_unchanged_name() {
    let remote = MockRemote::new();
    let entry = Entry::file("a.txt", r"C:\a.txt", 1);
    assert!(!rename(&remote, &entry, "a.txt").await.unwrap());
    assert!(!rename(&remote, &entry, " ").await.unwrap());
    assert!(rename(&remote, &entry, "b.txt").await.unwrap());
    assert_eq!(remote.count(CallKind::Rename), 1);
}

#[tokio::test]
async fn test_create_file_saves_empty_content() {
    let remote = MockRemote::new();
    let created = create_file(&remote, r"C:\Data", "new.txt").await.unwrap();
    assert_eq!(created, r"C:\Data\new.txt");
    assert_eq!(remote.content_of(r"C:\Data\new.txt").as_deref(), Some(""));
}

#[tokio::test]
async fn test_share_panel_stores_link_until_closed() {
    let remote = MockRemote::new();
    let mut panel = SharePanel::new();
    assert!(panel.create(&remote).await.unwrap().is_none());

    panel.open(Entry::file("a.txt", r"C:\a.txt", 1));
    panel.options.no_expiry = false;
    panel.options.expires_hours = 2.0;
    panel.create(&remote).await.unwrap();

    assert!(panel.url().is_some());
    assert!(panel.expires_at().is_some());

    panel.close();
    assert!(panel.url().is_none());
    assert!(!panel.is_open());
    assert_eq!(remote.count(CallKind::Share), 1);
}
