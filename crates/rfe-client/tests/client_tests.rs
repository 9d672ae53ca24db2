use std::sync::Arc;

use rfe_client::settings::LAST_PATH_KEY;
use rfe_client::{
    ClickModifiers, ClientSession, Key, KeyAction, KeyPress, MemoryStore, OpenOutcome, PasteResult,
    Preferences, TextBufferFactory, ToastLevel, TreeRow, WatchEvent,
};
use rfe_core::mock::{CallKind, MockRemote};
use rfe_core::{ClientConfig, Entry, UploadFile};
use rfe_ops::ClipboardMode;

fn root_listing() -> Vec<Entry> {
    vec![
        Entry::dir("A", r"C:\A"),
        Entry::file("B.txt", r"C:\B.txt", 10),
        Entry::file("C.txt", r"C:\C.txt", 20),
        Entry::file("D.txt", r"C:\D.txt", 30),
    ]
}

fn mock() -> MockRemote {
    MockRemote::new()
        .with_listing(r"C:\", root_listing())
        .with_listing(r"C:\A", vec![Entry::file("inner.txt", r"C:\A\inner.txt", 1)])
        .with_roots(&[r"C:\"])
}

async fn session_with(remote: Arc<MockRemote>, prefs: Preferences) -> ClientSession {
    let mut session = ClientSession::new(
        remote,
        ClientConfig::default(),
        prefs,
        Arc::new(TextBufferFactory::new()),
    );
    session.start().await;
    session
}

async fn session(remote: Arc<MockRemote>) -> ClientSession {
    session_with(remote, Preferences::in_memory()).await
}

fn names(entries: &[Entry]) -> Vec<String> {
    entries.iter().map(|e| e.name.to_string()).collect()
}

fn latest_error(session: &ClientSession) -> String {
    let toast = session.toasts().latest().expect("a toast");
    assert_eq!(toast.level, ToastLevel::Error);
    toast.message.clone()
}

#[tokio::test]
async fn test_startup_restores_last_path() {
    let remote = Arc::new(mock());
    let store = MemoryStore::new().with(LAST_PATH_KEY, r"C:\A");
    let session = session_with(remote.clone(), Preferences::load(Box::new(store))).await;

    assert_eq!(session.current_path(), r"C:\A");
    assert_eq!(names(session.entries()), vec!["inner.txt"]);
    assert_eq!(remote.calls_of(CallKind::List)[0].path, r"C:\A");
    assert_eq!(remote.count(CallKind::Roots), 1);
    assert_eq!(remote.count(CallKind::Pins), 1);
}

#[tokio::test]
async fn test_navigation_persists_last_path() {
    let remote = Arc::new(mock());
    let mut session = session(remote).await;

    assert!(session.load(r"C:\A").await);
    assert_eq!(session.prefs().last_path().as_deref(), Some(r"C:\A"));
    assert_eq!(session.breadcrumbs().len(), 2);

    assert!(session.go_up().await);
    assert_eq!(session.current_path(), r"C:\");
    assert!(session.go_up().await);
    assert_eq!(session.current_path(), r"C:\");
}

#[tokio::test]
async fn test_load_failure_keeps_state() {
    let remote = Arc::new(mock());
    let mut session = session(remote).await;
    let before = names(session.entries());

    assert!(!session.load(r"C:\missing").await);
    assert_eq!(session.current_path(), r"C:\");
    assert_eq!(names(session.entries()), before);
    assert!(latest_error(&session).starts_with("Cannot access this folder"));
}

#[tokio::test]
async fn test_shift_click_then_drag_moves_range() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;

    session.click(0, ClickModifiers::NONE);
    session.click(2, ClickModifiers::CTRL);
    session.click(3, ClickModifiers::SHIFT);
    assert_eq!(names(&session.selected()), vec!["C.txt", "D.txt"]);

    let c = session.displayed()[2].clone();
    session.begin_drag(&c);
    assert_eq!(session.drag().sources(), &[r"C:\C.txt".to_string(), r"C:\D.txt".to_string()]);

    let a = session.displayed()[0].clone();
    let batch = session.drop_on_entry(&a).await.unwrap();
    assert!(batch.is_success());

    let moves = remote.calls_of(CallKind::Move);
    assert_eq!(moves.len(), 2);
    assert_eq!(moves[0].path, r"C:\C.txt");
    assert_eq!(moves[1].path, r"C:\D.txt");
    assert_eq!(moves[1].arg.as_deref(), Some(r"C:\A"));

    // Only the last token survives.
    assert_eq!(session.undo_token(), Some("undo-2"));
    assert!(!session.drag().is_active());
}

#[tokio::test]
async fn test_drag_unselected_collapses_selection() {
    let remote = Arc::new(mock());
    let mut session = session(remote).await;

    session.click(1, ClickModifiers::NONE);
    session.click(2, ClickModifiers::CTRL);
    let d = session.displayed()[3].clone();
    session.begin_drag(&d);

    assert_eq!(session.drag().sources(), &[r"C:\D.txt".to_string()]);
    assert_eq!(names(&session.selected()), vec!["D.txt"]);
}

#[tokio::test]
async fn test_drop_onto_self_issues_no_move() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;

    let a = session.displayed()[0].clone();
    session.begin_drag(&a);
    let batch = session.drop_on_entry(&a).await.unwrap();

    assert!(batch.moved.is_empty());
    assert_eq!(batch.skipped.len(), 1);
    assert_eq!(remote.count(CallKind::Move), 0);
    assert!(session.undo_token().is_none());
}

#[tokio::test]
async fn test_drop_on_file_is_ignored() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;

    let b = session.displayed()[1].clone();
    let c = session.displayed()[2].clone();
    session.begin_drag(&b);
    assert!(session.drop_on_entry(&c).await.is_none());
    assert_eq!(remote.count(CallKind::Move), 0);
}

#[tokio::test]
async fn test_undo_sends_token_once() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;

    let b = session.displayed()[1].clone();
    let a = session.displayed()[0].clone();
    session.begin_drag(&b);
    session.drop_on_entry(&a).await;

    remote.clear_calls();
    assert!(session.undo().await);
    let undos = remote.calls_of(CallKind::Undo);
    assert_eq!(undos.len(), 1);
    assert_eq!(undos[0].path, "undo-1");
    assert_eq!(remote.count(CallKind::List), 1);

    assert!(session.undo_token().is_none());
    assert!(!session.undo().await);
    assert_eq!(remote.count(CallKind::Undo), 1);
}

#[tokio::test]
async fn test_pagination_of_large_listing() {
    let files: Vec<Entry> = (0..250)
        .map(|i| Entry::file(format!("f{i:03}.txt"), format!(r"C:\f{i:03}.txt"), 1))
        .collect();
    let remote = Arc::new(MockRemote::new().with_listing(r"C:\", files));
    let mut session = session(remote).await;

    assert_eq!(session.total_pages(), 3);
    assert_eq!(session.displayed().len(), 100);

    assert!(session.next_page());
    assert!(session.next_page());
    assert_eq!(session.page(), 3);
    assert_eq!(session.displayed().len(), 50);
    assert!(!session.next_page());

    assert!(session.prev_page());
    assert_eq!(session.page(), 2);
}

#[tokio::test]
async fn test_selection_stays_within_displayed() {
    let remote = Arc::new(mock());
    let mut session = session(remote).await;

    session.click(1, ClickModifiers::NONE);
    session.click(3, ClickModifiers::SHIFT);
    assert_eq!(session.selection().len(), 3);

    session.set_filter("d.");
    let displayed = session.displayed();
    assert_eq!(names(&displayed), vec!["D.txt"]);
    assert_eq!(session.selection().len(), 1);
    assert!(session.selected().iter().all(|e| displayed.iter().any(|d| d.same_as(e))));

    session.set_filter("");
    assert_eq!(session.displayed().len(), 4);
    assert_eq!(session.selection().len(), 1);
}

#[tokio::test]
async fn test_reload_prunes_vanished_selection() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;

    session.click(1, ClickModifiers::NONE);
    session.click(2, ClickModifiers::CTRL);
    remote.set_listing(r"C:\", vec![Entry::file("C.txt", r"C:\C.txt", 20)]);
    assert!(session.reload().await);

    assert_eq!(names(&session.selected()), vec!["C.txt"]);

    assert!(session.load(r"C:\A").await);
    assert!(session.selection().is_empty());
}

#[tokio::test]
async fn test_deep_search_requires_query() {
    let remote = Arc::new(
        mock().with_search(r"C:\", vec![Entry::file("deep.txt", r"C:\A\deep.txt", 1)]),
    );
    let mut session = session(remote.clone()).await;

    session.set_deep_search(true);
    assert!(!session.perform_search().await);
    assert_eq!(remote.count(CallKind::Search), 0);

    session.set_filter("deep");
    assert!(session.perform_search().await);
    assert_eq!(remote.count(CallKind::Search), 1);
    assert_eq!(names(&session.displayed()), vec!["deep.txt"]);

    // Navigating drops the results; the listing shows until the next search.
    session.load(r"C:\A").await;
    assert_eq!(names(&session.displayed()), vec!["inner.txt"]);
}

#[tokio::test]
async fn test_deep_search_failure_toasts() {
    let remote = Arc::new(mock().fail(CallKind::Search, r"C:\"));
    let mut session = session(remote).await;

    session.set_deep_search(true);
    session.set_filter("x");
    assert!(!session.perform_search().await);
    assert!(latest_error(&session).starts_with("Search failed"));
    assert_eq!(session.displayed().len(), 4);
}

#[tokio::test]
async fn test_tree_fetches_children_once() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;

    let root = session.tree().roots()[0];
    session.toggle_tree_node(root).await;
    session.toggle_tree_node(root).await;
    session.toggle_tree_node(root).await;

    let fetches: Vec<_> = remote
        .calls_of(CallKind::List)
        .into_iter()
        .filter(|c| c.arg.as_deref() == Some("only_dirs"))
        .collect();
    assert_eq!(fetches.len(), 1);

    let node = session.tree().node(root).unwrap();
    assert!(node.is_open());
    assert_eq!(node.children().len(), 1);

    let rows = session.tree_rows();
    assert!(matches!(&rows[0], TreeRow::Node { is_active: true, .. }));
    assert!(matches!(&rows[1], TreeRow::Node { depth: 1, name, .. } if name == "A"));

    let child = node.children()[0];
    assert!(session.open_tree_node(child).await);
    assert_eq!(session.current_path(), r"C:\A");
}

fn tree_fetches(remote: &MockRemote) -> Vec<String> {
    remote
        .calls_of(CallKind::List)
        .into_iter()
        .filter(|c| c.arg.as_deref() == Some("only_dirs"))
        .map(|c| c.path)
        .collect()
}

#[tokio::test]
async fn test_tree_drop_refreshes_destination_node() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;

    let root = session.tree().roots()[0];
    session.toggle_tree_node(root).await;
    let a = session.tree().find(r"C:\A").unwrap();
    session.toggle_tree_node(a).await;
    remote.clear_calls();

    let b = session.displayed()[1].clone();
    session.begin_drag(&b);
    let batch = session.drop_on_tree_node(a).await.unwrap();
    assert_eq!(batch.moved.len(), 1);

    assert_eq!(tree_fetches(&remote), vec![r"C:\A".to_string()]);
    let node = session.tree().node(a).unwrap();
    assert!(node.is_open());
    assert!(node.is_loaded());
}

#[tokio::test]
async fn test_folder_move_refreshes_old_parent() {
    let mut listing = root_listing();
    listing.push(Entry::dir("E", r"C:\E"));
    let remote = Arc::new(
        mock()
            .with_listing(r"C:\", listing)
            .with_listing(r"C:\E", vec![]),
    );
    let mut session = session(remote.clone()).await;

    let root = session.tree().roots()[0];
    session.toggle_tree_node(root).await;
    let e = session.tree().find(r"C:\E").unwrap();
    session.toggle_tree_node(e).await;
    remote.clear_calls();

    let a = session.displayed()[0].clone();
    session.begin_drag(&a);
    session.drop_on_tree_node(e).await.unwrap();

    assert_eq!(
        tree_fetches(&remote),
        vec![r"C:\E".to_string(), r"C:\".to_string()]
    );
    assert!(session.tree().node(root).unwrap().is_open());
    assert_eq!(session.tree().find(r"C:\E"), Some(e));
    assert!(session.tree().node(e).unwrap().is_open());
}

#[tokio::test]
async fn test_guarded_tree_drop_fetches_nothing() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;
    let root = session.tree().roots()[0];
    session.toggle_tree_node(root).await;
    let a = session.tree().find(r"C:\A").unwrap();
    remote.clear_calls();

    session.begin_tree_drag(a);
    let batch = session.drop_on_tree_node(a).await.unwrap();
    assert!(batch.moved.is_empty());
    assert!(tree_fetches(&remote).is_empty());
}

#[tokio::test]
async fn test_upload_partial_failure_reloads_once() {
    let remote = Arc::new(mock().fail(CallKind::Upload, r"C:\f2.txt"));
    let mut session = session(remote.clone()).await;
    remote.clear_calls();

    let complete = session
        .upload(vec![
            UploadFile::new("f1.txt", b"one".to_vec()),
            UploadFile::new("f2.txt", b"two".to_vec()),
        ])
        .await
        .unwrap();

    assert_eq!(complete.succeeded, 1);
    assert!(complete.error.is_some());
    assert_eq!(remote.count(CallKind::Upload), 2);
    assert_eq!(remote.count(CallKind::List), 1);
    assert!(session.uploads().input().is_empty());
    assert!(!session.uploads().is_active());
    assert!(latest_error(&session).starts_with("Upload failed"));
}

#[tokio::test]
async fn test_upload_nothing_staged() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;
    remote.clear_calls();

    assert!(session.upload(Vec::new()).await.is_none());
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn test_keyboard_copy_paste_flow() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;

    session.click(1, ClickModifiers::NONE);
    assert_eq!(session.handle_key(KeyPress::ctrl('c')).await, KeyAction::Copy);
    assert_eq!(session.clipboard().mode(), Some(ClipboardMode::Copy));

    session.click(0, ClickModifiers::NONE);
    assert_eq!(
        session.handle_key(KeyPress::new(Key::Enter)).await,
        KeyAction::OpenSelected
    );
    assert_eq!(session.current_path(), r"C:\A");

    assert_eq!(session.handle_key(KeyPress::ctrl('v')).await, KeyAction::Paste);
    let copies = remote.calls_of(CallKind::Copy);
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].path, r"C:\B.txt");
    assert_eq!(copies[0].arg.as_deref(), Some(r"C:\A"));
    assert!(session.clipboard().is_empty());

    assert_eq!(
        session.handle_key(KeyPress::new(Key::Backspace).while_typing()).await,
        KeyAction::None
    );
    assert_eq!(session.current_path(), r"C:\A");
    session.handle_key(KeyPress::new(Key::Backspace)).await;
    assert_eq!(session.current_path(), r"C:\");
}

#[tokio::test]
async fn test_cut_paste_captures_undo_token() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;

    let d = session.displayed()[3].clone();
    session.cut(d);
    session.load(r"C:\A").await;

    assert_eq!(session.paste_here().await, PasteResult::Pasted(ClipboardMode::Cut));
    assert_eq!(session.undo_token(), Some("undo-1"));
    assert_eq!(session.paste_here().await, PasteResult::Empty);
}

#[tokio::test]
async fn test_failed_paste_clears_clipboard() {
    let remote = Arc::new(mock().fail(CallKind::Copy, r"C:\B.txt"));
    let mut session = session(remote).await;

    let b = session.displayed()[1].clone();
    session.copy(b);
    assert_eq!(session.paste_here().await, PasteResult::Failed);
    assert!(session.clipboard().is_empty());
    assert_eq!(session.toasts().latest().unwrap().level, ToastLevel::Error);
}

#[tokio::test]
async fn test_watch_change_reloads_silently() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;
    remote.clear_calls();

    session.handle_watch_event(WatchEvent::Connected).await;
    assert!(session.is_connected());

    remote.set_listing(r"C:\", vec![Entry::dir("A", r"C:\A")]);
    session.handle_watch_event(WatchEvent::Change).await;
    assert_eq!(remote.count(CallKind::List), 1);
    assert_eq!(names(session.entries()), vec!["A"]);
    assert!(session.toasts().is_empty());

    session.handle_watch_event(WatchEvent::Disconnected).await;
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_preview_and_save_text() {
    let remote = Arc::new(
        MockRemote::new()
            .with_listing(r"C:\", vec![Entry::file("notes.md", r"C:\notes.md", 5)])
            .with_file(r"C:\notes.md", "hello"),
    );
    let mut session = session(remote.clone()).await;

    let notes = session.displayed()[0].clone();
    assert_eq!(session.edit(&notes).await, OpenOutcome::Opened);
    assert!(session.editor().is_editable());

    let widget = session.editor_mut().widget_mut().unwrap();
    widget.set_content("changed");
    assert!(session.save_editor().await);
    assert_eq!(remote.content_of(r"C:\notes.md").as_deref(), Some("changed"));
    assert!(!session.editor().is_editable());
}

#[tokio::test]
async fn test_preview_unsupported_file() {
    let remote = Arc::new(
        MockRemote::new().with_listing(r"C:\", vec![Entry::file("blob.bin", r"C:\blob.bin", 5)]),
    );
    let mut session = session(remote).await;

    let blob = session.displayed()[0].clone();
    let outcome = session.preview(&blob).await;
    assert!(matches!(outcome, OpenOutcome::Failed(_)));
    assert_eq!(latest_error(&session), rfe_client::preview::UNSUPPORTED_MESSAGE);
    assert!(!session.editor().is_open());
}

#[tokio::test]
async fn test_mutations_reload_and_report() {
    let remote = Arc::new(mock().fail(CallKind::Delete, r"C:\C.txt"));
    let mut session = session(remote.clone()).await;
    remote.clear_calls();

    let b = session.displayed()[1].clone();
    assert!(session.rename(&b, "renamed.txt").await);
    assert!(!session.rename(&b, "B.txt").await);
    assert_eq!(remote.count(CallKind::Rename), 1);

    assert!(session.create_folder("New").await);
    assert_eq!(remote.calls_of(CallKind::Mkdir)[0].path, r"C:\New");

    let c = session.displayed()[2].clone();
    assert!(!session.delete(&c).await);
    assert_eq!(session.toasts().latest().unwrap().level, ToastLevel::Error);

    assert_eq!(remote.count(CallKind::List), 2);
}

#[tokio::test]
async fn test_download_selection() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;

    assert!(session.download_selected().await.is_none());

    session.click(0, ClickModifiers::NONE);
    let (name, _) = session.download_selected().await.unwrap();
    assert_eq!(name, "A.zip");
    assert_eq!(remote.calls_of(CallKind::Zip)[0].arg.as_deref(), Some("fast"));

    session.click(2, ClickModifiers::SHIFT);
    let (name, _) = session.download_selected().await.unwrap();
    assert_eq!(name, "selected_files.zip");
    assert_eq!(remote.count(CallKind::ZipMultiple), 1);
}

#[tokio::test]
async fn test_pins_and_properties() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;

    session.click(0, ClickModifiers::NONE);
    session.click(1, ClickModifiers::CTRL);
    assert!(session.drop_on_pins().await);
    assert_eq!(remote.pinned(), vec![r"C:\A".to_string()]);
    assert_eq!(session.pins().paths(), &[r"C:\A".to_string()]);

    assert!(session.unpin(r"C:\A").await);
    assert!(session.pins().paths().is_empty());

    let b = session.displayed()[1].clone();
    assert!(session.open_properties(&b).await);
    session.properties_mut().readonly = true;
    assert!(session.save_properties().await);
    assert_eq!(
        remote.calls_of(CallKind::UpdateMeta)[0].arg.as_deref(),
        Some("readonly=true")
    );
}

#[tokio::test]
async fn test_share_link() {
    let remote = Arc::new(mock());
    let mut session = session(remote.clone()).await;

    assert!(session.create_share_link().await.is_none());

    let b = session.displayed()[1].clone();
    session.open_share(b);
    let url = session.create_share_link().await.unwrap();
    assert!(url.starts_with("http://mock/shared.html"));
    assert_eq!(remote.count(CallKind::Share), 1);
}

#[tokio::test]
async fn test_refresh_stats() {
    let remote = Arc::new(mock());
    let mut session = session(remote).await;

    assert!(session.stats().is_none());
    session.refresh_stats().await;
    assert_eq!(session.stats().unwrap().memory_total, "16 GiB");
}
