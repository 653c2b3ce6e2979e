//! Repository Integration Tests
//!
//! Entity services over the in-memory store.

#[cfg(test)]
mod tests {
    use crate::domain::{ChecklistItem, DomainError, ManualClock, Note, Principal, Question};
    use crate::repository::{EntityService, MemoryStore, NoteService, QuestionService, RemoteStore, StorePath};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        notes: NoteService,
        questions: QuestionService,
        user: Principal,
    }

    fn setup() -> Fixture {
        let clock = Arc::new(ManualClock::new(1_000));
        let store = Arc::new(MemoryStore::with_clock(clock.clone()));
        Fixture {
            notes: NoteService::new(store.clone(), clock.clone()),
            questions: QuestionService::new(store.clone(), clock.clone()),
            store,
            clock,
            user: Principal::new("user-1").with_display_name("Test User"),
        }
    }

    fn text_note(now: i64, title: &str, content: &str) -> Note {
        let mut note = Note::new(now);
        note.title = title.to_string();
        note.content = content.to_string();
        note
    }

    #[tokio::test]
    async fn test_list_without_data_is_empty() {
        let f = setup();
        assert!(f.notes.list(&f.user).await.unwrap().is_empty());
        assert!(f.questions.list(&f.user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_note_and_list() {
        let f = setup();
        let id = f.notes.create(&f.user, &text_note(1_000, "Title", "Body")).await.expect("Failed to create");

        let notes = f.notes.list(&f.user).await.expect("List failed");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, id);
        assert_eq!(notes[0].title, "Title");

        let raw = f.store.get(&StorePath::parse(&format!("users/user-1/notes/{}", id)).unwrap()).await.unwrap().unwrap();
        assert_eq!(raw["content"], json!("Body"));
        assert!(raw.get("id").is_none());
    }

    #[tokio::test]
    async fn test_notes_are_scoped_per_user() {
        let f = setup();
        let other = Principal::new("user-2");
        f.notes.create(&f.user, &text_note(1, "mine", "")).await.unwrap();

        assert!(f.notes.list(&other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_from_list_and_subscription() {
        let f = setup();
        let keep = f.notes.create(&f.user, &text_note(1, "keep", "")).await.unwrap();
        let gone = f.notes.create(&f.user, &text_note(2, "gone", "")).await.unwrap();
        let mut sub = f.notes.subscribe(&f.user).await.unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 2);

        f.notes.delete(&f.user, &gone).await.expect("Delete failed");

        let listed: Vec<String> = f.notes.list(&f.user).await.unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(listed, vec![keep.clone()]);
        let delivered: Vec<String> = sub.next().await.unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(delivered, vec![keep]);
    }

    #[tokio::test]
    async fn test_update_refreshes_updated_at() {
        let f = setup();
        let id = f.notes.create(&f.user, &text_note(1_000, "a", "")).await.unwrap();
        let mut note = f.notes.list(&f.user).await.unwrap().remove(0);
        assert_eq!(note.id, id);
        let before = note.updated_at;

        f.clock.advance(25);
        note.title = "b".to_string();
        note.updated_at = 0;
        f.notes.update(&f.user, &note).await.expect("Update failed");

        let after = f.notes.list(&f.user).await.unwrap().remove(0);
        assert_eq!(after.title, "b");
        assert_eq!(after.created_at, 1_000);
        assert!(after.updated_at > before);
        assert_eq!(after.updated_at, 1_025);
    }

    #[tokio::test]
    async fn test_update_requires_id() {
        let f = setup();
        let err = f.notes.update(&f.user, &text_note(1, "x", "")).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_content_survives_switch_to_checklist() {
        let f = setup();
        let id = f.notes.create(&f.user, &text_note(1, "list", "keep me")).await.unwrap();
        let mut note = f.notes.list(&f.user).await.unwrap().remove(0);

        note.is_check_list = true;
        note.items.push(f.notes.new_item("first"));
        f.notes.update(&f.user, &note).await.unwrap();

        let stored = f.notes.list(&f.user).await.unwrap().remove(0);
        assert_eq!(stored.id, id);
        assert!(stored.is_check_list);
        assert_eq!(stored.content, "keep me");
        assert_eq!(stored.items.len(), 1);
    }

    #[tokio::test]
    async fn test_removed_items_disappear_on_update() {
        let f = setup();
        let mut note = text_note(1, "list", "");
        note.is_check_list = true;
        note.items = vec![f.notes.new_item("a"), f.notes.new_item("b")];
        let id = f.notes.create(&f.user, &note).await.unwrap();

        let mut note = note.clone();
        note.id = id;
        note.items.remove(0);
        f.notes.update(&f.user, &note).await.unwrap();

        let stored = f.notes.list(&f.user).await.unwrap().remove(0);
        let texts: Vec<_> = stored.items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["b"]);
    }

    #[tokio::test]
    async fn test_checklist_items_keep_insertion_order() {
        let f = setup();
        let mut note = text_note(1, "order", "");
        note.is_check_list = true;
        note.items = (0..20).map(|i| f.notes.new_item(&format!("item {}", i))).collect();
        f.notes.create(&f.user, &note).await.unwrap();

        let stored = f.notes.list(&f.user).await.unwrap().remove(0);
        let texts: Vec<String> = stored.items.iter().map(|i| i.text.clone()).collect();
        let expected: Vec<String> = (0..20).map(|i| format!("item {}", i)).collect();
        assert_eq!(texts, expected);
    }

    #[tokio::test]
    async fn test_toggle_checklist_item() {
        let f = setup();
        let mut note = text_note(1_000, "list", "");
        note.is_check_list = true;
        note.items = vec![f.notes.new_item("a"), f.notes.new_item("b")];
        let first: ChecklistItem = note.items[0].clone();
        let id = f.notes.create(&f.user, &note).await.unwrap();

        f.clock.advance(10);
        f.notes.toggle_checklist_item(&f.user, &id, &first.id, true).await.expect("Toggle failed");

        let stored = f.notes.list(&f.user).await.unwrap().remove(0);
        assert!(stored.item(&first.id).unwrap().checked);
        assert!(!stored.items[1].checked);
        assert_eq!(stored.item(&first.id).unwrap().text, "a");
        assert_eq!(stored.updated_at, 1_010);
    }

    #[tokio::test]
    async fn test_toggle_after_delete_is_tolerated() {
        let f = setup();
        let id = f.notes.create(&f.user, &text_note(1, "x", "")).await.unwrap();
        f.notes.delete(&f.user, &id).await.unwrap();

        f.notes.toggle_checklist_item(&f.user, &id, "item", true).await.expect("Orphan write should succeed");

        // The partial node still decodes
        let notes = f.notes.list(&f.user).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].created_at, 0);
    }

    #[tokio::test]
    async fn test_mark_asked_sets_and_clears_asked_at() {
        let f = setup();
        let id = f.questions.create(&f.user, &Question::new("When?", None, 1_000)).await.unwrap();

        f.clock.set(5_000);
        f.questions.mark_asked(&f.user, &id, true).await.unwrap();
        let q = f.questions.list(&f.user).await.unwrap().remove(0);
        assert!(q.already_asked);
        assert_eq!(q.asked_at, Some(5_000));

        f.questions.mark_asked(&f.user, &id, false).await.unwrap();
        let q = f.questions.list(&f.user).await.unwrap().remove(0);
        assert!(!q.already_asked);
        assert_eq!(q.asked_at, None);
    }

    #[tokio::test]
    async fn test_question_update_clears_notes() {
        let f = setup();
        let id = f.questions.create(&f.user, &Question::new("Why?", Some("context"), 1)).await.unwrap();
        let mut q = f.questions.list(&f.user).await.unwrap().remove(0);
        assert_eq!(q.notes.as_deref(), Some("context"));
        assert_eq!(q.id, id);

        q.notes = None;
        q.text = "Why not?".to_string();
        f.questions.update(&f.user, &q).await.unwrap();

        let stored = f.questions.list(&f.user).await.unwrap().remove(0);
        assert_eq!(stored.text, "Why not?");
        assert_eq!(stored.notes, None);
        assert_eq!(stored.created_at, 1);
    }

    #[tokio::test]
    async fn test_blank_question_never_reaches_store() {
        let f = setup();
        let err = f.questions.create(&f.user, &Question::new("  ", None, 1)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(f.store.dump(), json!({}));
    }

    #[tokio::test]
    async fn test_question_subscription_is_newest_first() {
        let f = setup();
        for (text, at) in [("a", 1), ("c", 3), ("b", 2)] {
            f.questions.create(&f.user, &Question::new(text, None, at)).await.unwrap();
        }

        let mut sub = f.questions.subscribe(&f.user).await.unwrap();
        let texts: Vec<String> = sub.next().await.unwrap().into_iter().map(|q| q.text).collect();
        assert_eq!(texts, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_empty_subscription_delivers_once() {
        let f = setup();
        let mut sub = f.notes.subscribe(&f.user).await.unwrap();

        assert_eq!(sub.next().await, Some(Vec::new()));
        assert!(timeout(Duration::from_millis(50), sub.next()).await.is_err());
    }

    #[tokio::test]
    async fn test_subscription_follows_writes() {
        let f = setup();
        let mut sub = f.notes.subscribe(&f.user).await.unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 0);

        let id = f.notes.create(&f.user, &text_note(1, "new", "")).await.unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
    }

    #[tokio::test]
    async fn test_unsubscribe_twice_is_harmless() {
        let f = setup();
        let mut sub = f.notes.subscribe(&f.user).await.unwrap();
        let handle = sub.handle();
        assert_eq!(f.store.watcher_count(), 1);

        handle.unsubscribe();
        handle.unsubscribe();

        assert_eq!(f.store.watcher_count(), 0);
        assert_eq!(sub.next().await, None);
        f.notes.create(&f.user, &text_note(1, "after", "")).await.unwrap();
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test]
    async fn test_listen_pushes_until_unsubscribed() {
        let f = setup();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sub = f.notes.subscribe(&f.user).await.unwrap();
        let handle = sub.listen(move |notes| {
            let _ = tx.send(notes.len());
        });

        assert_eq!(rx.recv().await, Some(0));
        f.notes.create(&f.user, &text_note(1, "one", "")).await.unwrap();
        assert_eq!(rx.recv().await, Some(1));

        handle.unsubscribe();
        handle.unsubscribe();
        let closed = timeout(Duration::from_secs(1), rx.recv()).await.expect("listener should stop");
        assert_eq!(closed, None);
    }

    #[tokio::test]
    async fn test_store_failures_propagate() {
        let f = setup();
        f.store.inject_fault(Some(DomainError::Unavailable("offline".to_string())));

        assert!(matches!(f.notes.list(&f.user).await, Err(DomainError::Unavailable(_))));
        assert!(matches!(
            f.notes.create(&f.user, &text_note(1, "x", "")).await,
            Err(DomainError::Unavailable(_))
        ));
        assert!(f.questions.subscribe(&f.user).await.is_err());
    }

    async fn legacy_checklist(f: &Fixture, count: usize) -> String {
        let items: Vec<serde_json::Value> = (0..count)
            .map(|i| json!({"id": format!("170000000{:04}", i), "text": format!("t{}", i), "checked": false}))
            .collect();
        let path = StorePath::parse("users/user-1/notes/-Nlegacy").unwrap();
        f.store
            .set(&path, json!({"title": "old list", "isCheckList": true, "items": items, "createdAt": 1, "updatedAt": 1}))
            .await
            .unwrap();
        "-Nlegacy".to_string()
    }

    fn texts(note: &Note) -> Vec<String> {
        note.items.iter().map(|i| i.text.clone()).collect()
    }

    #[tokio::test]
    async fn test_legacy_item_array_keeps_order() {
        let f = setup();
        let id = legacy_checklist(&f, 12).await;

        let note = f.notes.list(&f.user).await.unwrap().remove(0);
        let expected: Vec<String> = (0..12).map(|i| format!("t{}", i)).collect();
        assert_eq!(texts(&note), expected);
        assert_eq!(note.items[10].id, "10");

        f.notes.toggle_checklist_item(&f.user, &id, "10", true).await.unwrap();
        let note = f.notes.list(&f.user).await.unwrap().remove(0);
        assert_eq!(note.items.len(), 12);
        assert!(note.items[10].checked);
        assert_eq!(note.checked_count(), 1);
    }

    #[tokio::test]
    async fn test_legacy_items_then_append_keeps_order() {
        let f = setup();
        legacy_checklist(&f, 12).await;

        let mut note = f.notes.list(&f.user).await.unwrap().remove(0);
        note.items.truncate(2);
        note.items.push(f.notes.new_item("appended"));
        f.notes.update(&f.user, &note).await.unwrap();

        let stored = f.notes.list(&f.user).await.unwrap().remove(0);
        assert_eq!(texts(&stored), vec!["t0", "t1", "appended"]);

        let mut all = f.notes.list(&f.user).await.unwrap().remove(0);
        let extra = f.notes.new_item("second append");
        all.items.push(extra);
        f.notes.update(&f.user, &all).await.unwrap();
        let stored = f.notes.list(&f.user).await.unwrap().remove(0);
        assert_eq!(texts(&stored), vec!["t0", "t1", "appended", "second append"]);
    }

    #[tokio::test]
    async fn test_items_out_of_key_order_are_rekeyed() {
        let f = setup();
        let mut note = Note::new(1);
        note.is_check_list = true;
        note.items = vec![
            ChecklistItem::new("b".to_string(), "first".to_string()),
            ChecklistItem::new("a".to_string(), "second".to_string()),
            ChecklistItem::new("bad.key".to_string(), "third".to_string()),
        ];

        f.notes.create(&f.user, &note).await.unwrap();
        let stored = f.notes.list(&f.user).await.unwrap().remove(0);
        assert_eq!(texts(&stored), vec!["first", "second", "third"]);
        assert!(stored.items.iter().all(|i| i.id.len() == crate::domain::PUSH_ID_LEN));
    }

    #[tokio::test]
    async fn test_subscription_as_stream() {
        use futures::StreamExt;

        let f = setup();
        let sub = f.notes.subscribe(&f.user).await.unwrap();
        let handle = sub.handle();
        let mut stream = Box::pin(sub.into_stream());

        assert_eq!(stream.next().await.map(|notes| notes.len()), Some(0));
        f.notes.create(&f.user, &text_note(1, "streamed", "")).await.unwrap();
        let notes = stream.next().await.unwrap();
        assert_eq!(notes[0].title, "streamed");

        handle.unsubscribe();
        f.notes.create(&f.user, &text_note(2, "after", "")).await.unwrap();
        assert_eq!(stream.next().await.map(|notes| notes.len()), None);
    }
}
