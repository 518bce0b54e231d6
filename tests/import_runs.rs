mod common;

use common::{items_csv, temp_dir, ChunkReply, FakeApi};
use item_import::db::Database;
use item_import::services::processor::{process_import_file, process_pasted_text};
use item_import::services::state::{import_inbox_file, scan_folder};
use std::sync::{Arc, Mutex};

fn memory_db() -> Arc<Mutex<Database>> {
    Arc::new(Mutex::new(Database::in_memory().expect("open db")))
}

#[tokio::test]
async fn file_import_records_run_and_chunks() {
    let dir = temp_dir("item-import-run");
    let path = dir.join("items.csv");
    std::fs::write(&path, items_csv(150)).unwrap();

    let db = memory_db();
    let api = FakeApi::with_replies(vec![ChunkReply::AllOk, ChunkReply::Rejected("bad batch")]);
    let report = process_import_file(&db, &path, &api, |_, _| {}).await.unwrap();

    assert_eq!(report.run.status, "partial");
    assert_eq!(report.run.record_count, 150);
    assert_eq!(report.run.success_count, 100);
    assert_eq!(report.run.error_count, 50);
    assert_eq!(report.run.message.as_deref(), Some("100 imported, 50 failed"));

    let db_guard = db.lock().unwrap();
    let stored = db_guard.get_run(&report.run.id).unwrap().expect("stored run");
    assert_eq!(stored.status, "partial");
    let chunks = db_guard.get_chunks(&report.run.id).unwrap();
    assert_eq!(chunks.len(), 2);
    assert!(!chunks[0].failed);
    assert!(chunks[1].failed);
    assert_eq!(chunks[1].message.as_deref(), Some("bad batch"));
    drop(db_guard);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn identical_file_is_not_imported_twice() {
    let dir = temp_dir("item-import-repeat");
    let path = dir.join("items.csv");
    std::fs::write(&path, items_csv(3)).unwrap();

    let db = memory_db();
    let api = FakeApi::new();
    let first = process_import_file(&db, &path, &api, |_, _| {}).await.unwrap();
    assert_eq!(first.run.status, "imported");

    let second = process_import_file(&db, &path, &api, |_, _| {}).await.unwrap();
    assert_eq!(second.run.status, "skipped");
    assert_eq!(api.chunk_sizes(), vec![3]);

    let runs = db.lock().unwrap().list_runs(10).unwrap();
    assert_eq!(runs.len(), 2);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn invalid_file_is_logged_without_network() {
    let dir = temp_dir("item-import-invalid");
    let path = dir.join("items.csv");
    std::fs::write(&path, "Item Name,Tax Rate\nWidget,250\nGadget,5").unwrap();

    let db = memory_db();
    let api = FakeApi::new();
    let report = process_import_file(&db, &path, &api, |_, _| {}).await.unwrap();

    assert_eq!(report.run.status, "invalid");
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].field, "taxRate");
    assert_eq!(report.issues[0].row_index, 2);
    assert_eq!(api.check_calls(), 0);
    assert!(api.chunk_sizes().is_empty());

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn unsupported_file_is_marked_failed() {
    let dir = temp_dir("item-import-unsupported");
    let path = dir.join("items.pdf");
    std::fs::write(&path, "%PDF-1.4").unwrap();

    let db = memory_db();
    let api = FakeApi::new();
    assert!(process_import_file(&db, &path, &api, |_, _| {}).await.is_err());

    let runs = db.lock().unwrap().list_runs(10).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, "failed");

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn pasted_tab_text_is_imported() {
    let db = memory_db();
    let api = FakeApi::new();
    let report = process_pasted_text(&db, "Item Name\tItem Code\nWidget\tW1\nGadget\tG2", &api, |_, _| {})
        .await
        .unwrap();
    assert_eq!(report.run.source, "paste");
    assert_eq!(report.run.success_count, 2);
    assert_eq!(*api.submitted_codes.lock().unwrap(), vec!["W1".to_string(), "G2".to_string()]);
}

#[tokio::test]
async fn inbox_scan_processes_supported_files_in_order() {
    let dir = temp_dir("item-import-inbox");
    std::fs::write(dir.join("a.csv"), items_csv(2)).unwrap();
    std::fs::write(dir.join("b.csv"), "Item Name;Item Code\nSolo;S1\nDuo;D2").unwrap();
    std::fs::write(dir.join("notes.md"), "not an import").unwrap();

    let db = memory_db();
    let api = FakeApi::new();
    let reports = scan_folder(&db, &dir, &api).await.unwrap();

    assert_eq!(reports.len(), 2);
    assert!(reports[0].run.source.ends_with("a.csv"));
    assert!(reports[1].run.source.ends_with("b.csv"));
    assert_eq!(api.chunk_sizes(), vec![2, 2]);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn repeated_inbox_events_send_a_partial_file_once() {
    let dir = temp_dir("item-import-inbox-repeat");
    let path = dir.join("items.csv");
    std::fs::write(&path, items_csv(150)).unwrap();

    let db = memory_db();
    let api = FakeApi::with_replies(vec![ChunkReply::AllOk, ChunkReply::Rejected("bad batch")]);
    let first = import_inbox_file(&db, &path, &api).await.expect("first event imports");
    assert_eq!(first.run.status, "partial");

    assert!(import_inbox_file(&db, &path, &api).await.is_none());
    assert!(import_inbox_file(&db, &path, &api).await.is_none());
    assert_eq!(api.chunk_sizes(), vec![100, 50]);
    assert_eq!(api.check_calls(), 1);

    let runs = db.lock().unwrap().list_runs(10).unwrap();
    assert_eq!(runs.len(), 1);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn repeated_inbox_events_log_an_invalid_file_once() {
    let dir = temp_dir("item-import-inbox-invalid");
    let path = dir.join("items.csv");
    std::fs::write(&path, "Item Name,Tax Rate\nWidget,250").unwrap();

    let db = memory_db();
    let api = FakeApi::new();
    let first = import_inbox_file(&db, &path, &api).await.expect("first event is recorded");
    assert_eq!(first.run.status, "invalid");
    assert!(import_inbox_file(&db, &path, &api).await.is_none());

    let runs = db.lock().unwrap().list_runs(10).unwrap();
    assert_eq!(runs.len(), 1);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn changed_inbox_file_is_imported_again() {
    let dir = temp_dir("item-import-inbox-changed");
    let path = dir.join("items.csv");
    std::fs::write(&path, items_csv(2)).unwrap();

    let db = memory_db();
    let api = FakeApi::new();
    assert!(import_inbox_file(&db, &path, &api).await.is_some());

    std::fs::write(&path, items_csv(3)).unwrap();
    assert!(import_inbox_file(&db, &path, &api).await.is_some());
    assert_eq!(api.chunk_sizes(), vec![2, 3]);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn explicit_import_still_retries_a_partial_file() {
    let dir = temp_dir("item-import-retry");
    let path = dir.join("items.csv");
    std::fs::write(&path, items_csv(150)).unwrap();

    let db = memory_db();
    let api = FakeApi::with_replies(vec![ChunkReply::AllOk, ChunkReply::Rejected("bad batch")]);
    assert!(import_inbox_file(&db, &path, &api).await.is_some());

    let retry = process_import_file(&db, &path, &api, |_, _| {}).await.unwrap();
    assert_eq!(retry.run.status, "imported");
    assert_eq!(api.chunk_sizes(), vec![100, 50, 100, 50]);

    let _ = std::fs::remove_dir_all(dir);
}
