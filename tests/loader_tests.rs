//! Tests for the plain-text directory loader.

use std::fs;

use finrag::{DocumentLoader, RagError, TextDirectoryLoader};

#[test]
fn loads_documents_in_sorted_filename_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tesla-earnings.txt"), "Tesla report.").unwrap();
    fs::write(dir.path().join("meta-earnings.txt"), "Meta report.").unwrap();
    fs::write(dir.path().join("nvidia-earnings.txt"), "Nvidia report.").unwrap();
    fs::write(dir.path().join("notes.md"), "ignored").unwrap();

    let documents = TextDirectoryLoader::new(dir.path()).load().unwrap();

    let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["meta-earnings", "nvidia-earnings", "tesla-earnings"]);
    assert_eq!(documents[0].pages[0].text, "Meta report.");
}

#[test]
fn form_feeds_separate_pages() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("report.txt"), "page one\x0cpage two\x0cpage three").unwrap();

    let documents = TextDirectoryLoader::new(dir.path()).load().unwrap();

    assert_eq!(documents.len(), 1);
    let pages = &documents[0].pages;
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].text, "page one");
    assert_eq!(pages[2].text, "page three");
    assert_eq!(pages[2].index, 2);
    assert!(pages.iter().all(|p| p.document_id == "report"));
}

#[test]
fn missing_directory_fails_with_load_error() {
    match TextDirectoryLoader::new("/nonexistent/reports").load() {
        Err(RagError::Load { path, .. }) => assert!(path.contains("nonexistent")),
        other => panic!("expected Load error, got {other:?}"),
    }
}

#[test]
fn empty_directory_yields_no_documents() {
    let dir = tempfile::tempdir().unwrap();
    assert!(TextDirectoryLoader::new(dir.path()).load().unwrap().is_empty());
}
