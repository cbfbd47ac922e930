//! Integration tests for docbrief
//!
//! The library tests drive the same functions the CLI commands use, against
//! temporary databases and note files. The binary tests run the compiled
//! `docbrief` executable with `DOCBRIEF_HOME` pointed at a temporary directory.

use std::io::Write;

use chrono::{Duration, Utc};
use docbrief::analyze::Analyzer;
use docbrief::notes::{NewNote, NoteFilter, NoteStore, NoteUpdate};
use docbrief::storage::{Analysis, Database, SummarySource};
use docbrief::summarize::{
    FallbackSummarizer, ProviderSummarizer, SummarizeError, SummaryProvider,
};
use tempfile::{tempdir, NamedTempFile};
use uuid::Uuid;

// =============================================================================
// Test Helpers
// =============================================================================

/// Creates a test database in a temporary directory.
/// Returns the Database instance and the temp directory (which must be kept alive).
fn create_test_db() -> (Database, tempfile::TempDir) {
    let dir = tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    (db, dir)
}

/// Writes `content` to a temporary file with the given suffix.
fn create_test_document(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write document");
    file.flush().expect("Failed to flush");
    file
}

fn local_analyzer() -> Analyzer {
    Analyzer::new(Box::new(FallbackSummarizer), 5)
}

/// A provider whose every request fails with a server error.
struct FailingProvider;

impl SummaryProvider for FailingProvider {
    fn summarize(&self, _system_prompt: &str, _user_content: &str) -> Result<String, SummarizeError> {
        Err(SummarizeError::HttpError {
            status: 503,
            body: "overloaded".to_string(),
        })
    }

    fn describe(&self) -> String {
        "failing/test".to_string()
    }
}

// =============================================================================
// Analyze Pipeline Tests
// =============================================================================

mod analyze_tests {
    use super::*;

    #[test]
    fn test_analyze_and_store_markdown() {
        let (db, _dir) = create_test_db();
        let doc = create_test_document(
            ".md",
            "# Migration plan\n\nThe migration starts Monday. The migration ends Friday.\n",
        );

        let analysis = local_analyzer().analyze_file(doc.path(), "plan.md");
        db.insert_analysis(&analysis).expect("Failed to insert");

        let stored = db
            .get_analysis(&analysis.id)
            .expect("Failed to get")
            .expect("Analysis should exist");
        assert_eq!(stored, analysis);
        assert_eq!(stored.file_type, "md");
        assert_eq!(stored.keywords[0], "migration");
        assert_eq!(stored.source, SummarySource::Fallback);
        assert!(stored.summary.contains("Key topics: migration"));
    }

    #[test]
    fn test_analyze_json_and_csv() {
        let json = create_test_document(".json", r#"{"title": "Quarterly report", "pages": 12}"#);
        let analysis = local_analyzer().analyze_file(json.path(), "report.json");
        assert!(analysis.full_text.contains("Quarterly report"));
        assert!(analysis.full_text.contains("12"));

        let csv = create_test_document(".csv", "name,city\nAda,London\nGrace,Arlington\n");
        let analysis = local_analyzer().analyze_file(csv.path(), "people.csv");
        assert!(analysis.full_text.contains("Ada London"));
        assert_eq!(analysis.file_type, "csv");
    }

    #[test]
    fn test_analyze_html_drops_markup() {
        let html = create_test_document(
            ".html",
            "<html><head><style>p{}</style></head><body><p>Rust &amp; Cargo</p>\
             <script>var x = 1;</script></body></html>",
        );
        let analysis = local_analyzer().analyze_file(html.path(), "page.html");
        assert!(analysis.full_text.contains("Rust & Cargo"));
        assert!(!analysis.full_text.contains("var x"));
        assert!(!analysis.full_text.contains('<'));
    }

    #[test]
    fn test_unsupported_file_stores_placeholder() {
        let (db, _dir) = create_test_db();
        let doc = create_test_document(".docx", "PK\u{3}\u{4}");

        let analysis = local_analyzer().analyze_file(doc.path(), "contract.docx");
        db.insert_analysis(&analysis).expect("Failed to insert");

        assert!(analysis
            .summary
            .starts_with("Unable to extract text from contract.docx"));
        assert_eq!(analysis.source, SummarySource::Fallback);
        assert!(analysis.keywords.is_empty());
    }

    #[test]
    fn test_missing_file_stores_placeholder() {
        let dir = tempdir().unwrap();
        let analysis = local_analyzer().analyze_file(&dir.path().join("gone.txt"), "gone.txt");
        assert!(analysis.summary.starts_with("Unable to extract text from gone.txt"));
    }

    #[test]
    fn test_provider_failure_yields_local_summary() {
        let doc = create_test_document(".txt", "Shipping is delayed. Customers were told.");
        let summarizer = ProviderSummarizer::new(Box::new(FailingProvider), 4000);
        let analyzer = Analyzer::new(Box::new(summarizer), 3);
        let analysis = analyzer.analyze_file(doc.path(), "status.txt");

        assert_eq!(analysis.source, SummarySource::Fallback);
        assert!(analysis.summary.starts_with("Shipping is delayed."));
    }
}

// =============================================================================
// Storage Tests
// =============================================================================

mod storage_tests {
    use super::*;

    fn stored(db: &Database, filename: &str, text: &str, age_minutes: i64) -> Analysis {
        let created = Utc::now() - Duration::minutes(age_minutes);
        let analysis = Analysis {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            file_type: "txt".to_string(),
            summary: format!("Summary of {filename}"),
            full_text: text.to_string(),
            keywords: vec![],
            word_count: text.split_whitespace().count() as i64,
            source: SummarySource::Fallback,
            created_at: created,
            updated_at: created,
        };
        db.insert_analysis(&analysis).expect("Failed to insert");
        analysis
    }

    #[test]
    fn test_list_newest_first_and_limit() {
        let (db, _dir) = create_test_db();
        stored(&db, "old.txt", "old", 30);
        stored(&db, "new.txt", "new", 1);
        stored(&db, "mid.txt", "mid", 10);

        let listed = db.list_analyses(2).expect("Failed to list");
        let names: Vec<_> = listed.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["new.txt", "mid.txt"]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let (db, _dir) = create_test_db();
        stored(&db, "invoice.txt", "Payment due in March", 2);
        stored(&db, "notes.txt", "Nothing relevant", 1);

        let hits = db.search_analyses("MARCH", 10).expect("Failed to search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].filename, "invoice.txt");

        let by_name = db.search_analyses("Invoice", 10).expect("Failed to search");
        assert_eq!(by_name.len(), 1);

        let all = db.search_analyses("", 10).expect("Failed to search");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_update_summary_and_delete() {
        let (db, _dir) = create_test_db();
        let analysis = stored(&db, "a.txt", "text", 1);

        assert!(db
            .update_summary(&analysis.id, "Hand written", SummarySource::Manual)
            .unwrap());
        let updated = db.get_analysis(&analysis.id).unwrap().unwrap();
        assert_eq!(updated.summary, "Hand written");
        assert_eq!(updated.source, SummarySource::Manual);
        assert!(updated.updated_at > analysis.updated_at);

        assert!(db.delete_analysis(&analysis.id).unwrap());
        assert!(db.get_analysis(&analysis.id).unwrap().is_none());
        assert!(!db.delete_analysis(&analysis.id).unwrap());
        assert!(!db
            .update_summary(&analysis.id, "Too late", SummarySource::Manual)
            .unwrap());
    }

    #[test]
    fn test_find_by_prefix() {
        let (db, _dir) = create_test_db();
        let analysis = stored(&db, "a.txt", "text", 1);

        let found = db
            .find_by_prefix(&analysis.short_id())
            .unwrap()
            .expect("Prefix should match");
        assert_eq!(found.id, analysis.id);
        assert!(db.find_by_prefix("ffffffffffff").unwrap().is_none());
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docbrief.db");
        let id = {
            let db = Database::open(&path).unwrap();
            stored(&db, "kept.txt", "kept", 1).id
        };

        let db = Database::open(&path).unwrap();
        assert_eq!(db.analysis_count().unwrap(), 1);
        assert!(db.get_analysis(&id).unwrap().is_some());
    }
}

// =============================================================================
// Note Tests
// =============================================================================

mod note_tests {
    use super::*;

    #[test]
    fn test_note_lifecycle_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");

        let id = {
            let mut store = NoteStore::open(&path).unwrap();
            let note = store
                .create(NewNote {
                    title: "Vendor call".to_string(),
                    content: "Ask about pricing".to_string(),
                    category: Some("Work".to_string()),
                    tags: vec!["Vendors".to_string()],
                })
                .unwrap();
            store
                .update(
                    &note.id,
                    NoteUpdate {
                        title: Some("Vendor call (done)".to_string()),
                        ..Default::default()
                    },
                )
                .unwrap();
            note.id
        };

        let mut store = NoteStore::open(&path).unwrap();
        let note = store.get(&id).expect("Note should persist");
        assert_eq!(note.title, "Vendor call (done)");
        assert_eq!(note.category, "work");
        assert_eq!(note.tags, vec!["vendors"]);

        let found = store.list(&NoteFilter {
            query: Some("PRICING".to_string()),
            ..Default::default()
        });
        assert_eq!(found.len(), 1);

        assert!(store.delete(&id).unwrap());
        assert!(NoteStore::open(&path).unwrap().is_empty());
    }
}

// =============================================================================
// Binary Tests
// =============================================================================

mod binary_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;

    use super::*;

    fn docbrief(home: &std::path::Path) -> Command {
        let mut cmd = Command::cargo_bin("docbrief").expect("Binary should build");
        cmd.env("DOCBRIEF_HOME", home)
            .env("NO_COLOR", "1")
            .env_remove("DOCBRIEF_SUMMARY_PROVIDER")
            .env_remove("DOCBRIEF_SUMMARY_API_KEY")
            .env_remove("RUST_LOG");
        cmd
    }

    #[test]
    fn test_help_lists_commands() {
        let home = tempdir().unwrap();
        docbrief(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("analyze"))
            .stdout(predicate::str::contains("note"))
            .stdout(predicate::str::contains("serve"));
    }

    #[test]
    fn test_analyze_then_list_and_show() {
        let home = tempdir().unwrap();
        let doc = create_test_document(".txt", "Harvest festival on Saturday. Bring apples.");

        let output = docbrief(home.path())
            .args(["analyze", "--format", "json"])
            .arg(doc.path())
            .output()
            .unwrap();
        assert!(output.status.success());
        let analyses: Vec<Analysis> = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(analyses.len(), 1);
        let short_id = analyses[0].short_id();

        docbrief(home.path())
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains(short_id.as_str()));

        docbrief(home.path())
            .args(["show", &short_id])
            .assert()
            .success()
            .stdout(predicate::str::contains("Harvest festival on Saturday."));

        docbrief(home.path())
            .args(["search", "apples"])
            .assert()
            .success()
            .stdout(predicate::str::contains(short_id.as_str()));
    }

    #[test]
    fn test_analyze_no_save_stores_nothing() {
        let home = tempdir().unwrap();
        let doc = create_test_document(".txt", "Ephemeral text.");

        docbrief(home.path())
            .args(["analyze", "--no-save"])
            .arg(doc.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("unsaved"));

        docbrief(home.path())
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No analyses found."));
    }

    #[test]
    fn test_analyze_missing_file_fails() {
        let home = tempdir().unwrap();
        docbrief(home.path())
            .args(["analyze", "does-not-exist.txt"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No files were analyzed"));
    }

    #[test]
    fn test_summarize_and_delete() {
        let home = tempdir().unwrap();
        let doc = create_test_document(".txt", "Draft contract terms.");
        let output = docbrief(home.path())
            .args(["analyze", "--format", "json"])
            .arg(doc.path())
            .output()
            .unwrap();
        let analyses: Vec<Analysis> = serde_json::from_slice(&output.stdout).unwrap();
        let short_id = analyses[0].short_id();

        docbrief(home.path())
            .args(["summarize", &short_id, "Contract needs legal review"])
            .assert()
            .success();

        docbrief(home.path())
            .args(["summarize", &short_id])
            .assert()
            .success()
            .stdout(predicate::str::contains("Contract needs legal review"))
            .stdout(predicate::str::contains("manual"));

        docbrief(home.path())
            .args(["delete", &short_id, "--force"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Deleted"));

        docbrief(home.path())
            .args(["show", &short_id])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No analysis found"));
    }

    #[test]
    fn test_note_commands() {
        let home = tempdir().unwrap();

        docbrief(home.path())
            .args(["note", "add", "Call plumber", "-c", "home", "-t", "Urgent"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created note"));

        docbrief(home.path())
            .args(["note", "list", "--tag", "urgent"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Call plumber"));

        docbrief(home.path())
            .args(["note", "tags"])
            .assert()
            .success()
            .stdout(predicate::str::contains("urgent"));

        docbrief(home.path())
            .args(["note", "add", "   "])
            .assert()
            .failure()
            .stderr(predicate::str::contains("title cannot be empty"));

        assert!(home.path().join("notes.json").exists());
    }

    #[test]
    fn test_config_set_and_get() {
        let home = tempdir().unwrap();

        docbrief(home.path())
            .args(["config", "set", "keyword_count", "3"])
            .assert()
            .success();

        docbrief(home.path())
            .args(["config", "get", "keyword_count"])
            .assert()
            .success()
            .stdout(predicate::str::diff("3\n"));

        docbrief(home.path())
            .args(["config", "set", "no_such_key", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));

        docbrief(home.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.yaml"));
    }
}
