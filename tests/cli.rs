//! Process-level checks of the testgen binary: argument handling, the
//! success line on stdout, and the JSON error line on stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::{SimpleFileOptions, ZipWriter};

const USAGE: &str = "Usage: testgen <requirements_file_path>";

fn testgen(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("testgen").unwrap();
    cmd.current_dir(dir)
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("OPENAI_MODEL")
        .env_remove("TESTGEN_CREW_FILE")
        .env("TESTGEN_OUTPUT_ROOT", dir);
    cmd
}

fn write_docx(dir: &Path, paragraphs: &[&str]) -> PathBuf {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{}</w:body></w:document>",
        body
    );

    let path = dir.join("requirements.docx");
    let mut zip = ZipWriter::new(std::fs::File::create(&path).unwrap());
    zip.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
    path
}

fn completion(text: &str) -> Value {
    json!({
        "model": "gpt-test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
    })
}

fn single_error_line(stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(lines.len(), 1, "stderr: {}", stderr);
    let value: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(value.as_object().unwrap().len(), 1);
    value["error"].as_str().unwrap().to_string()
}

fn artifact_dirs(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with("test_artifacts_"))
        })
        .collect()
}

#[test]
fn no_arguments_prints_usage_and_fails() {
    let temp_dir = TempDir::new().unwrap();

    testgen(temp_dir.path())
        .env("OPENAI_API_KEY", "sk-test")
        .assert()
        .code(1)
        .stdout(predicate::str::diff(format!("{}\n", USAGE)));

    assert!(artifact_dirs(temp_dir.path()).is_empty());
}

#[test]
fn two_arguments_print_usage_and_fail() {
    let temp_dir = TempDir::new().unwrap();

    testgen(temp_dir.path())
        .env("OPENAI_API_KEY", "sk-test")
        .args(["a.docx", "b.docx"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with(USAGE));

    assert!(!temp_dir.path().join("testcase_generation.log").exists());
}

#[test]
fn missing_api_key_reports_json_error() {
    let temp_dir = TempDir::new().unwrap();

    let assert = testgen(temp_dir.path())
        .arg("requirements.docx")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());

    let message = single_error_line(&assert.get_output().stderr);
    assert!(message.contains("OPENAI_API_KEY"), "{}", message);
    assert!(artifact_dirs(temp_dir.path()).is_empty());
}

#[test]
fn api_key_from_dotenv_file_is_used() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join(".env"), "OPENAI_API_KEY=sk-from-dotenv\n").unwrap();

    // Settings load, so the failure moves on to the document.
    let assert = testgen(temp_dir.path())
        .arg("missing.docx")
        .assert()
        .code(1);

    let message = single_error_line(&assert.get_output().stderr);
    assert!(message.starts_with("document error"), "{}", message);
}

#[test]
fn missing_document_reports_json_error() {
    let temp_dir = TempDir::new().unwrap();

    let assert = testgen(temp_dir.path())
        .env("OPENAI_API_KEY", "sk-test")
        .arg("missing.docx")
        .assert()
        .code(1);

    assert!(single_error_line(&assert.get_output().stderr).starts_with("document error"));
    assert!(artifact_dirs(temp_dir.path()).is_empty());

    let log = std::fs::read_to_string(temp_dir.path().join("testcase_generation.log")).unwrap();
    assert!(log.contains(" INFO run_started "));
    assert!(log.contains(" ERROR run_failed "));
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_run_prints_summary_line() {
    let server = MockServer::start().await;
    for reply in [
        "# Analysis\nFR-1 Users log in.",
        "Test Case ID: TC-001\nTest Objective: valid login",
        "{\"test_data_sets\": []}",
        "# Validation\nComplete.",
    ] {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(reply)))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
    }

    let temp_dir = TempDir::new().unwrap();
    let input = write_docx(temp_dir.path(), &["Users log in with email."]);
    let mut cmd = testgen(temp_dir.path());
    cmd.env("OPENAI_API_KEY", "sk-test")
        .env("OPENAI_BASE_URL", format!("{}/v1", server.uri()))
        .arg(&input);

    let output = tokio::task::spawn_blocking(move || cmd.assert().success().get_output().clone())
        .await
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "stdout: {}", stdout);
    let summary: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(summary["status"], "success");
    assert!(
        summary["wordFilePath"]
            .as_str()
            .unwrap()
            .ends_with("Generated_Test_Cases.docx")
    );
    assert!(summary["testCases"].as_str().unwrap().starts_with("Test Case ID: TC-001"));

    let mut files: Vec<&str> = summary["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_str().unwrap())
        .collect();
    files.sort();
    assert_eq!(
        files,
        vec![
            "Generated_Test_Cases.docx",
            "detailed_test_cases.md",
            "requirements_analysis.md",
            "test_cases_complete.json",
            "test_data_sets.json",
            "validation_report.md",
        ]
    );

    let dirs = artifact_dirs(temp_dir.path());
    assert_eq!(dirs.len(), 1);
    for file in files {
        assert!(std::fs::metadata(dirs[0].join(file)).unwrap().len() > 0, "{}", file);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn api_failure_reports_single_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let input = write_docx(temp_dir.path(), &["Users log in with email."]);
    let mut cmd = testgen(temp_dir.path());
    cmd.env("OPENAI_API_KEY", "sk-test")
        .env("OPENAI_BASE_URL", format!("{}/v1", server.uri()))
        .arg(&input);

    let output = tokio::task::spawn_blocking(move || cmd.assert().code(1).get_output().clone())
        .await
        .unwrap();

    assert!(output.stdout.is_empty());
    let message = single_error_line(&output.stderr);
    assert_eq!(message, "LLM request failed: status 500: upstream exploded");
}
