//! Integration tests for the recall binary.
//!
//! These tests verify end-to-end behavior including:
//! - Adding and listing cards
//! - The answer workflow (apply update, persist, review log)
//! - Preview output
//! - Recovery from a corrupted collection file

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("recall"))
}

/// Add a card and return its id as printed by the binary
fn add_card(data_dir: &Path, front: &str, back: &str) -> String {
    let output = cli()
        .arg("add")
        .arg(front)
        .arg(back)
        .arg("--data-dir")
        .arg(data_dir)
        .output()
        .expect("Failed to run add");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .trim()
        .rsplit(' ')
        .next()
        .expect("add output ends with the card id")
        .to_string()
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Spaced-repetition flashcard scheduler",
        ));
}

#[test]
fn test_add_creates_collection() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("add")
        .arg("capital of France?")
        .arg("Paris")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added card"));

    let collection = fs::read_to_string(data_dir.join("cards.json")).unwrap();
    assert!(collection.contains("capital of France?"));
}

#[test]
fn test_list_shows_cards() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    add_card(data_dir, "front one", "back one");
    add_card(data_dir, "front two", "back two");

    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("front one"))
        .stdout(predicate::str::contains("2 cards"));
}

#[test]
fn test_answer_updates_card_and_logs_review() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let id = add_card(data_dir, "q", "a");

    cli()
        .arg("answer")
        .arg(&id)
        .arg("good")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Answered good"));

    // The card moved out of New: its learning state is persisted
    let collection = fs::read_to_string(data_dir.join("cards.json")).unwrap();
    assert!(collection.contains("learning"));

    // A review row was appended
    let revlog = fs::read_to_string(data_dir.join("reviews.csv")).unwrap();
    assert!(revlog.contains(&id));
    assert!(revlog.contains("good"));
}

#[test]
fn test_answer_easy_graduates_new_card() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let id = add_card(data_dir, "q", "a");

    cli()
        .arg("answer")
        .arg(&id)
        .arg("easy")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("next review in"));

    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("review"));
}

#[test]
fn test_answer_accepts_id_prefix() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let id = add_card(data_dir, "q", "a");

    cli()
        .arg("answer")
        .arg(&id[..8])
        .arg("3")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();
}

#[test]
fn test_answer_unknown_card_fails() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    add_card(data_dir, "q", "a");

    cli()
        .arg("answer")
        .arg("ffffffff")
        .arg("good")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .failure();
}

#[test]
fn test_answer_invalid_grade_fails() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let id = add_card(data_dir, "q", "a");

    cli()
        .arg("answer")
        .arg(&id)
        .arg("perfect")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .failure();
}

#[test]
fn test_preview_shows_all_grades() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let id = add_card(data_dir, "q", "a");

    cli()
        .arg("preview")
        .arg(&id)
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("again"))
        .stdout(predicate::str::contains("hard"))
        .stdout(predicate::str::contains("good"))
        .stdout(predicate::str::contains("easy"));
}

#[test]
fn test_corrupted_collection_recovers() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::create_dir_all(data_dir).unwrap();
    fs::write(data_dir.join("cards.json"), "{ not json }").unwrap();

    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No cards yet"));
}
