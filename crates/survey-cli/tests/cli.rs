//! End-to-end tests driving the `survey` binary.

use assert_cmd::Command;
use assert_fs::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;

const SURVEY: &str = include_str!("../../survey-spec/tests/fixtures/psap_survey.json");

fn survey_file(dir: &assert_fs::TempDir, contents: &str) -> PathBuf {
    let file = dir.child("survey.json");
    file.write_str(contents).expect("write survey");
    file.path().to_path_buf()
}

#[test]
fn sections_lists_slugs() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let survey = survey_file(&dir, SURVEY);

    let output = Command::cargo_bin("survey")?
        .arg("sections")
        .arg("--survey")
        .arg(&survey)
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("psap-staffing-operations - PSAP Staffing & Operations"));
    assert!(!stdout.contains("welcome"));
    Ok(())
}

#[test]
fn convert_writes_model_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let survey = survey_file(&dir, SURVEY);
    let out = dir.child("model.json");

    Command::cargo_bin("survey")?
        .args(["convert", "--section", "call-handling", "--survey"])
        .arg(&survey)
        .arg("--out")
        .arg(out.path())
        .assert()
        .success();

    let model: Value = serde_json::from_str(&fs::read_to_string(out.path())?)?;
    assert_eq!(model["title"], "Call Handling");
    assert_eq!(
        model["pages"][0]["elements"][1]["visibleIf"],
        "{q_10} contains '9-1-1' and {q_10} contains 'Admin'"
    );
    Ok(())
}

#[test]
fn convert_unknown_section_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let survey = survey_file(&dir, SURVEY);

    Command::cargo_bin("survey")?
        .args(["convert", "--section", "welcome", "--survey"])
        .arg(&survey)
        .assert()
        .failure();
    Ok(())
}

#[test]
fn strict_validate_fails_on_findings() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let broken = json!({
        "title": "Broken",
        "sections": [{
            "title": "Loops",
            "questions": [
                { "id": 1, "text": "A", "type": "text",
                  "showIf": { "questionId": 7, "anyOf": ["Yes"] } }
            ]
        }]
    });
    let survey = survey_file(&dir, &broken.to_string());

    let lenient = Command::cargo_bin("survey")?
        .arg("validate")
        .arg("--survey")
        .arg(&survey)
        .output()?;
    assert!(lenient.status.success());
    assert!(
        String::from_utf8(lenient.stdout)?
            .contains("[loops] missing referenced question 7 from question 1")
    );

    Command::cargo_bin("survey")?
        .arg("validate")
        .arg("--strict")
        .arg("--survey")
        .arg(&survey)
        .assert()
        .failure();
    Ok(())
}

#[test]
fn visibility_marks_hidden_questions() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let survey = survey_file(&dir, SURVEY);
    let mut answers = tempfile::NamedTempFile::new()?;
    std::io::Write::write_all(&mut answers, br#"{ "q_7": "No", "q_5": "Primary" }"#)?;

    let output = Command::cargo_bin("survey")?
        .args(["visibility", "--section", "psap-staffing-operations"])
        .arg("--survey")
        .arg(&survey)
        .arg("--answers")
        .arg(answers.path())
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("[hidden] 7.1"));
    assert!(stdout.contains("[shown]  5.1"));
    Ok(())
}

#[test]
fn schema_describes_sections() -> Result<(), Box<dyn std::error::Error>> {
    let output = Command::cargo_bin("survey")?.arg("schema").output()?;
    assert!(output.status.success());
    let schema: Value = serde_json::from_slice(&output.stdout)?;
    assert!(schema["properties"]["sections"].is_object());
    Ok(())
}
