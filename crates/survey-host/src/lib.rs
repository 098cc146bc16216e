pub mod progress;
pub mod session;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, info};

use survey_spec::{
    AnswerMap, Section, SpecError, SurveySpec, resolve_visibility as resolve_section_visibility,
    to_render_model, validate_dependencies,
};

pub use progress::{ProgressSummary, section_completion};
pub use session::{SectionResult, SessionState, UserSession};

const DEFAULT_SURVEY: &str = include_str!("../../survey-spec/tests/fixtures/psap_survey.json");

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error(transparent)]
    Spec(#[from] SpecError),
    #[error("section '{0}' is not available")]
    SectionNotFound(String),
    #[error("section '{section}' has dependency problems: {findings}")]
    Validation { section: String, findings: String },
    #[error("failed to parse session: {0}")]
    SessionParse(#[source] serde_json::Error),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

/// Host-supplied configuration.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct HostConfig {
    /// Survey document; the bundled survey is used when absent.
    #[serde(default)]
    pub survey_json: Option<String>,
    /// Refuse to render sections whose show-conditions have dependency findings.
    #[serde(default)]
    pub strict_validation: bool,
}

fn load_config(config_json: &str) -> Result<HostConfig, HostError> {
    if config_json.trim().is_empty() {
        return Ok(HostConfig::default());
    }
    serde_json::from_str(config_json).map_err(HostError::ConfigParse)
}

fn load_survey(config: &HostConfig) -> Result<SurveySpec, HostError> {
    let survey_json = config.survey_json.as_deref().unwrap_or(DEFAULT_SURVEY);
    Ok(SurveySpec::from_json(survey_json)?)
}

fn find_section<'a>(
    spec: &'a SurveySpec,
    section_id: &str,
) -> Result<(usize, &'a Section), HostError> {
    spec.find_section(section_id)
        .ok_or_else(|| HostError::SectionNotFound(section_id.to_string()))
}

fn parse_session(session_json: &str) -> Result<SessionState, HostError> {
    if session_json.trim().is_empty() {
        return Ok(SessionState::new(Utc::now()));
    }
    serde_json::from_str(session_json).map_err(HostError::SessionParse)
}

fn parse_answers(answers_json: &str) -> Value {
    serde_json::from_str(answers_json).unwrap_or_else(|_| Value::Object(Map::new()))
}

fn respond(result: Result<Value, HostError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, HostError> {
    serde_json::to_value(value).map_err(HostError::JsonEncode)
}

/// Returns the survey document in use.
pub fn describe(config_json: &str) -> String {
    respond(
        load_config(config_json)
            .and_then(|config| load_survey(&config))
            .and_then(|spec| encode(&spec)),
    )
}

/// Creates a fresh session state.
pub fn new_session() -> String {
    respond(encode(&SessionState::new(Utc::now())))
}

/// Lists processable sections with their routing ids and completion flags.
pub fn list_sections(config_json: &str, session_json: &str) -> String {
    let result = load_config(config_json)
        .and_then(|config| load_survey(&config))
        .and_then(|spec| {
            let state = parse_session(session_json)?;
            let sections = spec
                .sections()
                .into_iter()
                .enumerate()
                .map(|(index, section)| {
                    let id = section.id();
                    json!({
                        "id": id,
                        "title": section.title,
                        "index": index,
                        "questions": section.questions.len(),
                        "complete": state.session.is_complete(&id),
                    })
                })
                .collect::<Vec<_>>();
            Ok(Value::Array(sections))
        });
    respond(result)
}

/// Runs the dependency validator over every processable section.
pub fn validate_survey(config_json: &str) -> String {
    let result = load_config(config_json)
        .and_then(|config| load_survey(&config))
        .map(|spec| {
            let errors = spec
                .sections()
                .into_iter()
                .flat_map(|section| {
                    validate_dependencies(&section.questions)
                        .into_iter()
                        .map(move |finding| {
                            json!({
                                "section": section.id(),
                                "question": finding.question(),
                                "message": finding.to_string(),
                            })
                        })
                })
                .collect::<Vec<_>>();
            json!({ "valid": errors.is_empty(), "errors": errors })
        });
    respond(result)
}

/// Produces the render model for one section.
pub fn render_section(section_id: &str, config_json: &str) -> String {
    let result = load_config(config_json).and_then(|config| {
        let spec = load_survey(&config)?;
        let (index, section) = find_section(&spec, section_id)?;
        if config.strict_validation {
            let findings = validate_dependencies(&section.questions);
            if !findings.is_empty() {
                return Err(HostError::Validation {
                    section: section.title.clone(),
                    findings: findings
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; "),
                });
            }
        }
        encode(&to_render_model(section, index))
    });
    respond(result)
}

/// Visibility of every question in a section for an answers snapshot.
pub fn resolve_visibility(section_id: &str, config_json: &str, answers_json: &str) -> String {
    let result = load_config(config_json)
        .and_then(|config| load_survey(&config))
        .and_then(|spec| {
            let (_, section) = find_section(&spec, section_id)?;
            let answers = AnswerMap::from_snapshot(&parse_answers(answers_json));
            encode(&resolve_section_visibility(&section.questions, &answers))
        });
    respond(result)
}

/// Handles an answer-change event: re-evaluates visibility and saves progress.
pub fn on_value_changed(
    section_id: &str,
    config_json: &str,
    session_json: &str,
    answers_json: &str,
) -> String {
    respond(record_snapshot(
        section_id,
        config_json,
        session_json,
        answers_json,
        false,
    ))
}

/// Handles the completion event: saves the final snapshot and marks the section done.
pub fn on_complete(
    section_id: &str,
    config_json: &str,
    session_json: &str,
    answers_json: &str,
) -> String {
    respond(record_snapshot(
        section_id,
        config_json,
        session_json,
        answers_json,
        true,
    ))
}

fn record_snapshot(
    section_id: &str,
    config_json: &str,
    session_json: &str,
    answers_json: &str,
    complete: bool,
) -> Result<Value, HostError> {
    let config = load_config(config_json)?;
    let spec = load_survey(&config)?;
    let (_, section) = find_section(&spec, section_id)?;
    let mut state = parse_session(session_json)?;

    let snapshot = parse_answers(answers_json);
    let answers = AnswerMap::from_snapshot(&snapshot);
    let visibility = resolve_section_visibility(&section.questions, &answers);
    let percent = if complete {
        100
    } else {
        section_completion(section, &snapshot)
    };

    state.record(section, snapshot, percent, Utc::now());
    if complete && state.session.mark_complete(section_id) {
        info!(section = section_id, user = %state.session.user_id, "section completed");
    }
    debug!(section = section_id, percent, "recorded section snapshot");

    Ok(json!({
        "session": encode(&state)?,
        "visibility": visibility,
        "percentComplete": percent,
    }))
}

/// Saved result of one section for resuming; `null` when nothing was recorded.
pub fn saved_progress(section_id: &str, config_json: &str, session_json: &str) -> String {
    let result = load_config(config_json)
        .and_then(|config| load_survey(&config))
        .and_then(|spec| {
            let (_, section) = find_section(&spec, section_id)?;
            let state = parse_session(session_json)?;
            encode(&state.result(&section.id()))
        });
    respond(result)
}

/// Completion summary across sections.
pub fn progress(config_json: &str, session_json: &str) -> String {
    let result = load_config(config_json)
        .and_then(|config| load_survey(&config))
        .and_then(|spec| {
            let state = parse_session(session_json)?;
            encode(&ProgressSummary::for_survey(&spec, &state.session))
        });
    respond(result)
}

/// Export document of the session's results.
pub fn export(session_json: &str) -> String {
    respond(parse_session(session_json).map(|state| state.export(Utc::now())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(payload: &str) -> Value {
        serde_json::from_str(payload).expect("valid json")
    }

    fn broken_config(strict: bool) -> String {
        let survey = json!({
            "title": "Broken",
            "sections": [{
                "title": "Loops",
                "questions": [
                    { "id": 1, "text": "A", "type": "radio", "options": ["x"],
                      "showIf": { "questionId": 2, "anyOf": ["x"] } },
                    { "id": 2, "text": "B", "type": "radio", "options": ["x"],
                      "showIf": { "questionId": 1, "anyOf": ["x"] } },
                    { "id": 3, "text": "C", "type": "text",
                      "showIf": { "questionId": 9, "anyOf": ["x"] } }
                ]
            }]
        });
        json!({ "survey_json": survey.to_string(), "strict_validation": strict }).to_string()
    }

    #[test]
    fn describe_returns_bundled_survey() {
        let survey = parse(&describe(""));
        assert_eq!(survey["title"], "PSAP Operations Survey");
    }

    #[test]
    fn list_sections_hides_reserved_titles() {
        let sections = parse(&list_sections("", ""));
        let ids: Vec<_> = sections
            .as_array()
            .expect("array")
            .iter()
            .map(|section| section["id"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(ids, vec!["psap-staffing-operations", "call-handling"]);
        assert_eq!(sections[1]["index"], 1);
        assert_eq!(sections[0]["complete"], false);
    }

    #[test]
    fn render_section_returns_model() {
        let model = parse(&render_section("call-handling", ""));
        assert_eq!(model["pages"][0]["name"], "page_1");
        assert_eq!(model["completeText"], "Complete Section");
    }

    #[test]
    fn unknown_section_is_an_error() {
        let response = parse(&render_section("welcome", ""));
        assert_eq!(response["error"], "section 'welcome' is not available");
    }

    #[test]
    fn strict_validation_blocks_rendering() {
        let lenient = parse(&render_section("loops", &broken_config(false)));
        assert_eq!(lenient["pages"][0]["elements"].as_array().map(Vec::len), Some(3));

        let strict = parse(&render_section("loops", &broken_config(true)));
        let error = strict["error"].as_str().expect("error");
        assert!(error.contains("circular dependency through question 1"));
        assert!(error.contains("missing referenced question 9 from question 3"));
    }

    #[test]
    fn validate_survey_reports_findings() {
        let report = parse(&validate_survey(&broken_config(false)));
        assert_eq!(report["valid"], false);
        assert_eq!(report["errors"].as_array().map(Vec::len), Some(3));
        assert_eq!(report["errors"][0]["section"], "loops");

        let clean = parse(&validate_survey(""));
        assert_eq!(clean["valid"], true);
    }

    #[test]
    fn visibility_follows_answers() {
        let visibility = parse(&resolve_visibility(
            "psap-staffing-operations",
            "",
            &json!({ "q_7": "Yes", "q_5": "Secondary" }).to_string(),
        ));
        assert_eq!(visibility["7.1"], true);
        assert_eq!(visibility["5.1"], false);
        assert_eq!(visibility["8.1"], false);
    }

    #[test]
    fn value_change_then_completion_updates_session() {
        let changed = parse(&on_value_changed(
            "call-handling",
            "",
            "",
            &json!({ "q_10": ["9-1-1", "Admin"] }).to_string(),
        ));
        assert_eq!(changed["visibility"]["10.1"], true);
        assert_eq!(changed["percentComplete"], 33);
        let session = changed["session"].to_string();

        let completed = parse(&on_complete(
            "call-handling",
            "",
            &session,
            &json!({ "q_10": ["9-1-1", "Admin"], "q_10.1": "Shared floor" }).to_string(),
        ));
        assert_eq!(completed["percentComplete"], 100);
        let state: SessionState =
            serde_json::from_value(completed["session"].clone()).expect("session");
        assert!(state.session.is_complete("call-handling"));
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].responses["q_10.1"], "Shared floor");

        let summary = parse(&progress("", &completed["session"].to_string()));
        assert_eq!(summary, json!({ "completed": 1, "total": 2, "percent": 50 }));

        let exported = parse(&export(&completed["session"].to_string()));
        assert_eq!(exported["surveys"][0]["sectionId"], "call-handling");
    }

    #[test]
    fn saved_progress_returns_recorded_responses() {
        let empty = parse(&saved_progress("call-handling", "", ""));
        assert_eq!(empty, Value::Null);

        let changed = parse(&on_value_changed(
            "call-handling",
            "",
            "",
            &json!({ "q_10": ["Admin"] }).to_string(),
        ));
        let session = changed["session"].to_string();

        let saved = parse(&saved_progress("call-handling", "", &session));
        assert_eq!(saved["sectionId"], "call-handling");
        assert_eq!(saved["responses"], json!({ "q_10": ["Admin"] }));
        assert_eq!(saved["percentComplete"], 50);

        let other = parse(&saved_progress("psap-staffing-operations", "", &session));
        assert_eq!(other, Value::Null);

        let missing = parse(&saved_progress("welcome", "", &session));
        assert_eq!(missing["error"], "section 'welcome' is not available");
    }

    #[test]
    fn malformed_session_is_reported() {
        let response = parse(&progress("", "not json"));
        assert!(
            response["error"]
                .as_str()
                .unwrap_or_default()
                .starts_with("failed to parse session")
        );
    }
}
