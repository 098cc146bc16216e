use serde_json::json;

use survey_spec::{
    AnswerMap, DependencyError, QuestionType, ShowCondition, SurveySpec, is_visible,
    resolve_visibility, spec::Question, validate_dependencies,
};

fn load() -> SurveySpec {
    SurveySpec::from_json(include_str!("fixtures/psap_survey.json")).expect("deserialize")
}

#[test]
fn snapshot_drives_section_visibility() {
    let spec = load();
    let (_, section) = spec
        .find_section("psap-staffing-operations")
        .expect("section");

    let answers = AnswerMap::from_snapshot(&json!({
        "q_5": "Primary",
        "q_7": "No",
        "q_8": "County Government (Sheriff, Fire, EMS, Other)"
    }));
    let visibility = resolve_visibility(&section.questions, &answers);

    assert_eq!(visibility["5.1"], true);
    assert_eq!(visibility["7.1"], false);
    assert_eq!(visibility["7.2"], false);
    assert_eq!(visibility["8.1"], true);
    assert_eq!(visibility["intro"], true);
}

#[test]
fn checkbox_answers_drive_all_of() {
    let spec = load();
    let (_, section) = spec.find_section("call-handling").expect("section");
    let details = &section.questions[1];

    let both = AnswerMap::from_snapshot(&json!({ "q_10": ["9-1-1", "Admin", "SMS/Text"] }));
    let partial = AnswerMap::from_snapshot(&json!({ "q_10": ["9-1-1", "SMS/Text"] }));
    assert!(is_visible(details, &both));
    assert!(!is_visible(details, &partial));
    assert!(!is_visible(details, &AnswerMap::new()));
}

#[test]
fn fixture_has_no_dependency_findings() {
    let spec = load();
    for section in spec.sections() {
        assert!(validate_dependencies(&section.questions).is_empty());
    }
}

#[test]
fn mutual_references_are_both_reported() {
    let questions = vec![
        Question::new("1", "A", QuestionType::Radio)
            .with_condition(ShowCondition::any_of("2", &["Yes"])),
        Question::new("2", "B", QuestionType::Radio)
            .with_condition(ShowCondition::any_of("1", &["Yes"])),
    ];
    assert_eq!(
        validate_dependencies(&questions),
        vec![
            DependencyError::Circular {
                question: "1".into()
            },
            DependencyError::Circular {
                question: "2".into()
            },
        ]
    );
}

#[test]
fn missing_parent_reported_once() {
    let questions = vec![
        Question::new("1", "A", QuestionType::Radio),
        Question::new("2", "B", QuestionType::Text)
            .with_condition(ShowCondition::any_of("99", &["Yes"])),
    ];
    assert_eq!(
        validate_dependencies(&questions),
        vec![DependencyError::MissingReference {
            question: "2".into(),
            referenced: "99".into(),
        }]
    );
}

#[test]
fn integral_float_id_matches_integer_reference() {
    let section: survey_spec::Section = serde_json::from_value(json!({
        "title": "Services",
        "questions": [
            { "id": 7.0, "text": "Extra services?", "type": "radio", "options": ["Yes", "No"] },
            { "id": 8, "text": "Describe them", "type": "text",
              "showIf": { "questionId": 7, "anyOf": ["Yes"] } }
        ]
    }))
    .expect("deserialize");

    assert!(validate_dependencies(&section.questions).is_empty());
    let answers = AnswerMap::from_snapshot(&json!({ "q_7": "Yes" }));
    assert!(is_visible(&section.questions[1], &answers));
}
