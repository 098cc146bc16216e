use serde::{Deserialize, Serialize};
use serde_json::Value;

use survey_spec::{AnswerMap, QuestionType, Section, SurveySpec, is_visible};

use crate::session::UserSession;

/// Completion across all processable sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl ProgressSummary {
    pub fn for_survey(spec: &SurveySpec, session: &UserSession) -> Self {
        let sections = spec.sections();
        let completed = sections
            .iter()
            .filter(|section| session.is_complete(&section.id()))
            .count();
        let total = sections.len();
        ProgressSummary {
            completed,
            total,
            percent: percent(completed, total),
        }
    }
}

/// Share of currently visible, answerable questions that hold an answer.
pub fn section_completion(section: &Section, snapshot: &Value) -> u8 {
    let answers = AnswerMap::from_snapshot(snapshot);
    let visible: Vec<_> = section
        .questions
        .iter()
        .filter(|question| question.kind != QuestionType::Info)
        .filter(|question| is_visible(question, &answers))
        .collect();
    let answered = visible
        .iter()
        .filter(|question| has_value(snapshot.get(question.answer_key())))
        .count();
    percent(answered, visible.len())
}

fn has_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(entries)) => !entries.is_empty(),
        Some(_) => true,
    }
}

fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u8
}
